// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Solve Contract
//!
//! `AssignmentSolver` is the only way the pipeline talks to a combinatorial
//! engine. An engine receives an immutable `ProblemInstance` and `SolveLimits`
//! and answers with a `SolverOutcome`:
//!
//! - every non-infeasible result satisfies all hard constraints exactly,
//! - the reported objective equals `ProblemInstance::evaluate` on the
//!   returned values.
//!
//! `verify_outcome` checks both guarantees and is run by the pipeline on every
//! outcome, whichever engine produced it.

use crate::{num::SolverNumeric, result::SolverOutcome};
use allot_model::{instance::ProblemInstance, solution::Solution};
use std::num::NonZeroU64;
use std::time::Duration;

/// Budgets for a single solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolveLimits {
    time_budget: Option<Duration>,
    solution_limit: Option<NonZeroU64>,
}

impl SolveLimits {
    /// No limits: run until optimality or infeasibility is proven.
    #[inline]
    pub fn unlimited() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    #[inline]
    pub fn with_solution_limit(mut self, limit: NonZeroU64) -> Self {
        self.solution_limit = Some(limit);
        self
    }

    #[inline]
    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget
    }

    #[inline]
    pub fn solution_limit(&self) -> Option<NonZeroU64> {
        self.solution_limit
    }
}

impl std::fmt::Display for SolveLimits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.time_budget {
            Some(budget) => write!(f, "SolveLimits(time: {:.3}s", budget.as_secs_f64())?,
            None => write!(f, "SolveLimits(time: none")?,
        }
        match self.solution_limit {
            Some(limit) => write!(f, ", solutions: {limit})"),
            None => write!(f, ", solutions: none)"),
        }
    }
}

/// Failures of the engine itself, as opposed to answers about the instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// The engine cannot work with the instance as given.
    MalformedInstance(String),
    /// A returned solution does not match the instance's dimensions.
    DimensionMismatch { expected: usize, found: usize },
    /// A returned solution breaks a hard constraint.
    ContractViolation(String),
    /// The reported objective differs from the instance's evaluation.
    ObjectiveMismatch { reported: String, evaluated: String },
}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedInstance(msg) => write!(f, "malformed instance: {msg}"),
            Self::DimensionMismatch { expected, found } => write!(
                f,
                "solution has {} values but the instance has {} variables",
                found, expected
            ),
            Self::ContractViolation(msg) => write!(f, "hard constraint violated: {msg}"),
            Self::ObjectiveMismatch {
                reported,
                evaluated,
            } => write!(
                f,
                "reported objective {} does not match evaluated objective {}",
                reported, evaluated
            ),
        }
    }
}

impl std::error::Error for SolverError {}

/// A combinatorial engine that can solve assignment instances.
pub trait AssignmentSolver<T>
where
    T: SolverNumeric,
{
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Solves `instance` within `limits`.
    fn solve(
        &mut self,
        instance: &ProblemInstance<T>,
        limits: &SolveLimits,
    ) -> Result<SolverOutcome<T>, SolverError>;

    /// Solves `instance` with an optional time budget and no other limit.
    fn solve_within(
        &mut self,
        instance: &ProblemInstance<T>,
        time_budget: Option<Duration>,
    ) -> Result<SolverOutcome<T>, SolverError> {
        let limits = match time_budget {
            Some(budget) => SolveLimits::unlimited().with_time_budget(budget),
            None => SolveLimits::unlimited(),
        };
        self.solve(instance, &limits)
    }
}

impl<T> std::fmt::Debug for dyn AssignmentSolver<T>
where
    T: SolverNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AssignmentSolver({})", self.name())
    }
}

/// Checks one solution against the solve contract.
pub fn verify_solution<T>(
    instance: &ProblemInstance<T>,
    solution: &Solution<T>,
) -> Result<(), SolverError>
where
    T: SolverNumeric,
{
    let values = solution.centers();
    if values.len() != instance.num_variables() || solution.num_days() != instance.num_days() {
        return Err(SolverError::DimensionMismatch {
            expected: instance.num_variables(),
            found: values.len(),
        });
    }
    if let Some(bad) = values.iter().find(|c| c.get() >= instance.num_centers()) {
        return Err(SolverError::ContractViolation(format!(
            "value {} outside the domain 0..{}",
            bad.get(),
            instance.num_centers()
        )));
    }
    if let Some(violation) = instance.violated_capacities(values).first() {
        return Err(SolverError::ContractViolation(violation.to_string()));
    }
    let evaluated = instance.evaluate(values);
    if evaluated != solution.objective_value() {
        return Err(SolverError::ObjectiveMismatch {
            reported: solution.objective_value().to_string(),
            evaluated: evaluated.to_string(),
        });
    }
    Ok(())
}

/// Checks the solution carried by an outcome, if any.
#[inline]
pub fn verify_outcome<T>(
    instance: &ProblemInstance<T>,
    outcome: &SolverOutcome<T>,
) -> Result<(), SolverError>
where
    T: SolverNumeric,
{
    match outcome.solution() {
        Some(solution) => verify_solution(instance, solution),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::SolverStatisticsBuilder;
    use allot_model::{
        builder::ProblemBuilder,
        index::CenterIndex,
        input::{CenterRecord, StudentRecord},
    };

    fn instance() -> ProblemInstance<i64> {
        let centers = vec![CenterRecord::new("A", vec![1]), CenterRecord::new("B", vec![1])];
        let students = vec![StudentRecord::new(1, "A"), StudentRecord::new(2, "A")];
        ProblemBuilder::new(&students, &centers).build().unwrap()
    }

    fn ci(i: usize) -> CenterIndex {
        CenterIndex::new(i)
    }

    /// Returns a fixed answer, whatever the instance.
    struct Canned(Solution<i64>);

    impl AssignmentSolver<i64> for Canned {
        fn name(&self) -> &str {
            "Canned"
        }

        fn solve(
            &mut self,
            _instance: &ProblemInstance<i64>,
            _limits: &SolveLimits,
        ) -> Result<SolverOutcome<i64>, SolverError> {
            Ok(SolverOutcome::optimal(
                self.0.clone(),
                SolverStatisticsBuilder::new().build(),
            ))
        }
    }

    #[test]
    fn test_valid_solution_passes() {
        // Student 2 moves to B: pref 1 + move 0.
        let solution = Solution::new(1, 1, vec![ci(0), ci(1)]);
        assert_eq!(verify_solution(&instance(), &solution), Ok(()));
    }

    #[test]
    fn test_capacity_breach_is_reported() {
        let solution = Solution::new(0, 1, vec![ci(0), ci(0)]);
        assert!(matches!(
            verify_solution(&instance(), &solution),
            Err(SolverError::ContractViolation(_))
        ));
    }

    #[test]
    fn test_wrong_objective_is_reported() {
        let solution = Solution::new(5, 1, vec![ci(1), ci(0)]);
        assert_eq!(
            verify_solution(&instance(), &solution),
            Err(SolverError::ObjectiveMismatch {
                reported: "5".to_string(),
                evaluated: "1".to_string()
            })
        );
    }

    #[test]
    fn test_wrong_dimensions_and_domain_are_reported() {
        let short = Solution::new(0, 1, vec![ci(0)]);
        assert_eq!(
            verify_solution(&instance(), &short),
            Err(SolverError::DimensionMismatch {
                expected: 2,
                found: 1
            })
        );
        let outside = Solution::new(0, 1, vec![ci(0), ci(7)]);
        assert!(matches!(
            verify_solution(&instance(), &outside),
            Err(SolverError::ContractViolation(_))
        ));
    }

    #[test]
    fn test_solve_within_and_verify_outcome() {
        let mut solver = Canned(Solution::new(1, 1, vec![ci(1), ci(0)]));
        let instance = instance();
        let outcome = solver
            .solve_within(&instance, Some(Duration::from_secs(1)))
            .unwrap();
        assert!(outcome.is_optimal());
        assert_eq!(verify_outcome(&instance, &outcome), Ok(()));
    }

    #[test]
    fn test_limits_display() {
        let limits = SolveLimits::unlimited()
            .with_time_budget(Duration::from_millis(1500))
            .with_solution_limit(NonZeroU64::new(3).unwrap());
        assert_eq!(limits.to_string(), "SolveLimits(time: 1.500s, solutions: 3)");
        assert_eq!(
            SolveLimits::unlimited().to_string(),
            "SolveLimits(time: none, solutions: none)"
        );
    }
}
