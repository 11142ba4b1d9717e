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

//! # Allocation Pipeline
//!
//! `Allocator` runs build, solve, extract and verify for one set of input
//! records:
//!
//! 1. `ProblemBuilder` validates the records and builds the instance.
//! 2. The configured `AssignmentSolver` solves it within the limits.
//! 3. The outcome is checked against the solve contract.
//! 4. `ResultExtractor` converts and independently audits the assignment.
//!
//! The timeout policy decides whether a timed-out run with a feasible
//! assignment is reported (labeled `SolveStatus::TimedOut`) or rejected.
//! Timeouts are never reported as optimal or infeasible.
//!
//! ```rust
//! use allot_model::input::{CenterRecord, StudentRecord};
//! use allot_solver::engine::{AllocatorBuilder, SolveStatus};
//!
//! let students = vec![StudentRecord::new(1, "A"), StudentRecord::new(2, "A")];
//! let centers = vec![CenterRecord::new("A", vec![1]), CenterRecord::new("B", vec![1])];
//!
//! let mut allocator = AllocatorBuilder::<i64>::new().build();
//! let report = allocator.run(&students, &centers).unwrap();
//! assert_eq!(report.status(), SolveStatus::Optimal);
//! assert_eq!(report.objective(), 1);
//! ```

use crate::{
    config::{SolveConfig, TimeoutPolicy},
    diagnostics::{DemandReport, InfeasibilityReport},
    err::AllotError,
    extract::{Allocation, ResultExtractor},
};
use allot_bnb::adapter::BnbAssignmentSolver;
use allot_model::{
    builder::{PenaltySource, ProblemBuilder},
    input::{CenterRecord, StudentRecord},
    instance::ProblemInstance,
    weights::ObjectiveWeights,
};
use allot_search::{
    adapter::{AssignmentSolver, SolveLimits, verify_outcome},
    num::SolverNumeric,
    result::{SolverResult, TerminationReason},
    stats::SolverStatistics,
};
use std::{num::NonZeroU64, time::Duration};

/// How an accepted run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    /// Proven minimal.
    Optimal,
    /// Feasible, stopped before optimality was proven.
    Feasible,
    /// Feasible, the time budget ran out. Only produced under
    /// `TimeoutPolicy::AcceptPartial`.
    TimedOut,
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "optimal"),
            SolveStatus::Feasible => write!(f, "feasible"),
            SolveStatus::TimedOut => write!(f, "timed out"),
        }
    }
}

/// Everything an accepted run produces.
#[derive(Debug, Clone)]
pub struct AllocationReport<T> {
    status: SolveStatus,
    allocation: Allocation<T>,
    demand: DemandReport,
    statistics: SolverStatistics,
    termination_reason: TerminationReason,
}

impl<T> AllocationReport<T>
where
    T: SolverNumeric,
{
    #[inline]
    pub fn status(&self) -> SolveStatus {
        self.status
    }

    #[inline]
    pub fn allocation(&self) -> &Allocation<T> {
        &self.allocation
    }

    #[inline]
    pub fn objective(&self) -> T {
        self.allocation.reported_objective()
    }

    #[inline]
    pub fn demand(&self) -> &DemandReport {
        &self.demand
    }

    #[inline]
    pub fn statistics(&self) -> &SolverStatistics {
        &self.statistics
    }

    #[inline]
    pub fn termination_reason(&self) -> TerminationReason {
        self.termination_reason
    }
}

impl<T> std::fmt::Display for AllocationReport<T>
where
    T: SolverNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Status: {}", self.status)?;
        writeln!(f, "Objective: {}", self.objective())?;
        writeln!(f, "Penalties: {}", self.allocation.breakdown())?;
        writeln!(f, "Termination: {}", self.termination_reason)?;
        write!(f, "{}", self.statistics)
    }
}

/// Runs the allocation pipeline with a fixed solver and configuration.
pub struct Allocator<'a, T> {
    solver: Box<dyn AssignmentSolver<T> + 'a>,
    weights: ObjectiveWeights<T>,
    penalty: PenaltySource<T>,
    limits: SolveLimits,
    on_timeout: TimeoutPolicy,
}

impl<'a, T> std::fmt::Debug for Allocator<'a, T>
where
    T: SolverNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Allocator")
            .field("solver", &self.solver.name())
            .field("weights", &self.weights)
            .field("penalty", &self.penalty)
            .field("limits", &self.limits)
            .field("on_timeout", &self.on_timeout)
            .finish()
    }
}

impl<'a, T> Allocator<'a, T>
where
    T: SolverNumeric,
{
    /// Builds an allocator backed by the branch-and-bound engine.
    pub fn from_config(config: &SolveConfig) -> Result<Self, AllotError> {
        let solver = BnbAssignmentSolver::new()
            .with_symmetry_breaking(config.symmetry_breaking)
            .with_progress_logging(config.log_progress);
        Ok(AllocatorBuilder::new()
            .weights(config.objective_weights()?)
            .penalty(config.penalty_source()?)
            .limits(config.limits()?)
            .on_timeout(config.on_timeout)
            .solver(solver)
            .build())
    }

    #[inline]
    pub fn limits(&self) -> &SolveLimits {
        &self.limits
    }

    #[inline]
    pub fn on_timeout(&self) -> TimeoutPolicy {
        self.on_timeout
    }

    /// Validates the records and builds the instance.
    pub fn build_instance(
        &self,
        students: &[StudentRecord],
        centers: &[CenterRecord],
    ) -> Result<ProblemInstance<T>, AllotError> {
        let instance = ProblemBuilder::new(students, centers)
            .weights(self.weights)
            .penalty(self.penalty.clone())
            .build()?;
        tracing::info!(
            students = instance.num_students(),
            centers = instance.num_centers(),
            days = instance.num_days(),
            variables = instance.num_variables(),
            objective_terms = instance.objective_terms().len(),
            "problem instance built"
        );
        Ok(instance)
    }

    /// Builds, solves, extracts and verifies.
    pub fn run(
        &mut self,
        students: &[StudentRecord],
        centers: &[CenterRecord],
    ) -> Result<AllocationReport<T>, AllotError> {
        let instance = self.build_instance(students, centers)?;
        self.solve_instance(&instance)
    }

    /// Solves an already built instance, then extracts and verifies.
    pub fn solve_instance(
        &mut self,
        instance: &ProblemInstance<T>,
    ) -> Result<AllocationReport<T>, AllotError> {
        let demand = DemandReport::from_instance(instance);
        for day in demand.days() {
            tracing::debug!(
                day = day.day,
                demand = day.demand,
                capacity = day.capacity,
                forced_displacements = day.forced_displacements(),
                "daily demand"
            );
        }
        for day in demand.oversubscribed_days() {
            tracing::warn!(
                day = day.day,
                demand = day.demand,
                capacity = day.capacity,
                "day is over-subscribed"
            );
        }

        tracing::info!(solver = self.solver.name(), limits = %self.limits, "solving");
        let outcome = self.solver.solve(instance, &self.limits)?;
        verify_outcome(instance, &outcome)?;
        tracing::info!(
            result = %outcome.result,
            reason = %outcome.reason,
            nodes = outcome.statistics.nodes_explored,
            seconds = outcome.statistics.solve_duration.as_secs_f64(),
            "solver finished"
        );

        let (status, solution) = match outcome.result {
            SolverResult::Optimal(solution) => (SolveStatus::Optimal, solution),
            SolverResult::Feasible(solution) => (SolveStatus::Feasible, solution),
            SolverResult::Infeasible => {
                return Err(AllotError::Infeasible(InfeasibilityReport::new(demand)));
            }
            SolverResult::TimedOut(None) => {
                return Err(AllotError::TimedOut {
                    best_objective: None,
                });
            }
            SolverResult::TimedOut(Some(solution)) => match self.on_timeout {
                TimeoutPolicy::AcceptPartial => {
                    tracing::warn!(
                        objective = %solution.objective_value(),
                        "time budget exhausted, accepting best assignment found"
                    );
                    (SolveStatus::TimedOut, solution)
                }
                TimeoutPolicy::Reject => {
                    return Err(AllotError::TimedOut {
                        best_objective: Some(solution.objective_value().to_string()),
                    });
                }
            },
        };

        let allocation = ResultExtractor::new(instance).extract_verified(&solution)?;
        tracing::info!(
            status = %status,
            objective = %allocation.reported_objective(),
            breakdown = %allocation.breakdown(),
            "assignment verified"
        );

        Ok(AllocationReport {
            status,
            allocation,
            demand,
            statistics: outcome.statistics,
            termination_reason: outcome.reason,
        })
    }
}

/// Builder for `Allocator`. Defaults: unit weights, banded penalties, no
/// limits, `TimeoutPolicy::Reject`, branch-and-bound solver.
pub struct AllocatorBuilder<'a, T> {
    solver: Option<Box<dyn AssignmentSolver<T> + 'a>>,
    weights: ObjectiveWeights<T>,
    penalty: PenaltySource<T>,
    limits: SolveLimits,
    on_timeout: TimeoutPolicy,
}

impl<'a, T> Default for AllocatorBuilder<'a, T>
where
    T: SolverNumeric,
{
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> AllocatorBuilder<'a, T>
where
    T: SolverNumeric,
{
    #[inline]
    pub fn new() -> Self {
        Self {
            solver: None,
            weights: ObjectiveWeights::default(),
            penalty: PenaltySource::default(),
            limits: SolveLimits::unlimited(),
            on_timeout: TimeoutPolicy::default(),
        }
    }

    #[inline]
    pub fn solver<S>(mut self, solver: S) -> Self
    where
        S: AssignmentSolver<T> + 'a,
    {
        self.solver = Some(Box::new(solver));
        self
    }

    #[inline]
    pub fn weights(mut self, weights: ObjectiveWeights<T>) -> Self {
        self.weights = weights;
        self
    }

    #[inline]
    pub fn penalty(mut self, penalty: PenaltySource<T>) -> Self {
        self.penalty = penalty;
        self
    }

    #[inline]
    pub fn limits(mut self, limits: SolveLimits) -> Self {
        self.limits = limits;
        self
    }

    #[inline]
    pub fn time_budget(mut self, budget: Duration) -> Self {
        self.limits = self.limits.with_time_budget(budget);
        self
    }

    #[inline]
    pub fn solution_limit(mut self, limit: NonZeroU64) -> Self {
        self.limits = self.limits.with_solution_limit(limit);
        self
    }

    #[inline]
    pub fn on_timeout(mut self, policy: TimeoutPolicy) -> Self {
        self.on_timeout = policy;
        self
    }

    #[inline]
    pub fn build(self) -> Allocator<'a, T> {
        Allocator {
            solver: self
                .solver
                .unwrap_or_else(|| Box::new(BnbAssignmentSolver::new())),
            weights: self.weights,
            penalty: self.penalty,
            limits: self.limits,
            on_timeout: self.on_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allot_model::{
        index::{CenterIndex, DayIndex},
        solution::Solution,
    };
    use allot_search::{
        adapter::SolverError, monitor::search_monitor::AbortReason, result::SolverOutcome,
        stats::SolverStatisticsBuilder,
    };

    type IntegerType = i64;

    fn abc_records() -> (Vec<StudentRecord>, Vec<CenterRecord>) {
        let students = ["A", "A", "A", "B", "B", "C", "C"]
            .iter()
            .enumerate()
            .map(|(i, c)| StudentRecord::new(i as i64 + 1, *c))
            .collect();
        let centers = vec![
            CenterRecord::new("A", vec![3, 1]),
            CenterRecord::new("B", vec![3, 2]),
            CenterRecord::new("C", vec![3, 4]),
        ];
        (students, centers)
    }

    /// Gives every variable its preferred center if a seat is left, else the
    /// first center with a free seat, and reports a time-out.
    struct FirstFitTimeout;

    impl AssignmentSolver<IntegerType> for FirstFitTimeout {
        fn name(&self) -> &str {
            "FirstFitTimeout"
        }

        fn solve(
            &mut self,
            instance: &ProblemInstance<IntegerType>,
            _limits: &SolveLimits,
        ) -> Result<SolverOutcome<IntegerType>, SolverError> {
            let mut left: Vec<u32> = (0..instance.num_days())
                .flat_map(|d| instance.day_capacities(DayIndex::new(d)).to_vec())
                .collect();
            let mut values = Vec::with_capacity(instance.num_variables());
            for variable in instance.variables() {
                let day = variable.day().get();
                let preferred = instance.preferred_center(variable.student());
                let slot = |c: CenterIndex| day * instance.num_centers() + c.get();
                let center = if left[slot(preferred)] > 0 {
                    preferred
                } else {
                    (0..instance.num_centers())
                        .map(CenterIndex::new)
                        .find(|&c| left[slot(c)] > 0)
                        .ok_or_else(|| SolverError::MalformedInstance("no seat".into()))?
                };
                left[slot(center)] -= 1;
                values.push(center);
            }
            let solution = Solution::new(instance.evaluate(&values), instance.num_days(), values);
            Ok(SolverOutcome::aborted(
                Some(solution),
                AbortReason::TimeLimit,
                SolverStatisticsBuilder::new().solutions_found(1).build(),
            ))
        }
    }

    #[test]
    fn test_default_allocator_solves_abc_to_optimality() {
        let (students, centers) = abc_records();
        let mut allocator = AllocatorBuilder::<IntegerType>::new().build();
        let report = allocator.run(&students, &centers).unwrap();
        assert_eq!(report.status(), SolveStatus::Optimal);
        assert_eq!(report.objective(), 8);
        assert_eq!(report.allocation().breakdown().weighted_total, 8);
        assert_eq!(report.allocation().rows().len(), 14);
        assert_eq!(
            report.termination_reason(),
            TerminationReason::OptimalityProven
        );
    }

    #[test]
    fn test_timeout_is_rejected_by_default() {
        let (students, centers) = abc_records();
        let mut allocator = AllocatorBuilder::<IntegerType>::new()
            .solver(FirstFitTimeout)
            .build();
        match allocator.run(&students, &centers) {
            Err(AllotError::TimedOut {
                best_objective: Some(_),
            }) => {}
            other => panic!("expected a rejected timeout, got {:?}", other),
        }
    }

    #[test]
    fn test_timeout_accepted_as_partial() {
        let (students, centers) = abc_records();
        let mut allocator = AllocatorBuilder::<IntegerType>::new()
            .solver(FirstFitTimeout)
            .on_timeout(TimeoutPolicy::AcceptPartial)
            .build();
        let report = allocator.run(&students, &centers).unwrap();
        assert_eq!(report.status(), SolveStatus::TimedOut);
        assert!(report.objective() >= 8);
        assert!(report.allocation().summary().iter().all(|s| !s.is_overrun()));
        assert_eq!(
            report.termination_reason(),
            TerminationReason::Aborted(AbortReason::TimeLimit)
        );
    }

    #[test]
    fn test_zero_budget_without_solution_is_an_error_under_both_policies() {
        let (students, centers) = abc_records();
        for policy in [TimeoutPolicy::Reject, TimeoutPolicy::AcceptPartial] {
            let mut allocator = AllocatorBuilder::<IntegerType>::new()
                .time_budget(Duration::ZERO)
                .on_timeout(policy)
                .build();
            assert_eq!(
                allocator.run(&students, &centers).unwrap_err(),
                AllotError::TimedOut {
                    best_objective: None
                }
            );
        }
    }

    #[test]
    fn test_infeasible_run_carries_demand_report() {
        let students = vec![
            StudentRecord::new(1, "A"),
            StudentRecord::new(2, "A"),
            StudentRecord::new(3, "B"),
        ];
        let centers = vec![
            CenterRecord::new("A", vec![2, 1]),
            CenterRecord::new("B", vec![1, 1]),
        ];
        let mut allocator = AllocatorBuilder::<IntegerType>::new().build();
        match allocator.run(&students, &centers) {
            Err(AllotError::Infeasible(report)) => {
                let days: Vec<_> = report.oversubscribed_days().map(|d| d.day).collect();
                assert_eq!(days, vec![1]);
            }
            other => panic!("expected Infeasible, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_errors_are_propagated() {
        let students = vec![StudentRecord::new(1, "Z")];
        let centers = vec![CenterRecord::new("A", vec![1])];
        let mut allocator = AllocatorBuilder::<IntegerType>::new().build();
        assert!(matches!(
            allocator.run(&students, &centers),
            Err(AllotError::Validation(_))
        ));
    }

    #[test]
    fn test_from_config_applies_weights() {
        let (students, centers) = abc_records();
        let mut config = SolveConfig::default();
        config.weights.preference = 2;
        let mut allocator = Allocator::<IntegerType>::from_config(&config).unwrap();
        let report = allocator.run(&students, &centers).unwrap();
        assert_eq!(report.objective(), 10);
    }
}
