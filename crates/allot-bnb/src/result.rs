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

use crate::stats::BnbSolverStatistics;
use allot_model::solution::Solution;
use allot_search::{
    monitor::search_monitor::AbortReason,
    result::{SolverOutcome, SolverResult, TerminationReason},
    stats::SolverStatistics,
};
use num_traits::{PrimInt, Signed};

/// Result of a branch-and-bound run, with engine-specific statistics.
#[derive(Debug, Clone)]
pub struct BnbSolverOutcome<T> {
    result: SolverResult<T>,
    termination_reason: TerminationReason,
    statistics: BnbSolverStatistics<T>,
}

impl<T> BnbSolverOutcome<T>
where
    T: PrimInt + Signed,
{
    #[inline]
    pub fn optimal(solution: Solution<T>, statistics: BnbSolverStatistics<T>) -> Self {
        Self {
            result: SolverResult::Optimal(solution),
            termination_reason: TerminationReason::OptimalityProven,
            statistics,
        }
    }

    #[inline]
    pub fn infeasible(statistics: BnbSolverStatistics<T>) -> Self {
        Self {
            result: SolverResult::Infeasible,
            termination_reason: TerminationReason::InfeasibilityProven,
            statistics,
        }
    }

    /// An early stop. The mapping to a result is the one of
    /// `SolverOutcome::aborted`.
    #[inline]
    pub fn aborted(
        solution: Option<Solution<T>>,
        reason: AbortReason,
        statistics: BnbSolverStatistics<T>,
    ) -> Self {
        let general = SolverOutcome::aborted(solution, reason, SolverStatistics::from(&statistics));
        Self {
            result: general.result,
            termination_reason: general.reason,
            statistics,
        }
    }

    #[inline]
    pub fn result(&self) -> &SolverResult<T> {
        &self.result
    }

    #[inline]
    pub fn termination_reason(&self) -> TerminationReason {
        self.termination_reason
    }

    #[inline]
    pub fn statistics(&self) -> &BnbSolverStatistics<T> {
        &self.statistics
    }
}

impl<T> From<BnbSolverOutcome<T>> for SolverOutcome<T>
where
    T: PrimInt + Signed,
{
    fn from(outcome: BnbSolverOutcome<T>) -> Self {
        let statistics = SolverStatistics::from(&outcome.statistics);
        SolverOutcome::new(outcome.result, outcome.termination_reason, statistics)
    }
}

impl<T> std::fmt::Display for BnbSolverOutcome<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Result: {}", self.result)?;
        writeln!(f, "Termination: {}", self.termination_reason)?;
        write!(f, "{}", self.statistics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> BnbSolverStatistics<i64> {
        BnbSolverStatistics::default()
    }

    #[test]
    fn test_into_solver_outcome_keeps_result_and_reason() {
        let outcome = BnbSolverOutcome::optimal(Solution::new(3, 1, Vec::new()), stats());
        let general: SolverOutcome<i64> = outcome.into();
        assert!(general.is_optimal());
        assert_eq!(general.reason, TerminationReason::OptimalityProven);

        let general: SolverOutcome<i64> = BnbSolverOutcome::infeasible(stats()).into();
        assert!(general.is_infeasible());
    }

    #[test]
    fn test_aborted_without_solution_is_timed_out() {
        let outcome = BnbSolverOutcome::<i64>::aborted(None, AbortReason::TimeLimit, stats());
        assert_eq!(outcome.result(), &SolverResult::TimedOut(None));
        assert_eq!(
            outcome.termination_reason(),
            TerminationReason::Aborted(AbortReason::TimeLimit)
        );
    }

    #[test]
    fn test_aborted_by_solution_limit_is_feasible() {
        let outcome = BnbSolverOutcome::aborted(
            Some(Solution::new(5i64, 1, Vec::new())),
            AbortReason::SolutionLimit,
            stats(),
        );
        assert!(matches!(outcome.result(), SolverResult::Feasible(_)));
        assert!(outcome.to_string().contains("Aborted: solution limit reached"));
    }
}
