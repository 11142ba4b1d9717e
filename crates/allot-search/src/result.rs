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

use crate::{monitor::search_monitor::AbortReason, stats::SolverStatistics};
use allot_model::solution::Solution;
use num_traits::{PrimInt, Signed};

/// The four possible answers of a solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverResult<T> {
    /// A solution with proven minimal objective.
    Optimal(Solution<T>),
    /// A solution satisfying every hard constraint, optimality not proven.
    Feasible(Solution<T>),
    /// No assignment satisfies the hard constraints.
    Infeasible,
    /// The time budget ran out. Carries the best solution found so far, if any.
    TimedOut(Option<Solution<T>>),
}

impl<T> SolverResult<T> {
    /// Returns the carried solution, if any.
    #[inline]
    pub fn solution(&self) -> Option<&Solution<T>> {
        match self {
            SolverResult::Optimal(s) | SolverResult::Feasible(s) => Some(s),
            SolverResult::TimedOut(s) => s.as_ref(),
            SolverResult::Infeasible => None,
        }
    }

    /// Consumes the result and returns the carried solution, if any.
    #[inline]
    pub fn into_solution(self) -> Option<Solution<T>> {
        match self {
            SolverResult::Optimal(s) | SolverResult::Feasible(s) => Some(s),
            SolverResult::TimedOut(s) => s,
            SolverResult::Infeasible => None,
        }
    }
}

impl<T> std::fmt::Display for SolverResult<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverResult::Optimal(solution) => {
                write!(f, "Optimal(objective={})", solution.objective_value())
            }
            SolverResult::Feasible(solution) => {
                write!(f, "Feasible(objective={})", solution.objective_value())
            }
            SolverResult::Infeasible => write!(f, "Infeasible"),
            SolverResult::TimedOut(Some(solution)) => {
                write!(f, "TimedOut(best objective={})", solution.objective_value())
            }
            SolverResult::TimedOut(None) => write!(f, "TimedOut(no solution)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// The search space was exhausted with a solution in hand.
    OptimalityProven,
    /// The search space was exhausted without any solution.
    InfeasibilityProven,
    /// A monitor stopped the search early.
    Aborted(AbortReason),
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationReason::OptimalityProven => write!(f, "Optimality Proven"),
            TerminationReason::InfeasibilityProven => write!(f, "Infeasibility Proven"),
            TerminationReason::Aborted(reason) => write!(f, "Aborted: {}", reason),
        }
    }
}

/// Result, reason and statistics of one solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverOutcome<T> {
    pub result: SolverResult<T>,
    pub reason: TerminationReason,
    pub statistics: SolverStatistics,
}

impl<T> SolverOutcome<T>
where
    T: PrimInt + Signed,
{
    #[inline]
    pub fn new(
        result: SolverResult<T>,
        reason: TerminationReason,
        statistics: SolverStatistics,
    ) -> Self {
        Self {
            result,
            reason,
            statistics,
        }
    }

    #[inline]
    pub fn optimal(solution: Solution<T>, statistics: SolverStatistics) -> Self {
        Self::new(
            SolverResult::Optimal(solution),
            TerminationReason::OptimalityProven,
            statistics,
        )
    }

    #[inline]
    pub fn infeasible(statistics: SolverStatistics) -> Self {
        Self::new(
            SolverResult::Infeasible,
            TerminationReason::InfeasibilityProven,
            statistics,
        )
    }

    /// Maps an early stop to a result.
    ///
    /// A time limit yields `TimedOut` with whatever was found. A solution
    /// limit yields `Feasible`; it can only trigger after a solution exists,
    /// so a missing solution is reported as `TimedOut(None)`.
    #[inline]
    pub fn aborted(
        best: Option<Solution<T>>,
        reason: AbortReason,
        statistics: SolverStatistics,
    ) -> Self {
        let result = match (reason, best) {
            (AbortReason::SolutionLimit, Some(solution)) => SolverResult::Feasible(solution),
            (_, best) => SolverResult::TimedOut(best),
        };
        Self::new(result, TerminationReason::Aborted(reason), statistics)
    }

    #[inline]
    pub fn is_optimal(&self) -> bool {
        matches!(self.result, SolverResult::Optimal(_))
    }

    #[inline]
    pub fn is_feasible(&self) -> bool {
        matches!(self.result, SolverResult::Feasible(_))
    }

    #[inline]
    pub fn is_infeasible(&self) -> bool {
        matches!(self.result, SolverResult::Infeasible)
    }

    #[inline]
    pub fn is_timed_out(&self) -> bool {
        matches!(self.result, SolverResult::TimedOut(_))
    }

    #[inline]
    pub fn has_solution(&self) -> bool {
        self.result.solution().is_some()
    }

    #[inline]
    pub fn solution(&self) -> Option<&Solution<T>> {
        self.result.solution()
    }
}

impl<T> std::fmt::Display for SolverOutcome<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Result: {}", self.result)?;
        writeln!(f, "Termination: {}", self.reason)?;
        write!(f, "{}", self.statistics)
    }
}
