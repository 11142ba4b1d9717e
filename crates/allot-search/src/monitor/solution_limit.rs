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

use crate::monitor::search_monitor::{AbortReason, SearchCommand, SearchMonitor};
use allot_model::{instance::ProblemInstance, solution::Solution};
use num_traits::{PrimInt, Signed};
use std::num::NonZeroU64;

/// Terminates the search once `solution_limit` improving solutions were found.
/// The best of them is reported as feasible, not optimal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionLimitMonitor<T> {
    solutions_found: u64,
    solution_limit: NonZeroU64,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> SolutionLimitMonitor<T> {
    #[inline]
    pub fn new(solution_limit: NonZeroU64) -> Self {
        Self {
            solutions_found: 0,
            solution_limit,
            _phantom: std::marker::PhantomData,
        }
    }

    #[inline]
    pub fn solutions_found(&self) -> u64 {
        self.solutions_found
    }

    #[inline]
    fn reached_limit(&self) -> bool {
        self.solutions_found >= self.solution_limit.get()
    }
}

impl<T> SearchMonitor<T> for SolutionLimitMonitor<T>
where
    T: PrimInt + Signed,
{
    fn name(&self) -> &str {
        "SolutionLimitMonitor"
    }

    fn on_enter_search(&mut self, _instance: &ProblemInstance<T>) {
        self.solutions_found = 0;
    }

    fn on_exit_search(&mut self) {}

    fn on_solution_found(&mut self, _solution: &Solution<T>) {
        self.solutions_found = self.solutions_found.saturating_add(1);
    }

    fn on_step(&mut self) {}

    fn search_command(&self) -> SearchCommand {
        if self.reached_limit() {
            SearchCommand::Terminate(AbortReason::SolutionLimit)
        } else {
            SearchCommand::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_solution(objective: i64) -> Solution<i64> {
        Solution::new(objective, 1, Vec::new())
    }

    #[test]
    fn test_continue_before_limit_and_terminate_at_limit() {
        let mut monitor = SolutionLimitMonitor::<i64>::new(NonZeroU64::new(2).unwrap());
        assert_eq!(monitor.search_command(), SearchCommand::Continue);

        monitor.on_solution_found(&dummy_solution(10));
        assert_eq!(monitor.search_command(), SearchCommand::Continue);

        monitor.on_solution_found(&dummy_solution(5));
        assert_eq!(
            monitor.search_command(),
            SearchCommand::Terminate(AbortReason::SolutionLimit)
        );
        assert_eq!(monitor.solutions_found(), 2);
    }
}
