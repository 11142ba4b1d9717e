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

//! `AssignmentSolver` implementation backed by `BnbSolver`.
//!
//! Budgets from `SolveLimits` become engine-independent monitors, wrapped so
//! the tree search can consult them. Progress logging is optional.

use crate::{
    bnb::BnbSolver,
    monitor::{
        composite::CompositeTreeSearchMonitor, log::LogTreeSearchMonitor, wrapper::WrapperMonitor,
    },
};
use allot_model::instance::ProblemInstance;
use allot_search::{
    adapter::{AssignmentSolver, SolveLimits, SolverError},
    monitor::{
        composite::CompositeMonitor, solution_limit::SolutionLimitMonitor,
        time_limit::TimeLimitMonitor,
    },
    num::SolverNumeric,
    result::SolverOutcome,
};

#[derive(Clone, Debug)]
pub struct BnbAssignmentSolver<T> {
    inner: BnbSolver<T>,
    log_progress: bool,
}

impl<T> Default for BnbAssignmentSolver<T>
where
    T: SolverNumeric,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BnbAssignmentSolver<T>
where
    T: SolverNumeric,
{
    #[inline]
    pub fn new() -> Self {
        Self {
            inner: BnbSolver::new(),
            log_progress: false,
        }
    }

    #[inline]
    pub fn preallocated(num_centers: usize, num_variables: usize) -> Self {
        Self {
            inner: BnbSolver::preallocated(num_centers, num_variables),
            log_progress: false,
        }
    }

    /// Emits periodic progress events through `tracing` while solving.
    #[inline]
    pub fn with_progress_logging(mut self, enabled: bool) -> Self {
        self.log_progress = enabled;
        self
    }

    #[inline]
    pub fn with_symmetry_breaking(mut self, enabled: bool) -> Self {
        self.inner = self.inner.with_symmetry_breaking(enabled);
        self
    }

    #[inline]
    pub fn inner(&self) -> &BnbSolver<T> {
        &self.inner
    }
}

impl<T> AssignmentSolver<T> for BnbAssignmentSolver<T>
where
    T: SolverNumeric,
{
    fn name(&self) -> &str {
        "BnbAssignmentSolver"
    }

    fn solve(
        &mut self,
        instance: &ProblemInstance<T>,
        limits: &SolveLimits,
    ) -> Result<SolverOutcome<T>, SolverError> {
        let mut budget = CompositeMonitor::with_capacity(2);
        if let Some(time_budget) = limits.time_budget() {
            budget.add_monitor(TimeLimitMonitor::new(time_budget));
        }
        if let Some(solution_limit) = limits.solution_limit() {
            budget.add_monitor(SolutionLimitMonitor::new(solution_limit));
        }

        let mut monitor = CompositeTreeSearchMonitor::with_capacity(2);
        monitor.add_monitor(WrapperMonitor::new(&mut budget));
        if self.log_progress {
            monitor.add_monitor(LogTreeSearchMonitor::default());
        }

        let outcome = self.inner.solve(instance, monitor)?;
        Ok(outcome.into())
    }
}
