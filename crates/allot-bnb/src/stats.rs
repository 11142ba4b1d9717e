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

use allot_search::stats::{SolverStatistics, SolverStatisticsBuilder};
use num_traits::Zero;
use std::time::Duration;

/// Statistics collected during one branch-and-bound run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BnbSolverStatistics<T> {
    /// Total nodes visited, the root included.
    pub nodes_explored: u64,
    /// Frames undone.
    pub backtracks: u64,
    /// Decisions popped from the stack.
    pub decisions_generated: u64,
    /// The deepest level reached in the tree.
    pub max_depth: u64,
    /// Subtrees cut because they cannot be completed.
    pub prunings_infeasible: u64,
    /// Subtrees cut because they cannot beat the incumbent.
    pub prunings_bound: u64,
    /// Values skipped by the symmetry-breaking order.
    pub prunings_symmetry: u64,
    /// Improving solutions found.
    pub solutions_found: u64,
    /// Loop iterations.
    pub steps: u64,
    pub time_total: Duration,
    /// Lower bound of the empty assignment.
    pub root_lower_bound: T,
}

impl<T> Default for BnbSolverStatistics<T>
where
    T: Zero,
{
    fn default() -> Self {
        Self {
            nodes_explored: 0,
            backtracks: 0,
            decisions_generated: 0,
            max_depth: 0,
            prunings_infeasible: 0,
            prunings_bound: 0,
            prunings_symmetry: 0,
            solutions_found: 0,
            steps: 0,
            time_total: Duration::ZERO,
            root_lower_bound: T::zero(),
        }
    }
}

impl<T> BnbSolverStatistics<T> {
    #[inline]
    pub fn on_step(&mut self) {
        self.steps = self.steps.saturating_add(1);
    }

    #[inline]
    pub fn on_node_explored(&mut self) {
        self.nodes_explored = self.nodes_explored.saturating_add(1);
    }

    #[inline]
    pub fn on_backtrack(&mut self) {
        self.backtracks = self.backtracks.saturating_add(1);
    }

    #[inline]
    pub fn on_solution_found(&mut self) {
        self.solutions_found = self.solutions_found.saturating_add(1);
    }

    #[inline]
    pub fn on_depth_update(&mut self, depth: u64) {
        self.max_depth = self.max_depth.max(depth);
    }

    #[inline]
    pub fn on_decision_generated(&mut self) {
        self.decisions_generated = self.decisions_generated.saturating_add(1);
    }

    #[inline]
    pub fn on_pruning_infeasible(&mut self) {
        self.prunings_infeasible = self.prunings_infeasible.saturating_add(1);
    }

    #[inline]
    pub fn on_pruning_bound(&mut self) {
        self.prunings_bound = self.prunings_bound.saturating_add(1);
    }

    #[inline]
    pub fn on_pruning_symmetry(&mut self, count: u64) {
        self.prunings_symmetry = self.prunings_symmetry.saturating_add(count);
    }

    #[inline]
    pub fn set_total_time(&mut self, duration: Duration) {
        self.time_total = duration;
    }

    #[inline]
    pub fn set_root_lower_bound(&mut self, bound: T) {
        self.root_lower_bound = bound;
    }
}

impl<T> From<&BnbSolverStatistics<T>> for SolverStatistics {
    fn from(stats: &BnbSolverStatistics<T>) -> Self {
        SolverStatisticsBuilder::new()
            .solutions_found(stats.solutions_found)
            .nodes_explored(stats.nodes_explored)
            .backtracks(stats.backtracks)
            .solve_duration(stats.time_total)
            .build()
    }
}

impl<T> std::fmt::Display for BnbSolverStatistics<T>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Allot-BnB Solver Statistics:")?;
        writeln!(f, "  Nodes explored:        {}", self.nodes_explored)?;
        writeln!(f, "  Backtracks:            {}", self.backtracks)?;
        writeln!(f, "  Max depth reached:     {}", self.max_depth)?;
        writeln!(f, "  Decisions generated:   {}", self.decisions_generated)?;
        writeln!(f, "  Prunings (infeasible): {}", self.prunings_infeasible)?;
        writeln!(f, "  Prunings (bound):      {}", self.prunings_bound)?;
        writeln!(f, "  Prunings (symmetry):   {}", self.prunings_symmetry)?;
        writeln!(f, "  Solutions found:       {}", self.solutions_found)?;
        writeln!(f, "  Root lower bound:      {}", self.root_lower_bound)?;
        writeln!(f, "  Total time:            {:.2?}", self.time_total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut stats = BnbSolverStatistics::<i64>::default();
        stats.on_node_explored();
        stats.on_node_explored();
        stats.on_backtrack();
        stats.on_solution_found();
        stats.on_depth_update(4);
        stats.on_depth_update(2);
        stats.on_pruning_symmetry(3);
        stats.set_root_lower_bound(7);
        assert_eq!(stats.nodes_explored, 2);
        assert_eq!(stats.max_depth, 4);
        assert_eq!(stats.prunings_symmetry, 3);
        assert!(stats.to_string().contains("Root lower bound:      7"));
    }

    #[test]
    fn test_into_solver_statistics() {
        let mut stats = BnbSolverStatistics::<i64>::default();
        stats.on_node_explored();
        stats.on_backtrack();
        stats.on_solution_found();
        stats.set_total_time(Duration::from_millis(5));
        let general = SolverStatistics::from(&stats);
        assert_eq!(general.nodes_explored, 1);
        assert_eq!(general.backtracks, 1);
        assert_eq!(general.solutions_found, 1);
        assert_eq!(general.solve_duration, Duration::from_millis(5));
    }
}
