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

//! Progress reporting through `tracing`.
//!
//! Emits an `info` event at most once per `log_interval`, checked every
//! `clock_check_mask + 1` steps, plus one event per improving solution and a
//! summary at exit.

use crate::{
    decision::Decision,
    monitor::tree_search_monitor::{PruneReason, TreeSearchMonitor},
    state::SearchState,
    stats::BnbSolverStatistics,
};
use allot_model::{instance::ProblemInstance, solution::Solution};
use allot_search::num::SolverNumeric;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct LogTreeSearchMonitor<T> {
    start_time: Instant,
    last_log_time: Instant,
    log_interval: Duration,
    clock_check_mask: u64,
    best_objective: Option<T>,
}

impl<T> LogTreeSearchMonitor<T> {
    pub fn new(log_interval: Duration, clock_check_mask: u64) -> Self {
        Self {
            start_time: Instant::now(),
            last_log_time: Instant::now(),
            log_interval,
            clock_check_mask,
            best_objective: None,
        }
    }
}

impl<T> Default for LogTreeSearchMonitor<T> {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 4095)
    }
}

impl<T> std::fmt::Display for LogTreeSearchMonitor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LogTreeSearchMonitor(log_interval: {:.1}s, clock_check_mask: {})",
            self.log_interval.as_secs_f64(),
            self.clock_check_mask
        )
    }
}

impl<T> TreeSearchMonitor<T> for LogTreeSearchMonitor<T>
where
    T: SolverNumeric,
{
    fn name(&self) -> &str {
        "LogTreeSearchMonitor"
    }

    fn on_enter_search(
        &mut self,
        instance: &ProblemInstance<T>,
        _statistics: &BnbSolverStatistics<T>,
    ) {
        self.start_time = Instant::now();
        self.last_log_time = self.start_time;
        self.best_objective = None;
        tracing::info!(
            students = instance.num_students(),
            centers = instance.num_centers(),
            days = instance.num_days(),
            search_space = %instance.complexity(),
            "branch-and-bound search started"
        );
    }

    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics<T>) {
        let best = match self.best_objective {
            Some(objective) => objective.to_string(),
            None => "none".to_string(),
        };
        tracing::info!(
            nodes = statistics.nodes_explored,
            backtracks = statistics.backtracks,
            solutions = statistics.solutions_found,
            best = %best,
            elapsed_secs = self.start_time.elapsed().as_secs_f64(),
            "branch-and-bound search finished"
        );
    }

    fn on_step(&mut self, state: &SearchState<T>, statistics: &BnbSolverStatistics<T>) {
        if (statistics.steps & self.clock_check_mask) != 0 {
            return;
        }
        if self.last_log_time.elapsed() < self.log_interval {
            return;
        }
        self.last_log_time = Instant::now();
        tracing::info!(
            elapsed_secs = self.start_time.elapsed().as_secs_f64(),
            nodes = statistics.nodes_explored,
            depth = state.num_assigned(),
            best = ?self.best_objective.map(|b| b.to_string()),
            current = %state.current_objective(),
            pruned_bound = statistics.prunings_bound,
            "search progress"
        );
    }

    fn on_lower_bound_computed(
        &mut self,
        _state: &SearchState<T>,
        _lower_bound: T,
        _estimated_remaining: T,
        _statistics: &BnbSolverStatistics<T>,
    ) {
    }

    fn on_prune(
        &mut self,
        _state: &SearchState<T>,
        _reason: PruneReason,
        _statistics: &BnbSolverStatistics<T>,
    ) {
    }

    fn on_decisions_enqueued(
        &mut self,
        _state: &SearchState<T>,
        _count: usize,
        _statistics: &BnbSolverStatistics<T>,
    ) {
    }

    fn on_descend(
        &mut self,
        _state: &SearchState<T>,
        _decision: Decision<T>,
        _statistics: &BnbSolverStatistics<T>,
    ) {
    }

    fn on_backtrack(&mut self, _state: &SearchState<T>, _statistics: &BnbSolverStatistics<T>) {}

    fn on_solution_found(&mut self, solution: &Solution<T>, statistics: &BnbSolverStatistics<T>) {
        self.best_objective = Some(solution.objective_value());
        tracing::info!(
            objective = %solution.objective_value(),
            nodes = statistics.nodes_explored,
            "improving solution found"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bnb::BnbSolver;
    use allot_model::{
        builder::ProblemBuilder,
        input::{CenterRecord, StudentRecord},
    };
    use allot_search::result::SolverResult;

    #[test]
    fn test_logging_every_step_keeps_the_optimum() {
        let centers = vec![
            CenterRecord::new("A", vec![1, 1]),
            CenterRecord::new("B", vec![2, 2]),
        ];
        let students = vec![StudentRecord::new(1, "A"), StudentRecord::new(2, "A")];
        let instance = ProblemBuilder::<i32>::new(&students, &centers)
            .build()
            .unwrap();

        let monitor = LogTreeSearchMonitor::new(Duration::ZERO, 0);
        let outcome = BnbSolver::new().solve(&instance, monitor).unwrap();
        match outcome.result() {
            // One student stays on A; the other moves to the adjacent B on both days.
            SolverResult::Optimal(solution) => assert_eq!(solution.objective_value(), 2),
            other => panic!("expected Optimal, got {:?}", other),
        }
        assert!(outcome.statistics().solutions_found >= 1);
    }

    #[test]
    fn test_display() {
        let monitor = LogTreeSearchMonitor::<i64>::new(Duration::from_millis(500), 1023);
        assert_eq!(
            monitor.to_string(),
            "LogTreeSearchMonitor(log_interval: 0.5s, clock_check_mask: 1023)"
        );
    }
}
