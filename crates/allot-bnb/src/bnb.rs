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

//! Branch-and-bound search over assignment instances.
//!
//! `BnbSolver` keeps the reusable trail and decision stack; each call to
//! `solve` runs a search session that owns the per-run state, statistics and
//! timing. The session branches over variables in index order and tries the
//! values of each variable cheapest first. A branch is cut when:
//!
//! - the value has no capacity left on its day,
//! - the value breaks the lexicographic order between interchangeable students,
//! - the partial objective plus the admissible bound of `bound` cannot beat
//!   the incumbent.
//!
//! Capacity is the only hard constraint and days are independent, so a
//! partial assignment that respects every capacity can always be completed
//! when each day's demand fits its total capacity. That check runs once at
//! the root; past it, every leaf is feasible.

use crate::{
    bound::remaining_lower_bound,
    decision::Decision,
    model::CostModel,
    monitor::tree_search_monitor::{PruneReason, TreeSearchMonitor},
    result::BnbSolverOutcome,
    stack::SearchStack,
    state::SearchState,
    stats::BnbSolverStatistics,
    symmetry::SymmetryClasses,
    trail::SearchTrail,
};
use allot_model::{
    index::{CenterIndex, VariableIndex},
    instance::ProblemInstance,
    solution::Solution,
};
use allot_search::{
    adapter::SolverError, monitor::search_monitor::SearchCommand, num::SolverNumeric,
    result::TerminationReason,
};

/// An exact branch-and-bound solver for assignment instances.
#[derive(Clone, Debug)]
pub struct BnbSolver<T> {
    trail: SearchTrail<T>,
    stack: SearchStack<T>,
    symmetry_breaking: bool,
}

impl<T> Default for BnbSolver<T>
where
    T: SolverNumeric,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BnbSolver<T>
where
    T: SolverNumeric,
{
    /// Creates a solver with symmetry breaking enabled.
    #[inline]
    pub fn new() -> Self {
        Self {
            trail: SearchTrail::new(),
            stack: SearchStack::new(),
            symmetry_breaking: true,
        }
    }

    /// Creates a solver with storage reserved for the given size.
    #[inline]
    pub fn preallocated(num_centers: usize, num_variables: usize) -> Self {
        Self {
            trail: SearchTrail::preallocated(num_variables),
            stack: SearchStack::preallocated(num_centers, num_variables),
            symmetry_breaking: true,
        }
    }

    #[inline]
    pub fn with_symmetry_breaking(mut self, enabled: bool) -> Self {
        self.symmetry_breaking = enabled;
        self
    }

    #[inline]
    pub fn symmetry_breaking(&self) -> bool {
        self.symmetry_breaking
    }

    /// Solves `instance`, reporting to `monitor`.
    ///
    /// # Errors
    ///
    /// Returns `SolverError::MalformedInstance` if the instance cannot be
    /// compiled into a cost model.
    pub fn solve<S>(
        &mut self,
        instance: &ProblemInstance<T>,
        mut monitor: S,
    ) -> Result<BnbSolverOutcome<T>, SolverError>
    where
        S: TreeSearchMonitor<T>,
    {
        let model = CostModel::from_instance(instance)?;
        let symmetry = if self.symmetry_breaking {
            SymmetryClasses::detect(&model)
        } else {
            SymmetryClasses::none(model.num_students())
        };
        let session =
            BnbSolverSearchSession::new(self, instance, &model, &symmetry, &mut monitor);
        let outcome = session.run();
        self.reset();
        Ok(outcome)
    }

    /// Clears the trail and stack, keeping their allocations.
    #[inline]
    fn reset(&mut self) {
        self.trail.reset();
        self.stack.reset();
    }
}

/// A child node generated from a decision.
#[derive(Clone, Copy, Debug)]
struct ChildNode<T> {
    new_objective: T,
    variable: VariableIndex,
    center: CenterIndex,
}

/// State and logic of a single search run.
struct BnbSolverSearchSession<'a, T, S>
where
    T: SolverNumeric,
{
    solver: &'a mut BnbSolver<T>,
    instance: &'a ProblemInstance<T>,
    model: &'a CostModel<T>,
    symmetry: &'a SymmetryClasses,
    monitor: &'a mut S,
    state: SearchState<T>,
    best_objective: T,
    best_solution: Option<Solution<T>>,
    stats: BnbSolverStatistics<T>,
    start_time: std::time::Instant,
}

impl<'a, T, S> std::fmt::Display for BnbSolverSearchSession<'a, T, S>
where
    T: SolverNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let solution_str = match &self.best_solution {
            Some(sol) => format!("Solution(objective: {})", sol.objective_value()),
            None => "No solution found".to_string(),
        };
        write!(
            f,
            "SearchSession(best_objective: {}, best_solution: {}, state: {})",
            self.best_objective, solution_str, self.state
        )
    }
}

impl<'a, T, S> BnbSolverSearchSession<'a, T, S>
where
    T: SolverNumeric,
    S: TreeSearchMonitor<T>,
{
    #[inline]
    fn new(
        solver: &'a mut BnbSolver<T>,
        instance: &'a ProblemInstance<T>,
        model: &'a CostModel<T>,
        symmetry: &'a SymmetryClasses,
        monitor: &'a mut S,
    ) -> Self {
        Self {
            solver,
            instance,
            model,
            symmetry,
            monitor,
            state: SearchState::new(model),
            best_objective: T::max_value(),
            best_solution: None,
            stats: BnbSolverStatistics::default(),
            start_time: std::time::Instant::now(),
        }
    }

    fn run(mut self) -> BnbSolverOutcome<T> {
        self.monitor.on_enter_search(self.instance, &self.stats);

        if !self.initialize() {
            self.stats.set_total_time(self.start_time.elapsed());
            self.monitor.on_exit_search(&self.stats);
            return self.finalize_result(TerminationReason::InfeasibilityProven);
        }

        let termination_reason = loop {
            self.monitor.on_step(&self.state, &self.stats);
            self.stats.on_step();

            if let SearchCommand::Terminate(reason) =
                self.monitor.search_command(&self.state, &self.stats)
            {
                break TerminationReason::Aborted(reason);
            }

            if self.solver.stack.is_current_level_empty() {
                if self.solver.stack.depth() <= 1 {
                    break if self.best_solution.is_some() {
                        TerminationReason::OptimalityProven
                    } else {
                        TerminationReason::InfeasibilityProven
                    };
                }
                self.backtrack_step();
            } else {
                self.process_next_decision();
            }
        };

        self.stats.set_total_time(self.start_time.elapsed());
        self.monitor.on_exit_search(&self.stats);
        self.finalize_result(termination_reason)
    }

    fn finalize_result(self, reason: TerminationReason) -> BnbSolverOutcome<T> {
        match (reason, self.best_solution) {
            (TerminationReason::OptimalityProven, Some(solution)) => {
                BnbSolverOutcome::optimal(solution, self.stats)
            }
            (TerminationReason::Aborted(abort), best) => {
                BnbSolverOutcome::aborted(best, abort, self.stats)
            }
            _ => BnbSolverOutcome::infeasible(self.stats),
        }
    }

    /// Reserves storage, rejects days whose demand exceeds capacity and
    /// enqueues the root decisions. Returns `false` if the instance is
    /// infeasible.
    fn initialize(&mut self) -> bool {
        let (num_centers, num_variables) = (self.model.num_centers(), self.model.num_variables());
        self.solver.trail.ensure_capacity(num_variables);
        self.solver.stack.ensure_capacity(num_centers, num_variables);

        if self.model.overloaded_day().is_some() {
            self.stats.on_pruning_infeasible();
            self.monitor
                .on_prune(&self.state, PruneReason::Infeasible, &self.stats);
            return false;
        }

        // Root frame. Must exist before the first decisions are pushed.
        self.solver.trail.push_frame();
        self.solver.stack.push_frame();
        self.stats.on_node_explored();

        if self.state.is_complete() {
            self.handle_complete_solution(self.state.current_objective());
            return true;
        }

        let root_bound = remaining_lower_bound(self.model, &self.state);
        self.stats.set_root_lower_bound(root_bound);
        self.monitor
            .on_lower_bound_computed(&self.state, root_bound, root_bound, &self.stats);
        self.enqueue_decisions();
        true
    }

    fn backtrack_step(&mut self) {
        self.stats.on_backtrack();
        self.monitor.on_backtrack(&self.state, &self.stats);

        self.solver.trail.backtrack(&mut self.state, self.model);
        self.solver.stack.pop_frame();
    }

    fn process_next_decision(&mut self) {
        let Some(decision) = self.solver.stack.pop() else {
            return;
        };
        self.stats.on_decision_generated();

        if let Some(child) = self.build_child(decision) {
            self.descend(child, decision);
        }
    }

    fn build_child(&mut self, decision: Decision<T>) -> Option<ChildNode<T>> {
        debug_assert!(
            decision.variable().get() < self.model.num_variables(),
            "called `BnbSolverSearchSession::build_child` with variable index out of bounds: the len is {} but the index is {}",
            self.model.num_variables(),
            decision.variable().get()
        );

        let new_objective = self
            .state
            .current_objective()
            .saturating_add(decision.cost_delta());
        if new_objective >= self.best_objective {
            self.stats.on_pruning_bound();
            self.monitor
                .on_prune(&self.state, PruneReason::BoundDominated, &self.stats);
            return None;
        }

        Some(ChildNode {
            new_objective,
            variable: decision.variable(),
            center: decision.center(),
        })
    }

    fn descend(&mut self, child: ChildNode<T>, decision: Decision<T>) {
        self.solver.trail.push_frame();
        self.solver.trail.apply_assignment(
            &mut self.state,
            self.model,
            child.variable,
            child.center,
            child.new_objective,
        );
        self.solver.stack.push_frame();

        self.stats.on_node_explored();
        self.stats.on_depth_update(self.solver.stack.depth() as u64);
        self.monitor.on_descend(&self.state, decision, &self.stats);

        if self.state.is_complete() {
            self.handle_complete_solution(child.new_objective);
            return;
        }

        if self.should_backtrack_after_expand() {
            self.backtrack_step();
        }
    }

    fn handle_complete_solution(&mut self, new_objective: T) {
        if new_objective >= self.best_objective && self.best_solution.is_some() {
            self.stats.on_pruning_bound();
            self.monitor
                .on_prune(&self.state, PruneReason::BoundDominated, &self.stats);
            return;
        }
        match Solution::try_from(&self.state) {
            Ok(solution) => {
                self.best_objective = new_objective;
                self.stats.on_solution_found();
                self.monitor.on_solution_found(&solution, &self.stats);
                self.best_solution = Some(solution);
            }
            Err(_) => {
                self.stats.on_pruning_infeasible();
                self.monitor
                    .on_prune(&self.state, PruneReason::Infeasible, &self.stats);
            }
        }
    }

    /// Bounds the current node and, if it survives, enqueues its children.
    fn should_backtrack_after_expand(&mut self) -> bool {
        let remaining = remaining_lower_bound(self.model, &self.state);
        let node_lower_bound = self.state.current_objective().saturating_add(remaining);
        self.monitor
            .on_lower_bound_computed(&self.state, node_lower_bound, remaining, &self.stats);

        if node_lower_bound >= self.best_objective {
            self.stats.on_pruning_bound();
            self.monitor
                .on_prune(&self.state, PruneReason::BoundDominated, &self.stats);
            return true;
        }

        if self.enqueue_decisions() == 0 {
            self.stats.on_pruning_infeasible();
            self.monitor
                .on_prune(&self.state, PruneReason::Infeasible, &self.stats);
            return true;
        }
        false
    }

    /// Pushes the admissible values of the next open variable, cheapest on
    /// top. Returns how many were pushed.
    fn enqueue_decisions(&mut self) -> usize {
        let Some(variable) = self.state.next_variable() else {
            return 0;
        };
        let day = self.model.day(variable);
        let min_center = self.symmetry.min_center(self.model, &self.state, variable);
        if !min_center.is_zero() {
            self.stats.on_pruning_symmetry(min_center.get() as u64);
        }

        let before = self.solver.stack.num_entries();
        for c in min_center.get()..self.model.num_centers() {
            let center = CenterIndex::new(c);
            let slot = self.model.slot(day, center);
            if self.state.used(slot) >= self.model.limit(day, center) {
                continue;
            }
            let cost = self.model.assignment_cost(variable, center, &self.state);
            self.solver.stack.push(Decision::new(variable, center, cost));
        }
        // Descending cost, then descending center: the cheapest, lowest
        // center ends up on top.
        self.solver.stack.sort_current_frame_by(|a, b| {
            b.cost_delta()
                .cmp(&a.cost_delta())
                .then_with(|| b.center().cmp(&a.center()))
        });
        let added = self.solver.stack.num_entries() - before;
        self.monitor
            .on_decisions_enqueued(&self.state, added, &self.stats);
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::{log::LogTreeSearchMonitor, no_op::NoOperationMonitor};
    use allot_model::{
        builder::ProblemBuilder,
        index::{DayIndex, StudentIndex},
        input::{CenterRecord, StudentRecord},
        weights::ObjectiveWeights,
    };
    use allot_search::result::SolverResult;

    type IntegerType = i64;

    fn build(
        prefs: &[&str],
        centers: Vec<CenterRecord>,
        weights: ObjectiveWeights<IntegerType>,
    ) -> ProblemInstance<IntegerType> {
        let students: Vec<_> = prefs
            .iter()
            .enumerate()
            .map(|(i, c)| StudentRecord::new(i as i64 + 1, *c))
            .collect();
        ProblemBuilder::new(&students, &centers)
            .weights(weights)
            .build()
            .unwrap()
    }

    fn abc(weights: ObjectiveWeights<IntegerType>) -> ProblemInstance<IntegerType> {
        build(
            &["A", "A", "A", "B", "B", "C", "C"],
            vec![
                CenterRecord::new("A", vec![3, 1]),
                CenterRecord::new("B", vec![3, 2]),
                CenterRecord::new("C", vec![3, 4]),
            ],
            weights,
        )
    }

    fn optimal(outcome: &BnbSolverOutcome<IntegerType>) -> &Solution<IntegerType> {
        match outcome.result() {
            SolverResult::Optimal(solution) => solution,
            other => panic!("expected Optimal, got {:?}", other),
        }
    }

    /// Enumerates every assignment; only for tiny instances.
    fn brute_force(instance: &ProblemInstance<IntegerType>) -> Option<IntegerType> {
        let n = instance.num_variables();
        let c = instance.num_centers();
        let mut values = vec![CenterIndex::new(0); n];
        let mut best = None;
        let total = c.pow(n as u32);
        for mut code in 0..total {
            for value in values.iter_mut() {
                *value = CenterIndex::new(code % c);
                code /= c;
            }
            if instance.is_feasible(&values) {
                let objective = instance.evaluate(&values);
                if best.map_or(true, |b| objective < b) {
                    best = Some(objective);
                }
            }
        }
        best
    }

    #[test]
    fn test_abc_default_weights_optimum_is_eight() {
        let instance = abc(ObjectiveWeights::default());
        let mut solver = BnbSolver::new();
        let outcome = solver
            .solve(&instance, NoOperationMonitor::new())
            .unwrap();
        let solution = optimal(&outcome);
        assert_eq!(solution.objective_value(), 8);
        assert!(instance.is_feasible(solution.centers()));
        assert_eq!(instance.evaluate(solution.centers()), 8);
        assert_eq!(
            outcome.termination_reason(),
            TerminationReason::OptimalityProven
        );
    }

    #[test]
    fn test_abc_heavier_preference_moves_two_a_students_to_c() {
        let instance = abc(ObjectiveWeights::new(2, 1, 1));
        let mut solver = BnbSolver::new();
        let outcome = solver
            .solve(&instance, LogTreeSearchMonitor::default())
            .unwrap();
        let solution = optimal(&outcome);
        assert_eq!(solution.objective_value(), 10);

        let (a, b, c) = (CenterIndex::new(0), CenterIndex::new(1), CenterIndex::new(2));
        let day1 = DayIndex::new(1);
        let a_students_at_c = (0..3)
            .filter(|&s| solution.center(StudentIndex::new(s), day1) == c)
            .count();
        assert_eq!(a_students_at_c, 2);
        for s in 0..3 {
            assert_eq!(solution.center(StudentIndex::new(s), DayIndex::new(0)), a);
        }
        for s in 3..5 {
            assert_eq!(solution.center(StudentIndex::new(s), day1), b);
        }
    }

    #[test]
    fn test_symmetry_breaking_keeps_the_optimum() {
        for weights in [ObjectiveWeights::default(), ObjectiveWeights::new(2, 1, 1)] {
            let instance = abc(weights);
            let with = BnbSolver::new()
                .solve(&instance, NoOperationMonitor::new())
                .unwrap();
            let without = BnbSolver::new()
                .with_symmetry_breaking(false)
                .solve(&instance, NoOperationMonitor::new())
                .unwrap();
            assert_eq!(
                optimal(&with).objective_value(),
                optimal(&without).objective_value()
            );
            assert_eq!(without.statistics().prunings_symmetry, 0);
        }
    }

    #[test]
    fn test_matches_brute_force_on_small_instances() {
        let cases: Vec<(Vec<&str>, Vec<CenterRecord>, ObjectiveWeights<IntegerType>)> = vec![
            (
                vec!["A", "A", "B"],
                vec![CenterRecord::new("A", vec![1, 2]), CenterRecord::new("B", vec![2, 1])],
                ObjectiveWeights::default(),
            ),
            (
                vec!["C", "C", "A"],
                vec![
                    CenterRecord::new("A", vec![1, 1]),
                    CenterRecord::new("B", vec![1, 1]),
                    CenterRecord::new("C", vec![1, 2]),
                ],
                ObjectiveWeights::new(3, 2, 1),
            ),
            (
                vec!["B", "B", "B", "A"],
                vec![
                    CenterRecord::new("A", vec![2]),
                    CenterRecord::new("B", vec![1]),
                    CenterRecord::new("C", vec![2]),
                ],
                ObjectiveWeights::new(1, 0, 4),
            ),
        ];
        for (prefs, centers, weights) in cases {
            let instance = build(&prefs, centers, weights);
            let expected = brute_force(&instance);
            let outcome = BnbSolver::new()
                .solve(&instance, NoOperationMonitor::new())
                .unwrap();
            assert_eq!(
                outcome.result().solution().map(|s| s.objective_value()),
                expected,
                "instance {}",
                instance
            );
        }
    }

    #[test]
    fn test_overloaded_day_is_infeasible() {
        let instance = build(
            &["A", "A", "B"],
            vec![CenterRecord::new("A", vec![1, 2]), CenterRecord::new("B", vec![1, 1])],
            ObjectiveWeights::default(),
        );
        let outcome = BnbSolver::new()
            .solve(&instance, NoOperationMonitor::new())
            .unwrap();
        assert_eq!(outcome.result(), &SolverResult::Infeasible);
        assert_eq!(
            outcome.termination_reason(),
            TerminationReason::InfeasibilityProven
        );
    }

    #[test]
    fn test_single_day_needs_no_consistency_terms() {
        let instance = build(
            &["A", "A", "B"],
            vec![CenterRecord::new("A", vec![1]), CenterRecord::new("B", vec![2])],
            ObjectiveWeights::default(),
        );
        let outcome = BnbSolver::new()
            .solve(&instance, NoOperationMonitor::new())
            .unwrap();
        // One A-student moves to the adjacent center: preference 1, move 0.
        assert_eq!(optimal(&outcome).objective_value(), 1);
    }

    #[test]
    fn test_no_students_is_trivially_optimal() {
        let instance = build(
            &[],
            vec![CenterRecord::new("A", vec![0, 0])],
            ObjectiveWeights::default(),
        );
        let outcome = BnbSolver::new()
            .solve(&instance, NoOperationMonitor::new())
            .unwrap();
        let solution = optimal(&outcome);
        assert_eq!(solution.objective_value(), 0);
        assert_eq!(solution.num_variables(), 0);
    }

    #[test]
    fn test_solver_is_reusable_and_deterministic() {
        let instance = abc(ObjectiveWeights::default());
        let mut solver = BnbSolver::preallocated(instance.num_centers(), instance.num_variables());
        let first = solver.solve(&instance, NoOperationMonitor::new()).unwrap();
        let second = solver.solve(&instance, NoOperationMonitor::new()).unwrap();
        assert_eq!(first.result(), second.result());
        assert_eq!(
            first.statistics().nodes_explored,
            second.statistics().nodes_explored
        );
    }
}
