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

//! Search state for the branch-and-bound engine.
//!
//! `SearchState` holds the partial assignment explored by the search:
//! - which variables are fixed (a `FixedBitSet`) and to which center,
//! - how many students each `(day, center)` slot already holds,
//! - how many open variables remain in each lower-bound group,
//! - the objective of the partial assignment.
//!
//! Mutation goes through `SearchTrail`, which records enough to undo every
//! assignment on backtrack.

use crate::model::CostModel;
use allot_model::{
    index::{CenterIndex, VariableIndex},
    solution::Solution,
};
use allot_search::num::SolverNumeric;
use fixedbitset::FixedBitSet;

#[derive(Debug, Clone)]
pub struct SearchState<T> {
    values: Vec<CenterIndex>,
    used: Vec<u32>,
    open_in_group: Vec<u32>,
    assigned: FixedBitSet,
    current_objective: T,
    num_days: usize,
    num_assigned: usize,
}

impl<T> SearchState<T>
where
    T: SolverNumeric,
{
    /// Creates the empty state for `model`: nothing assigned, objective zero.
    pub fn new(model: &CostModel<T>) -> Self {
        let num_variables = model.num_variables();
        Self {
            values: vec![CenterIndex::new(0); num_variables],
            used: vec![0; model.limits().len()],
            open_in_group: model.group_sizes().to_vec(),
            assigned: FixedBitSet::with_capacity(num_variables),
            current_objective: T::zero(),
            num_days: model.num_days(),
            num_assigned: 0,
        }
    }

    #[inline]
    pub fn num_variables(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn num_assigned(&self) -> usize {
        self.num_assigned
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.num_assigned == self.values.len()
    }

    /// The next variable in branching order, if any remain.
    #[inline]
    pub fn next_variable(&self) -> Option<VariableIndex> {
        (!self.is_complete()).then(|| VariableIndex::new(self.num_assigned))
    }

    #[inline]
    pub fn current_objective(&self) -> T {
        self.current_objective
    }

    #[inline]
    pub fn is_assigned(&self, variable: VariableIndex) -> bool {
        self.assigned.contains(variable.get())
    }

    /// The value of `variable`, or `None` while it is open.
    #[inline(always)]
    pub fn value(&self, variable: VariableIndex) -> Option<CenterIndex> {
        self.is_assigned(variable).then(|| self.values[variable.get()])
    }

    /// Students already placed in capacity slot `slot`.
    #[inline(always)]
    pub fn used(&self, slot: usize) -> u32 {
        self.used[slot]
    }

    /// Open variables whose cheapest value falls in `group`.
    #[inline(always)]
    pub fn open_in_group(&self, group: usize) -> u32 {
        self.open_in_group[group]
    }

    #[inline]
    pub fn open_in_groups(&self) -> &[u32] {
        &self.open_in_group
    }

    /// Fixes `variable := center`.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if `variable` is already assigned.
    #[inline]
    pub fn assign(
        &mut self,
        variable: VariableIndex,
        center: CenterIndex,
        slot: usize,
        group: usize,
        new_objective: T,
    ) {
        debug_assert!(
            !self.is_assigned(variable),
            "called `SearchState::assign` with {} which is already assigned",
            variable
        );
        self.values[variable.get()] = center;
        self.assigned.insert(variable.get());
        self.used[slot] += 1;
        self.open_in_group[group] -= 1;
        self.num_assigned += 1;
        self.current_objective = new_objective;
    }

    /// Reverts an `assign` of `variable` that occupied `slot` and `group`.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if `variable` is not assigned.
    #[inline]
    pub fn unassign(
        &mut self,
        variable: VariableIndex,
        slot: usize,
        group: usize,
        old_objective: T,
    ) {
        debug_assert!(
            self.is_assigned(variable),
            "called `SearchState::unassign` with {} which is not assigned",
            variable
        );
        self.assigned.set(variable.get(), false);
        self.used[slot] -= 1;
        self.open_in_group[group] += 1;
        self.num_assigned -= 1;
        self.current_objective = old_objective;
    }
}

impl<T> std::fmt::Display for SearchState<T>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "State(objective: {}, assigned: {}/{})",
            self.current_objective,
            self.num_assigned,
            self.values.len()
        )
    }
}

/// Returned when converting a partial state into a `Solution`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IncompleteSolutionError {
    assigned: usize,
    total: usize,
}

impl std::fmt::Display for IncompleteSolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Incomplete solution: assigned {}/{} variables",
            self.assigned, self.total
        )
    }
}

impl std::error::Error for IncompleteSolutionError {}

impl<T> TryFrom<&SearchState<T>> for Solution<T>
where
    T: SolverNumeric,
{
    type Error = IncompleteSolutionError;

    fn try_from(state: &SearchState<T>) -> Result<Self, Self::Error> {
        if !state.is_complete() {
            return Err(IncompleteSolutionError {
                assigned: state.num_assigned(),
                total: state.num_variables(),
            });
        }
        Ok(Solution::new(
            state.current_objective,
            state.num_days,
            state.values.clone(),
        ))
    }
}
