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

//! Undo log for the search state.

use crate::{model::CostModel, state::SearchState};
use allot_model::index::{CenterIndex, VariableIndex};
use allot_search::num::SolverNumeric;

/// One applied assignment, with what is needed to revert it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct TrailEntry<T> {
    old_objective: T,
    variable: VariableIndex,
    center: CenterIndex,
}

/// A linear undo log with frame markers.
///
/// Usage mirrors the search stack:
/// 1. `push_frame` before descending,
/// 2. `apply_assignment` for the decision taken,
/// 3. `backtrack` to restore the state to the start of the frame.
#[derive(Debug, Clone)]
pub struct SearchTrail<T> {
    entries: Vec<TrailEntry<T>>,
    /// `frames[i]` is the index in `entries` where depth `i` began.
    frames: Vec<usize>,
}

impl<T> Default for SearchTrail<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SearchTrail<T> {
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Reserves one entry per variable and one frame per depth.
    #[inline]
    pub fn preallocated(num_variables: usize) -> Self {
        Self {
            entries: Vec::with_capacity(num_variables),
            frames: Vec::with_capacity(num_variables + 1),
        }
    }

    pub fn ensure_capacity(&mut self, num_variables: usize) {
        if self.entries.capacity() < num_variables {
            self.entries.reserve(num_variables - self.entries.len());
        }
        if self.frames.capacity() < num_variables + 1 {
            self.frames.reserve((num_variables + 1) - self.frames.len());
        }
    }

    #[inline]
    pub fn push_frame(&mut self) {
        self.frames.push(self.entries.len());
    }

    /// Applies `variable := center` to `state` and records it.
    pub fn apply_assignment(
        &mut self,
        state: &mut SearchState<T>,
        model: &CostModel<T>,
        variable: VariableIndex,
        center: CenterIndex,
        new_objective: T,
    ) where
        T: SolverNumeric,
    {
        debug_assert!(
            variable.get() < state.num_variables(),
            "called `SearchTrail::apply_assignment` with variable index out of bounds: the len is {} but the index is {}",
            state.num_variables(),
            variable.get()
        );
        self.entries.push(TrailEntry {
            old_objective: state.current_objective(),
            variable,
            center,
        });
        let slot = model.slot(model.day(variable), center);
        state.assign(variable, center, slot, model.group(variable), new_objective);
    }

    /// Reverts every entry of the top frame and pops it.
    /// Returns `false` if there was no frame.
    pub fn backtrack(&mut self, state: &mut SearchState<T>, model: &CostModel<T>) -> bool
    where
        T: SolverNumeric,
    {
        let Some(start) = self.frames.pop() else {
            return false;
        };
        while self.entries.len() > start {
            if let Some(entry) = self.entries.pop() {
                let slot = model.slot(model.day(entry.variable), entry.center);
                state.unassign(
                    entry.variable,
                    slot,
                    model.group(entry.variable),
                    entry.old_objective,
                );
            }
        }
        true
    }

    /// Clears entries and frames but keeps the allocation.
    #[inline]
    pub fn reset(&mut self) {
        self.entries.clear();
        self.frames.clear();
    }
}

impl<T> std::fmt::Display for SearchTrail<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SearchTrail(entries: {}, frames: {})",
            self.entries.len(),
            self.frames.len()
        )
    }
}
