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

//! Interchangeable students.
//!
//! Two students whose unary cost rows and links are identical on every day
//! differ only in name: swapping their whole schedules keeps the objective
//! and every capacity count. Within each such class the search only
//! explores schedules in non-decreasing lexicographic order, so each
//! distinct multiset of schedules is visited once. Students linked to
//! another student are never grouped.

use crate::{model::CostModel, state::SearchState};
use allot_model::index::{CenterIndex, DayIndex, StudentIndex, VariableIndex};
use allot_search::num::SolverNumeric;
use fixedbitset::FixedBitSet;
use rustc_hash::FxHashMap;

/// Cost signature of one student: unary rows and `(day, partner day, weight)` links.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Signature<T> {
    unary: Vec<T>,
    links: Vec<(usize, usize, T)>,
}

#[derive(Debug, Clone)]
pub struct SymmetryClasses {
    /// The previous student of the same class, if any.
    predecessor: Vec<Option<StudentIndex>>,
    has_predecessor: FixedBitSet,
}

impl SymmetryClasses {
    /// Groups the students of `model` by cost signature.
    pub fn detect<T>(model: &CostModel<T>) -> Self
    where
        T: SolverNumeric,
    {
        let num_students = model.num_students();
        let mut entangled = FixedBitSet::with_capacity(num_students);
        for v in 0..model.num_variables() {
            let variable = VariableIndex::new(v);
            for &(partner, _) in model.links(variable) {
                let (a, b) = (model.student(variable), model.student(partner));
                if a != b {
                    entangled.insert(a.get());
                    entangled.insert(b.get());
                }
            }
        }

        let mut last_seen: FxHashMap<Signature<T>, StudentIndex> = FxHashMap::default();
        let mut predecessor = vec![None; num_students];
        let mut has_predecessor = FixedBitSet::with_capacity(num_students);
        for s in (0..num_students).filter(|&s| !entangled.contains(s)) {
            let student = StudentIndex::new(s);
            let mut signature = Signature {
                unary: Vec::with_capacity(model.num_days() * model.num_centers()),
                links: Vec::new(),
            };
            for d in 0..model.num_days() {
                let variable = model.student_variable(student, DayIndex::new(d));
                signature.unary.extend_from_slice(model.unary_row(variable));
                signature.links.extend(
                    model
                        .links(variable)
                        .iter()
                        .map(|&(partner, weight)| (d, model.day(partner).get(), weight)),
                );
            }
            if let Some(previous) = last_seen.insert(signature, student) {
                predecessor[s] = Some(previous);
                has_predecessor.insert(s);
            }
        }

        Self {
            predecessor,
            has_predecessor,
        }
    }

    /// No student is restricted.
    pub fn none(num_students: usize) -> Self {
        Self {
            predecessor: vec![None; num_students],
            has_predecessor: FixedBitSet::with_capacity(num_students),
        }
    }

    #[inline]
    pub fn predecessor(&self, student: StudentIndex) -> Option<StudentIndex> {
        self.predecessor[student.get()]
    }

    /// Number of students tied to an earlier twin.
    #[inline]
    pub fn num_restricted(&self) -> usize {
        self.has_predecessor.count_ones(..)
    }

    /// Smallest value `variable` may take so that its student's schedule
    /// stays lexicographically at or above its predecessor's.
    #[inline]
    pub fn min_center<T>(
        &self,
        model: &CostModel<T>,
        state: &SearchState<T>,
        variable: VariableIndex,
    ) -> CenterIndex
    where
        T: SolverNumeric,
    {
        let student = model.student(variable);
        if !self.has_predecessor.contains(student.get()) {
            return CenterIndex::new(0);
        }
        let Some(previous) = self.predecessor[student.get()] else {
            return CenterIndex::new(0);
        };
        let day = model.day(variable);
        let prefix_equal = (0..day.get()).map(DayIndex::new).all(|d| {
            state.value(model.student_variable(student, d))
                == state.value(model.student_variable(previous, d))
        });
        if !prefix_equal {
            return CenterIndex::new(0);
        }
        state
            .value(model.student_variable(previous, day))
            .unwrap_or(CenterIndex::new(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allot_model::{
        builder::ProblemBuilder,
        input::{CenterRecord, StudentRecord},
    };

    fn model(prefs: &[&str]) -> CostModel<i64> {
        let centers = vec![
            CenterRecord::new("A", vec![3, 1]),
            CenterRecord::new("B", vec![3, 2]),
            CenterRecord::new("C", vec![3, 4]),
        ];
        let students: Vec<_> = prefs
            .iter()
            .enumerate()
            .map(|(i, c)| StudentRecord::new(i as i64 + 1, *c))
            .collect();
        let instance = ProblemBuilder::new(&students, &centers).build().unwrap();
        CostModel::from_instance(&instance).unwrap()
    }

    #[test]
    fn test_students_with_same_preference_are_chained() {
        let model = model(&["A", "B", "A", "A"]);
        let classes = SymmetryClasses::detect(&model);
        assert_eq!(classes.predecessor(StudentIndex::new(0)), None);
        assert_eq!(classes.predecessor(StudentIndex::new(1)), None);
        assert_eq!(
            classes.predecessor(StudentIndex::new(2)),
            Some(StudentIndex::new(0))
        );
        assert_eq!(
            classes.predecessor(StudentIndex::new(3)),
            Some(StudentIndex::new(2))
        );
        assert_eq!(classes.num_restricted(), 2);
        assert_eq!(SymmetryClasses::none(4).num_restricted(), 0);
    }

    #[test]
    fn test_min_center_follows_predecessor_while_prefix_ties() {
        let model = model(&["A", "A"]);
        let classes = SymmetryClasses::detect(&model);
        let mut state = SearchState::new(&model);
        let assign = |state: &mut SearchState<i64>, v: usize, c: usize| {
            let (v, c) = (VariableIndex::new(v), CenterIndex::new(c));
            state.assign(v, c, model.slot(model.day(v), c), model.group(v), 0);
        };
        // Student 0: [B, C].
        assign(&mut state, 0, 1);
        assign(&mut state, 1, 2);
        // Student 1 day 0 must be at least B.
        assert_eq!(
            classes.min_center(&model, &state, VariableIndex::new(2)),
            CenterIndex::new(1)
        );
        // Tied on day 0, so day 1 must be at least C.
        assign(&mut state, 2, 1);
        assert_eq!(
            classes.min_center(&model, &state, VariableIndex::new(3)),
            CenterIndex::new(2)
        );
    }

    #[test]
    fn test_min_center_is_free_once_prefix_differs() {
        let model = model(&["A", "A"]);
        let classes = SymmetryClasses::detect(&model);
        let mut state = SearchState::new(&model);
        for (v, c) in [(0, 0), (1, 2), (2, 1)] {
            let (v, c) = (VariableIndex::new(v), CenterIndex::new(c));
            state.assign(v, c, model.slot(model.day(v), c), model.group(v), 0);
        }
        assert_eq!(
            classes.min_center(&model, &state, VariableIndex::new(3)),
            CenterIndex::new(0)
        );
    }
}
