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

//! Admissible lower bound on the cost of the open variables.
//!
//! Two parts, both never larger than the true remaining cost:
//!
//! 1. Every open variable pays at least its cheapest unary cost.
//! 2. Open variables sharing a day and a cheapest center compete for that
//!    center's residual capacity. If `k` of them cannot fit, at least `k`
//!    must take another value and pay their regret on top, so the group
//!    adds `k * min_regret`.
//!
//! Links (day-to-day changes) have nonnegative weight and are left out.

use crate::{model::CostModel, state::SearchState};
use allot_search::num::SolverNumeric;

/// Lower bound on the cost still to be added to `state`.
#[inline]
pub fn remaining_lower_bound<T>(model: &CostModel<T>, state: &SearchState<T>) -> T
where
    T: SolverNumeric,
{
    let base = model.suffix_min(state.num_assigned());
    state
        .open_in_groups()
        .iter()
        .zip(model.limits())
        .enumerate()
        .fold(base, |acc, (group, (&open, &limit))| {
            if open == 0 || limit == u32::MAX {
                return acc;
            }
            let residual = limit.saturating_sub(state.used(group));
            let overflow = open.saturating_sub(residual);
            if overflow == 0 {
                return acc;
            }
            let Some(overflow) = num_traits::cast::<u32, T>(overflow) else {
                return acc;
            };
            acc.saturating_add(model.group_min_regret(group).saturating_mul_val(overflow))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use allot_model::{
        builder::ProblemBuilder,
        index::{CenterIndex, DayIndex, VariableIndex},
        input::{CenterRecord, StudentRecord},
        weights::ObjectiveWeights,
    };

    fn abc_model(weights: ObjectiveWeights<i64>) -> CostModel<i64> {
        let centers = vec![
            CenterRecord::new("A", vec![3, 1]),
            CenterRecord::new("B", vec![3, 2]),
            CenterRecord::new("C", vec![3, 4]),
        ];
        let students: Vec<_> = ["A", "A", "A", "B", "B", "C", "C"]
            .iter()
            .enumerate()
            .map(|(i, c)| StudentRecord::new(i as i64 + 1, *c))
            .collect();
        let instance = ProblemBuilder::new(&students, &centers)
            .weights(weights)
            .build()
            .unwrap();
        CostModel::from_instance(&instance).unwrap()
    }

    #[test]
    fn test_root_bound_counts_capacity_overflow() {
        // Three students want A on day 1 where A holds one: two must pay
        // their regret (preference weight 2).
        let model = abc_model(ObjectiveWeights::new(2, 1, 1));
        let state = SearchState::new(&model);
        assert_eq!(remaining_lower_bound(&model, &state), 4);
    }

    #[test]
    fn test_bound_never_exceeds_known_optimum() {
        let model = abc_model(ObjectiveWeights::default());
        let state = SearchState::new(&model);
        assert!(remaining_lower_bound(&model, &state) <= 8);
    }

    #[test]
    fn test_bound_shrinks_as_capacity_is_taken_by_the_group() {
        let model = abc_model(ObjectiveWeights::new(2, 1, 1));
        let mut state = SearchState::new(&model);
        // Student 0 keeps A on both days.
        for d in 0..2 {
            let v = VariableIndex::new(d);
            let c = CenterIndex::new(0);
            state.assign(v, c, model.slot(DayIndex::new(d), c), model.group(v), 0);
        }
        // Two open A-students remain for day 1 with no room left at A.
        assert_eq!(remaining_lower_bound(&model, &state), 4);
    }
}
