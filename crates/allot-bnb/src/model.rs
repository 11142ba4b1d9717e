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

//! Compiled cost model
//!
//! `CostModel` flattens a `ProblemInstance` into the dense tables the search
//! loop reads. It is built only from the instance's variables, constraint
//! list and objective terms:
//!
//! - `PreferCenter` and `MoveDistance` terms become per-value unary costs,
//! - `KeepCenter` terms become pairwise links, stored on the later variable,
//! - `Capacity` constraints become per `(day, center)` limits.
//!
//! It also precomputes the static parts of the lower bound: the cheapest
//! value of each variable, its regret (second cheapest minus cheapest) and
//! the suffix sums of the cheapest costs in branching order.

use crate::state::SearchState;
use allot_model::{
    index::{CenterIndex, DayIndex, StudentIndex, VariableIndex},
    instance::{Constraint, ProblemInstance},
};
use allot_search::{adapter::SolverError, num::SolverNumeric};
use smallvec::SmallVec;

/// Pairwise terms that become decidable when their owning variable is assigned.
pub type Links<T> = SmallVec<[(VariableIndex, T); 2]>;

#[derive(Debug, Clone)]
pub struct CostModel<T> {
    num_students: usize,
    num_centers: usize,
    num_days: usize,
    var_day: Vec<DayIndex>,
    var_student: Vec<StudentIndex>,
    /// `student * num_days + day` to variable.
    student_vars: Vec<VariableIndex>,
    /// `variable * num_centers + center`.
    unary: Vec<T>,
    links: Vec<Links<T>>,
    /// `day * num_centers + center`; `u32::MAX` means unconstrained.
    limits: Vec<u32>,
    best_center: Vec<CenterIndex>,
    regret: Vec<T>,
    /// `suffix_min[v]` is the sum of the cheapest unary costs of `v..`.
    suffix_min: Vec<T>,
    /// Variables per group `(day, best center)`.
    group_sizes: Vec<u32>,
    group_min_regret: Vec<T>,
    /// Variables per day.
    day_demand: Vec<u32>,
}

impl<T> CostModel<T>
where
    T: SolverNumeric,
{
    /// Compiles `instance` into dense cost tables.
    ///
    /// # Errors
    ///
    /// Returns `SolverError::MalformedInstance` if an objective term refers to
    /// a hard constraint, an index is out of range, or a weight is negative.
    pub fn from_instance(instance: &ProblemInstance<T>) -> Result<Self, SolverError> {
        let num_variables = instance.num_variables();
        let num_centers = instance.num_centers();
        let num_days = instance.num_days();
        let num_students = instance.num_students();

        if num_centers == 0 || num_days == 0 {
            return Err(SolverError::MalformedInstance(
                "instance has an empty domain or horizon".to_string(),
            ));
        }
        if num_students.checked_mul(num_days) != Some(num_variables) {
            return Err(SolverError::MalformedInstance(format!(
                "{} variables do not cover {} students over {} days",
                num_variables, num_students, num_days
            )));
        }

        let mut var_day = Vec::with_capacity(num_variables);
        let mut var_student = Vec::with_capacity(num_variables);
        let mut student_vars = vec![VariableIndex::new(usize::MAX); num_variables];
        for (v, variable) in instance.variables().iter().enumerate() {
            let (student, day) = (variable.student(), variable.day());
            if student.get() >= num_students || day.get() >= num_days {
                return Err(SolverError::MalformedInstance(format!(
                    "variable {} refers to {} on {}",
                    v, student, day
                )));
            }
            var_day.push(day);
            var_student.push(student);
            student_vars[student.get() * num_days + day.get()] = VariableIndex::new(v);
        }

        let check_variable = |variable: VariableIndex| -> Result<(), SolverError> {
            if variable.get() < num_variables {
                Ok(())
            } else {
                Err(SolverError::MalformedInstance(format!(
                    "constraint refers to unknown {}",
                    variable
                )))
            }
        };
        let check_center = |center: CenterIndex| -> Result<(), SolverError> {
            if center.get() < num_centers {
                Ok(())
            } else {
                Err(SolverError::MalformedInstance(format!(
                    "constraint refers to unknown {}",
                    center
                )))
            }
        };

        let mut limits = vec![u32::MAX; num_days * num_centers];
        for constraint in instance.hard_constraints() {
            if let Constraint::Capacity { center, day, limit } = *constraint {
                check_center(center)?;
                if day.get() >= num_days {
                    return Err(SolverError::MalformedInstance(format!(
                        "capacity refers to unknown {}",
                        day
                    )));
                }
                let slot = &mut limits[day.get() * num_centers + center.get()];
                *slot = (*slot).min(limit);
            }
        }

        let table = instance.penalty_table();
        let mut unary = vec![T::zero(); num_variables * num_centers];
        let mut links: Vec<Links<T>> = vec![Links::new(); num_variables];
        for term in instance.objective_terms() {
            let weight = term.weight();
            if weight.is_negative() {
                return Err(SolverError::MalformedInstance(format!(
                    "objective term on {} has negative weight {}",
                    term.constraint(),
                    weight
                )));
            }
            if term.constraint().get() >= instance.constraints().len() {
                return Err(SolverError::MalformedInstance(format!(
                    "objective refers to unknown {}",
                    term.constraint()
                )));
            }
            match *instance.constraint(term.constraint()) {
                Constraint::Capacity { .. } => {
                    return Err(SolverError::MalformedInstance(format!(
                        "objective term refers to hard constraint {}",
                        term.constraint()
                    )));
                }
                Constraint::PreferCenter { variable, center } => {
                    check_variable(variable)?;
                    check_center(center)?;
                    let row = &mut unary[variable.get() * num_centers..][..num_centers];
                    for (c, cost) in row.iter_mut().enumerate() {
                        if c != center.get() {
                            *cost = cost.saturating_add(weight);
                        }
                    }
                }
                Constraint::MoveDistance {
                    variable,
                    preferred,
                } => {
                    check_variable(variable)?;
                    check_center(preferred)?;
                    let row = &mut unary[variable.get() * num_centers..][..num_centers];
                    for (cost, penalty) in row.iter_mut().zip(table.row(preferred)) {
                        *cost = cost.saturating_add(weight.saturating_mul_val(*penalty));
                    }
                }
                Constraint::KeepCenter { first, second } => {
                    check_variable(first)?;
                    check_variable(second)?;
                    if first == second || weight.is_zero() {
                        continue;
                    }
                    let (earlier, later) = if first < second {
                        (first, second)
                    } else {
                        (second, first)
                    };
                    links[later.get()].push((earlier, weight));
                }
            }
        }

        let mut best_center = Vec::with_capacity(num_variables);
        let mut regret = Vec::with_capacity(num_variables);
        let mut min_cost = Vec::with_capacity(num_variables);
        for row in unary.chunks_exact(num_centers) {
            let (mut best, mut second) = (0usize, None::<T>);
            for (c, &cost) in row.iter().enumerate().skip(1) {
                if cost < row[best] {
                    second = Some(row[best]);
                    best = c;
                } else if second.is_none_or(|s| cost < s) {
                    second = Some(cost);
                }
            }
            best_center.push(CenterIndex::new(best));
            min_cost.push(row[best]);
            regret.push(match second {
                Some(s) => s.saturating_sub(row[best]),
                None => T::zero(),
            });
        }

        let mut suffix_min = vec![T::zero(); num_variables + 1];
        for v in (0..num_variables).rev() {
            suffix_min[v] = suffix_min[v + 1].saturating_add(min_cost[v]);
        }

        let mut group_sizes = vec![0u32; num_days * num_centers];
        let mut group_min_regret = vec![T::max_value(); num_days * num_centers];
        let mut day_demand = vec![0u32; num_days];
        for v in 0..num_variables {
            let group = var_day[v].get() * num_centers + best_center[v].get();
            group_sizes[group] += 1;
            group_min_regret[group] = group_min_regret[group].min(regret[v]);
            day_demand[var_day[v].get()] += 1;
        }
        for (size, min_regret) in group_sizes.iter().zip(group_min_regret.iter_mut()) {
            if *size == 0 {
                *min_regret = T::zero();
            }
        }

        Ok(Self {
            num_students,
            num_centers,
            num_days,
            var_day,
            var_student,
            student_vars,
            unary,
            links,
            limits,
            best_center,
            regret,
            suffix_min,
            group_sizes,
            group_min_regret,
            day_demand,
        })
    }

    /// Cost of `variable := center` given the values already fixed in `state`.
    /// Links whose partner is still open contribute nothing.
    #[inline(always)]
    pub fn assignment_cost(
        &self,
        variable: VariableIndex,
        center: CenterIndex,
        state: &SearchState<T>,
    ) -> T {
        let base = self.unary_cost(variable, center);
        self.links[variable.get()]
            .iter()
            .fold(base, |acc, &(partner, weight)| match state.value(partner) {
                Some(value) if value != center => acc.saturating_add(weight),
                _ => acc,
            })
    }

    /// Sum of every term of a complete assignment.
    pub fn evaluate(&self, values: &[CenterIndex]) -> T {
        values
            .iter()
            .enumerate()
            .fold(T::zero(), |acc, (v, &center)| {
                let links = self.links[v]
                    .iter()
                    .filter(|(partner, _)| values[partner.get()] != center)
                    .fold(T::zero(), |l, &(_, weight)| l.saturating_add(weight));
                acc.saturating_add(self.unary_cost(VariableIndex::new(v), center))
                    .saturating_add(links)
            })
    }

    /// Returns the first day whose demand exceeds the total capacity.
    pub fn overloaded_day(&self) -> Option<DayIndex> {
        (0..self.num_days).map(DayIndex::new).find(|&day| {
            let limits = &self.limits[day.get() * self.num_centers..][..self.num_centers];
            if limits.contains(&u32::MAX) {
                return false;
            }
            let capacity: u64 = limits.iter().map(|&l| l as u64).sum();
            self.day_demand[day.get()] as u64 > capacity
        })
    }

    #[inline(always)]
    pub fn unary_cost(&self, variable: VariableIndex, center: CenterIndex) -> T {
        debug_assert!(
            variable.get() < self.num_variables() && center.get() < self.num_centers,
            "called `CostModel::unary_cost` with ({}, {}) out of bounds",
            variable,
            center
        );
        self.unary[variable.get() * self.num_centers + center.get()]
    }

    #[inline(always)]
    pub fn links(&self, variable: VariableIndex) -> &[(VariableIndex, T)] {
        &self.links[variable.get()]
    }

    #[inline(always)]
    pub fn limit(&self, day: DayIndex, center: CenterIndex) -> u32 {
        self.limits[self.slot(day, center)]
    }

    #[inline(always)]
    pub fn slot(&self, day: DayIndex, center: CenterIndex) -> usize {
        day.get() * self.num_centers + center.get()
    }

    /// Lower-bound group of `variable`: its day and cheapest center.
    #[inline(always)]
    pub fn group(&self, variable: VariableIndex) -> usize {
        self.slot(self.day(variable), self.best_center[variable.get()])
    }

    #[inline(always)]
    pub fn day(&self, variable: VariableIndex) -> DayIndex {
        self.var_day[variable.get()]
    }

    #[inline(always)]
    pub fn student(&self, variable: VariableIndex) -> StudentIndex {
        self.var_student[variable.get()]
    }

    #[inline(always)]
    pub fn student_variable(&self, student: StudentIndex, day: DayIndex) -> VariableIndex {
        self.student_vars[student.get() * self.num_days + day.get()]
    }

    #[inline(always)]
    pub fn best_center(&self, variable: VariableIndex) -> CenterIndex {
        self.best_center[variable.get()]
    }

    #[inline(always)]
    pub fn regret(&self, variable: VariableIndex) -> T {
        self.regret[variable.get()]
    }

    /// Sum of the cheapest unary costs of the variables from `first` on.
    #[inline(always)]
    pub fn suffix_min(&self, first: usize) -> T {
        self.suffix_min[first]
    }

    #[inline]
    pub fn group_sizes(&self) -> &[u32] {
        &self.group_sizes
    }

    #[inline(always)]
    pub fn group_min_regret(&self, group: usize) -> T {
        self.group_min_regret[group]
    }

    #[inline]
    pub fn limits(&self) -> &[u32] {
        &self.limits
    }

    #[inline]
    pub fn unary_row(&self, variable: VariableIndex) -> &[T] {
        &self.unary[variable.get() * self.num_centers..][..self.num_centers]
    }

    #[inline]
    pub fn num_variables(&self) -> usize {
        self.var_day.len()
    }

    #[inline]
    pub fn num_students(&self) -> usize {
        self.num_students
    }

    #[inline]
    pub fn num_centers(&self) -> usize {
        self.num_centers
    }

    #[inline]
    pub fn num_days(&self) -> usize {
        self.num_days
    }
}

impl<T> std::fmt::Display for CostModel<T>
where
    T: SolverNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CostModel(variables: {}, centers: {}, days: {}, links: {})",
            self.num_variables(),
            self.num_centers,
            self.num_days,
            self.links.iter().map(|l| l.len()).sum::<usize>()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allot_model::{
        builder::ProblemBuilder,
        input::{CenterRecord, StudentRecord},
        weights::ObjectiveWeights,
    };

    fn ci(i: usize) -> CenterIndex {
        CenterIndex::new(i)
    }

    fn abc(weights: ObjectiveWeights<i64>) -> ProblemInstance<i64> {
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
        ProblemBuilder::new(&students, &centers)
            .weights(weights)
            .build()
            .unwrap()
    }

    #[test]
    fn test_unary_costs_fold_preference_and_move() {
        let instance = abc(ObjectiveWeights::new(2, 1, 1));
        let model = CostModel::from_instance(&instance).unwrap();
        // Student 0 prefers A: A costs 0, B costs pref 2, C costs pref 2 + move 2.
        assert_eq!(model.unary_row(VariableIndex::new(0)), &[0, 2, 4]);
        assert_eq!(model.best_center(VariableIndex::new(0)), ci(0));
        assert_eq!(model.regret(VariableIndex::new(0)), 2);
    }

    #[test]
    fn test_links_sit_on_later_variable() {
        let instance = abc(ObjectiveWeights::default());
        let model = CostModel::from_instance(&instance).unwrap();
        assert!(model.links(VariableIndex::new(0)).is_empty());
        assert_eq!(model.links(VariableIndex::new(1)), &[(VariableIndex::new(0), 1)]);
    }

    #[test]
    fn test_limits_and_groups() {
        let instance = abc(ObjectiveWeights::default());
        let model = CostModel::from_instance(&instance).unwrap();
        assert_eq!(model.limit(DayIndex::new(1), ci(0)), 1);
        assert_eq!(model.limit(DayIndex::new(1), ci(2)), 4);
        // Three students want A on day 1.
        let group = model.slot(DayIndex::new(1), ci(0));
        assert_eq!(model.group_sizes()[group], 3);
        assert_eq!(model.overloaded_day(), None);
    }

    #[test]
    fn test_evaluate_matches_instance() {
        let instance = abc(ObjectiveWeights::new(2, 1, 1));
        let model = CostModel::from_instance(&instance).unwrap();
        let mut values: Vec<CenterIndex> = instance
            .variables()
            .iter()
            .map(|v| instance.preferred_center(v.student()))
            .collect();
        values[1] = ci(2);
        values[3] = ci(2);
        assert_eq!(model.evaluate(&values), instance.evaluate(&values));
        assert_eq!(model.evaluate(&values), 10);
    }

    #[test]
    fn test_assignment_cost_uses_fixed_partners_only() {
        let instance = abc(ObjectiveWeights::default());
        let model = CostModel::from_instance(&instance).unwrap();
        let mut state = SearchState::new(&model);
        // Partner open: only unary cost.
        assert_eq!(model.assignment_cost(VariableIndex::new(1), ci(1), &state), 1);
        let v0 = VariableIndex::new(0);
        state.assign(v0, ci(0), model.slot(DayIndex::new(0), ci(0)), model.group(v0), 0);
        assert_eq!(model.assignment_cost(VariableIndex::new(1), ci(1), &state), 2);
        assert_eq!(model.assignment_cost(VariableIndex::new(1), ci(0), &state), 0);
    }

    #[test]
    fn test_overloaded_day() {
        let centers = vec![CenterRecord::new("A", vec![1, 0])];
        let students = vec![StudentRecord::new(1, "A")];
        let instance: ProblemInstance<i64> =
            ProblemBuilder::new(&students, &centers).build().unwrap();
        let model = CostModel::from_instance(&instance).unwrap();
        assert_eq!(model.overloaded_day(), Some(DayIndex::new(1)));
    }
}
