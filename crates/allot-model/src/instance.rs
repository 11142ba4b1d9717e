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

//! # Problem Instance
//!
//! The immutable, solver-facing form of an assignment problem. An instance
//! consists of
//!
//! - one `AssignmentVariable` per `(student, day)` with domain
//!   `0..num_centers`,
//! - a constraint list in which every entry is either `Hard` (capacity) or a
//!   soft term already folded into the objective,
//! - the objective, a list of `(constraint, weight)` pairs over the soft
//!   constraints,
//!
//! plus the records needed to translate indices back to codes. Everything is
//! stored in dense `Vec`s: variables by `student * num_days + day`, capacities
//! by `day * num_centers + center`.
//!
//! Instances are produced by `ProblemBuilder` and never mutated afterwards, so
//! they can be shared across threads freely.

use crate::{
    index::{CenterIndex, ConstraintIndex, DayIndex, StudentIndex, VariableIndex},
    penalty::PenaltyTable,
    weights::ObjectiveWeights,
};
use num_traits::{PrimInt, Signed};

/// The three soft terms of the objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SoftTerm {
    /// `1` if a student is not at the preferred center.
    Preference,
    /// `1` if a student changes center between consecutive days.
    Consistency,
    /// Penalty table entry `(preferred, assigned)`.
    Move,
}

impl std::fmt::Display for SoftTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SoftTerm::Preference => write!(f, "Preference"),
            SoftTerm::Consistency => write!(f, "Consistency"),
            SoftTerm::Move => write!(f, "Move"),
        }
    }
}

/// Whether a constraint must hold or is priced in the objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    Hard,
    SoftFolded(SoftTerm),
}

impl std::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstraintKind::Hard => write!(f, "Hard"),
            ConstraintKind::SoftFolded(term) => write!(f, "Soft({term})"),
        }
    }
}

/// A single entry of the constraint list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constraint {
    /// At most `limit` variables of `day` may take the value `center`.
    Capacity {
        center: CenterIndex,
        day: DayIndex,
        limit: u32,
    },
    /// Violated when `variable != center`.
    PreferCenter {
        variable: VariableIndex,
        center: CenterIndex,
    },
    /// Violated when `first != second`.
    KeepCenter {
        first: VariableIndex,
        second: VariableIndex,
    },
    /// Costs `PenaltyTable[preferred][variable]`.
    MoveDistance {
        variable: VariableIndex,
        preferred: CenterIndex,
    },
}

impl Constraint {
    #[inline]
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Constraint::Capacity { .. } => ConstraintKind::Hard,
            Constraint::PreferCenter { .. } => ConstraintKind::SoftFolded(SoftTerm::Preference),
            Constraint::KeepCenter { .. } => ConstraintKind::SoftFolded(SoftTerm::Consistency),
            Constraint::MoveDistance { .. } => ConstraintKind::SoftFolded(SoftTerm::Move),
        }
    }

    #[inline]
    pub fn is_hard(&self) -> bool {
        matches!(self.kind(), ConstraintKind::Hard)
    }
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constraint::Capacity { center, day, limit } => {
                write!(f, "count({day}, {center}) <= {limit}")
            }
            Constraint::PreferCenter { variable, center } => write!(f, "{variable} == {center}"),
            Constraint::KeepCenter { first, second } => write!(f, "{first} == {second}"),
            Constraint::MoveDistance {
                variable,
                preferred,
            } => write!(f, "move({preferred} -> {variable})"),
        }
    }
}

/// A weighted reference to a soft constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectiveTerm<T> {
    constraint: ConstraintIndex,
    weight: T,
}

impl<T> ObjectiveTerm<T>
where
    T: Copy,
{
    #[inline]
    pub fn new(constraint: ConstraintIndex, weight: T) -> Self {
        Self { constraint, weight }
    }

    #[inline]
    pub fn constraint(&self) -> ConstraintIndex {
        self.constraint
    }

    #[inline]
    pub fn weight(&self) -> T {
        self.weight
    }
}

/// The decision variable of one student on one day. Its value is a
/// `CenterIndex` in `0..num_centers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssignmentVariable {
    student: StudentIndex,
    day: DayIndex,
}

impl AssignmentVariable {
    #[inline]
    pub fn new(student: StudentIndex, day: DayIndex) -> Self {
        Self { student, day }
    }

    #[inline]
    pub fn student(&self) -> StudentIndex {
        self.student
    }

    #[inline]
    pub fn day(&self) -> DayIndex {
        self.day
    }
}

impl std::fmt::Display for AssignmentVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x[{}][{}]", self.student.get(), self.day.get())
    }
}

/// A hard capacity constraint that a set of values breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapacityViolation {
    pub center: CenterIndex,
    pub day: DayIndex,
    pub assigned: u32,
    pub limit: u32,
}

impl std::fmt::Display for CapacityViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} on {}: {} assigned, capacity {}",
            self.center, self.day, self.assigned, self.limit
        )
    }
}

/// Order of magnitude of the naive search space, `Σ_k C^k` over the variable
/// levels of a depth-first tree.
#[derive(Clone, Copy, PartialEq)]
pub struct Complexity {
    log_val: f64,
}

impl Complexity {
    pub fn new(num_variables: usize, num_centers: usize) -> Self {
        if num_variables == 0 || num_centers <= 1 {
            return Complexity {
                log_val: (num_variables as f64 + 1.0).log10(),
            };
        }
        // Geometric series: (C^(V+1) - 1) / (C - 1) ~ C^V * C / (C - 1)
        let c = num_centers as f64;
        let log_val = num_variables as f64 * c.log10() + (c / (c - 1.0)).log10();
        Complexity { log_val }
    }

    #[inline]
    pub fn log10(&self) -> f64 {
        self.log_val
    }

    #[inline]
    pub fn exponent(&self) -> u64 {
        self.log_val.floor() as u64
    }

    #[inline]
    pub fn mantissa(&self) -> f64 {
        10.0_f64.powf(self.log_val - self.log_val.floor())
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} × 10^{}", self.mantissa(), self.exponent())
    }
}

impl std::fmt::Debug for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Complexity(log10={:.4})", self.log_val)
    }
}

/// The immutable assignment problem handed to a solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemInstance<T> {
    center_codes: Vec<String>,
    student_ids: Vec<i64>,
    preferred_centers: Vec<CenterIndex>,
    num_days: usize,
    capacities: Vec<u32>,
    penalty_table: PenaltyTable<T>,
    weights: ObjectiveWeights<T>,
    variables: Vec<AssignmentVariable>,
    constraints: Vec<Constraint>,
    objective: Vec<ObjectiveTerm<T>>,
}

impl<T> ProblemInstance<T>
where
    T: PrimInt + Signed,
{
    /// Assembles an instance from already validated parts.
    ///
    /// Only `ProblemBuilder` calls this; it guarantees that the dense arrays
    /// agree in size.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        center_codes: Vec<String>,
        student_ids: Vec<i64>,
        preferred_centers: Vec<CenterIndex>,
        num_days: usize,
        capacities: Vec<u32>,
        penalty_table: PenaltyTable<T>,
        weights: ObjectiveWeights<T>,
        variables: Vec<AssignmentVariable>,
        constraints: Vec<Constraint>,
        objective: Vec<ObjectiveTerm<T>>,
    ) -> Self {
        debug_assert_eq!(student_ids.len(), preferred_centers.len());
        debug_assert_eq!(capacities.len(), center_codes.len() * num_days);
        debug_assert_eq!(variables.len(), student_ids.len() * num_days);
        debug_assert_eq!(penalty_table.num_centers(), center_codes.len());

        Self {
            center_codes,
            student_ids,
            preferred_centers,
            num_days,
            capacities,
            penalty_table,
            weights,
            variables,
            constraints,
            objective,
        }
    }

    #[inline]
    pub fn num_students(&self) -> usize {
        self.student_ids.len()
    }

    #[inline]
    pub fn num_centers(&self) -> usize {
        self.center_codes.len()
    }

    #[inline]
    pub fn num_days(&self) -> usize {
        self.num_days
    }

    #[inline]
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Size of every variable's domain; values are `0..domain_size()`.
    #[inline]
    pub fn domain_size(&self) -> usize {
        self.center_codes.len()
    }

    #[inline]
    pub fn complexity(&self) -> Complexity {
        Complexity::new(self.num_variables(), self.num_centers())
    }

    #[inline]
    pub fn variables(&self) -> &[AssignmentVariable] {
        &self.variables
    }

    /// Returns the variable at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn variable(&self, index: VariableIndex) -> AssignmentVariable {
        debug_assert!(
            index.get() < self.variables.len(),
            "called `ProblemInstance::variable` with variable index out of bounds: the len is {} but the index is {}",
            self.variables.len(),
            index.get()
        );
        self.variables[index.get()]
    }

    #[inline]
    pub fn variable_index(&self, student: StudentIndex, day: DayIndex) -> VariableIndex {
        debug_assert!(
            day.get() < self.num_days,
            "called `ProblemInstance::variable_index` with day index out of bounds: the len is {} but the index is {}",
            self.num_days,
            day.get()
        );
        VariableIndex::new(student.get() * self.num_days + day.get())
    }

    #[inline]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    #[inline]
    pub fn constraint(&self, index: ConstraintIndex) -> &Constraint {
        &self.constraints[index.get()]
    }

    /// Iterates over the hard constraints only.
    pub fn hard_constraints(&self) -> impl Iterator<Item = &Constraint> + '_ {
        self.constraints.iter().filter(|c| c.is_hard())
    }

    #[inline]
    pub fn objective_terms(&self) -> &[ObjectiveTerm<T>] {
        &self.objective
    }

    #[inline]
    pub fn weights(&self) -> &ObjectiveWeights<T> {
        &self.weights
    }

    #[inline]
    pub fn penalty_table(&self) -> &PenaltyTable<T> {
        &self.penalty_table
    }

    #[inline]
    pub fn center_codes(&self) -> &[String] {
        &self.center_codes
    }

    #[inline]
    pub fn center_code(&self, center: CenterIndex) -> &str {
        &self.center_codes[center.get()]
    }

    /// Resolves a center code to its ordinal index.
    pub fn center_index(&self, code: &str) -> Option<CenterIndex> {
        self.center_codes
            .iter()
            .position(|c| c == code)
            .map(CenterIndex::new)
    }

    #[inline]
    pub fn student_ids(&self) -> &[i64] {
        &self.student_ids
    }

    #[inline]
    pub fn student_id(&self, student: StudentIndex) -> i64 {
        self.student_ids[student.get()]
    }

    #[inline]
    pub fn preferred_center(&self, student: StudentIndex) -> CenterIndex {
        self.preferred_centers[student.get()]
    }

    #[inline]
    pub fn preferred_centers(&self) -> &[CenterIndex] {
        &self.preferred_centers
    }

    #[inline(always)]
    fn capacity_index(&self, center: CenterIndex, day: DayIndex) -> usize {
        day.get() * self.num_centers() + center.get()
    }

    /// Returns the capacity of `center` on `day`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn capacity(&self, center: CenterIndex, day: DayIndex) -> u32 {
        debug_assert!(
            center.get() < self.num_centers(),
            "called `ProblemInstance::capacity` with center index out of bounds: the len is {} but the index is {}",
            self.num_centers(),
            center.get()
        );
        self.capacities[self.capacity_index(center, day)]
    }

    /// Capacities of all centers on `day`, in center order.
    #[inline]
    pub fn day_capacities(&self, day: DayIndex) -> &[u32] {
        let start = day.get() * self.num_centers();
        &self.capacities[start..start + self.num_centers()]
    }

    /// Total capacity over all centers on `day`.
    pub fn total_capacity(&self, day: DayIndex) -> u64 {
        self.day_capacities(day).iter().map(|&c| c as u64).sum()
    }

    /// Number of students preferring each center. Demand is the same every day.
    pub fn preference_counts(&self) -> Vec<u32> {
        let mut counts = vec![0u32; self.num_centers()];
        for p in &self.preferred_centers {
            counts[p.get()] += 1;
        }
        counts
    }

    /// Counts assigned students per `(day, center)`, laid out like the capacities.
    ///
    /// # Panics
    ///
    /// Panics if `values` does not hold one in-range value per variable.
    pub fn assignment_counts(&self, values: &[CenterIndex]) -> Vec<u32> {
        assert_eq!(
            values.len(),
            self.num_variables(),
            "called `ProblemInstance::assignment_counts` with {} values for {} variables",
            values.len(),
            self.num_variables()
        );
        let mut counts = vec![0u32; self.capacities.len()];
        for (variable, value) in self.variables.iter().zip(values) {
            counts[self.capacity_index(*value, variable.day())] += 1;
        }
        counts
    }

    /// Lists the capacity constraints broken by `values`.
    pub fn violated_capacities(&self, values: &[CenterIndex]) -> Vec<CapacityViolation> {
        let counts = self.assignment_counts(values);
        self.hard_constraints()
            .filter_map(|constraint| match *constraint {
                Constraint::Capacity { center, day, limit } => {
                    let assigned = counts[self.capacity_index(center, day)];
                    (assigned > limit).then_some(CapacityViolation {
                        center,
                        day,
                        assigned,
                        limit,
                    })
                }
                _ => None,
            })
            .collect()
    }

    /// Returns `true` if `values` satisfies every hard constraint.
    #[inline]
    pub fn is_feasible(&self, values: &[CenterIndex]) -> bool {
        values.iter().all(|c| c.get() < self.num_centers())
            && self.violated_capacities(values).is_empty()
    }

    /// Unweighted violation of a soft constraint under `values`.
    /// Hard constraints report zero here; use `violated_capacities`.
    #[inline]
    pub fn soft_violation(&self, constraint: &Constraint, values: &[CenterIndex]) -> T {
        let indicator = |violated: bool| if violated { T::one() } else { T::zero() };
        match *constraint {
            Constraint::Capacity { .. } => T::zero(),
            Constraint::PreferCenter { variable, center } => {
                indicator(values[variable.get()] != center)
            }
            Constraint::KeepCenter { first, second } => {
                indicator(values[first.get()] != values[second.get()])
            }
            Constraint::MoveDistance {
                variable,
                preferred,
            } => self.penalty_table.lookup(preferred, values[variable.get()]),
        }
    }

    /// Weighted objective of `values`, summed over the objective term list.
    ///
    /// # Panics
    ///
    /// Panics if `values` does not hold one value per variable.
    pub fn evaluate(&self, values: &[CenterIndex]) -> T {
        assert_eq!(
            values.len(),
            self.num_variables(),
            "called `ProblemInstance::evaluate` with {} values for {} variables",
            values.len(),
            self.num_variables()
        );
        self.objective.iter().fold(T::zero(), |acc, term| {
            let violation = self.soft_violation(self.constraint(term.constraint()), values);
            let cost = term
                .weight()
                .checked_mul(&violation)
                .unwrap_or_else(T::max_value);
            acc.saturating_add(cost)
        })
    }
}

impl<T> std::fmt::Display for ProblemInstance<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Problem Instance")?;
        writeln!(f, "   Students:    {}", self.num_students())?;
        writeln!(f, "   Centers:     {}", self.num_centers())?;
        writeln!(f, "   Days:        {}", self.num_days())?;
        writeln!(f, "   Variables:   {}", self.num_variables())?;
        writeln!(f, "   Constraints: {}", self.constraints.len())?;
        writeln!(f, "   Objective:   {} terms, {}", self.objective.len(), self.weights)?;
        write!(f, "   Search space: {}", self.complexity())
    }
}
