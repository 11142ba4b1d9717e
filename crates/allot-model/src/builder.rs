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

//! # Problem Builder
//!
//! Validates raw student and center records and turns them into an immutable
//! `ProblemInstance`. Validation fails fast: the first problem found is
//! returned and no variable is created.
//!
//! ```rust
//! use allot_model::builder::ProblemBuilder;
//! use allot_model::input::{CenterRecord, StudentRecord};
//! use allot_model::penalty::PenaltyPolicy;
//! use allot_model::weights::ObjectiveWeights;
//!
//! let centers = vec![CenterRecord::new("A", vec![1]), CenterRecord::new("B", vec![1])];
//! let students = vec![StudentRecord::new(1, "A"), StudentRecord::new(2, "A")];
//!
//! let instance = ProblemBuilder::<i64>::new(&students, &centers)
//!     .weights(ObjectiveWeights::new(2, 1, 1))
//!     .penalty_policy(PenaltyPolicy::scaled())
//!     .build()
//!     .unwrap();
//! assert_eq!(instance.num_variables(), 2);
//! ```

use crate::{
    err::ValidationError,
    index::{CenterIndex, ConstraintIndex, DayIndex, StudentIndex, VariableIndex},
    input::{CenterRecord, StudentRecord},
    instance::{
        AssignmentVariable, Constraint, ConstraintKind, ObjectiveTerm, ProblemInstance, SoftTerm,
    },
    penalty::{PenaltyPolicy, PenaltyTable},
    weights::ObjectiveWeights,
};
use num_traits::{PrimInt, Signed};
use std::collections::{HashMap, HashSet};

/// Where the move penalty table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PenaltySource<T> {
    /// Derive the table from a distance policy over the center ordering.
    Policy(PenaltyPolicy<T>),
    /// Use explicit rows indexed `[preferred][assigned]`.
    Rows(Vec<Vec<T>>),
}

impl<T> Default for PenaltySource<T>
where
    T: PrimInt + Signed,
{
    fn default() -> Self {
        PenaltySource::Policy(PenaltyPolicy::default())
    }
}

/// Fail-fast builder for `ProblemInstance`.
#[derive(Debug, Clone)]
pub struct ProblemBuilder<'a, T> {
    students: &'a [StudentRecord],
    centers: &'a [CenterRecord],
    weights: ObjectiveWeights<T>,
    penalty: PenaltySource<T>,
}

impl<'a, T> ProblemBuilder<'a, T>
where
    T: PrimInt + Signed,
{
    /// Starts a builder with default weights (all one) and the banded policy.
    pub fn new(students: &'a [StudentRecord], centers: &'a [CenterRecord]) -> Self {
        Self {
            students,
            centers,
            weights: ObjectiveWeights::default(),
            penalty: PenaltySource::default(),
        }
    }

    #[inline]
    pub fn weights(mut self, weights: ObjectiveWeights<T>) -> Self {
        self.weights = weights;
        self
    }

    #[inline]
    pub fn penalty(mut self, penalty: PenaltySource<T>) -> Self {
        self.penalty = penalty;
        self
    }

    #[inline]
    pub fn penalty_policy(self, policy: PenaltyPolicy<T>) -> Self {
        self.penalty(PenaltySource::Policy(policy))
    }

    #[inline]
    pub fn penalty_rows(self, rows: Vec<Vec<T>>) -> Self {
        self.penalty(PenaltySource::Rows(rows))
    }

    /// Validates the records and builds the instance.
    pub fn build(self) -> Result<ProblemInstance<T>, ValidationError> {
        let num_days = self.validate_centers()?;
        let center_lookup = self.center_lookup();
        let preferred_centers = self.resolve_preferences(&center_lookup)?;
        self.weights.validate()?;

        let num_centers = self.centers.len();
        let penalty_table = match &self.penalty {
            PenaltySource::Policy(policy) => PenaltyTable::from_policy(num_centers, policy)?,
            PenaltySource::Rows(rows) => PenaltyTable::from_rows(num_centers, rows)?,
        };

        let mut capacities = Vec::with_capacity(num_centers * num_days);
        for d in 0..num_days {
            for center in self.centers {
                // Non-negative, checked in validate_centers.
                capacities.push(u32::try_from(center.capacity_by_day[d]).unwrap_or(u32::MAX));
            }
        }

        let num_students = self.students.len();
        let mut variables = Vec::with_capacity(num_students * num_days);
        for s in 0..num_students {
            for d in 0..num_days {
                variables.push(AssignmentVariable::new(
                    StudentIndex::new(s),
                    DayIndex::new(d),
                ));
            }
        }

        let soft_per_variable = if num_days > 1 { 3 } else { 2 };
        let mut constraints =
            Vec::with_capacity(capacities.len() + variables.len() * soft_per_variable);
        for d in 0..num_days {
            for c in 0..num_centers {
                constraints.push(Constraint::Capacity {
                    center: CenterIndex::new(c),
                    day: DayIndex::new(d),
                    limit: capacities[d * num_centers + c],
                });
            }
        }

        for (s, &preferred) in preferred_centers.iter().enumerate() {
            for d in 0..num_days {
                let variable = VariableIndex::new(s * num_days + d);
                constraints.push(Constraint::PreferCenter {
                    variable,
                    center: preferred,
                });
                constraints.push(Constraint::MoveDistance {
                    variable,
                    preferred,
                });
                if d + 1 < num_days {
                    constraints.push(Constraint::KeepCenter {
                        first: variable,
                        second: variable.next(),
                    });
                }
            }
        }

        let objective = self.fold_objective(&constraints);

        Ok(ProblemInstance::from_parts(
            self.centers.iter().map(|c| c.code.clone()).collect(),
            self.students.iter().map(|s| s.id).collect(),
            preferred_centers,
            num_days,
            capacities,
            penalty_table,
            self.weights,
            variables,
            constraints,
            objective,
        ))
    }

    /// Checks the center list and returns the number of days.
    fn validate_centers(&self) -> Result<usize, ValidationError> {
        let first = self.centers.first().ok_or(ValidationError::NoCenters)?;
        let num_days = first.num_days();
        if num_days == 0 {
            return Err(ValidationError::NoDays);
        }

        let mut seen = HashSet::with_capacity(self.centers.len());
        for center in self.centers {
            if !seen.insert(center.code.as_str()) {
                return Err(ValidationError::DuplicateCenterCode(center.code.clone()));
            }
            if center.num_days() != num_days {
                return Err(ValidationError::InconsistentCapacityLength {
                    center_code: center.code.clone(),
                    expected: num_days,
                    found: center.num_days(),
                });
            }
            if let Some((day, &value)) = center
                .capacity_by_day
                .iter()
                .enumerate()
                .find(|(_, v)| **v < 0)
            {
                return Err(ValidationError::NegativeCapacity {
                    center_code: center.code.clone(),
                    day,
                    value,
                });
            }
        }
        Ok(num_days)
    }

    fn center_lookup(&self) -> HashMap<&'a str, CenterIndex> {
        self.centers
            .iter()
            .enumerate()
            .map(|(i, c)| (c.code.as_str(), CenterIndex::new(i)))
            .collect()
    }

    fn resolve_preferences(
        &self,
        lookup: &HashMap<&'a str, CenterIndex>,
    ) -> Result<Vec<CenterIndex>, ValidationError> {
        let mut ids = HashSet::with_capacity(self.students.len());
        self.students
            .iter()
            .map(|student| {
                if !ids.insert(student.id) {
                    return Err(ValidationError::DuplicateStudentId(student.id));
                }
                lookup
                    .get(student.preferred_center.as_str())
                    .copied()
                    .ok_or_else(|| ValidationError::UnknownPreferredCenter {
                        student_id: student.id,
                        center_code: student.preferred_center.clone(),
                    })
            })
            .collect()
    }

    fn fold_objective(&self, constraints: &[Constraint]) -> Vec<ObjectiveTerm<T>> {
        constraints
            .iter()
            .enumerate()
            .filter_map(|(i, constraint)| {
                let weight = match constraint.kind() {
                    ConstraintKind::Hard => return None,
                    ConstraintKind::SoftFolded(SoftTerm::Preference) => {
                        self.weights.preference()
                    }
                    ConstraintKind::SoftFolded(SoftTerm::Consistency) => {
                        self.weights.consistency()
                    }
                    ConstraintKind::SoftFolded(SoftTerm::Move) => {
                        self.weights.movement()
                    }
                };
                (!weight.is_zero()).then(|| ObjectiveTerm::new(ConstraintIndex::new(i), weight))
            })
            .collect()
    }
}
