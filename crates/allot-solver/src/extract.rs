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

//! # Result Extraction
//!
//! Turns a solved assignment back into records keyed by student id, day and
//! center code, and audits it. The audit prices the assignment from the
//! student preferences, the penalty table and the weights alone; it never
//! reads the instance's objective term list or the solver's bookkeeping. The
//! recomputed total must equal the objective reported by the solver, and no
//! `(day, center)` pair may exceed its capacity.
//!
//! Row penalties are unweighted. The consistency penalty of row `(s, d)`
//! refers to the change between day `d` and `d + 1`; on the last day it is
//! always zero.

use crate::err::VerificationError;
use allot_model::{
    index::{CenterIndex, DayIndex, StudentIndex},
    instance::ProblemInstance,
    solution::Solution,
};
use allot_search::num::SolverNumeric;
use serde::Serialize;

/// One student on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentRow<T> {
    pub student_id: i64,
    pub day: usize,
    pub preferred_center: String,
    pub assigned_center: String,
    pub preference_penalty: T,
    pub move_penalty: T,
    pub consistency_penalty: T,
}

/// Occupancy of one center on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CenterDaySummary {
    pub day: usize,
    pub center: String,
    pub assigned: u32,
    pub capacity: u32,
}

impl CenterDaySummary {
    #[inline]
    pub fn is_overrun(&self) -> bool {
        self.assigned > self.capacity
    }
}

/// Unweighted penalty sums and the weighted total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PenaltyBreakdown<T> {
    pub preference: T,
    pub consistency: T,
    pub movement: T,
    pub weighted_total: T,
}

impl<T> std::fmt::Display for PenaltyBreakdown<T>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "preference: {}, consistency: {}, movement: {}, weighted total: {}",
            self.preference, self.consistency, self.movement, self.weighted_total
        )
    }
}

/// A solved assignment in output form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation<T> {
    rows: Vec<AssignmentRow<T>>,
    summary: Vec<CenterDaySummary>,
    breakdown: PenaltyBreakdown<T>,
    reported_objective: T,
}

impl<T> Allocation<T>
where
    T: SolverNumeric,
{
    /// Rows ordered by student, then day.
    #[inline]
    pub fn rows(&self) -> &[AssignmentRow<T>] {
        &self.rows
    }

    /// Summaries ordered by day, then center.
    #[inline]
    pub fn summary(&self) -> &[CenterDaySummary] {
        &self.summary
    }

    #[inline]
    pub fn breakdown(&self) -> &PenaltyBreakdown<T> {
        &self.breakdown
    }

    /// Objective value as reported by the solver.
    #[inline]
    pub fn reported_objective(&self) -> T {
        self.reported_objective
    }

    /// Checks that the recomputed total matches the reported objective and
    /// that no capacity is exceeded.
    pub fn verify(&self) -> Result<(), VerificationError> {
        if let Some(overrun) = self.summary.iter().find(|s| s.is_overrun()) {
            return Err(VerificationError::CapacityOverrun {
                day: overrun.day,
                center: overrun.center.clone(),
                assigned: overrun.assigned,
                capacity: overrun.capacity,
            });
        }
        if self.breakdown.weighted_total != self.reported_objective {
            return Err(VerificationError::ObjectiveMismatch {
                reported: self.reported_objective.to_string(),
                recomputed: self.breakdown.weighted_total.to_string(),
            });
        }
        Ok(())
    }
}

/// Extracts and audits solutions of one instance.
#[derive(Debug, Clone, Copy)]
pub struct ResultExtractor<'a, T> {
    instance: &'a ProblemInstance<T>,
}

impl<'a, T> ResultExtractor<'a, T>
where
    T: SolverNumeric,
{
    #[inline]
    pub fn new(instance: &'a ProblemInstance<T>) -> Self {
        Self { instance }
    }

    /// Builds the output records of `solution` without verifying them.
    ///
    /// # Panics
    ///
    /// Panics if `solution` does not match the dimensions of the instance.
    pub fn extract(&self, solution: &Solution<T>) -> Allocation<T> {
        let instance = self.instance;
        assert_eq!(
            solution.num_variables(),
            instance.num_variables(),
            "called `ResultExtractor::extract` with a solution of {} values for {} variables",
            solution.num_variables(),
            instance.num_variables()
        );

        let num_days = instance.num_days();
        let num_centers = instance.num_centers();
        let indicator = |violated: bool| if violated { T::one() } else { T::zero() };

        let mut rows = Vec::with_capacity(instance.num_variables());
        let mut counts = vec![0u32; num_days * num_centers];
        let (mut preference, mut consistency, mut movement) = (T::zero(), T::zero(), T::zero());

        for s in 0..instance.num_students() {
            let student = StudentIndex::new(s);
            let preferred = instance.preferred_center(student);
            let schedule = solution.student_schedule(student);
            for (d, &assigned) in schedule.iter().enumerate() {
                counts[d * num_centers + assigned.get()] += 1;

                let preference_penalty = indicator(assigned != preferred);
                let move_penalty = instance.penalty_table().lookup(preferred, assigned);
                let consistency_penalty =
                    indicator(schedule.get(d + 1).is_some_and(|&next| next != assigned));

                preference = preference.saturating_add(preference_penalty);
                movement = movement.saturating_add(move_penalty);
                consistency = consistency.saturating_add(consistency_penalty);

                rows.push(AssignmentRow {
                    student_id: instance.student_id(student),
                    day: d,
                    preferred_center: instance.center_code(preferred).to_string(),
                    assigned_center: instance.center_code(assigned).to_string(),
                    preference_penalty,
                    move_penalty,
                    consistency_penalty,
                });
            }
        }

        let weights = instance.weights();
        let weighted_total = weights
            .preference()
            .saturating_mul_val(preference)
            .saturating_add(weights.consistency().saturating_mul_val(consistency))
            .saturating_add(weights.movement().saturating_mul_val(movement));

        let summary = (0..num_days)
            .flat_map(|d| (0..num_centers).map(move |c| (d, c)))
            .map(|(d, c)| CenterDaySummary {
                day: d,
                center: instance.center_code(CenterIndex::new(c)).to_string(),
                assigned: counts[d * num_centers + c],
                capacity: instance.capacity(CenterIndex::new(c), DayIndex::new(d)),
            })
            .collect();

        Allocation {
            rows,
            summary,
            breakdown: PenaltyBreakdown {
                preference,
                consistency,
                movement,
                weighted_total,
            },
            reported_objective: solution.objective_value(),
        }
    }

    /// Builds the output records of `solution` and verifies them.
    pub fn extract_verified(
        &self,
        solution: &Solution<T>,
    ) -> Result<Allocation<T>, VerificationError> {
        let allocation = self.extract(solution);
        allocation.verify()?;
        Ok(allocation)
    }
}
