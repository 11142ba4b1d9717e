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

//! Demand against capacity, per day and center.
//!
//! Every student needs one seat per day, so a day is over-subscribed exactly
//! when the student count exceeds the summed capacity of that day. Since days
//! do not constrain each other, that is also the only way an instance can be
//! infeasible.

use allot_model::{
    index::{CenterIndex, DayIndex},
    instance::ProblemInstance,
};
use allot_search::num::SolverNumeric;
use serde::Serialize;

/// Preference count and capacity of one center on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CenterDemand {
    pub code: String,
    /// Students preferring this center.
    pub preferred: u32,
    pub capacity: u32,
}

impl CenterDemand {
    /// Capacity minus preference count. Negative values mean some students
    /// must be displaced.
    #[inline]
    pub fn difference(&self) -> i64 {
        i64::from(self.capacity) - i64::from(self.preferred)
    }
}

/// Demand summary of a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayDemand {
    pub day: usize,
    pub demand: u64,
    pub capacity: u64,
    pub centers: Vec<CenterDemand>,
}

impl DayDemand {
    #[inline]
    pub fn is_oversubscribed(&self) -> bool {
        self.demand > self.capacity
    }

    /// Seats left over once every student is placed; negative if short.
    #[inline]
    pub fn slack(&self) -> i64 {
        self.capacity as i64 - self.demand as i64
    }

    /// Students who cannot get their preferred center on this day.
    pub fn forced_displacements(&self) -> u64 {
        self.centers
            .iter()
            .map(|c| c.difference().min(0).unsigned_abs())
            .sum()
    }
}

impl std::fmt::Display for DayDemand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Day {}: demand {}, capacity {}, slack {}",
            self.day,
            self.demand,
            self.capacity,
            self.slack()
        )?;
        for center in &self.centers {
            writeln!(
                f,
                "  {}: preferred {}, capacity {}, difference {}",
                center.code,
                center.preferred,
                center.capacity,
                center.difference()
            )?;
        }
        Ok(())
    }
}

/// Demand summary of every day of an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemandReport {
    days: Vec<DayDemand>,
}

impl DemandReport {
    pub fn from_instance<T>(instance: &ProblemInstance<T>) -> Self
    where
        T: SolverNumeric,
    {
        let preferred = instance.preference_counts();
        let demand = instance.num_students() as u64;
        let days = (0..instance.num_days())
            .map(DayIndex::new)
            .map(|day| {
                let centers = (0..instance.num_centers())
                    .map(CenterIndex::new)
                    .map(|center| CenterDemand {
                        code: instance.center_code(center).to_string(),
                        preferred: preferred[center.get()],
                        capacity: instance.capacity(center, day),
                    })
                    .collect();
                DayDemand {
                    day: day.get(),
                    demand,
                    capacity: instance.total_capacity(day),
                    centers,
                }
            })
            .collect();
        Self { days }
    }

    #[inline]
    pub fn days(&self) -> &[DayDemand] {
        &self.days
    }

    pub fn oversubscribed_days(&self) -> impl Iterator<Item = &DayDemand> {
        self.days.iter().filter(|d| d.is_oversubscribed())
    }

    #[inline]
    pub fn has_oversubscribed_day(&self) -> bool {
        self.oversubscribed_days().next().is_some()
    }
}

impl std::fmt::Display for DemandReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for day in &self.days {
            write!(f, "{}", day)?;
        }
        Ok(())
    }
}

/// Why an instance has no feasible assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfeasibilityReport {
    demand: DemandReport,
}

impl InfeasibilityReport {
    #[inline]
    pub fn new(demand: DemandReport) -> Self {
        Self { demand }
    }

    #[inline]
    pub fn demand(&self) -> &DemandReport {
        &self.demand
    }

    pub fn oversubscribed_days(&self) -> impl Iterator<Item = &DayDemand> {
        self.demand.oversubscribed_days()
    }
}

impl std::fmt::Display for InfeasibilityReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let short: Vec<String> = self
            .oversubscribed_days()
            .map(|d| format!("day {} needs {} seats but has {}", d.day, d.demand, d.capacity))
            .collect();
        if short.is_empty() {
            write!(f, "no assignment satisfies the capacity limits")
        } else {
            write!(f, "no feasible assignment: {}", short.join("; "))
        }
    }
}
