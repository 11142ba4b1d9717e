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

use crate::index::{CenterIndex, DayIndex, StudentIndex, VariableIndex};
use num_traits::{PrimInt, Signed};

/// A complete assignment returned by a solver.
///
/// One center per `(student, day)`, stored densely by `VariableIndex`
/// (`student * num_days + day`), plus the objective value the solver reports
/// for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution<T> {
    objective_value: T,
    num_days: usize,
    centers: Vec<CenterIndex>,
}

impl<T> Solution<T>
where
    T: PrimInt + Signed + Copy,
{
    /// Constructs a new `Solution`.
    ///
    /// # Panics
    ///
    /// Panics if `num_days` is zero or `centers.len()` is not a multiple of it.
    pub fn new(objective_value: T, num_days: usize, centers: Vec<CenterIndex>) -> Self {
        assert!(
            num_days > 0 && centers.len() % num_days == 0,
            "called `Solution::new` with {} values which is not a multiple of num_days = {}",
            centers.len(),
            num_days
        );

        Self {
            objective_value,
            num_days,
            centers,
        }
    }

    #[inline]
    pub fn objective_value(&self) -> T {
        self.objective_value
    }

    #[inline]
    pub fn num_days(&self) -> usize {
        self.num_days
    }

    #[inline]
    pub fn num_students(&self) -> usize {
        self.centers.len() / self.num_days
    }

    #[inline]
    pub fn num_variables(&self) -> usize {
        self.centers.len()
    }

    /// Returns the center assigned to `student` on `day`.
    ///
    /// # Panics
    ///
    /// Panics if `student` or `day` is out of bounds.
    #[inline]
    pub fn center(&self, student: StudentIndex, day: DayIndex) -> CenterIndex {
        debug_assert!(
            day.get() < self.num_days,
            "called `Solution::center` with day index out of bounds: the len is {} but the index is {}",
            self.num_days,
            day.get()
        );
        debug_assert!(
            student.get() < self.num_students(),
            "called `Solution::center` with student index out of bounds: the len is {} but the index is {}",
            self.num_students(),
            student.get()
        );

        self.centers[student.get() * self.num_days + day.get()]
    }

    /// Returns the center assigned to a variable.
    ///
    /// # Panics
    ///
    /// Panics if `variable` is out of bounds.
    #[inline]
    pub fn center_for_variable(&self, variable: VariableIndex) -> CenterIndex {
        self.centers[variable.get()]
    }

    /// Returns all assigned centers in variable order.
    #[inline]
    pub fn centers(&self) -> &[CenterIndex] {
        &self.centers
    }

    /// Returns the day-ordered assignment of one student.
    #[inline]
    pub fn student_schedule(&self, student: StudentIndex) -> &[CenterIndex] {
        let start = student.get() * self.num_days;
        &self.centers[start..start + self.num_days]
    }
}

impl<T> std::fmt::Display for Solution<T>
where
    T: PrimInt + Signed + Copy + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution Summary")?;
        writeln!(f, "   Objective Value: {}", self.objective_value)?;
        writeln!(f)?;

        if self.centers.is_empty() {
            writeln!(f, "   (No students assigned)")?;
            return Ok(());
        }

        write!(f, "   {:<10}", "Student")?;
        for d in 0..self.num_days {
            write!(f, " | Day {:<5}", d)?;
        }
        writeln!(f)?;
        for (s, schedule) in self.centers.chunks(self.num_days).enumerate() {
            write!(f, "   {:<10}", s)?;
            for c in schedule {
                write!(f, " | {:<9}", c.get())?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ci(i: usize) -> CenterIndex {
        CenterIndex::new(i)
    }

    #[test]
    fn test_new_and_basic_accessors() {
        let sol = Solution::new(7i64, 2, vec![ci(0), ci(1), ci(2), ci(2)]);

        assert_eq!(sol.objective_value(), 7);
        assert_eq!(sol.num_days(), 2);
        assert_eq!(sol.num_students(), 2);
        assert_eq!(sol.num_variables(), 4);

        assert_eq!(sol.center(StudentIndex::new(0), DayIndex::new(1)), ci(1));
        assert_eq!(sol.center(StudentIndex::new(1), DayIndex::new(0)), ci(2));
        assert_eq!(sol.center_for_variable(VariableIndex::new(2)), ci(2));
        assert_eq!(sol.student_schedule(StudentIndex::new(1)), &[ci(2), ci(2)]);
    }

    #[test]
    #[should_panic(expected = "not a multiple of num_days")]
    fn test_new_panics_on_ragged_values() {
        let _ = Solution::new(0i64, 2, vec![ci(0), ci(1), ci(2)]);
    }

    #[test]
    fn test_display_contains_objective_and_rows() {
        let sol = Solution::new(3i64, 1, vec![ci(0), ci(2)]);
        let rendered = sol.to_string();
        assert!(rendered.contains("Objective Value: 3"));
        assert!(rendered.contains("Day 0"));
    }

    #[test]
    fn test_display_empty() {
        let sol = Solution::<i64>::new(0, 3, Vec::new());
        assert!(sol.to_string().contains("No students assigned"));
    }
}
