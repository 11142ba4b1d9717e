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

//! Raw input records, exactly as read from the outside world. Nothing here is
//! validated; `ProblemBuilder` does that.

use serde::{Deserialize, Serialize};

/// A student and the code of the center they prefer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StudentRecord {
    #[serde(rename = "StudentID")]
    pub id: i64,
    #[serde(rename = "PreferredCenter")]
    pub preferred_center: String,
}

impl StudentRecord {
    #[inline]
    pub fn new(id: i64, preferred_center: impl Into<String>) -> Self {
        Self {
            id,
            preferred_center: preferred_center.into(),
        }
    }
}

impl std::fmt::Display for StudentRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Student({}, prefers {})", self.id, self.preferred_center)
    }
}

/// A center and its capacity on each day of the horizon.
///
/// Capacities are signed so that negative input can be reported instead of
/// failing at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CenterRecord {
    pub code: String,
    pub capacity_by_day: Vec<i64>,
}

impl CenterRecord {
    #[inline]
    pub fn new(code: impl Into<String>, capacity_by_day: Vec<i64>) -> Self {
        Self {
            code: code.into(),
            capacity_by_day,
        }
    }

    #[inline]
    pub fn num_days(&self) -> usize {
        self.capacity_by_day.len()
    }
}

impl std::fmt::Display for CenterRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Center({}, capacity {:?})", self.code, self.capacity_by_day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let s = StudentRecord::new(4, "B");
        assert_eq!(s.id, 4);
        assert_eq!(s.preferred_center, "B");
        assert_eq!(s.to_string(), "Student(4, prefers B)");

        let c = CenterRecord::new("A", vec![3, 1]);
        assert_eq!(c.num_days(), 2);
        assert_eq!(c.to_string(), "Center(A, capacity [3, 1])");
    }
}
