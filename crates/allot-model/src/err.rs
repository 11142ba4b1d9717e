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

//! Validation failures raised while turning input records into a problem
//! instance. Every variant is fatal and reported before any variable exists.

use std::fmt::Display;

/// Reasons a set of input records cannot form a problem instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No center was supplied.
    NoCenters,
    /// Centers were supplied, but their capacity sequences are empty.
    NoDays,
    /// A student references a center code that does not exist.
    UnknownPreferredCenter {
        student_id: i64,
        center_code: String,
    },
    /// A center's capacity sequence differs in length from the first center's.
    InconsistentCapacityLength {
        center_code: String,
        expected: usize,
        found: usize,
    },
    /// A capacity value is negative.
    NegativeCapacity {
        center_code: String,
        day: usize,
        value: i64,
    },
    /// Two centers share the same code.
    DuplicateCenterCode(String),
    /// Two students share the same id.
    DuplicateStudentId(i64),
    /// An objective weight is negative.
    NegativeWeight { term: &'static str },
    /// A penalty table or policy parameter is malformed.
    InvalidPenaltyTable(PenaltyTableError),
}

/// Details about a malformed penalty table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PenaltyTableError {
    /// The table is not `num_centers x num_centers`.
    DimensionMismatch { expected: usize, found: usize },
    /// A row has the wrong number of columns.
    RaggedRow { row: usize, expected: usize, found: usize },
    /// An entry on the diagonal is not zero.
    NonZeroDiagonal { index: usize },
    /// An entry is negative.
    NegativeEntry { row: usize, column: usize },
    /// A policy parameter is negative.
    NegativeParameter { name: &'static str },
}

impl Display for PenaltyTableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DimensionMismatch { expected, found } => write!(
                f,
                "penalty table has {} rows but there are {} centers",
                found, expected
            ),
            Self::RaggedRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "penalty table row {} has {} columns, expected {}",
                row, found, expected
            ),
            Self::NonZeroDiagonal { index } => {
                write!(f, "penalty table entry ({index}, {index}) must be zero")
            }
            Self::NegativeEntry { row, column } => {
                write!(f, "penalty table entry ({row}, {column}) is negative")
            }
            Self::NegativeParameter { name } => {
                write!(f, "penalty policy parameter '{name}' is negative")
            }
        }
    }
}

impl std::error::Error for PenaltyTableError {}

impl Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoCenters => write!(f, "at least one center is required"),
            Self::NoDays => write!(f, "centers must provide capacity for at least one day"),
            Self::UnknownPreferredCenter {
                student_id,
                center_code,
            } => write!(
                f,
                "student {} prefers unknown center '{}'",
                student_id, center_code
            ),
            Self::InconsistentCapacityLength {
                center_code,
                expected,
                found,
            } => write!(
                f,
                "center '{}' lists {} daily capacities, expected {}",
                center_code, found, expected
            ),
            Self::NegativeCapacity {
                center_code,
                day,
                value,
            } => write!(
                f,
                "center '{}' has negative capacity {} on day {}",
                center_code, value, day
            ),
            Self::DuplicateCenterCode(code) => write!(f, "center code '{code}' is not unique"),
            Self::DuplicateStudentId(id) => write!(f, "student id {id} is not unique"),
            Self::NegativeWeight { term } => write!(f, "weight of the {term} term is negative"),
            Self::InvalidPenaltyTable(e) => write!(f, "invalid penalty table: {e}"),
        }
    }
}

impl std::error::Error for ValidationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPenaltyTable(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PenaltyTableError> for ValidationError {
    fn from(e: PenaltyTableError) -> Self {
        Self::InvalidPenaltyTable(e)
    }
}
