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

//! Errors of the allocation pipeline.

use crate::diagnostics::InfeasibilityReport;
use allot_model::err::ValidationError;
use allot_search::adapter::SolverError;
use std::fmt::Display;

/// A configuration value that cannot be used.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// An integer does not fit the objective type.
    OutOfRange { field: &'static str, value: i64 },
    /// The time budget is negative, infinite or NaN.
    InvalidTimeBudget(f64),
    /// A solution limit of zero would stop before the search starts.
    ZeroSolutionLimit,
    UnknownTimeoutPolicy(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange { field, value } => {
                write!(f, "{field} = {value} does not fit the objective type")
            }
            Self::InvalidTimeBudget(seconds) => {
                write!(f, "time budget of {seconds} seconds is not a valid duration")
            }
            Self::ZeroSolutionLimit => write!(f, "solution limit must be at least 1"),
            Self::UnknownTimeoutPolicy(policy) => write!(
                f,
                "unknown timeout policy '{policy}', expected 'reject' or 'accept_partial'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// The extracted assignment disagrees with the instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    /// The independently recomputed objective differs from the reported one.
    ObjectiveMismatch { reported: String, recomputed: String },
    /// A `(day, center)` pair holds more students than its capacity.
    CapacityOverrun {
        day: usize,
        center: String,
        assigned: u32,
        capacity: u32,
    },
}

impl Display for VerificationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ObjectiveMismatch {
                reported,
                recomputed,
            } => write!(
                f,
                "solver reported objective {} but the assignment costs {}",
                reported, recomputed
            ),
            Self::CapacityOverrun {
                day,
                center,
                assigned,
                capacity,
            } => write!(
                f,
                "center '{}' holds {} students on day {}, capacity {}",
                center, assigned, day, capacity
            ),
        }
    }
}

impl std::error::Error for VerificationError {}

/// Every way an allocation run can fail.
#[derive(Debug, Clone, PartialEq)]
pub enum AllotError {
    Config(ConfigError),
    Validation(ValidationError),
    Solver(SolverError),
    Verification(VerificationError),
    /// No assignment satisfies the capacity limits.
    Infeasible(InfeasibilityReport),
    /// The time budget ran out and partial results are rejected.
    TimedOut { best_objective: Option<String> },
}

impl Display for AllotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid configuration: {e}"),
            Self::Validation(e) => write!(f, "invalid input: {e}"),
            Self::Solver(e) => write!(f, "solver failure: {e}"),
            Self::Verification(e) => write!(f, "verification failed: {e}"),
            Self::Infeasible(report) => write!(f, "{report}"),
            Self::TimedOut {
                best_objective: Some(objective),
            } => write!(
                f,
                "time budget exhausted before optimality was proven (best objective {objective}, partial results rejected)"
            ),
            Self::TimedOut {
                best_objective: None,
            } => write!(f, "time budget exhausted before any assignment was found"),
        }
    }
}

impl std::error::Error for AllotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Validation(e) => Some(e),
            Self::Solver(e) => Some(e),
            Self::Verification(e) => Some(e),
            Self::Infeasible(_) | Self::TimedOut { .. } => None,
        }
    }
}

impl From<ConfigError> for AllotError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ValidationError> for AllotError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<SolverError> for AllotError {
    fn from(e: SolverError) -> Self {
        Self::Solver(e)
    }
}

impl From<VerificationError> for AllotError {
    fn from(e: VerificationError) -> Self {
        Self::Verification(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_sources_are_chained() {
        let e = AllotError::from(ValidationError::NoCenters);
        assert!(e.source().is_some());
        assert_eq!(e.to_string(), "invalid input: at least one center is required");

        let e = AllotError::TimedOut {
            best_objective: None,
        };
        assert!(e.source().is_none());
    }

    #[test]
    fn test_timeout_display_mentions_best_objective() {
        let e = AllotError::TimedOut {
            best_objective: Some("12".to_string()),
        };
        assert!(e.to_string().contains("best objective 12"));
    }
}
