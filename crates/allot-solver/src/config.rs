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

//! Run configuration.
//!
//! `SolveConfig` is the serde-facing description of a run: objective weights,
//! the move penalty policy, budgets and the timeout policy. Every field has a
//! default, so an empty document is a valid configuration. Integer fields are
//! read as `i64` and converted to the objective type on use.

use crate::err::ConfigError;
use allot_model::{builder::PenaltySource, penalty::PenaltyPolicy, weights::ObjectiveWeights};
use allot_search::{adapter::SolveLimits, num::SolverNumeric};
use serde::{Deserialize, Serialize};
use std::{num::NonZeroU64, time::Duration};

/// What to do when the time budget runs out before optimality is proven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutPolicy {
    /// Fail the run, even if a feasible assignment was found.
    #[default]
    Reject,
    /// Report the best assignment found, labeled as timed out.
    AcceptPartial,
}

impl std::fmt::Display for TimeoutPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeoutPolicy::Reject => write!(f, "reject"),
            TimeoutPolicy::AcceptPartial => write!(f, "accept_partial"),
        }
    }
}

impl std::str::FromStr for TimeoutPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "reject" => Ok(TimeoutPolicy::Reject),
            "accept_partial" => Ok(TimeoutPolicy::AcceptPartial),
            other => Err(ConfigError::UnknownTimeoutPolicy(other.to_string())),
        }
    }
}

/// Objective weights section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeightsConfig {
    /// Weight of a day spent away from the preferred center.
    pub preference: i64,
    /// Weight of a center change between consecutive days.
    pub consistency: i64,
    /// Weight of the move penalty table entry.
    pub movement: i64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            preference: 1,
            consistency: 1,
            movement: 1,
        }
    }
}

fn default_penalty_parameter() -> i64 {
    2
}

/// Move penalty section, tagged by `policy`.
///
/// ```toml
/// [penalty]
/// policy = "scaled"
/// factor = 3
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case", deny_unknown_fields)]
pub enum PenaltyConfig {
    /// Zero within one position, `constant` beyond.
    Banded {
        #[serde(default = "default_penalty_parameter")]
        constant: i64,
    },
    /// `factor` per position beyond the first.
    Scaled {
        #[serde(default = "default_penalty_parameter")]
        factor: i64,
    },
    /// Explicit rows indexed `[preferred][assigned]`.
    Table { rows: Vec<Vec<i64>> },
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        PenaltyConfig::Banded {
            constant: default_penalty_parameter(),
        }
    }
}

/// A complete run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolveConfig {
    pub weights: WeightsConfig,
    pub penalty: PenaltyConfig,
    /// Wall-clock budget of the solve, unlimited when absent.
    ///
    /// The search is exact and its running time grows exponentially with the
    /// number of students. Instances with a few hundred students may not be
    /// proven optimal within minutes, so set a budget (and usually
    /// `on_timeout = "accept_partial"`) for anything beyond small inputs.
    pub time_budget_seconds: Option<f64>,
    /// Stop after this many improving solutions.
    pub solution_limit: Option<u64>,
    pub on_timeout: TimeoutPolicy,
    /// Keep interchangeable students in lexicographic order.
    pub symmetry_breaking: bool,
    /// Emit periodic search progress through `tracing`.
    pub log_progress: bool,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            weights: WeightsConfig::default(),
            penalty: PenaltyConfig::default(),
            time_budget_seconds: None,
            solution_limit: None,
            on_timeout: TimeoutPolicy::default(),
            symmetry_breaking: true,
            log_progress: false,
        }
    }
}

fn convert<T>(field: &'static str, value: i64) -> Result<T, ConfigError>
where
    T: SolverNumeric,
{
    T::from_i64(value).ok_or(ConfigError::OutOfRange { field, value })
}

impl SolveConfig {
    /// The objective weights, converted to `T`. Sign checks happen in the
    /// problem builder.
    pub fn objective_weights<T>(&self) -> Result<ObjectiveWeights<T>, ConfigError>
    where
        T: SolverNumeric,
    {
        Ok(ObjectiveWeights::new(
            convert("weights.preference", self.weights.preference)?,
            convert("weights.consistency", self.weights.consistency)?,
            convert("weights.movement", self.weights.movement)?,
        ))
    }

    /// Where the move penalty table comes from, converted to `T`.
    pub fn penalty_source<T>(&self) -> Result<PenaltySource<T>, ConfigError>
    where
        T: SolverNumeric,
    {
        match &self.penalty {
            PenaltyConfig::Banded { constant } => Ok(PenaltySource::Policy(PenaltyPolicy::Banded {
                constant: convert("penalty.constant", *constant)?,
            })),
            PenaltyConfig::Scaled { factor } => {
                Ok(PenaltySource::Policy(PenaltyPolicy::ScaledDistance {
                    factor: convert("penalty.factor", *factor)?,
                }))
            }
            PenaltyConfig::Table { rows } => rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|&value| convert("penalty.rows", value))
                        .collect::<Result<Vec<T>, _>>()
                })
                .collect::<Result<Vec<_>, _>>()
                .map(PenaltySource::Rows),
        }
    }

    /// The budgets of the solve.
    pub fn limits(&self) -> Result<SolveLimits, ConfigError> {
        let mut limits = SolveLimits::unlimited();
        if let Some(seconds) = self.time_budget_seconds {
            let budget = Duration::try_from_secs_f64(seconds)
                .map_err(|_| ConfigError::InvalidTimeBudget(seconds))?;
            limits = limits.with_time_budget(budget);
        }
        if let Some(limit) = self.solution_limit {
            let limit = NonZeroU64::new(limit).ok_or(ConfigError::ZeroSolutionLimit)?;
            limits = limits.with_solution_limit(limit);
        }
        Ok(limits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type IntegerType = i64;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config: SolveConfig = toml::from_str("").unwrap();
        assert_eq!(config, SolveConfig::default());
        assert_eq!(
            config.objective_weights::<IntegerType>().unwrap(),
            ObjectiveWeights::new(1, 1, 1)
        );
        assert_eq!(
            config.penalty_source::<IntegerType>().unwrap(),
            PenaltySource::Policy(PenaltyPolicy::Banded { constant: 2 })
        );
        assert_eq!(config.limits().unwrap(), SolveLimits::unlimited());
        assert_eq!(config.on_timeout, TimeoutPolicy::Reject);
        assert!(config.symmetry_breaking);
    }

    #[test]
    fn test_full_document() {
        let config: SolveConfig = toml::from_str(
            r#"
            time_budget_seconds = 2.5
            solution_limit = 4
            on_timeout = "accept_partial"
            symmetry_breaking = false

            [weights]
            preference = 2

            [penalty]
            policy = "scaled"
            factor = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.weights.preference, 2);
        assert_eq!(config.weights.movement, 1);
        assert_eq!(
            config.penalty_source::<IntegerType>().unwrap(),
            PenaltySource::Policy(PenaltyPolicy::ScaledDistance { factor: 3 })
        );
        let limits = config.limits().unwrap();
        assert_eq!(limits.time_budget(), Some(Duration::from_millis(2500)));
        assert_eq!(limits.solution_limit(), NonZeroU64::new(4));
        assert_eq!(config.on_timeout, TimeoutPolicy::AcceptPartial);
        assert!(!config.symmetry_breaking);
    }

    #[test]
    fn test_table_policy_and_default_parameter() {
        let config: SolveConfig = toml::from_str(
            r#"
            [penalty]
            policy = "table"
            rows = [[0, 5], [5, 0]]
            "#,
        )
        .unwrap();
        assert_eq!(
            config.penalty_source::<IntegerType>().unwrap(),
            PenaltySource::Rows(vec![vec![0, 5], vec![5, 0]])
        );

        let banded: SolveConfig = toml::from_str("[penalty]\npolicy = \"banded\"\n").unwrap();
        assert_eq!(banded.penalty, PenaltyConfig::Banded { constant: 2 });
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(toml::from_str::<SolveConfig>("time_budget = 3").is_err());
        assert!(toml::from_str::<SolveConfig>("[weights]\npref = 3\n").is_err());
    }

    #[test]
    fn test_invalid_limits() {
        let config = SolveConfig {
            time_budget_seconds: Some(-1.0),
            ..SolveConfig::default()
        };
        assert_eq!(config.limits(), Err(ConfigError::InvalidTimeBudget(-1.0)));

        let config = SolveConfig {
            solution_limit: Some(0),
            ..SolveConfig::default()
        };
        assert_eq!(config.limits(), Err(ConfigError::ZeroSolutionLimit));
    }

    #[test]
    fn test_out_of_range_weight() {
        let config = SolveConfig {
            weights: WeightsConfig {
                preference: i64::from(i32::MAX) + 1,
                ..WeightsConfig::default()
            },
            ..SolveConfig::default()
        };
        assert_eq!(
            config.objective_weights::<i32>(),
            Err(ConfigError::OutOfRange {
                field: "weights.preference",
                value: i64::from(i32::MAX) + 1
            })
        );
    }

    #[test]
    fn test_timeout_policy_parsing() {
        assert_eq!("reject".parse(), Ok(TimeoutPolicy::Reject));
        assert_eq!("accept-partial".parse(), Ok(TimeoutPolicy::AcceptPartial));
        assert!("later".parse::<TimeoutPolicy>().is_err());
        assert_eq!(TimeoutPolicy::AcceptPartial.to_string(), "accept_partial");
    }
}
