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

//! Configuration loading for the `allot` binary.
//!
//! Reads an optional TOML `SolveConfig` and applies command-line overrides on
//! top of it. Command-line values win.

use allot_solver::config::{PenaltyConfig, SolveConfig, TimeoutPolicy};
use anyhow::Context;
use clap::ValueEnum;
use std::path::Path;
use tracing::debug;

/// Built-in penalty policies selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    Banded,
    Scaled,
}

/// Command-line values that override the configuration file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub time_budget: Option<f64>,
    pub solution_limit: Option<u64>,
    pub on_timeout: Option<TimeoutPolicy>,
    pub w_pref: Option<i64>,
    pub w_diff: Option<i64>,
    pub w_move: Option<i64>,
    pub penalty_policy: Option<PolicyArg>,
    pub penalty_parameter: Option<i64>,
    pub no_symmetry_breaking: bool,
    pub progress: bool,
}

/// Parses a configuration document.
pub fn parse_config(contents: &str) -> anyhow::Result<SolveConfig> {
    let config: SolveConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Loads the configuration file, or the defaults if no path is given.
pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<SolveConfig> {
    match path {
        Some(path) => {
            debug!("loading config file {}", path.display());
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("read config file {}", path.display()))?;
            parse_config(&contents).with_context(|| format!("parse config file {}", path.display()))
        }
        None => {
            debug!("no config file given, using defaults");
            Ok(SolveConfig::default())
        }
    }
}

/// Applies `overrides` to `config`.
pub fn merge(mut config: SolveConfig, overrides: &Overrides) -> SolveConfig {
    if let Some(seconds) = overrides.time_budget {
        config.time_budget_seconds = Some(seconds);
    }
    if let Some(limit) = overrides.solution_limit {
        config.solution_limit = Some(limit);
    }
    if let Some(policy) = overrides.on_timeout {
        config.on_timeout = policy;
    }
    if let Some(w) = overrides.w_pref {
        config.weights.preference = w;
    }
    if let Some(w) = overrides.w_diff {
        config.weights.consistency = w;
    }
    if let Some(w) = overrides.w_move {
        config.weights.movement = w;
    }
    let parameter = overrides.penalty_parameter;
    config.penalty = match (overrides.penalty_policy, config.penalty) {
        (Some(PolicyArg::Banded), _) => PenaltyConfig::Banded {
            constant: parameter.unwrap_or(2),
        },
        (Some(PolicyArg::Scaled), _) => PenaltyConfig::Scaled {
            factor: parameter.unwrap_or(2),
        },
        (None, PenaltyConfig::Banded { constant }) => PenaltyConfig::Banded {
            constant: parameter.unwrap_or(constant),
        },
        (None, PenaltyConfig::Scaled { factor }) => PenaltyConfig::Scaled {
            factor: parameter.unwrap_or(factor),
        },
        (None, table) => table,
    };
    if overrides.no_symmetry_breaking {
        config.symmetry_breaking = false;
    }
    if overrides.progress {
        config.log_progress = true;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win_over_file() {
        let file = parse_config(
            r#"
            time_budget_seconds = 10.0
            [weights]
            preference = 2
            movement = 3
            "#,
        )
        .unwrap();
        let overrides = Overrides {
            time_budget: Some(1.5),
            w_pref: Some(5),
            penalty_policy: Some(PolicyArg::Scaled),
            ..Overrides::default()
        };
        let merged = merge(file, &overrides);
        assert_eq!(merged.time_budget_seconds, Some(1.5));
        assert_eq!(merged.weights.preference, 5);
        assert_eq!(merged.weights.movement, 3);
        assert_eq!(merged.penalty, PenaltyConfig::Scaled { factor: 2 });
    }

    #[test]
    fn test_parameter_alone_keeps_policy() {
        let overrides = Overrides {
            penalty_parameter: Some(7),
            ..Overrides::default()
        };
        let merged = merge(SolveConfig::default(), &overrides);
        assert_eq!(merged.penalty, PenaltyConfig::Banded { constant: 7 });
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_or_default(Some(Path::new("/nonexistent/allot.toml"))).unwrap_err();
        assert!(err.to_string().contains("read config file"));
        assert_eq!(load_or_default(None).unwrap(), SolveConfig::default());
    }
}
