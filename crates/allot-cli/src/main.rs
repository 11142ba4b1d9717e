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

mod config;
mod output;

use allot_model::{
    input::{CenterRecord, StudentRecord},
    loading::RecordLoader,
};
use allot_solver::{
    config::TimeoutPolicy,
    diagnostics::DemandReport,
    engine::Allocator,
    err::AllotError,
};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use config::{Overrides, PolicyArg};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Exit code when no assignment satisfies the capacities.
const EXIT_INFEASIBLE: u8 = 2;
/// Exit code when the time budget ran out and the result was rejected.
const EXIT_TIMED_OUT: u8 = 3;

#[derive(Debug, Parser)]
#[command(
    name = "allot",
    version,
    about = "Assigns students to centers per day under capacity limits."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Solve an instance and write the assignment.
    Solve(SolveArgs),
    /// Print demand against capacity per day and center.
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
struct InputArgs {
    /// Student CSV with a `StudentID,PreferredCenter` header.
    #[arg(long)]
    students: PathBuf,

    /// Center CSV, one `code,cap_day0,cap_day1,...` row per center.
    #[arg(long)]
    centers: PathBuf,

    /// The center file starts with a header row.
    #[arg(long, default_value_t = false)]
    center_headers: bool,

    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct SolveArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Directory for the output files.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Time budget in seconds. Unlimited by default; the search is exact and
    /// may not finish on inputs beyond a few hundred students, so set a budget
    /// together with `--on-timeout accept_partial` for large runs.
    #[arg(long)]
    time_budget: Option<f64>,

    /// Stop after this many improving solutions.
    #[arg(long)]
    solution_limit: Option<u64>,

    /// What to do with a timed-out run: `reject` or `accept_partial`.
    #[arg(long)]
    on_timeout: Option<TimeoutPolicy>,

    /// Weight of the preference term.
    #[arg(long)]
    w_pref: Option<i64>,

    /// Weight of the consistency term.
    #[arg(long)]
    w_diff: Option<i64>,

    /// Weight of the move penalty term.
    #[arg(long)]
    w_move: Option<i64>,

    /// Built-in move penalty policy.
    #[arg(long, value_enum)]
    penalty_policy: Option<PolicyArg>,

    /// Constant of the banded policy or factor of the scaled policy.
    #[arg(long)]
    penalty_parameter: Option<i64>,

    /// Disable symmetry breaking between interchangeable students.
    #[arg(long, default_value_t = false)]
    no_symmetry_breaking: bool,

    /// Log search progress periodically.
    #[arg(long, default_value_t = false)]
    progress: bool,
}

#[derive(Debug, Args)]
struct InspectArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Print the report as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl SolveArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            time_budget: self.time_budget,
            solution_limit: self.solution_limit,
            on_timeout: self.on_timeout,
            w_pref: self.w_pref,
            w_diff: self.w_diff,
            w_move: self.w_move,
            penalty_policy: self.penalty_policy,
            penalty_parameter: self.penalty_parameter,
            no_symmetry_breaking: self.no_symmetry_breaking,
            progress: self.progress,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match real_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            match e.downcast_ref::<AllotError>() {
                Some(AllotError::Infeasible(_)) => ExitCode::from(EXIT_INFEASIBLE),
                Some(AllotError::TimedOut { .. }) => ExitCode::from(EXIT_TIMED_OUT),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Solve(args) => cmd_solve(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn load_records(input: &InputArgs) -> anyhow::Result<(Vec<StudentRecord>, Vec<CenterRecord>)> {
    let loader = RecordLoader::new().center_headers(input.center_headers);
    let students = loader
        .students_from_path(&input.students)
        .with_context(|| format!("load students from {}", input.students.display()))?;
    let centers = loader
        .centers_from_path(&input.centers)
        .with_context(|| format!("load centers from {}", input.centers.display()))?;
    info!(
        students = students.len(),
        centers = centers.len(),
        "input records loaded"
    );
    Ok((students, centers))
}

fn cmd_solve(args: SolveArgs) -> anyhow::Result<()> {
    let file_config = config::load_or_default(args.input.config.as_deref())?;
    let config = config::merge(file_config, &args.overrides());
    let (students, centers) = load_records(&args.input)?;

    let mut allocator = Allocator::<i64>::from_config(&config)?;
    let report = allocator
        .run(&students, &centers)
        .context("allocation failed")?;

    let written = output::write_all(&args.out_dir, &report)?;
    for path in &written {
        info!("wrote {}", path.display());
    }
    println!("{}", report);
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let config = config::load_or_default(args.input.config.as_deref())?;
    let (students, centers) = load_records(&args.input)?;

    let allocator = Allocator::<i64>::from_config(&config)?;
    let instance = allocator.build_instance(&students, &centers)?;
    let demand = DemandReport::from_instance(&instance);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&demand).context("serialize demand report")?
        );
    } else {
        print!("{}", demand);
        println!("Search space: {}", instance.complexity());
    }
    Ok(())
}
