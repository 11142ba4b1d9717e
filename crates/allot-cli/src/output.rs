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

//! Writes run results to disk.
//!
//! - `assignments.csv`: one row per `(student, day)` with penalties.
//! - `capacity_summary.csv`: one row per `(day, center)` with occupancy.
//! - `report.json`: status, objective, penalty breakdown and statistics.

use allot_solver::{
    engine::AllocationReport,
    extract::{AssignmentRow, CenterDaySummary, PenaltyBreakdown},
};
use anyhow::Context;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const ASSIGNMENTS_FILE: &str = "assignments.csv";
pub const SUMMARY_FILE: &str = "capacity_summary.csv";
pub const REPORT_FILE: &str = "report.json";

#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    status: String,
    objective: i64,
    penalties: &'a PenaltyBreakdown<i64>,
    termination: String,
    solutions_found: u64,
    nodes_explored: u64,
    backtracks: u64,
    solve_seconds: f64,
}

fn write_csv<S, P>(path: P, records: &[S]) -> anyhow::Result<()>
where
    S: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("write {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}

pub fn write_assignments(path: &Path, rows: &[AssignmentRow<i64>]) -> anyhow::Result<()> {
    write_csv(path, rows)
}

pub fn write_summary(path: &Path, summary: &[CenterDaySummary]) -> anyhow::Result<()> {
    write_csv(path, summary)
}

pub fn write_report_json(path: &Path, report: &AllocationReport<i64>) -> anyhow::Result<()> {
    let statistics = report.statistics();
    let summary = RunSummary {
        status: report.status().to_string(),
        objective: report.objective(),
        penalties: report.allocation().breakdown(),
        termination: report.termination_reason().to_string(),
        solutions_found: statistics.solutions_found,
        nodes_explored: statistics.nodes_explored,
        backtracks: statistics.backtracks,
        solve_seconds: statistics.solve_duration.as_secs_f64(),
    };
    let json = serde_json::to_string_pretty(&summary).context("serialize report")?;
    std::fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Writes all three outputs into `out_dir`, creating it if needed, and
/// returns the paths written.
pub fn write_all(out_dir: &Path, report: &AllocationReport<i64>) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir).with_context(|| format!("create {}", out_dir.display()))?;
    let assignments = out_dir.join(ASSIGNMENTS_FILE);
    let summary = out_dir.join(SUMMARY_FILE);
    let json = out_dir.join(REPORT_FILE);
    write_assignments(&assignments, report.allocation().rows())?;
    write_summary(&summary, report.allocation().summary())?;
    write_report_json(&json, report)?;
    Ok(vec![assignments, summary, json])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_csv_has_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(ASSIGNMENTS_FILE);
        let rows = vec![AssignmentRow {
            student_id: 7,
            day: 1,
            preferred_center: "A".to_string(),
            assigned_center: "C".to_string(),
            preference_penalty: 1,
            move_penalty: 2,
            consistency_penalty: 0,
        }];
        write_assignments(&path, &rows).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next(),
            Some(
                "student_id,day,preferred_center,assigned_center,preference_penalty,move_penalty,consistency_penalty"
            )
        );
        assert_eq!(lines.next(), Some("7,1,A,C,1,2,0"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_summary_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SUMMARY_FILE);
        let summary = vec![CenterDaySummary {
            day: 0,
            center: "B".to_string(),
            assigned: 2,
            capacity: 3,
        }];
        write_summary(&path, &summary).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "day,center,assigned,capacity\n0,B,2,3\n");
    }
}
