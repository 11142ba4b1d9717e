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

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const STUDENTS: &str = "StudentID,PreferredCenter
1,A
2,A
3,A
4,B
5,B
6,C
7,C
";

const CENTERS: &str = "A,3,1
B,3,2
C,3,4
";

struct Fixture {
    dir: TempDir,
    students: PathBuf,
    centers: PathBuf,
}

impl Fixture {
    fn new(students: &str, centers: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let students_path = dir.path().join("students.csv");
        let centers_path = dir.path().join("centers.csv");
        std::fs::write(&students_path, students).unwrap();
        std::fs::write(&centers_path, centers).unwrap();
        Self {
            dir,
            students: students_path,
            centers: centers_path,
        }
    }

    fn abc() -> Self {
        Self::new(STUDENTS, CENTERS)
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn solve(&self) -> Command {
        let mut cmd = Command::cargo_bin("allot").unwrap();
        cmd.arg("solve")
            .arg("--students")
            .arg(&self.students)
            .arg("--centers")
            .arg(&self.centers)
            .arg("--out-dir")
            .arg(self.path());
        cmd
    }
}

#[test]
fn test_solve_writes_outputs() {
    let fixture = Fixture::abc();
    fixture
        .solve()
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: optimal"))
        .stdout(predicate::str::contains("Objective: 8"));

    for name in ["assignments.csv", "capacity_summary.csv", "report.json"] {
        assert!(fixture.path().join(name).exists(), "missing {}", name);
    }

    let assignments = std::fs::read_to_string(fixture.path().join("assignments.csv")).unwrap();
    // Header plus one row per student and day.
    assert_eq!(assignments.lines().count(), 1 + 7 * 2);

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(fixture.path().join("report.json")).unwrap())
            .unwrap();
    assert_eq!(report["objective"], 8);
}

#[test]
fn test_weight_override() {
    let fixture = Fixture::abc();
    fixture
        .solve()
        .args(["--w-pref", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Objective: 10"));
}

#[test]
fn test_config_file() {
    let fixture = Fixture::abc();
    let config = fixture.path().join("allot.toml");
    std::fs::write(
        &config,
        "[weights]\npreference = 2\n\n[penalty]\npolicy = \"banded\"\nconstant = 2\n",
    )
    .unwrap();
    fixture
        .solve()
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Objective: 10"));
}

#[test]
fn test_infeasible_exit_code() {
    let fixture = Fixture::new(STUDENTS, "A,3,1\nB,3,1\nC,3,1\n");
    fixture
        .solve()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("day 1 needs 7 seats but has 3"));
    assert!(!fixture.path().join("assignments.csv").exists());
}

#[test]
fn test_zero_time_budget_exit_code() {
    let fixture = Fixture::abc();
    fixture.solve().args(["--time-budget", "0"]).assert().code(3);
}

#[test]
fn test_unknown_center_fails() {
    let fixture = Fixture::new("StudentID,PreferredCenter\n1,Z\n", CENTERS);
    fixture
        .solve()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown center 'Z'"));
}

#[test]
fn test_inspect_prints_demand() {
    let fixture = Fixture::abc();
    Command::cargo_bin("allot")
        .unwrap()
        .arg("inspect")
        .arg("--students")
        .arg(&fixture.students)
        .arg("--centers")
        .arg(&fixture.centers)
        .assert()
        .success()
        .stdout(predicate::str::contains("Day 1: demand 7, capacity 7"))
        .stdout(predicate::str::contains("A: preferred 3, capacity 1, difference -2"));
}

#[test]
fn test_inspect_json() {
    let fixture = Fixture::abc();
    let output = Command::cargo_bin("allot")
        .unwrap()
        .arg("inspect")
        .arg("--students")
        .arg(&fixture.students)
        .arg("--centers")
        .arg(&fixture.centers)
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["days"][1]["capacity"], 7);
}

#[test]
fn test_solve_help_explains_unlimited_budget() {
    Command::cargo_bin("allot")
        .unwrap()
        .args(["solve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unlimited by default"))
        .stdout(predicate::str::contains("--on-timeout accept_partial"));
}
