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

use allot_model::{
    builder::PenaltySource,
    input::{CenterRecord, StudentRecord},
    penalty::PenaltyPolicy,
    weights::ObjectiveWeights,
};
use allot_solver::{
    config::SolveConfig,
    engine::{Allocator, AllocatorBuilder, SolveStatus},
    err::AllotError,
};

type IntegerType = i64;

fn students(prefs: &[&str]) -> Vec<StudentRecord> {
    prefs
        .iter()
        .enumerate()
        .map(|(i, c)| StudentRecord::new(100 + i as i64, *c))
        .collect()
}

fn abc() -> (Vec<StudentRecord>, Vec<CenterRecord>) {
    (
        students(&["A", "A", "A", "B", "B", "C", "C"]),
        vec![
            CenterRecord::new("A", vec![3, 1]),
            CenterRecord::new("B", vec![3, 2]),
            CenterRecord::new("C", vec![3, 4]),
        ],
    )
}

#[test]
fn test_abc_default_weights() {
    let (students, centers) = abc();
    let mut allocator = AllocatorBuilder::<IntegerType>::new().build();
    let report = allocator.run(&students, &centers).unwrap();

    assert_eq!(report.status(), SolveStatus::Optimal);
    assert_eq!(report.objective(), 8);

    let allocation = report.allocation();
    let day1_a = allocation
        .summary()
        .iter()
        .find(|s| s.day == 1 && s.center == "A")
        .unwrap();
    assert_eq!(day1_a.assigned, 1);
    let displaced = allocation
        .rows()
        .iter()
        .filter(|r| r.day == 1 && r.preferred_center == "A" && r.assigned_center != "A")
        .count();
    assert_eq!(displaced, 2);
}

#[test]
fn test_abc_heavier_preference_weight() {
    let (students, centers) = abc();
    let mut allocator = AllocatorBuilder::<IntegerType>::new()
        .weights(ObjectiveWeights::new(2, 1, 1))
        .build();
    let report = allocator.run(&students, &centers).unwrap();
    assert_eq!(report.objective(), 10);

    let breakdown = report.allocation().breakdown();
    assert_eq!(breakdown.preference, 2);
    assert_eq!(breakdown.consistency, 2);
    assert_eq!(breakdown.movement, 4);

    // Both displaced students go from A to C, nobody else moves.
    for row in report.allocation().rows() {
        if row.assigned_center != row.preferred_center {
            assert_eq!(row.preferred_center, "A");
            assert_eq!(row.assigned_center, "C");
            assert_eq!(row.day, 1);
        }
    }
}

#[test]
fn test_single_day_has_no_consistency_terms() {
    let students = students(&["A", "A", "A", "C"]);
    let centers = vec![
        CenterRecord::new("A", vec![1]),
        CenterRecord::new("B", vec![1]),
        CenterRecord::new("C", vec![2]),
    ];
    let mut allocator = AllocatorBuilder::<IntegerType>::new()
        .weights(ObjectiveWeights::new(3, 5, 1))
        .build();
    let report = allocator.run(&students, &centers).unwrap();

    let breakdown = report.allocation().breakdown();
    assert_eq!(breakdown.consistency, 0);
    // One A-student to B (pref 1, move 0), one to C (pref 1, move 2).
    assert_eq!(breakdown.preference, 2);
    assert_eq!(breakdown.movement, 2);
    assert_eq!(report.objective(), 3 * 2 + 2);
}

#[test]
fn test_scaled_policy_changes_move_prices() {
    let students = students(&["A", "A"]);
    let centers = vec![
        CenterRecord::new("A", vec![1]),
        CenterRecord::new("B", vec![0]),
        CenterRecord::new("C", vec![0]),
        CenterRecord::new("D", vec![1]),
    ];
    let mut allocator = AllocatorBuilder::<IntegerType>::new()
        .penalty(PenaltySource::Policy(PenaltyPolicy::ScaledDistance {
            factor: 3,
        }))
        .build();
    let report = allocator.run(&students, &centers).unwrap();
    // A -> D is three positions: 3 * (3 - 1) = 6, plus the preference term.
    assert_eq!(report.objective(), 7);
}

#[test]
fn test_custom_table_is_used() {
    let students = students(&["A", "A"]);
    let centers = vec![
        CenterRecord::new("A", vec![1, 1]),
        CenterRecord::new("B", vec![1, 1]),
    ];
    let mut allocator = AllocatorBuilder::<IntegerType>::new()
        .penalty(PenaltySource::Rows(vec![vec![0, 4], vec![4, 0]]))
        .build();
    let report = allocator.run(&students, &centers).unwrap();
    // One student at B on both days: preference 2, movement 8, no change.
    assert_eq!(report.objective(), 10);
    assert_eq!(report.allocation().breakdown().consistency, 0);
}

#[test]
fn test_capacity_below_headcount_is_infeasible() {
    let students = students(&["A", "B", "B"]);
    let centers = vec![
        CenterRecord::new("A", vec![2, 2, 1]),
        CenterRecord::new("B", vec![2, 2, 1]),
    ];
    let mut allocator = AllocatorBuilder::<IntegerType>::new().build();
    match allocator.run(&students, &centers) {
        Err(AllotError::Infeasible(report)) => {
            assert!(report.to_string().contains("day 2 needs 3 seats but has 2"));
        }
        other => panic!("expected Infeasible, got {:?}", other),
    }
}

#[test]
fn test_repeated_runs_agree() {
    let (students, centers) = abc();
    let config = SolveConfig::default();
    let objectives: Vec<_> = (0..3)
        .map(|_| {
            let mut allocator = Allocator::<IntegerType>::from_config(&config).unwrap();
            let report = allocator.run(&students, &centers).unwrap();
            (report.objective(), report.allocation().rows().to_vec())
        })
        .collect();
    assert!(objectives.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_symmetry_breaking_off_finds_same_optimum() {
    let (students, centers) = abc();
    let config = SolveConfig {
        symmetry_breaking: false,
        ..SolveConfig::default()
    };
    let mut allocator = Allocator::<IntegerType>::from_config(&config).unwrap();
    assert_eq!(allocator.run(&students, &centers).unwrap().objective(), 8);
}

#[test]
fn test_narrow_objective_type() {
    let (students, centers) = abc();
    let mut allocator = AllocatorBuilder::<i32>::new().build();
    assert_eq!(allocator.run(&students, &centers).unwrap().objective(), 8);
}
