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

//! Allot-BnB: exact branch-and-bound for center assignment
//!
//! Solves a `ProblemInstance` to proven optimality, or returns the best
//! solution found when a monitor stops the search early.
//!
//! Core flow
//! - Compile the instance into a `model::CostModel`: unary costs per
//!   `(variable, center)`, pairwise links between variables, and capacity
//!   limits per `(day, center)`.
//! - Run `bnb::BnbSolver` with a `TreeSearchMonitor`, or call it through
//!   `adapter::BnbAssignmentSolver` and the `AssignmentSolver` contract.
//!
//! Design highlights
//! - Fixed branching order (variable index), values cheapest first.
//! - State is mutated in place and restored through a trail.
//! - Admissible bound: unary minima of open variables plus forced
//!   displacement on over-subscribed `(day, center)` pairs.
//! - Interchangeable students are kept in lexicographic order.
//! - Deterministic: the same instance always yields the same tree.
//!
//! Module map
//! - `bnb`: the solver and search session.
//! - `model`: cost model compiled from an instance.
//! - `bound`: the admissible lower bound.
//! - `symmetry`: detection of interchangeable students.
//! - `monitor`: tree-search monitors (log, composite, wrapper, no-op).
//! - `adapter`: `AssignmentSolver` implementation.
//! - `result`, `stats`: outcomes and counters.

pub mod adapter;
pub mod bnb;
pub mod bound;
pub mod decision;
pub mod model;
pub mod monitor;
pub mod result;
mod stack;
pub mod state;
pub mod stats;
pub mod symmetry;
mod trail;
