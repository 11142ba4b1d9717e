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

//! # Allot Model
//!
//! **The domain model for capacity-constrained multi-day center assignment.**
//!
//! Students are assigned to one center per day. Each center has a capacity
//! per day, each student prefers one center, and the objective prices
//! displacement, day-to-day changes, and the distance of a move.
//!
//! ## Architecture
//!
//! * **`index`**: strongly typed indices (`StudentIndex`, `CenterIndex`, `DayIndex`, ...).
//! * **`input`**: raw student and center records.
//! * **`loading`**: CSV readers for those records.
//! * **`penalty`**: distance policies and the dense move penalty table.
//! * **`weights`**: objective weights.
//! * **`builder`**: fail-fast validation and construction of a `ProblemInstance`.
//! * **`instance`**: the immutable, solver-facing problem: variables, hard and
//!   soft constraints, and the weighted objective.
//! * **`solution`**: a complete assignment with its reported objective.
//! * **`err`**: validation errors.
//!
//! ## Design Philosophy
//!
//! 1.  **Type Safety**: index spaces are distinct types.
//! 2.  **Memory Layout**: all per-variable and per-(day, center) data lives in flat vectors.
//! 3.  **Fail-Fast**: invalid input is rejected before any variable is created.
//! 4.  **Exact**: integer arithmetic only.

pub mod builder;
pub mod err;
pub mod index;
pub mod input;
pub mod instance;
pub mod loading;
pub mod penalty;
pub mod solution;
pub mod weights;
