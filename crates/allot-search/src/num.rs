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

//! # Solver Numeric Trait
//!
//! Unified numeric bounds for objective values. `SolverNumeric` collects the
//! integer capabilities the search needs (`PrimInt`, `Signed`, primitive
//! conversions) into a single alias so generic signatures stay short.
//!
//! Arithmetic on objective values is saturating throughout the workspace; the
//! `Saturating` and `CheckedMul` methods come with `PrimInt`.

use num_traits::{FromPrimitive, PrimInt, Signed, ToPrimitive};
use std::hash::Hash;

/// A trait alias for numeric types that can be used as objective values.
/// These are usually the signed integer types `i16`, `i32`, `i64` and `isize`.
///
/// # Note
///
/// `i128` works but is significantly slower on many platforms.
pub trait SolverNumeric:
    PrimInt
    + Signed
    + FromPrimitive
    + ToPrimitive
    + std::fmt::Debug
    + std::fmt::Display
    + Send
    + Sync
    + Hash
    + 'static
{
    /// `self * rhs`, clamped to `max_value` on overflow.
    #[inline(always)]
    fn saturating_mul_val(self, rhs: Self) -> Self {
        self.checked_mul(&rhs).unwrap_or_else(|| {
            if self.is_negative() != rhs.is_negative() {
                Self::min_value()
            } else {
                Self::max_value()
            }
        })
    }
}

impl<T> SolverNumeric for T where
    T: PrimInt
        + Signed
        + FromPrimitive
        + ToPrimitive
        + std::fmt::Debug
        + std::fmt::Display
        + Send
        + Sync
        + Hash
        + 'static
{
}

#[cfg(test)]
mod tests {
    use super::SolverNumeric;

    fn accepts<T: SolverNumeric>(a: T, b: T) -> T {
        a.saturating_mul_val(b)
    }

    #[test]
    fn test_saturating_mul_val() {
        assert_eq!(accepts(3i64, 4i64), 12);
        assert_eq!(accepts(i32::MAX, 2), i32::MAX);
        assert_eq!(accepts(i32::MAX, -2), i32::MIN);
        assert_eq!(accepts(0i16, i16::MAX), 0);
    }
}
