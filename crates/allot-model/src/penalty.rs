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

//! # Move Penalty Model
//!
//! Derives the dense `num_centers x num_centers` penalty table that prices
//! assigning a student away from the preferred center. The table is indexed by
//! `(preferred, assigned)` and stored flattened row-major, so a lookup is a
//! single multiply-add.
//!
//! Two distance policies ship with the crate:
//!
//! - `BandedAdjacency`: free within one ordinal step, a fixed constant beyond.
//! - `ScaledOrdinalDistance`: `factor * max(0, |i - j| - 1)`.
//!
//! Any other policy can implement `DistanceFunction`. A hand-written table can
//! be supplied with `PenaltyTable::from_rows`, which validates the shape, the
//! zero diagonal and non-negativity.

use crate::{err::PenaltyTableError, index::CenterIndex};
use num_traits::{PrimInt, Signed};

/// Prices moving a student from the preferred center to another one.
///
/// Implementations must return zero for `preferred == assigned` and a
/// non-negative value otherwise.
pub trait DistanceFunction<T> {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Penalty of assigning a student who prefers `preferred` to `assigned`.
    fn penalty(&self, preferred: CenterIndex, assigned: CenterIndex) -> T;
}

#[inline(always)]
fn ordinal_distance(a: CenterIndex, b: CenterIndex) -> usize {
    a.get().abs_diff(b.get())
}

/// Zero penalty for the same or an adjacent center, `constant` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandedAdjacency<T> {
    constant: T,
}

impl<T> BandedAdjacency<T>
where
    T: PrimInt + Signed,
{
    #[inline]
    pub fn new(constant: T) -> Self {
        Self { constant }
    }

    #[inline]
    pub fn constant(&self) -> T {
        self.constant
    }
}

impl<T> DistanceFunction<T> for BandedAdjacency<T>
where
    T: PrimInt + Signed,
{
    fn name(&self) -> &str {
        "BandedAdjacency"
    }

    #[inline]
    fn penalty(&self, preferred: CenterIndex, assigned: CenterIndex) -> T {
        if ordinal_distance(preferred, assigned) <= 1 {
            T::zero()
        } else {
            self.constant
        }
    }
}

/// `factor * max(0, |i - j| - 1)`: adjacent centers are free, each further
/// step costs `factor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaledOrdinalDistance<T> {
    factor: T,
}

impl<T> ScaledOrdinalDistance<T>
where
    T: PrimInt + Signed,
{
    #[inline]
    pub fn new(factor: T) -> Self {
        Self { factor }
    }

    #[inline]
    pub fn factor(&self) -> T {
        self.factor
    }
}

impl<T> DistanceFunction<T> for ScaledOrdinalDistance<T>
where
    T: PrimInt + Signed,
{
    fn name(&self) -> &str {
        "ScaledOrdinalDistance"
    }

    #[inline]
    fn penalty(&self, preferred: CenterIndex, assigned: CenterIndex) -> T {
        let steps = ordinal_distance(preferred, assigned).saturating_sub(1);
        let steps: T = num_traits::cast(steps).unwrap_or_else(T::max_value);
        self.factor.checked_mul(&steps).unwrap_or_else(T::max_value)
    }
}

/// Selectable default penalty policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenaltyPolicy<T> {
    /// See `BandedAdjacency`.
    Banded { constant: T },
    /// See `ScaledOrdinalDistance`.
    ScaledDistance { factor: T },
}

impl<T> PenaltyPolicy<T>
where
    T: PrimInt + Signed,
{
    /// The banded policy with constant 2.
    #[inline]
    pub fn banded() -> Self {
        Self::Banded {
            constant: T::one() + T::one(),
        }
    }

    /// The scaled policy with factor 2.
    #[inline]
    pub fn scaled() -> Self {
        Self::ScaledDistance {
            factor: T::one() + T::one(),
        }
    }

    fn validate(&self) -> Result<(), PenaltyTableError> {
        match self {
            Self::Banded { constant } if constant.is_negative() => {
                Err(PenaltyTableError::NegativeParameter { name: "constant" })
            }
            Self::ScaledDistance { factor } if factor.is_negative() => {
                Err(PenaltyTableError::NegativeParameter { name: "factor" })
            }
            _ => Ok(()),
        }
    }
}

impl<T> Default for PenaltyPolicy<T>
where
    T: PrimInt + Signed,
{
    fn default() -> Self {
        Self::banded()
    }
}

impl<T> DistanceFunction<T> for PenaltyPolicy<T>
where
    T: PrimInt + Signed,
{
    fn name(&self) -> &str {
        match self {
            Self::Banded { .. } => "BandedAdjacency",
            Self::ScaledDistance { .. } => "ScaledOrdinalDistance",
        }
    }

    #[inline]
    fn penalty(&self, preferred: CenterIndex, assigned: CenterIndex) -> T {
        match *self {
            Self::Banded { constant } => BandedAdjacency::new(constant).penalty(preferred, assigned),
            Self::ScaledDistance { factor } => {
                ScaledOrdinalDistance::new(factor).penalty(preferred, assigned)
            }
        }
    }
}

impl<T> std::fmt::Display for PenaltyPolicy<T>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Banded { constant } => write!(f, "Banded(constant: {constant})"),
            Self::ScaledDistance { factor } => write!(f, "ScaledDistance(factor: {factor})"),
        }
    }
}

/// Dense, immutable move penalty lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PenaltyTable<T> {
    num_centers: usize,
    values: Vec<T>,
}

impl<T> PenaltyTable<T>
where
    T: PrimInt + Signed,
{
    /// Tabulates `distance` for every `(preferred, assigned)` pair.
    ///
    /// The diagonal is forced to zero regardless of what `distance` returns.
    pub fn from_distance<D>(num_centers: usize, distance: &D) -> Self
    where
        D: DistanceFunction<T> + ?Sized,
    {
        let mut values = Vec::with_capacity(num_centers * num_centers);
        for p in 0..num_centers {
            for a in 0..num_centers {
                let value = if p == a {
                    T::zero()
                } else {
                    distance.penalty(CenterIndex::new(p), CenterIndex::new(a))
                };
                values.push(value);
            }
        }
        Self {
            num_centers,
            values,
        }
    }

    /// Tabulates one of the built-in policies after checking its parameter.
    pub fn from_policy(
        num_centers: usize,
        policy: &PenaltyPolicy<T>,
    ) -> Result<Self, PenaltyTableError> {
        policy.validate()?;
        Ok(Self::from_distance(num_centers, policy))
    }

    /// Builds a table from explicit rows, indexed `[preferred][assigned]`.
    pub fn from_rows<R>(num_centers: usize, rows: &[R]) -> Result<Self, PenaltyTableError>
    where
        R: AsRef<[T]>,
    {
        if rows.len() != num_centers {
            return Err(PenaltyTableError::DimensionMismatch {
                expected: num_centers,
                found: rows.len(),
            });
        }

        let mut values = Vec::with_capacity(num_centers * num_centers);
        for (r, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != num_centers {
                return Err(PenaltyTableError::RaggedRow {
                    row: r,
                    expected: num_centers,
                    found: row.len(),
                });
            }
            for (c, &value) in row.iter().enumerate() {
                if value.is_negative() {
                    return Err(PenaltyTableError::NegativeEntry { row: r, column: c });
                }
                if r == c && !value.is_zero() {
                    return Err(PenaltyTableError::NonZeroDiagonal { index: r });
                }
                values.push(value);
            }
        }

        Ok(Self {
            num_centers,
            values,
        })
    }

    #[inline]
    pub fn num_centers(&self) -> usize {
        self.num_centers
    }

    #[inline(always)]
    fn flatten_index(&self, preferred: CenterIndex, assigned: CenterIndex) -> usize {
        preferred.get() * self.num_centers + assigned.get()
    }

    /// Returns the penalty of assigning a student preferring `preferred` to `assigned`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn lookup(&self, preferred: CenterIndex, assigned: CenterIndex) -> T {
        debug_assert!(
            preferred.get() < self.num_centers,
            "called `PenaltyTable::lookup` with preferred index out of bounds: the len is {} but the index is {}",
            self.num_centers,
            preferred.get()
        );
        debug_assert!(
            assigned.get() < self.num_centers,
            "called `PenaltyTable::lookup` with assigned index out of bounds: the len is {} but the index is {}",
            self.num_centers,
            assigned.get()
        );
        self.values[self.flatten_index(preferred, assigned)]
    }

    /// Returns the full row of penalties for a preferred center.
    #[inline]
    pub fn row(&self, preferred: CenterIndex) -> &[T] {
        let start = preferred.get() * self.num_centers;
        &self.values[start..start + self.num_centers]
    }

    /// Returns the flattened table.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }
}

impl<T> std::fmt::Display for PenaltyTable<T>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.values.chunks(self.num_centers.max(1)) {
            let cells: Vec<String> = row.iter().map(|v| format!("{v:>3}")).collect();
            writeln!(f, "[{}]", cells.join(","))?;
        }
        Ok(())
    }
}
