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

use crate::err::ValidationError;
use num_traits::{PrimInt, Signed};

/// Weights of the three soft terms in the objective
/// `preference * Σpref + consistency * Σcons + movement * Σmove`.
///
/// All weights default to one. Raising `preference` relative to `movement`
/// favors sending a displaced student to a distant center over displacing more
/// students; raising `consistency` keeps a displaced student at the same center
/// across consecutive days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectiveWeights<T> {
    preference: T,
    consistency: T,
    movement: T,
}

impl<T> ObjectiveWeights<T>
where
    T: PrimInt + Signed,
{
    #[inline]
    pub fn new(preference: T, consistency: T, movement: T) -> Self {
        Self {
            preference,
            consistency,
            movement,
        }
    }

    /// Weight of the preference term (`wPref`).
    #[inline]
    pub fn preference(&self) -> T {
        self.preference
    }

    /// Weight of the day-to-day consistency term (`wDiff`).
    #[inline]
    pub fn consistency(&self) -> T {
        self.consistency
    }

    /// Weight of the move distance term (`wMove`).
    #[inline]
    pub fn movement(&self) -> T {
        self.movement
    }

    /// Rejects negative weights; the objective must stay monotone.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.preference.is_negative() {
            return Err(ValidationError::NegativeWeight { term: "preference" });
        }
        if self.consistency.is_negative() {
            return Err(ValidationError::NegativeWeight {
                term: "consistency",
            });
        }
        if self.movement.is_negative() {
            return Err(ValidationError::NegativeWeight { term: "movement" });
        }
        Ok(())
    }
}

impl<T> Default for ObjectiveWeights<T>
where
    T: PrimInt + Signed,
{
    fn default() -> Self {
        Self::new(T::one(), T::one(), T::one())
    }
}

impl<T> std::fmt::Display for ObjectiveWeights<T>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Weights(pref: {}, diff: {}, move: {})",
            self.preference, self.consistency, self.movement
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_are_one() {
        let w = ObjectiveWeights::<i64>::default();
        assert_eq!((w.preference(), w.consistency(), w.movement()), (1, 1, 1));
        assert!(w.validate().is_ok());
    }

    #[test]
    fn test_negative_weight_is_rejected() {
        let w = ObjectiveWeights::<i64>::new(2, -1, 1);
        assert_eq!(
            w.validate(),
            Err(ValidationError::NegativeWeight {
                term: "consistency"
            })
        );
    }

    #[test]
    fn test_zero_weights_are_valid() {
        assert!(ObjectiveWeights::<i32>::new(0, 0, 0).validate().is_ok());
    }

    #[test]
    fn test_display() {
        let w = ObjectiveWeights::<i64>::new(2, 1, 1);
        assert_eq!(w.to_string(), "Weights(pref: 2, diff: 1, move: 1)");
    }
}
