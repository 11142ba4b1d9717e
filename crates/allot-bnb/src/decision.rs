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

use allot_model::index::{CenterIndex, VariableIndex};

/// A pending branching choice: give `variable` the value `center`.
///
/// `cost_delta` is the objective increase of the choice relative to the
/// parent node. It is computed when the decision is generated and stays
/// valid because the parent state is restored before the decision is popped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decision<T> {
    cost_delta: T,
    variable: VariableIndex,
    center: CenterIndex,
}

impl<T> Decision<T>
where
    T: Copy,
{
    #[inline(always)]
    pub fn new(variable: VariableIndex, center: CenterIndex, cost_delta: T) -> Self {
        Self {
            cost_delta,
            variable,
            center,
        }
    }

    #[inline(always)]
    pub fn variable(&self) -> VariableIndex {
        self.variable
    }

    #[inline(always)]
    pub fn center(&self) -> CenterIndex {
        self.center
    }

    #[inline(always)]
    pub fn cost_delta(&self) -> T {
        self.cost_delta
    }
}

impl<T> std::fmt::Display for Decision<T>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Decision({} := {}, delta: {})",
            self.variable, self.center, self.cost_delta
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_and_display() {
        let d = Decision::new(VariableIndex::new(3), CenterIndex::new(1), 4i64);
        assert_eq!(d.variable().get(), 3);
        assert_eq!(d.center().get(), 1);
        assert_eq!(d.cost_delta(), 4);
        assert_eq!(d.to_string(), "Decision(VariableIndex(3) := CenterIndex(1), delta: 4)");
    }
}
