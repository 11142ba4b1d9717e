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

//! # Strongly Typed Indices
//!
//! Phantom-tagged wrappers around `usize` that keep the student, center, day,
//! variable and constraint index spaces apart at the type level. Each index
//! compiles down to a plain `usize`.
//!
//! ```rust
//! use allot_model::index::{CenterIndex, DayIndex};
//!
//! let c = CenterIndex::new(2);
//! let d = DayIndex::new(1);
//! assert_eq!(format!("{}", c), "CenterIndex(2)");
//! assert_eq!(d.get(), 1);
//! ```

/// A trait to tag typed indices with a name for debugging and display purposes.
pub trait TypedIndexTag: Clone {
    const NAME: &'static str;
}

/// A strongly typed index that is associated with a specific tag type `T`.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypedIndex<T> {
    index: usize,
    _marker: std::marker::PhantomData<T>,
}

impl<T> TypedIndex<T> {
    /// Creates a new `TypedIndex` with the given `usize` index.
    #[inline(always)]
    pub const fn new(index: usize) -> Self {
        Self {
            index,
            _marker: std::marker::PhantomData,
        }
    }

    /// Returns the underlying `usize` index.
    #[inline(always)]
    pub const fn get(&self) -> usize {
        self.index
    }

    #[inline(always)]
    pub const fn is_zero(&self) -> bool {
        self.index == 0
    }

    /// Returns the index directly following this one.
    #[inline(always)]
    pub const fn next(&self) -> Self {
        Self::new(self.index + 1)
    }
}

impl<T> std::fmt::Debug for TypedIndex<T>
where
    T: TypedIndexTag,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", T::NAME, self.index)
    }
}

impl<T> std::fmt::Display for TypedIndex<T>
where
    T: TypedIndexTag,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", T::NAME, self.index)
    }
}

impl<T> From<usize> for TypedIndex<T> {
    fn from(index: usize) -> Self {
        Self::new(index)
    }
}

impl<T> From<TypedIndex<T>> for usize {
    fn from(typed_index: TypedIndex<T>) -> Self {
        typed_index.index
    }
}

macro_rules! define_index {
    ($(#[$doc:meta])* $tag:ident, $alias:ident, $name:literal) => {
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
        pub struct $tag;

        impl TypedIndexTag for $tag {
            const NAME: &'static str = $name;
        }

        $(#[$doc])*
        pub type $alias = TypedIndex<$tag>;
    };
}

define_index!(
    /// Position of a student in the input order.
    StudentIndexTag,
    StudentIndex,
    "StudentIndex"
);
define_index!(
    /// Ordinal of a center. Defines the distance used by the penalty model.
    CenterIndexTag,
    CenterIndex,
    "CenterIndex"
);
define_index!(
    /// Zero-based day of the planning horizon.
    DayIndexTag,
    DayIndex,
    "DayIndex"
);
define_index!(
    /// Dense index of an assignment variable, `student * num_days + day`.
    VariableIndexTag,
    VariableIndex,
    "VariableIndex"
);
define_index!(
    /// Position of a constraint in the instance's constraint list.
    ConstraintIndexTag,
    ConstraintIndex,
    "ConstraintIndex"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_get() {
        let idx = StudentIndex::new(10);
        assert_eq!(idx.get(), 10);
        assert!(!idx.is_zero());
        assert!(StudentIndex::new(0).is_zero());
    }

    #[test]
    fn test_conversions() {
        let idx: CenterIndex = 42.into();
        assert_eq!(idx.get(), 42);
        let val: usize = idx.into();
        assert_eq!(val, 42);
    }

    #[test]
    fn test_debug_and_display_use_tag_name() {
        assert_eq!(format!("{}", DayIndex::new(7)), "DayIndex(7)");
        assert_eq!(format!("{:?}", VariableIndex::new(3)), "VariableIndex(3)");
        assert_eq!(format!("{}", ConstraintIndex::new(0)), "ConstraintIndex(0)");
    }

    #[test]
    fn test_next_and_ordering() {
        let d = DayIndex::new(4);
        assert_eq!(d.next().get(), 5);
        assert!(d < d.next());
    }
}
