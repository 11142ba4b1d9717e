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

use crate::decision::Decision;

/// A frame-structured LIFO stack of pending decisions.
///
/// All decisions live in one vector; `frames` marks where each depth
/// begins. Popping a frame truncates back to its start.
#[derive(Clone, Debug)]
pub struct SearchStack<T> {
    entries: Vec<Decision<T>>,
    frames: Vec<usize>,
}

impl<T> Default for SearchStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SearchStack<T> {
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            frames: Vec::new(),
        }
    }

    #[inline]
    pub fn preallocated(num_centers: usize, num_variables: usize) -> Self {
        Self {
            entries: Vec::with_capacity(num_variables.saturating_mul(num_centers)),
            frames: Vec::with_capacity(num_variables.saturating_add(1)),
        }
    }

    #[inline]
    pub fn ensure_capacity(&mut self, num_centers: usize, num_variables: usize) {
        let entry_capacity = num_variables.saturating_mul(num_centers);
        let frame_capacity = num_variables.saturating_add(1);
        if self.entries.capacity() < entry_capacity {
            self.entries.reserve(entry_capacity - self.entries.len());
        }
        if self.frames.capacity() < frame_capacity {
            self.frames.reserve(frame_capacity - self.frames.len());
        }
    }

    #[inline]
    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn push_frame(&mut self) {
        self.frames.push(self.entries.len());
    }

    #[inline]
    pub fn pop_frame(&mut self) -> Option<()> {
        let start = self.frames.pop()?;
        self.entries.truncate(start);
        Some(())
    }

    #[inline]
    pub fn push(&mut self, decision: Decision<T>) {
        self.entries.push(decision);
    }

    #[inline]
    pub fn pop(&mut self) -> Option<Decision<T>> {
        if self.is_current_level_empty() {
            return None;
        }
        self.entries.pop()
    }

    /// Sorts the decisions of the current frame in place.
    /// The last element after sorting is popped first.
    #[inline]
    pub fn sort_current_frame_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Decision<T>, &Decision<T>) -> std::cmp::Ordering,
    {
        if let Some(&start) = self.frames.last() {
            self.entries[start..].sort_unstable_by(compare);
        }
    }

    #[inline]
    pub fn is_current_level_empty(&self) -> bool {
        match self.frames.last() {
            Some(&start) => self.entries.len() == start,
            None => true,
        }
    }

    #[inline]
    pub fn reset(&mut self) {
        self.entries.clear();
        self.frames.clear();
    }
}

impl<T> std::fmt::Display for SearchStack<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SearchStack(entries: {}, frames: {})",
            self.entries.len(),
            self.frames.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allot_model::index::{CenterIndex, VariableIndex};

    fn d(v: usize, c: usize, cost: i64) -> Decision<i64> {
        Decision::new(VariableIndex::new(v), CenterIndex::new(c), cost)
    }

    #[test]
    fn test_frames_isolate_levels() {
        let mut s = SearchStack::new();
        assert_eq!(s.depth(), 0);
        assert!(s.is_current_level_empty());

        s.push_frame();
        s.push(d(0, 0, 0));
        s.push(d(0, 1, 1));
        s.push_frame();
        assert!(s.is_current_level_empty());
        assert_eq!(s.pop(), None);
        s.push(d(1, 2, 5));
        assert_eq!(s.pop(), Some(d(1, 2, 5)));

        assert!(s.pop_frame().is_some());
        assert_eq!(s.depth(), 1);
        assert_eq!(s.num_entries(), 2);
        assert_eq!(s.pop(), Some(d(0, 1, 1)));
        assert!(s.pop_frame().is_some());
        assert_eq!(s.depth(), 0);
        assert_eq!(s.pop_frame(), None);
    }

    #[test]
    fn test_pop_frame_discards_pending_decisions() {
        let mut s = SearchStack::preallocated(3, 2);
        s.push_frame();
        s.push(d(0, 0, 0));
        s.push_frame();
        s.push(d(1, 0, 0));
        s.push(d(1, 1, 0));
        s.pop_frame();
        assert_eq!(s.num_entries(), 1);
        assert_eq!(s.pop(), Some(d(0, 0, 0)));
        assert!(s.is_current_level_empty());
    }

    #[test]
    fn test_sort_current_frame_only() {
        let mut s = SearchStack::new();
        s.push_frame();
        s.push(d(0, 0, 9));
        s.push_frame();
        for decision in [d(1, 0, 1), d(1, 1, 3), d(1, 2, 2)] {
            s.push(decision);
        }
        s.sort_current_frame_by(|a, b| b.cost_delta().cmp(&a.cost_delta()));
        assert_eq!(s.pop(), Some(d(1, 0, 1)));
        assert_eq!(s.pop(), Some(d(1, 2, 2)));
        assert_eq!(s.pop(), Some(d(1, 1, 3)));
        s.pop_frame();
        assert_eq!(s.pop(), Some(d(0, 0, 9)));
    }

    #[test]
    fn test_reset_and_display() {
        let mut s = SearchStack::new();
        s.ensure_capacity(2, 2);
        s.push_frame();
        s.push(d(0, 0, 0));
        assert_eq!(s.to_string(), "SearchStack(entries: 1, frames: 1)");
        s.reset();
        assert_eq!(s.depth(), 0);
        assert_eq!(s.num_entries(), 0);
    }
}
