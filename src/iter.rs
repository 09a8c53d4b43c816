//! Iteration over the dense array of a [`SparseSet`].

use core::ops::Range;

use crate::{Id, SparseSet};

/// Iterator over the identifiers and payload records of a [`SparseSet`], in
/// dense order.
#[derive(Clone)]
pub struct Iter<'a> {
    ids: &'a [Id],
    bytes: &'a [u8],
    stride: usize,
    range: Range<usize>,
}

impl<'a> Iter<'a> {
    #[inline]
    pub(crate) fn new(ids: &'a [Id], bytes: &'a [u8], stride: usize) -> Self {
        debug_assert_eq!(ids.len() * stride, bytes.len());
        Self {
            ids,
            bytes,
            stride,
            range: 0..ids.len(),
        }
    }

    #[inline]
    fn item(&self, pos: usize) -> (Id, &'a [u8]) {
        (
            self.ids[pos],
            &self.bytes[pos * self.stride..(pos + 1) * self.stride],
        )
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (Id, &'a [u8]);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.range.next().map(|pos| self.item(pos))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl DoubleEndedIterator for Iter<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.range.next_back().map(|pos| self.item(pos))
    }
}

impl ExactSizeIterator for Iter<'_> {}

/// Restartable, position-based cursor over the dense array of a
/// [`SparseSet`].
///
/// A cursor only remembers the next position to visit and borrows the set
/// for the duration of each step, so the set may be modified between steps.
/// Entries moved by a removal are not revisited or skipped in any principled
/// way; the cursor just continues from its position.
///
/// ```
/// use slotset::{Id, SparseSet};
///
/// let mut set = SparseSet::new();
/// for i in 0..3 {
///     set.insert(Id::new(i, 0), None)?;
/// }
/// let mut cursor = set.cursor();
/// let mut seen = vec![];
/// while let Some((_pos, id)) = cursor.next(&set) {
///     seen.push(id.index());
/// }
/// assert_eq!(seen, [0, 1, 2]);
///
/// cursor.reset();
/// assert_eq!(cursor.next(&set), Some((0, Id::new(0, 0))));
/// # Ok::<(), slotset::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pos: usize,
}

impl Cursor {
    /// Creates a cursor at the first position.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { pos: 0 }
    }

    /// Position of the next entry to visit.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Rewinds the cursor to the first position.
    #[inline]
    pub fn reset(&mut self) {
        self.pos = 0;
    }

    /// Returns the position and identifier of the next entry and advances,
    /// or returns `None` once the cursor is at or past the end of `set`.
    #[inline]
    pub fn next(&mut self, set: &SparseSet) -> Option<(usize, Id)> {
        let id = set.id_at(self.pos)?;
        let pos = self.pos;
        self.pos += 1;
        Some((pos, id))
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn iter_with_records() {
        let mut set = SparseSet::new();
        set.set_stride(2).unwrap();
        set.insert(Id::new(4, 0), Some(&[4, 4])).unwrap();
        set.insert(Id::new(1, 2), Some(&[1, 1])).unwrap();
        let items: Vec<_> = set.iter().collect();
        assert_eq!(items, [(Id::new(4, 0), &[4, 4][..]), (Id::new(1, 2), &[1, 1][..])]);
        let last = set.iter().next_back();
        assert_eq!(last, Some((Id::new(1, 2), &[1, 1][..])));
        assert_eq!(set.iter().len(), 2);
    }

    #[test]
    fn iter_without_records() {
        let mut set = SparseSet::new();
        for i in 0..3 {
            set.insert(Id::new(i, 0), None).unwrap();
        }
        assert!((&set).into_iter().all(|(_, record)| record.is_empty()));
        assert_eq!(set.iter().rev().map(|(id, _)| id.index()).collect::<Vec<_>>(), [2, 1, 0]);
    }

    #[test]
    fn cursor_survives_mutation() {
        let mut set = SparseSet::new();
        for i in 0..4 {
            set.insert(Id::new(i, 0), None).unwrap();
        }
        let mut cursor = set.cursor();
        assert_eq!(cursor.next(&set), Some((0, Id::new(0, 0))));
        // Removing the visited entry moves the last one into position 0.
        assert!(set.remove(Id::new(0, 0)));
        assert_eq!(cursor.next(&set), Some((1, Id::new(1, 0))));
        assert_eq!(cursor.next(&set), Some((2, Id::new(2, 0))));
        assert_eq!(cursor.next(&set), None);
        assert_eq!(cursor.position(), 3);
        cursor.reset();
        assert_eq!(cursor.next(&set), Some((0, Id::new(3, 0))));
    }
}
