//! Sparse set of identifiers with optional inline payload records.
//!
//! This is the classic sparse/dense pair described in:
//!
//! > Briggs, Torczon, *An efficient representation for sparse sets*,
//! > ACM Letters on Programming Languages and Systems, Volume 2, Issue 1-4, March-Dec. 1993.
//!
//! with the sparse half split into lazily-allocated pages so that identifiers
//! from a large, sparsely used index space don't need a flat table.

use alloc::vec::Vec;
use core::fmt;

use crate::iter::{Cursor, Iter};
use crate::records::RecordBuffer;
use crate::sparse_index::PagedSparseIndex;
use crate::{Error, FieldType, FieldValue, Id, Options};

/// Outcome of a successful [`SparseSet::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Insertion {
    /// The identifier was appended at the given position.
    Appended(usize),

    /// An entry for the same slot but a different generation was overwritten
    /// in place at the given position.
    Replaced(usize),

    /// The exact identifier was already present at the given position; nothing
    /// was changed.
    Duplicate(usize),
}

impl Insertion {
    /// Dense position of the entry.
    #[inline]
    #[must_use]
    pub fn position(self) -> usize {
        match self {
            Insertion::Appended(pos) | Insertion::Replaced(pos) | Insertion::Duplicate(pos) => {
                pos
            }
        }
    }

    /// Returns whether the set was modified.
    #[inline]
    #[must_use]
    pub fn is_inserted(self) -> bool {
        !matches!(self, Insertion::Duplicate(_))
    }
}

/// Description of a successful [`SparseSet::remove_entry`].
///
/// Removal moves the last entry of the dense array into the vacated position.
/// Owners of parallel per-position storage must apply the same move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Removal {
    /// Position the removed entry occupied.
    pub position: usize,

    /// Identifier that was moved from the last position into `position`, or
    /// `None` if the removed entry was the last one.
    pub moved: Option<Id>,
}

/// A set of [`Id`]s with O(1) insert, remove and lookup, and a packed dense
/// array for iteration.
///
/// Each entry may carry a fixed-size byte record, enabled by calling
/// [`set_stride`](SparseSet::set_stride) before the first insertion. Records
/// live in a buffer parallel to the dense array and move together with their
/// identifiers.
///
/// # Slot versus handle comparison
///
/// Lookups, [`contains`](SparseSet::contains) and
/// [`remove`](SparseSet::remove) only match an entry holding the exact
/// identifier (see [`Id::same_handle`]). [`insert`](SparseSet::insert) instead
/// matches on the slot alone (see [`Id::same_slot`]): inserting an identifier
/// whose slot is already present with a different generation overwrites that
/// entry in place. The set never consults a [`Registry`](crate::Registry), so
/// this also happens with an identifier the registry considers stale. Callers
/// that care must check [`Registry::valid`](crate::Registry::valid) first.
///
/// ```
/// use slotset::{Id, Insertion, SparseSet};
///
/// let mut set = SparseSet::new();
/// set.set_stride(8)?;
/// set.insert(Id::new(42, 0), Some(&[1, 2, 3, 4, 5, 6, 7, 8]))?;
/// assert_eq!(set.get(Id::new(42, 0)), Some(&[1, 2, 3, 4, 5, 6, 7, 8][..]));
///
/// // Same slot, newer generation: overwritten in place.
/// assert_eq!(set.insert(Id::new(42, 1), None)?, Insertion::Replaced(0));
/// assert!(!set.contains(Id::new(42, 0)));
/// assert_eq!(set.len(), 1);
/// # Ok::<(), slotset::Error>(())
/// ```
#[derive(Clone)]
pub struct SparseSet {
    /// Slot index to dense position.
    sparse: PagedSparseIndex,

    /// Present identifiers, packed.
    dense: Vec<Id>,

    /// One payload record per dense position.
    records: RecordBuffer,

    /// Whether `set_stride` has been called.
    stride_set: bool,

    /// Whether anything was ever inserted. Stays set across `clear`.
    inserted: bool,

    /// Dense capacity reserved by the first growth.
    initial_capacity: usize,

    /// Largest slot index accepted.
    max_index: u32,
}

impl Default for SparseSet {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl SparseSet {
    /// Creates an empty set with default [`Options`].
    ///
    /// Nothing is allocated until the first insertion.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(&Options::default())
    }

    /// Creates an empty set with the given growth parameters.
    #[must_use]
    pub fn with_options(options: &Options) -> Self {
        let max_index = options.max_index.min(crate::MAX_INDEX);
        Self {
            sparse: PagedSparseIndex::new(options.directory_capacity, max_index),
            dense: Vec::new(),
            records: RecordBuffer::new(),
            stride_set: false,
            inserted: false,
            initial_capacity: options.initial_capacity.max(1),
            max_index,
        }
    }

    /// Reserves `stride` bytes of inline payload for every entry.
    ///
    /// This can be called at most once, and only before the first insertion.
    pub fn set_stride(&mut self, stride: usize) -> Result<(), Error> {
        if self.stride_set {
            return Err(Error::StrideAlreadySet);
        }
        if self.inserted {
            return Err(Error::StrideAfterInsert);
        }
        self.records.set_stride(stride);
        self.stride_set = true;
        Ok(())
    }

    /// Size in bytes of the payload record of each entry.
    #[inline]
    #[must_use]
    pub fn stride(&self) -> usize {
        self.records.stride()
    }

    /// Number of entries in the set.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Returns whether the set has no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Number of entries the set can hold before the dense array must grow.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.dense.capacity()
    }

    /// Largest slot index this set accepts.
    #[inline]
    #[must_use]
    pub fn max_index(&self) -> u32 {
        self.max_index
    }

    /// Position of the entry occupying the slot of `id`, whatever its
    /// generation.
    #[inline]
    fn slot_position(&self, id: Id) -> Option<usize> {
        let pos = self.sparse.get(id.slot()?)?;
        let entry = self.dense.get(pos)?;
        entry.same_slot(id).then_some(pos)
    }

    /// Returns the dense position of `id`, if present.
    #[inline]
    #[must_use]
    pub fn index_of(&self, id: Id) -> Option<usize> {
        self.slot_position(id)
            .filter(|&pos| self.dense[pos].same_handle(id))
    }

    /// Returns whether the set contains exactly `id`.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: Id) -> bool {
        self.index_of(id).is_some()
    }

    /// Inserts `id`, optionally with its payload record.
    ///
    /// - If `id` itself is present, nothing changes and
    ///   [`Insertion::Duplicate`] is returned; the payload is not written.
    /// - If another identifier for the same slot is present, it is replaced by
    ///   `id` at the same position, and its record is overwritten if a payload
    ///   was given ([`Insertion::Replaced`]).
    /// - Otherwise `id` is appended with the given payload, or a zeroed record
    ///   ([`Insertion::Appended`]). The dense array doubles when full.
    ///
    /// A payload must be exactly [`stride`](SparseSet::stride) bytes long. On
    /// error the set is unchanged.
    pub fn insert(&mut self, id: Id, payload: Option<&[u8]>) -> Result<Insertion, Error> {
        if id.is_null() {
            return Err(Error::NullId);
        }
        let Some(slot) = id.slot().filter(|_| id.index() <= self.max_index) else {
            return Err(Error::CapacityExceeded);
        };
        if let Some(payload) = payload {
            if payload.len() != self.stride() {
                return Err(Error::PayloadSize {
                    expected: self.stride(),
                    actual: payload.len(),
                });
            }
        }

        if let Some(pos) = self.slot_position(id) {
            if self.dense[pos] == id {
                return Ok(Insertion::Duplicate(pos));
            }
            trace!("Replacing {} with {id} at position {pos}", self.dense[pos]);
            self.dense[pos] = id;
            if let Some(payload) = payload {
                self.records.record_mut(pos).copy_from_slice(payload);
            }
            return Ok(Insertion::Replaced(pos));
        }

        let pos = self.dense.len();
        let grown = self.reserve_one()?;
        self.sparse.set(slot, pos)?;
        if let Some(mut grown) = grown {
            grown.extend_from_slice(&self.dense);
            trace!("Grew dense array to {} entries", grown.capacity());
            self.dense = grown;
        }
        self.dense.push(id);
        self.records.push(payload);
        self.inserted = true;
        trace!("Appended {id} at position {pos}");
        Ok(Insertion::Appended(pos))
    }

    /// Makes sure one more entry fits.
    ///
    /// Record space is reserved in place. When the dense array is full, a
    /// doubled replacement is allocated and returned instead, to be swapped in
    /// by the caller once nothing else can fail.
    fn reserve_one(&mut self) -> Result<Option<Vec<Id>>, Error> {
        let len = self.dense.len();
        if len < self.dense.capacity() {
            self.records.try_reserve(len, self.dense.capacity() - len)?;
            return Ok(None);
        }
        let additional = len.max(self.initial_capacity);
        let new_capacity = len.checked_add(additional).ok_or(Error::OutOfMemory)?;
        self.records.try_reserve(len, additional)?;
        let mut grown = Vec::new();
        grown.try_reserve_exact(new_capacity)?;
        Ok(Some(grown))
    }

    /// Removes exactly `id`, returning whether it was present.
    ///
    /// The last entry is moved into the vacated position; no other entry
    /// moves.
    pub fn remove(&mut self, id: Id) -> bool {
        self.remove_entry(id).is_some()
    }

    /// Removes exactly `id` and reports which entry, if any, was moved into
    /// its position.
    pub fn remove_entry(&mut self, id: Id) -> Option<Removal> {
        let pos = self.index_of(id)?;
        let slot = id.slot()?;
        let last = self.dense.len() - 1;
        let mut moved = None;
        if pos != last {
            let last_id = self.dense[last];
            self.dense[pos] = last_id;
            self.records.copy_record(last, pos);
            if let Some(last_slot) = last_id.slot() {
                self.sparse.update(last_slot, pos);
            }
            moved = Some(last_id);
        }
        self.dense.pop();
        self.records.truncate(last);
        self.sparse.invalidate(slot);
        trace!("Removed {id} from position {pos}, moved {moved:?}");
        Some(Removal {
            position: pos,
            moved,
        })
    }

    /// Removes every entry, keeping all allocated memory.
    pub fn clear(&mut self) {
        self.dense.clear();
        self.records.clear();
        self.sparse.clear();
    }

    /// Returns the payload record of `id`, if present.
    ///
    /// With a stride of zero this is an empty slice for every present entry.
    #[inline]
    #[must_use]
    pub fn get(&self, id: Id) -> Option<&[u8]> {
        let pos = self.index_of(id)?;
        Some(self.records.record(pos))
    }

    /// Returns the payload record of `id` mutably, if present.
    #[inline]
    pub fn get_mut(&mut self, id: Id) -> Option<&mut [u8]> {
        let pos = self.index_of(id)?;
        Some(self.records.record_mut(pos))
    }

    /// Returns the identifier at a dense position.
    #[inline]
    #[must_use]
    pub fn id_at(&self, pos: usize) -> Option<Id> {
        self.dense.get(pos).copied()
    }

    /// Returns the identifier and payload record at a dense position.
    #[inline]
    #[must_use]
    pub fn at(&self, pos: usize) -> Option<(Id, &[u8])> {
        let id = self.id_at(pos)?;
        Some((id, self.records.record(pos)))
    }

    /// Exchanges the entries at two dense positions, together with their
    /// records.
    ///
    /// Swapping a position with itself does nothing.
    pub fn swap_at(&mut self, a: usize, b: usize) -> Result<(), Error> {
        let len = self.dense.len();
        for position in [a, b] {
            if position >= len {
                return Err(Error::PositionOutOfBounds { position, len });
            }
        }
        if a == b {
            return Ok(());
        }
        self.dense.swap(a, b);
        self.records.swap_records(a, b);
        for pos in [a, b] {
            if let Some(slot) = self.dense[pos].slot() {
                self.sparse.update(slot, pos);
            }
        }
        trace!("Swapped positions {a} and {b}");
        Ok(())
    }

    /// Reads a typed field at byte `offset` of the record of `id`.
    ///
    /// Returns `Ok(None)` if `id` is not present. Fails if the field does not
    /// fit in the stride, whether or not `id` is present.
    pub fn get_field(
        &self,
        id: Id,
        offset: usize,
        ty: FieldType,
    ) -> Result<Option<FieldValue>, Error> {
        ty.check_bounds(offset, self.stride())?;
        Ok(self.get(id).map(|record| ty.read(&record[offset..])))
    }

    /// Writes a typed field at byte `offset` of the record of `id`.
    ///
    /// Returns `Ok(false)` if `id` is not present. Fails if the field does not
    /// fit in the stride, whether or not `id` is present.
    pub fn set_field(&mut self, id: Id, offset: usize, value: FieldValue) -> Result<bool, Error> {
        value.ty().check_bounds(offset, self.stride())?;
        match self.get_mut(id) {
            Some(record) => {
                value.write(&mut record[offset..]);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Present identifiers in dense order.
    #[inline]
    #[must_use]
    pub fn ids(&self) -> &[Id] {
        &self.dense
    }

    /// Raw bytes of all payload records in dense order.
    #[inline]
    #[must_use]
    pub fn payload_bytes(&self) -> &[u8] {
        self.records.as_bytes()
    }

    /// Iterates over the entries and their records in dense order.
    #[inline]
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(&self.dense, self.records.as_bytes(), self.stride())
    }

    /// Returns a restartable cursor positioned at the first entry.
    ///
    /// Unlike [`iter`](SparseSet::iter), a cursor does not borrow the set.
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        Cursor::new()
    }

    /// Sparse index, for validation and display.
    pub(crate) fn sparse(&self) -> &PagedSparseIndex {
        &self.sparse
    }
}

impl<'a> IntoIterator for &'a SparseSet {
    type Item = (Id, &'a [u8]);
    type IntoIter = Iter<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for SparseSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::PAGE_SIZE;

    fn id(index: u32) -> Id {
        Id::new(index, 0)
    }

    #[test]
    fn insert_contains_remove() {
        let mut set = SparseSet::new();
        assert_eq!(set.insert(id(3), None), Ok(Insertion::Appended(0)));
        assert_eq!(set.insert(id(9), None), Ok(Insertion::Appended(1)));
        assert!(set.contains(id(3)));
        assert!(!set.contains(id(4)));
        assert_eq!(set.len(), 2);
        assert!(set.remove(id(3)));
        assert!(!set.remove(id(3)));
        assert!(!set.contains(id(3)));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(id(9)), Some(&[][..]));
    }

    #[test]
    fn payload_round_trip() {
        let mut set = SparseSet::new();
        set.set_stride(8).unwrap();
        set.insert(id(42), Some(&[1, 2, 3, 4, 5, 6, 7, 8])).unwrap();
        assert_eq!(set.get(id(42)), Some(&[1, 2, 3, 4, 5, 6, 7, 8][..]));
        assert!(set.remove(id(42)));
        set.insert(id(43), Some(&[8; 8])).unwrap();
        assert!(!set.contains(id(42)));
        assert_eq!(set.get(id(43)), Some(&[8; 8][..]));
    }

    #[test]
    fn duplicate_is_noop() {
        let mut set = SparseSet::new();
        set.set_stride(1).unwrap();
        set.insert(id(1), Some(&[5])).unwrap();
        assert_eq!(set.insert(id(1), Some(&[6])), Ok(Insertion::Duplicate(0)));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(id(1)), Some(&[5][..]));
    }

    #[test]
    fn upsert_by_slot() {
        let mut set = SparseSet::new();
        set.set_stride(2).unwrap();
        set.insert(id(0), None).unwrap();
        set.insert(Id::new(5, 0), Some(&[1, 1])).unwrap();
        assert_eq!(set.insert(Id::new(5, 1), None), Ok(Insertion::Replaced(1)));
        assert_eq!(set.len(), 2);
        assert!(!set.contains(Id::new(5, 0)));
        assert!(set.contains(Id::new(5, 1)));
        // The record survives when no payload is given.
        assert_eq!(set.get(Id::new(5, 1)), Some(&[1, 1][..]));
        assert_eq!(set.insert(Id::new(5, 0), Some(&[2, 2])), Ok(Insertion::Replaced(1)));
        assert_eq!(set.get(Id::new(5, 0)), Some(&[2, 2][..]));
        // Removal requires the exact handle.
        assert!(!set.remove(Id::new(5, 1)));
        assert!(set.remove(Id::new(5, 0)));
    }

    #[test]
    fn swap_remove_locality() {
        let mut set = SparseSet::new();
        set.set_stride(1).unwrap();
        for i in 0..5u8 {
            set.insert(id(u32::from(i) * 10), Some(&[i])).unwrap();
        }
        let removal = set.remove_entry(id(10)).unwrap();
        assert_eq!(
            removal,
            Removal {
                position: 1,
                moved: Some(id(40)),
            }
        );
        assert_eq!(set.index_of(id(40)), Some(1));
        assert_eq!(set.get(id(40)), Some(&[4][..]));
        for (i, pos) in [(0, 0), (20, 2), (30, 3)] {
            assert_eq!(set.index_of(id(i)), Some(pos));
        }

        let removal = set.remove_entry(id(40)).unwrap();
        assert_eq!(removal.moved, Some(id(30)));
        let removal = set.remove_entry(id(20)).unwrap();
        assert_eq!(
            removal,
            Removal {
                position: 2,
                moved: None,
            }
        );
        assert_eq!(set.ids(), [id(0), id(30)]);
        assert_eq!(set.payload_bytes(), [0, 3]);
    }

    #[test]
    fn growth_keeps_payloads() {
        let mut set = SparseSet::with_options(&Options {
            initial_capacity: 2,
            ..Options::default()
        });
        set.set_stride(4).unwrap();
        for i in 0..100u32 {
            set.insert(id(i * 7), Some(&i.to_le_bytes())).unwrap();
        }
        assert!(set.capacity() >= 100);
        for i in (0..100u32).step_by(3) {
            assert!(set.remove(id(i * 7)));
        }
        for i in 0..100u32 {
            let bytes = i.to_le_bytes();
            let expected = (i % 3 != 0).then_some(&bytes[..]);
            assert_eq!(set.get(id(i * 7)), expected);
        }
    }

    #[test]
    fn far_apart_indices() {
        let mut set = SparseSet::new();
        let far = Id::new(crate::MAX_INDEX, 3);
        set.insert(far, None).unwrap();
        set.insert(id(1), None).unwrap();
        set.insert(id(PAGE_SIZE as u32 * 5), None).unwrap();
        assert!(set.contains(far));
        assert_eq!(set.sparse().allocated_pages(), 3);
        assert!(!set.contains(Id::new(crate::MAX_INDEX - 1, 3)));
    }

    #[test]
    fn rejects_bad_ids_and_payloads() {
        let mut set = SparseSet::with_options(&Options {
            max_index: 100,
            ..Options::default()
        });
        assert_eq!(set.insert(Id::NULL, None), Err(Error::NullId));
        assert_eq!(set.insert(Id::new(u32::MAX, 0), None), Err(Error::CapacityExceeded));
        assert_eq!(set.insert(id(101), None), Err(Error::CapacityExceeded));
        assert_eq!(
            set.insert(id(1), Some(&[1])),
            Err(Error::PayloadSize {
                expected: 0,
                actual: 1
            })
        );
        assert!(set.is_empty());
        assert!(!set.contains(Id::NULL));
        assert_eq!(set.get(Id::new(u32::MAX, 5)), None);
    }

    #[test]
    fn stride_rules() {
        let mut set = SparseSet::new();
        set.set_stride(4).unwrap();
        assert_eq!(set.set_stride(4), Err(Error::StrideAlreadySet));

        let mut set = SparseSet::new();
        set.insert(id(0), None).unwrap();
        set.clear();
        assert_eq!(set.set_stride(4), Err(Error::StrideAfterInsert));
    }

    #[test]
    fn clear_keeps_memory() {
        let mut set = SparseSet::new();
        set.set_stride(2).unwrap();
        for i in 0..10 {
            set.insert(id(i), None).unwrap();
        }
        let capacity = set.capacity();
        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.capacity(), capacity);
        assert_eq!(set.sparse().allocated_pages(), 1);
        assert!(!set.contains(id(3)));
        assert_eq!(set.insert(id(3), None), Ok(Insertion::Appended(0)));
    }

    #[test]
    fn failed_growth_leaves_set_unchanged() {
        let mut set = SparseSet::new();
        set.set_stride(usize::MAX / 3).unwrap();
        assert_eq!(set.insert(id(5), None), Err(Error::OutOfMemory));
        assert!(set.is_empty());
        assert_eq!(set.capacity(), 0);
        assert_eq!(set.sparse().allocated_pages(), 0);
        assert!(!set.contains(id(5)));
        assert_eq!(set.payload_bytes().len(), 0);
    }

    #[test]
    fn at_and_swap() {
        let mut set = SparseSet::new();
        set.set_stride(1).unwrap();
        set.insert(id(7), Some(&[7])).unwrap();
        set.insert(id(8), Some(&[8])).unwrap();
        assert_eq!(set.at(0), Some((id(7), &[7][..])));
        assert_eq!(set.at(2), None);
        set.swap_at(0, 1).unwrap();
        assert_eq!(set.at(0), Some((id(8), &[8][..])));
        assert_eq!(set.index_of(id(7)), Some(1));
        assert_eq!(set.index_of(id(8)), Some(0));
        assert_eq!(set.swap_at(1, 1), Ok(()));
        assert_eq!(
            set.swap_at(0, 2),
            Err(Error::PositionOutOfBounds {
                position: 2,
                len: 2
            })
        );
        assert_eq!(set.id_at(1), Some(id(7)));
    }

    #[test]
    fn typed_fields() {
        let mut set = SparseSet::new();
        set.set_stride(16).unwrap();
        set.insert(id(1), None).unwrap();
        assert_eq!(set.set_field(id(1), 0, FieldValue::I64(-3)), Ok(true));
        assert_eq!(set.set_field(id(1), 8, FieldValue::F32(1.5)), Ok(true));
        assert_eq!(set.set_field(id(1), 15, FieldValue::U8(9)), Ok(true));
        assert_eq!(set.get_field(id(1), 0, FieldType::I64), Ok(Some(FieldValue::I64(-3))));
        assert_eq!(set.get_field(id(1), 8, FieldType::F32), Ok(Some(FieldValue::F32(1.5))));
        assert_eq!(set.get_field(id(1), 15, FieldType::U8), Ok(Some(FieldValue::U8(9))));
        assert_eq!(set.get_field(id(2), 0, FieldType::I32), Ok(None));
        assert_eq!(set.set_field(id(2), 0, FieldValue::I32(1)), Ok(false));
        assert!(set.get_field(id(1), 12, FieldType::F64).is_err());
        assert!(set.set_field(id(2), 16, FieldValue::U8(0)).is_err());
    }

    #[test]
    fn size_matches_contains() {
        let mut set = SparseSet::new();
        let mut present = Vec::new();
        for i in 0..50u32 {
            let id = Id::new((i * 37) % 23, i % 3);
            if i % 4 == 3 {
                if let Some(&victim) = present.first() {
                    assert!(set.remove(victim));
                    present.retain(|&p| p != victim);
                }
            } else {
                match set.insert(id, None).unwrap() {
                    Insertion::Appended(_) => present.push(id),
                    Insertion::Replaced(_) => {
                        present.retain(|p: &Id| !p.same_slot(id));
                        present.push(id);
                    }
                    Insertion::Duplicate(_) => {}
                }
            }
            assert_eq!(set.len(), present.len());
            assert!(present.iter().all(|&p| set.contains(p)));
        }
    }
}
