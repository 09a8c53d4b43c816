//! Sparse half of a [`SparseSet`](crate::SparseSet): slot index to dense
//! position.

use crate::Error;
use crate::entity::{PackedOption, Position, Slot};
use crate::paged::PagedTable;

/// Paged mapping from a [`Slot`] to the position of its entry in the dense
/// array.
///
/// Absent entries hold the reserved position (`u32::MAX`). An entry may also
/// be stale, pointing at or past the dense length or at an entry for another
/// slot; callers must always confirm a hit against the dense array.
#[derive(Clone)]
pub(crate) struct PagedSparseIndex {
    table: PagedTable<Slot, PackedOption<Position>>,
}

impl PagedSparseIndex {
    pub(crate) fn new(directory_capacity: usize, max_index: u32) -> Self {
        Self {
            table: PagedTable::new(PackedOption::default(), directory_capacity, max_index as usize),
        }
    }

    /// Returns the recorded position for `slot`, if any.
    #[inline]
    pub(crate) fn get(&self, slot: Slot) -> Option<usize> {
        self.table.get(slot)?.map(Position::index)
    }

    /// Records `pos` for `slot`, allocating the covering page if needed.
    #[inline]
    pub(crate) fn set(&mut self, slot: Slot, pos: usize) -> Result<(), Error> {
        *self.table.entry(slot)? = Position::new(pos).into();
        Ok(())
    }

    /// Records `pos` for a slot whose page is known to exist because it is
    /// currently present in the dense array.
    #[inline]
    pub(crate) fn update(&mut self, slot: Slot, pos: usize) {
        match self.table.get_mut(slot) {
            Some(entry) => *entry = Position::new(pos).into(),
            None => unreachable!("no sparse page for present {slot}"),
        }
    }

    /// Marks `slot` as absent.
    #[inline]
    pub(crate) fn invalidate(&mut self, slot: Slot) {
        if let Some(entry) = self.table.get_mut(slot) {
            *entry = PackedOption::default();
        }
    }

    /// Marks every slot as absent, keeping the pages allocated.
    pub(crate) fn clear(&mut self) {
        self.table.reset();
    }

    /// Number of pages which have been allocated.
    pub(crate) fn allocated_pages(&self) -> usize {
        self.table.allocated_pages()
    }

    /// Number of page directory entries.
    pub(crate) fn directory_len(&self) -> usize {
        self.table.directory_len()
    }

    /// Iterates over every slot with a recorded position, present or stale.
    pub(crate) fn entries(&self) -> impl Iterator<Item = (Slot, usize)> + '_ {
        self.table.pages().flat_map(|(first, page)| {
            page.iter()
                .enumerate()
                .filter_map(move |(offset, pos)| Some((Slot::new(first + offset), pos.expand()?.index())))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PAGE_SIZE;

    #[test]
    fn set_get_invalidate() {
        let mut index = PagedSparseIndex::new(1, crate::MAX_INDEX);
        assert_eq!(index.get(Slot::new(3)), None);
        index.set(Slot::new(3), 0).unwrap();
        index.set(Slot::new(PAGE_SIZE * 3), 1).unwrap();
        assert_eq!(index.get(Slot::new(3)), Some(0));
        assert_eq!(index.get(Slot::new(4)), None);
        assert_eq!(index.get(Slot::new(PAGE_SIZE * 3)), Some(1));
        assert_eq!(index.allocated_pages(), 2);
        assert_eq!(index.directory_len(), 4);

        index.update(Slot::new(3), 5);
        assert_eq!(index.get(Slot::new(3)), Some(5));
        index.invalidate(Slot::new(3));
        assert_eq!(index.get(Slot::new(3)), None);
        let entries: alloc::vec::Vec<_> = index.entries().collect();
        assert_eq!(entries, [(Slot::new(PAGE_SIZE * 3), 1)]);

        index.clear();
        assert_eq!(index.get(Slot::new(PAGE_SIZE * 3)), None);
        assert_eq!(index.allocated_pages(), 2);
    }

    #[test]
    fn max_index_is_enforced() {
        let mut index = PagedSparseIndex::new(1, 10);
        assert!(index.set(Slot::new(PAGE_SIZE - 1), 0).is_ok());
        assert_eq!(index.set(Slot::new(PAGE_SIZE), 0), Err(Error::CapacityExceeded));
    }
}
