//! Lazily-allocated two-level table keyed by entity references.
//!
//! The key space is split into pages of [`PAGE_SIZE`] entries. A directory
//! holds one optional page per range; a page is only allocated the first time
//! a key inside its range is written. This bounds the memory wasted by a
//! sparse, large key space to the regions that are actually touched while
//! keeping lookups O(1).

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::marker::PhantomData;

use crate::Error;
use crate::entity::EntityRef;

/// log2 of the number of entries per page.
pub const PAGE_SHIFT: u32 = 12;

/// Number of entries per page.
pub const PAGE_SIZE: usize = 1 << PAGE_SHIFT;

const PAGE_MASK: usize = PAGE_SIZE - 1;

/// Splits a key index into a page number and an offset within the page.
#[inline]
fn split(index: usize) -> (usize, usize) {
    (index >> PAGE_SHIFT, index & PAGE_MASK)
}

/// Paged table mapping `K` to a `Copy` value.
///
/// Entries in pages that were never allocated read as `None`; entries in
/// allocated pages start out as the table's fill value.
#[derive(Clone)]
pub(crate) struct PagedTable<K: EntityRef, V: Copy> {
    /// One entry per page range. `None` means the page was never allocated.
    directory: Vec<Option<Box<[V]>>>,

    /// Value written into every entry of a fresh or reset page.
    fill: V,

    /// Directory length reserved by the first page allocation.
    initial_directory: usize,

    /// Directory length is never grown past this.
    max_pages: usize,

    marker: PhantomData<K>,
}

impl<K: EntityRef, V: Copy> PagedTable<K, V> {
    /// Creates an empty table which can address keys up to `max_index`
    /// (inclusive).
    pub(crate) fn new(fill: V, initial_directory: usize, max_index: usize) -> Self {
        Self {
            directory: Vec::new(),
            fill,
            initial_directory: initial_directory.max(1),
            max_pages: (max_index >> PAGE_SHIFT) + 1,
            marker: PhantomData,
        }
    }

    /// Returns the entry for `key`, or `None` if its page was never allocated.
    #[inline]
    pub(crate) fn get(&self, key: K) -> Option<&V> {
        let (page, offset) = split(key.index());
        let page = self.directory.get(page)?.as_deref()?;
        Some(&page[offset])
    }

    /// Returns the entry for `key` mutably, or `None` if its page was never
    /// allocated.
    #[inline]
    pub(crate) fn get_mut(&mut self, key: K) -> Option<&mut V> {
        let (page, offset) = split(key.index());
        let page = self.directory.get_mut(page)?.as_deref_mut()?;
        Some(&mut page[offset])
    }

    /// Returns the entry for `key`, allocating its page (and growing the
    /// directory) if needed.
    ///
    /// On failure the table is unchanged, apart from possibly spare directory
    /// capacity.
    pub(crate) fn entry(&mut self, key: K) -> Result<&mut V, Error> {
        let (page, offset) = split(key.index());
        if page >= self.directory.len() {
            self.grow_directory(page)?;
        }
        let slot = &mut self.directory[page];
        if slot.is_none() {
            let mut entries = Vec::new();
            entries.try_reserve_exact(PAGE_SIZE)?;
            entries.resize(PAGE_SIZE, self.fill);
            trace!("Allocated page {page} covering {} keys", PAGE_SIZE);
            *slot = Some(entries.into_boxed_slice());
        }
        match slot {
            Some(entries) => Ok(&mut entries[offset]),
            None => unreachable!(),
        }
    }

    /// Doubles the directory until it covers `page`, capped at `max_pages`.
    fn grow_directory(&mut self, page: usize) -> Result<(), Error> {
        if page >= self.max_pages {
            return Err(Error::CapacityExceeded);
        }
        let mut new_len = self.directory.len().max(self.initial_directory);
        while new_len <= page {
            new_len *= 2;
        }
        let new_len = new_len.min(self.max_pages);
        self.directory
            .try_reserve_exact(new_len - self.directory.len())?;
        trace!(
            "Growing page directory from {} to {new_len} entries",
            self.directory.len()
        );
        self.directory.resize_with(new_len, || None);
        Ok(())
    }

    /// Resets every allocated page to the fill value without freeing it.
    pub(crate) fn reset(&mut self) {
        let fill = self.fill;
        for page in self.directory.iter_mut().flatten() {
            page.fill(fill);
        }
    }

    /// Number of directory entries.
    #[inline]
    pub(crate) fn directory_len(&self) -> usize {
        self.directory.len()
    }

    /// Number of pages which have been allocated.
    pub(crate) fn allocated_pages(&self) -> usize {
        self.directory.iter().filter(|page| page.is_some()).count()
    }

    /// Iterates over the first key of every allocated page together with the
    /// page contents.
    pub(crate) fn pages(&self) -> impl Iterator<Item = (usize, &[V])> + '_ {
        self.directory
            .iter()
            .enumerate()
            .filter_map(|(page, entries)| Some((page << PAGE_SHIFT, entries.as_deref()?)))
    }
}
