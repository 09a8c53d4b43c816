//! Generational identifier allocator.

use alloc::vec::Vec;

use crate::entity::Slot;
use crate::paged::PagedTable;
use crate::{Error, Id, Options};

/// Per-slot state stored in the generation pages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct SlotState {
    /// Generation carried by the current (or next) identifier for the slot.
    /// Never decreases, except by wrapping around.
    pub(crate) generation: u32,

    /// Whether an identifier for this slot is currently handed out.
    pub(crate) live: bool,
}

/// Allocates and recycles [`Id`]s, and detects stale ones.
///
/// Each slot index is in one of three states:
/// - never allocated (at or above the watermark);
/// - live, holding the generation of the identifier that was handed out;
/// - recycled, with a generation strictly greater than that of any identifier
///   previously handed out for the slot. The index waits on a free list and is
///   reused by a later [`create`](Registry::create).
///
/// ```
/// use slotset::{Id, Registry};
///
/// let mut registry = Registry::new();
/// let a = registry.create()?;
/// let b = registry.create()?;
/// assert_eq!((a, b), (Id::new(0, 0), Id::new(1, 0)));
///
/// registry.recycle(a)?;
/// assert!(!registry.valid(a));
/// let c = registry.create()?;
/// assert_eq!(c, Id::new(0, 1));
/// assert!(!registry.valid(a));
/// # Ok::<(), slotset::Error>(())
/// ```
#[derive(Clone)]
pub struct Registry {
    /// Generation and liveness of each slot, allocated in pages.
    slots: PagedTable<Slot, SlotState>,

    /// Recycled indices, reused in LIFO order.
    free: Vec<Slot>,

    /// Every index below this has been handed out at least once.
    next_index: u32,

    /// Largest index that may be handed out.
    max_index: u32,
}

impl Default for Registry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Creates an empty registry with default [`Options`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(&Options::default())
    }

    /// Creates an empty registry using the page directory size and index limit
    /// from `options`.
    #[must_use]
    pub fn with_options(options: &Options) -> Self {
        let max_index = options.max_index.min(crate::MAX_INDEX);
        Self {
            slots: PagedTable::new(
                SlotState::default(),
                options.directory_capacity,
                max_index as usize,
            ),
            free: Vec::new(),
            next_index: 0,
            max_index,
        }
    }

    /// Hands out a new identifier.
    ///
    /// Recycled indices are reused first, paired with their bumped
    /// generation. Otherwise a fresh index is taken from the watermark with
    /// generation 0, which may allocate a new generation page.
    ///
    /// Fails with [`Error::CapacityExceeded`] once every index up to the
    /// configured maximum is live, or [`Error::OutOfMemory`] if a page cannot
    /// be allocated. The registry is unchanged on failure.
    pub fn create(&mut self) -> Result<Id, Error> {
        if let Some(slot) = self.free.pop() {
            let Some(state) = self.slots.get_mut(slot) else {
                unreachable!("recycled {slot} has no generation page");
            };
            debug_assert!(!state.live);
            state.live = true;
            let id = Id::new(slot.index() as u32, state.generation);
            trace!("Reusing recycled {slot} as {id}");
            return Ok(id);
        }

        if self.next_index > self.max_index {
            return Err(Error::CapacityExceeded);
        }
        let index = self.next_index;
        let state = self.slots.entry(Slot::new(index as usize))?;
        state.live = true;
        let id = Id::new(index, state.generation);
        self.next_index += 1;
        trace!("Allocated fresh {id}");
        Ok(id)
    }

    /// Retires `id`, making it and every copy of it permanently stale.
    ///
    /// Returns `Ok(false)` and does nothing if `id` is not currently valid.
    /// Fails with [`Error::OutOfMemory`] if the free list cannot grow, in which
    /// case `id` stays valid.
    pub fn recycle(&mut self, id: Id) -> Result<bool, Error> {
        if !self.valid(id) {
            return Ok(false);
        }
        let Some(slot) = id.slot() else {
            return Ok(false);
        };
        self.free.try_reserve(1)?;
        let Some(state) = self.slots.get_mut(slot) else {
            unreachable!("valid {id} has no generation page");
        };
        state.generation = state.generation.wrapping_add(1);
        state.live = false;
        self.free.push(slot);
        trace!("Recycled {id}, {slot} now at generation {}", state.generation);
        Ok(true)
    }

    /// Returns whether `id` was handed out by this registry and has not been
    /// recycled since.
    #[must_use]
    pub fn valid(&self, id: Id) -> bool {
        self.state(id.index())
            .is_some_and(|state| state.live && state.generation == id.generation())
    }

    /// Returns the live identifier for `index`, if any.
    #[must_use]
    pub fn current(&self, index: u32) -> Option<Id> {
        let state = self.state(index)?;
        state.live.then(|| Id::new(index, state.generation))
    }

    /// Returns whether an identifier for `index` is currently live.
    #[must_use]
    pub fn is_alive(&self, index: u32) -> bool {
        self.state(index).is_some_and(|state| state.live)
    }

    /// Returns the generation stored for `index`, or `None` if the index was
    /// never handed out.
    ///
    /// For a recycled index this is the generation its next identifier will
    /// carry.
    #[must_use]
    pub fn generation(&self, index: u32) -> Option<u32> {
        self.state(index).map(|state| state.generation)
    }

    /// Number of live identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.next_index as usize - self.free.len()
    }

    /// Returns whether no identifier is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of distinct indices handed out so far.
    #[must_use]
    pub fn watermark(&self) -> u32 {
        self.next_index
    }

    /// Largest index this registry may hand out.
    #[must_use]
    pub fn max_index(&self) -> u32 {
        self.max_index
    }

    fn state(&self, index: u32) -> Option<SlotState> {
        if index >= self.next_index {
            return None;
        }
        self.slots.get(Slot::new(index as usize)).copied()
    }

    /// Recycled indices, oldest first.
    pub(crate) fn free_list(&self) -> &[Slot] {
        &self.free
    }

    /// Number of generation pages allocated.
    pub(crate) fn allocated_pages(&self) -> usize {
        self.slots.allocated_pages()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::PAGE_SIZE;

    #[test]
    fn fresh_identifiers() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());
        let a = registry.create().unwrap();
        let b = registry.create().unwrap();
        assert_eq!(a, Id::new(0, 0));
        assert_eq!(b, Id::new(1, 0));
        assert!(registry.valid(a) && registry.valid(b));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.watermark(), 2);
    }

    #[test]
    fn stale_detection() {
        let mut registry = Registry::new();
        let a = registry.create().unwrap();
        let _b = registry.create().unwrap();
        assert_eq!(registry.recycle(a), Ok(true));
        assert!(!registry.valid(a));
        assert_eq!(registry.len(), 1);

        let c = registry.create().unwrap();
        assert_eq!(c.index(), a.index());
        assert!(c.generation() > a.generation());
        assert_ne!(c, a);
        assert!(registry.valid(c));
        assert!(!registry.valid(a));
        assert_eq!(registry.current(0), Some(c));
    }

    #[test]
    fn recycle_is_idempotent() {
        let mut registry = Registry::new();
        let a = registry.create().unwrap();
        assert_eq!(registry.recycle(a), Ok(true));
        assert_eq!(registry.recycle(a), Ok(false));
        assert_eq!(registry.free_list().len(), 1);
        assert_eq!(registry.generation(0), Some(1));
        assert!(!registry.is_alive(0));
    }

    #[test]
    fn never_allocated_is_invalid() {
        let mut registry = Registry::new();
        assert!(!registry.valid(Id::new(0, 0)));
        assert!(!registry.valid(Id::NULL));
        registry.create().unwrap();
        assert!(!registry.valid(Id::new(1, 0)));
        assert_eq!(registry.generation(1), None);
        assert_eq!(registry.recycle(Id::new(7, 0)), Ok(false));
    }

    #[test]
    fn forged_next_generation_is_invalid() {
        let mut registry = Registry::new();
        let a = registry.create().unwrap();
        registry.recycle(a).unwrap();
        let forged = Id::new(a.index(), a.generation() + 1);
        assert!(!registry.valid(forged));
        assert_eq!(registry.recycle(forged), Ok(false));
        assert_eq!(registry.create().unwrap(), forged);
        assert_eq!(registry.create().unwrap(), Id::new(1, 0));
    }

    #[test]
    fn free_list_is_lifo() {
        let mut registry = Registry::new();
        let ids: Vec<Id> = (0..4).map(|_| registry.create().unwrap()).collect();
        registry.recycle(ids[1]).unwrap();
        registry.recycle(ids[3]).unwrap();
        assert_eq!(registry.create().unwrap(), Id::new(3, 1));
        assert_eq!(registry.create().unwrap(), Id::new(1, 1));
        assert_eq!(registry.create().unwrap(), Id::new(4, 0));
    }

    #[test]
    fn crossing_page_boundary() {
        let mut registry = Registry::new();
        for _ in 0..PAGE_SIZE + 1 {
            registry.create().unwrap();
        }
        assert_eq!(registry.allocated_pages(), 2);
        assert!(registry.valid(Id::new(PAGE_SIZE as u32, 0)));
    }

    #[test]
    fn limit() {
        let mut registry = Registry::with_options(&Options {
            max_index: 1,
            ..Options::default()
        });
        let a = registry.create().unwrap();
        registry.create().unwrap();
        assert_eq!(registry.create(), Err(Error::CapacityExceeded));
        registry.recycle(a).unwrap();
        assert_eq!(registry.create(), Ok(Id::new(0, 1)));
        assert_eq!(registry.max_index(), 1);
    }
}
