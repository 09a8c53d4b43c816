//! Generational identifiers.

use core::fmt;

use crate::entity::Slot;

/// Largest raw index that can be stored in an [`Id`] handed out by a
/// [`Registry`](crate::Registry) or accepted by a
/// [`SparseSet`](crate::SparseSet).
///
/// `u32::MAX` is excluded so that neither the null identifier nor the
/// invalid-position sentinel can ever be produced by a legitimate index.
pub const MAX_INDEX: u32 = u32::MAX - 1;

/// A copyable handle to a slot: a 32-bit `index` in the low bits and a 32-bit
/// `generation` in the high bits.
///
/// Two identifiers are equal only if both halves match. An identifier is
/// *current* only while the [`Registry`](crate::Registry) that issued it holds
/// the same generation for its index; recycling the index bumps the stored
/// generation, which makes every copy of the old identifier stale.
///
/// ```
/// use slotset::Id;
///
/// let id = Id::new(5, 2);
/// assert_eq!(id.index(), 5);
/// assert_eq!(id.generation(), 2);
/// assert_eq!(Id::from_bits(id.to_bits()), id);
/// assert!(id.same_slot(Id::new(5, 3)));
/// assert!(!id.same_handle(Id::new(5, 3)));
/// ```
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct Id(u64);

impl Id {
    /// The reserved "no identifier" value, with all bits set.
    pub const NULL: Id = Id(u64::MAX);

    /// Packs an index and a generation into an identifier.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self((generation as u64) << 32 | index as u64)
    }

    /// Reinterprets a raw 64-bit value as an identifier.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Returns the raw 64-bit representation of this identifier.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Returns the slot index half of the identifier.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation half of the identifier.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Returns the slot index as an entity reference, or `None` if the index is
    /// above [`MAX_INDEX`] (which includes [`Id::NULL`]).
    #[inline]
    #[must_use]
    pub const fn slot(self) -> Option<Slot> {
        if self.index() > MAX_INDEX {
            None
        } else {
            Some(Slot::new(self.index() as usize))
        }
    }

    /// Returns whether this is [`Id::NULL`].
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }

    /// Returns whether both identifiers address the same slot, ignoring the
    /// generation.
    ///
    /// [`SparseSet::insert`](crate::SparseSet::insert) uses this to decide
    /// between overwriting an existing entry and appending a new one.
    #[inline]
    #[must_use]
    pub const fn same_slot(self, other: Id) -> bool {
        self.index() == other.index()
    }

    /// Returns whether both identifiers are the same handle: same slot and same
    /// generation.
    ///
    /// Removal and lookups in a [`SparseSet`](crate::SparseSet) use this.
    #[inline]
    #[must_use]
    pub const fn same_handle(self, other: Id) -> bool {
        self.0 == other.0
    }
}

impl Default for Id {
    #[inline]
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "null")
        } else {
            write!(f, "{}v{}", self.index(), self.generation())
        }
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
