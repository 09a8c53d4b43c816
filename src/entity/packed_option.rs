//! In-band encoding of an absent entity.

/// An entity type with one value set aside to mean "no entity".
pub trait ReservedValue {
    /// Returns the value that stands for "no entity".
    fn reserved_value() -> Self;

    /// Checks whether `self` is that value.
    fn is_reserved_value(&self) -> bool;
}

/// An `Option<T>` stored as a bare `T`, with `None` held as
/// [`ReservedValue::reserved_value`].
///
/// Sparse pages are flat arrays of these, so an unset entry costs no more
/// than a set one.
///
/// ```
/// use slotset::entity::{PackedOption, Position};
///
/// let unset = PackedOption::<Position>::default();
/// assert_eq!(unset.expand(), None);
/// let at_three = PackedOption::from(Position::new(3));
/// assert_eq!(at_three.map(Position::index), Some(3));
/// assert_eq!(core::mem::size_of::<PackedOption<Position>>(), 4);
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct PackedOption<T: ReservedValue>(T);

impl<T: ReservedValue> PackedOption<T> {
    /// Unpacks into a regular `Option`.
    #[inline]
    pub fn expand(self) -> Option<T> {
        (!self.0.is_reserved_value()).then_some(self.0)
    }

    /// Unpacks and applies `f` to the entity, if there is one.
    #[inline]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Option<U> {
        self.expand().map(f)
    }
}

impl<T: ReservedValue> Default for PackedOption<T> {
    #[inline]
    fn default() -> Self {
        Self(T::reserved_value())
    }
}

impl<T: ReservedValue> From<T> for PackedOption<T> {
    #[inline]
    fn from(value: T) -> Self {
        debug_assert!(!value.is_reserved_value(), "cannot pack the reserved value");
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Position, Slot};

    #[test]
    fn unset_entry_is_reserved_value() {
        let unset = PackedOption::<Slot>::default();
        assert_eq!(unset.expand(), None);
        assert!(unset == PackedOption(Slot::reserved_value()));
    }

    #[test]
    fn map_unpacks_set_entry() {
        let pos = PackedOption::from(Position::new(9));
        assert_eq!(pos.expand(), Some(Position::new(9)));
        assert_eq!(pos.map(|p| p.index() + 1), Some(10));
        assert_eq!(PackedOption::<Position>::default().map(Position::index), None);
    }
}
