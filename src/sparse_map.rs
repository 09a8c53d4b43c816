//! Sparse mapping of identifiers to arbitrary values.
//!
//! A [`SparseSet`] can only carry fixed-size byte records. `SparseMap<V>`
//! pairs a set with no inline records with a `Vec<V>` indexed by dense
//! position, and applies every position change made by the set (append,
//! in-place replacement, swap-remove, swap) to the vector in the same call so
//! that the two never disagree.

use alloc::vec::Vec;
use core::{fmt, mem, slice};

use crate::{Error, Id, Insertion, Options, SparseSet};

/// A sparse mapping from [`Id`] to `V`, logically equivalent to an
/// `IndexMap<Id, V>` with swap-remove semantics.
///
/// A `SparseMap<V>` provides:
///
/// - Constant time lookup, insert and removal.
/// - Iteration that is as fast as a `Vec<(Id, V)>`.
/// - A `clear()` which keeps every allocation around for reuse.
///
/// Key matching follows [`SparseSet`]: lookups and removal need the exact
/// identifier, while insertion replaces an entry for the same slot with a
/// different generation.
///
/// ```
/// use slotset::{Id, SparseMap};
///
/// let mut names = SparseMap::new();
/// names.insert(Id::new(1, 0), "one")?;
/// names.insert(Id::new(2, 0), "two")?;
/// assert_eq!(names.get(Id::new(2, 0)), Some(&"two"));
/// assert_eq!(names.remove(Id::new(1, 0)), Some("one"));
/// assert_eq!(names.at(0), Some((Id::new(2, 0), &"two")));
/// # Ok::<(), slotset::Error>(())
/// ```
#[derive(Clone)]
pub struct SparseMap<V> {
    set: SparseSet,
    values: Vec<V>,
}

impl<V> Default for SparseMap<V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<V> SparseMap<V> {
    /// Create a new empty map.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(&Options::default())
    }

    /// Create a new empty map with the given growth parameters.
    #[inline]
    #[must_use]
    pub fn with_options(options: &Options) -> Self {
        Self {
            set: SparseSet::with_options(options),
            values: Vec::new(),
        }
    }

    /// Returns the number of elements in the map.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the map contains no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Remove all elements from the map.
    #[inline]
    pub fn clear(&mut self) {
        self.set.clear();
        self.values.clear();
    }

    /// Returns a reference to the value corresponding to the key.
    #[inline]
    #[must_use]
    pub fn get(&self, key: Id) -> Option<&V> {
        let pos = self.set.index_of(key)?;
        Some(&self.values[pos])
    }

    /// Returns a mutable reference to the value corresponding to the key.
    #[inline]
    pub fn get_mut(&mut self, key: Id) -> Option<&mut V> {
        let pos = self.set.index_of(key)?;
        Some(&mut self.values[pos])
    }

    /// Return the dense position of the value corresponding to `key`.
    #[inline]
    #[must_use]
    pub fn index_of(&self, key: Id) -> Option<usize> {
        self.set.index_of(key)
    }

    /// Return `true` if the map contains a value corresponding to `key`.
    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: Id) -> bool {
        self.set.contains(key)
    }

    /// Insert a value into the map.
    ///
    /// If the map did not have this key's slot present, `None` is returned.
    ///
    /// If the map did have the key, or another key for the same slot, the key
    /// and value are updated in place and the old value is returned.
    pub fn insert(&mut self, key: Id, value: V) -> Result<Option<V>, Error> {
        if self.values.len() == self.values.capacity() {
            self.values.try_reserve(1)?;
        }
        match self.set.insert(key, None)? {
            Insertion::Appended(pos) => {
                debug_assert_eq!(pos, self.values.len());
                self.values.push(value);
                Ok(None)
            }
            Insertion::Replaced(pos) | Insertion::Duplicate(pos) => {
                Ok(Some(mem::replace(&mut self.values[pos], value)))
            }
        }
    }

    /// Remove a value from the map and return it.
    ///
    /// Like [`Vec::swap_remove`], the pair is removed by swapping it with
    /// the last element of the map and popping it off.
    pub fn remove(&mut self, key: Id) -> Option<V> {
        let removal = self.set.remove_entry(key)?;
        Some(self.values.swap_remove(removal.position))
    }

    /// Returns the key and value at a dense position.
    #[inline]
    #[must_use]
    pub fn at(&self, pos: usize) -> Option<(Id, &V)> {
        Some((self.set.id_at(pos)?, self.values.get(pos)?))
    }

    /// Exchanges the entries at two dense positions.
    pub fn swap_at(&mut self, a: usize, b: usize) -> Result<(), Error> {
        self.set.swap_at(a, b)?;
        self.values.swap(a, b);
        Ok(())
    }

    /// Scan through each key-value pair in the map and keep those where the
    /// closure `keep` returns `true`.
    ///
    /// Removed pairs are swap-removed, so the order of the remaining elements
    /// may change.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(Id, &mut V) -> bool,
    {
        let mut pos = 0;
        while pos < self.values.len() {
            let key = self.set.ids()[pos];
            if keep(key, &mut self.values[pos]) {
                pos += 1;
            } else {
                self.remove(key);
            }
        }
    }

    /// Iterate over all the keys and values in this map.
    #[inline]
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (Id, &V)> + ExactSizeIterator + '_ {
        self.set.ids().iter().copied().zip(self.values.iter())
    }

    /// Iterate over all the keys and values in this map, mutable edition.
    #[inline]
    pub fn iter_mut(
        &mut self,
    ) -> impl DoubleEndedIterator<Item = (Id, &mut V)> + ExactSizeIterator + '_ {
        self.set.ids().iter().copied().zip(self.values.iter_mut())
    }

    /// Iterate over all the keys in this map.
    #[inline]
    #[must_use]
    pub fn keys(&self) -> &[Id] {
        self.set.ids()
    }

    /// Iterate over all the values in this map.
    #[inline]
    pub fn values(&self) -> slice::Iter<'_, V> {
        self.values.iter()
    }

    /// Iterate over all the values in this map, mutable edition.
    #[inline]
    pub fn values_mut(&mut self) -> slice::IterMut<'_, V> {
        self.values.iter_mut()
    }

    /// Return an owning iterator over the values of the map.
    #[inline]
    #[must_use]
    pub fn into_values(self) -> impl DoubleEndedIterator<Item = V> + ExactSizeIterator {
        self.values.into_iter()
    }
}

impl<V: fmt::Debug> fmt::Debug for SparseMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn insert_replace_remove() {
        let mut map = SparseMap::new();
        assert_eq!(map.insert(Id::new(5, 0), "a".to_string()), Ok(None));
        assert_eq!(map.insert(Id::new(6, 0), "b".to_string()), Ok(None));
        assert_eq!(
            map.insert(Id::new(5, 1), "c".to_string()),
            Ok(Some("a".to_string()))
        );
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(Id::new(5, 0)), None);
        assert_eq!(map.get(Id::new(5, 1)).map(String::as_str), Some("c"));
        assert_eq!(
            map.insert(Id::new(5, 1), "d".to_string()),
            Ok(Some("c".to_string()))
        );

        assert_eq!(map.remove(Id::new(5, 1)), Some("d".to_string()));
        assert_eq!(map.at(0).map(|(id, v)| (id, v.as_str())), Some((Id::new(6, 0), "b")));
        assert_eq!(map.remove(Id::new(5, 1)), None);
    }

    #[test]
    fn values_follow_positions() {
        let mut map = SparseMap::new();
        for i in 0..6u32 {
            map.insert(Id::new(i, 0), i).unwrap();
        }
        map.remove(Id::new(1, 0));
        map.swap_at(0, 4).unwrap();
        map.retain(|_, v| *v % 2 == 0);
        for (id, &v) in map.iter() {
            assert_eq!(id.index(), v);
        }
        let mut keys: Vec<u32> = map.keys().iter().map(|id| id.index()).collect();
        keys.sort_unstable();
        assert_eq!(keys, [0, 2, 4]);
        for (_, v) in map.iter_mut() {
            *v += 10;
        }
        assert_eq!(map.get(Id::new(4, 0)), Some(&14));
        assert!(map.swap_at(0, 3).is_err());
    }

    #[test]
    fn values_in_dense_order() {
        let mut map = SparseMap::new();
        for i in 0..4u32 {
            map.insert(Id::new(i, 0), i.to_string()).unwrap();
        }
        map.remove(Id::new(0, 0));
        for value in map.values_mut() {
            value.push('!');
        }
        let values: Vec<&str> = map.values().map(String::as_str).collect();
        assert_eq!(values, ["3!", "1!", "2!"]);
        assert_eq!(map.get(Id::new(3, 0)).map(String::as_str), Some("3!"));

        let owned: Vec<String> = map.into_values().rev().collect();
        assert_eq!(owned, ["2!", "1!", "3!"]);
    }

    #[test]
    fn clear_and_errors() {
        let mut map = SparseMap::new();
        map.insert(Id::new(1, 0), 1).unwrap();
        map.clear();
        assert!(map.is_empty());
        assert!(!map.contains_key(Id::new(1, 0)));
        assert_eq!(map.insert(Id::NULL, 2), Err(Error::NullId));
        assert!(map.is_empty());
    }
}
