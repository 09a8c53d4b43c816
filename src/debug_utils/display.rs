//! Support for displaying human-readable dumps of a [`SparseSet`] or a
//! [`Registry`].

use core::cell::Cell;
use core::fmt;

use crate::{Registry, SparseSet};

/// Helper type to display a separated list of displayable values.
pub(crate) struct DisplayIter<T> {
    iter: Cell<Option<T>>,
    separator: &'static str,
}
impl<T: IntoIterator> fmt::Display for DisplayIter<T>
where
    T::Item: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(iter) = self.iter.take() else {
            return Ok(());
        };
        for (i, val) in iter.into_iter().enumerate() {
            if i == 0 {
                write!(f, "{val}")?;
            } else {
                write!(f, "{}{val}", self.separator)?;
            }
        }
        Ok(())
    }
}

pub(crate) fn display_iter<I: IntoIterator<Item = impl fmt::Display>>(
    iter: I,
    separator: &'static str,
) -> DisplayIter<I> {
    DisplayIter {
        iter: Cell::new(Some(iter)),
        separator,
    }
}

/// A byte formatted as two lowercase hex digits.
pub(crate) struct HexByte(pub(crate) u8);

impl fmt::Display for HexByte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}", self.0)
    }
}

/// Number of payload bytes shown on each line of a dump.
const BYTES_PER_LINE: usize = 16;

/// Wrapper around a [`SparseSet`] that provides a [`Display`] implementation
/// which dumps its header, every entry in dense order and a hexdump of each
/// payload record.
///
/// [`Display`]: core::fmt::Display
pub struct DisplaySparseSet<'a>(pub &'a SparseSet);

impl fmt::Debug for DisplaySparseSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for DisplaySparseSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set = self.0;
        writeln!(
            f,
            "sparse set: len={} capacity={} stride={} pages={}/{}",
            set.len(),
            set.capacity(),
            set.stride(),
            set.sparse().allocated_pages(),
            set.sparse().directory_len(),
        )?;
        for (pos, (id, record)) in set.iter().enumerate() {
            write!(f, "  [{pos}] {id}")?;
            if record.is_empty() {
                writeln!(f)?;
                continue;
            }
            if record.len() <= BYTES_PER_LINE {
                writeln!(f, ": {}", display_iter(record.iter().map(|&b| HexByte(b)), " "))?;
                continue;
            }
            writeln!(f, ":")?;
            for (line, chunk) in record.chunks(BYTES_PER_LINE).enumerate() {
                writeln!(
                    f,
                    "    {:04x}: {}",
                    line * BYTES_PER_LINE,
                    display_iter(chunk.iter().map(|&b| HexByte(b)), " ")
                )?;
            }
        }
        Ok(())
    }
}

/// Wrapper around a [`Registry`] that provides a [`Display`] implementation
/// which dumps the state of every slot handed out so far.
///
/// [`Display`]: core::fmt::Display
pub struct DisplayRegistry<'a>(pub &'a Registry);

impl fmt::Debug for DisplayRegistry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for DisplayRegistry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.0;
        writeln!(
            f,
            "registry: live={} watermark={} max_index={} pages={}",
            registry.len(),
            registry.watermark(),
            registry.max_index(),
            registry.allocated_pages(),
        )?;
        for index in 0..registry.watermark() {
            match registry.current(index) {
                Some(id) => writeln!(f, "  {id}")?,
                None => {
                    let generation = registry.generation(index).unwrap_or_default();
                    writeln!(f, "  {index}: free, next generation {generation}")?;
                }
            }
        }
        if !registry.free_list().is_empty() {
            writeln!(
                f,
                "  free list: {}",
                display_iter(registry.free_list().iter().map(|slot| slot.index()), ", ")
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;
    use crate::Id;

    #[test]
    fn dump_sparse_set() {
        let mut set = SparseSet::new();
        set.set_stride(2).unwrap();
        set.insert(Id::new(3, 1), Some(&[0xab, 0x01])).unwrap();
        set.insert(Id::new(7, 0), Some(&[0, 0xff])).unwrap();
        assert_eq!(
            DisplaySparseSet(&set).to_string(),
            "sparse set: len=2 capacity=64 stride=2 pages=1/16\n  [0] 3v1: ab 01\n  [1] 7v0: 00 ff\n"
        );
    }

    #[test]
    fn dump_long_records() {
        let mut set = SparseSet::new();
        set.set_stride(20).unwrap();
        set.insert(Id::new(0, 0), Some(&[1; 20])).unwrap();
        let dump = DisplaySparseSet(&set).to_string();
        assert!(dump.contains("  [0] 0v0:\n    0000: 01 01"));
        assert!(dump.contains("    0010: 01 01 01 01\n"));
    }

    #[test]
    fn dump_registry() {
        let mut registry = Registry::new();
        let a = registry.create().unwrap();
        registry.create().unwrap();
        registry.recycle(a).unwrap();
        assert_eq!(
            DisplayRegistry(&registry).to_string(),
            "registry: live=1 watermark=2 max_index=4294967294 pages=1\n  0: free, next generation 1\n  1v0\n  free list: 0\n"
        );
    }
}
