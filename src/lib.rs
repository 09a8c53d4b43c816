//! Stable, copyable integer handles to slots of data, and a compact sparse set
//! keyed by those handles.
//!
//! This crate is compatible with `#![no_std]` and only requires `alloc`.
//!
//! # Overview
//!
//! - A [`Registry`] hands out [`Id`]s: a 32-bit slot index paired with a
//!   32-bit generation. Recycling an identifier bumps the generation stored
//!   for its index, so every copy of the old identifier is detected as stale
//!   by [`Registry::valid`], even after the index is handed out again.
//! - A [`SparseSet`] maps identifiers to positions in a packed dense array,
//!   with O(1) insert, remove (by swapping the last entry into the hole),
//!   lookup and cache-friendly iteration. Each entry can optionally carry a
//!   fixed-size inline byte record (see [`SparseSet::set_stride`]) with typed
//!   field accessors.
//! - A [`SparseMap<V>`] stores an arbitrary Rust value per entry in a parallel
//!   vector that is kept in the same order as the dense array.
//!
//! A `SparseSet` does not know about any `Registry`. Callers that mix the two
//! typically check [`Registry::valid`] before trusting an identifier.
//!
//! ```
//! use slotset::{FieldType, FieldValue, Insertion, Registry, SparseSet};
//!
//! let mut registry = Registry::new();
//! let mut positions = SparseSet::new();
//! positions.set_stride(8)?;
//!
//! let player = registry.create()?;
//! assert_eq!(positions.insert(player, Some(&[0; 8]))?, Insertion::Appended(0));
//! positions.set_field(player, 4, FieldValue::F32(2.5))?;
//! assert_eq!(
//!     positions.get_field(player, 4, FieldType::F32)?,
//!     Some(FieldValue::F32(2.5))
//! );
//!
//! registry.recycle(player)?;
//! assert!(!registry.valid(player));
//! # Ok::<(), slotset::Error>(())
//! ```
//!
//! # Reusing allocations
//!
//! Growth only ever increases capacity. [`SparseSet::clear`] resets the set
//! without freeing the dense array, the payload buffer or any sparse page, so
//! a cleared set can be refilled without going back to the memory allocator.
//! Drop the set to release its memory.
//!
//! # Failure
//!
//! Every operation that may grow storage reserves memory fallibly and reports
//! [`Error::OutOfMemory`] while leaving the structure exactly as it was.
//! Misuse (bad field offsets, setting the stride twice, out-of-range
//! positions) is reported as an [`Error`] instead of panicking. Absent or
//! stale identifiers are not errors; they show up as `None` or `false`.
//!
//! # Limitations
//!
//! Generation counters are 32 bits wide and wrap around. After 2³² recycles
//! of the same index a very old stale identifier would be reported as valid
//! again.

#![no_std]
#![warn(rust_2018_idioms, missing_docs)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::doc_markdown
)]
#![warn(
    clippy::explicit_iter_loop,
    clippy::range_plus_one,
    clippy::map_unwrap_or,
    clippy::cloned_instead_of_copied,
    clippy::semicolon_if_nothing_returned,
    clippy::must_use_candidate,
    clippy::iter_without_into_iter,
    clippy::uninlined_format_args,
    clippy::ignored_unit_patterns
)]

extern crate alloc;
#[cfg(any(feature = "clap", feature = "arbitrary"))]
extern crate std;

#[cfg(feature = "clap")]
use alloc::string::String;

use core::fmt;

// Even when trace logging is disabled, the trace macro has a significant
// performance cost so we disable it in release builds.
macro_rules! trace {
    ($($tt:tt)*) => {
        if cfg!(feature = "trace-log") {
            ::log::trace!($($tt)*);
        }
    };
}

// Macro for collecting statistics.
macro_rules! stat {
    ($stats:expr, $field:ident) => {
        $stats.$field += 1
    };
    ($stats:expr, $field:ident, $count:expr) => {
        $stats.$field += $count
    };
}

#[macro_use]
pub mod entity;

pub mod debug_utils;

mod id;
mod iter;
mod paged;
mod records;
mod registry;
mod sparse_index;
mod sparse_map;
mod sparse_set;

pub use id::{Id, MAX_INDEX};
pub use iter::{Cursor, Iter};
pub use paged::{PAGE_SHIFT, PAGE_SIZE};
pub use records::{FieldType, FieldValue};
pub use registry::Registry;
pub use sparse_map::SparseMap;
pub use sparse_set::{Insertion, Removal, SparseSet};

/// Configuration options for [`SparseSet`] and [`Registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct Options {
    /// Number of dense entries reserved by the first insertion. Later growth
    /// doubles the capacity.
    #[cfg_attr(feature = "clap", arg(long, default_value_t = 64))]
    pub initial_capacity: usize,

    /// Number of page directory entries reserved by the first page
    /// allocation. The directory doubles when an index beyond it is used.
    #[cfg_attr(feature = "clap", arg(long, default_value_t = 16))]
    pub directory_capacity: usize,

    /// Largest slot index accepted. This also limits the number of distinct
    /// identifiers a [`Registry`] can hand out.
    #[cfg_attr(feature = "clap", arg(long, default_value_t = MAX_INDEX))]
    pub max_index: u32,
}

impl Default for Options {
    #[inline]
    fn default() -> Self {
        Self {
            initial_capacity: 64,
            directory_capacity: 16,
            max_index: MAX_INDEX,
        }
    }
}

/// Error returned by fallible operations on a [`Registry`] or [`SparseSet`].
///
/// A failed operation never leaves a partially-applied change behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Growing a buffer failed because the memory allocator refused the
    /// request.
    OutOfMemory,

    /// The slot index is above the configured maximum, or a registry has
    /// handed out every index it may use.
    CapacityExceeded,

    /// [`Id::NULL`] cannot be stored in a container.
    NullId,

    /// [`SparseSet::set_stride`] was called a second time.
    StrideAlreadySet,

    /// [`SparseSet::set_stride`] was called after the first insertion.
    StrideAfterInsert,

    /// A payload did not have exactly `stride` bytes.
    PayloadSize {
        /// Stride of the set.
        expected: usize,
        /// Length of the payload that was passed in.
        actual: usize,
    },

    /// A typed field access does not fit inside the payload record.
    FieldOutOfBounds {
        /// Byte offset of the field.
        offset: usize,
        /// Size of the field type in bytes.
        size: usize,
        /// Stride of the set.
        stride: usize,
    },

    /// A dense position is not below the number of entries in the set.
    PositionOutOfBounds {
        /// Position that was passed in.
        position: usize,
        /// Number of entries in the set.
        len: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::OutOfMemory => write!(f, "memory allocation failed"),
            Error::CapacityExceeded => write!(f, "slot index space exhausted"),
            Error::NullId => write!(f, "the null identifier cannot be stored"),
            Error::StrideAlreadySet => write!(f, "payload stride was already set"),
            Error::StrideAfterInsert => {
                write!(f, "payload stride cannot be set after the first insertion")
            }
            Error::PayloadSize { expected, actual } => {
                write!(f, "payload is {actual} bytes but the stride is {expected}")
            }
            Error::FieldOutOfBounds {
                offset,
                size,
                stride,
            } => write!(
                f,
                "field of {size} bytes at offset {offset} exceeds the stride of {stride}"
            ),
            Error::PositionOutOfBounds { position, len } => {
                write!(f, "position {position} is out of bounds for length {len}")
            }
        }
    }
}

impl core::error::Error for Error {}

impl From<alloc::collections::TryReserveError> for Error {
    #[inline]
    fn from(_: alloc::collections::TryReserveError) -> Self {
        Error::OutOfMemory
    }
}

#[cfg(all(test, feature = "clap"))]
mod tests {
    use super::*;

    #[derive(clap::Parser)]
    struct Cli {
        #[command(flatten)]
        options: Options,
    }

    #[test]
    fn options_from_command_line() {
        use clap::Parser;

        let cli = Cli::try_parse_from(["slotset"]).unwrap();
        assert_eq!(cli.options, Options::default());
        let cli = Cli::try_parse_from(["slotset", "--initial-capacity", "8", "--max-index", "99"])
            .unwrap();
        assert_eq!(cli.options.initial_capacity, 8);
        assert_eq!(cli.options.directory_capacity, 16);
        assert_eq!(cli.options.max_index, 99);
    }
}
