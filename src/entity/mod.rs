//! Small integer newtypes ("entities") used as keys by the paged tables of
//! this crate.
//!
//! These types implement the [`EntityRef`] trait which allows them to be
//! converted to and from `usize`, but contain a `u32` internally to halve the
//! memory used by the sparse pages.
//!
//! - [`Slot`] is the raw index half of an [`Id`](crate::Id).
//! - [`Position`] is an offset into the dense array of a
//!   [`SparseSet`](crate::SparseSet).
//! - [`PackedOption<T>`] is an `Option<T>` the size of `T`. Sparse pages use
//!   it to mark absent entries with the maximum integer value.

#[macro_use]
pub mod base;
pub mod packed_option;

pub use base::{EntityRef, Position, Slot};
pub use packed_option::{PackedOption, ReservedValue};
