//! Textual operation scripts which drive a [`Registry`] and a [`SparseSet`].
//!
//! A script is a payload stride followed by a list of operations, one per
//! line:
//!
//! ```text
//! stride 8
//! create
//! insert 0v0 [01 00 00 00 00 00 00 00]
//! set_field 0v0 4 f32 1.5
//! get_field 0v0 4 f32
//! swap 0 0
//! remove 0v0
//! recycle 0v0
//! clear
//! ```
//!
//! Scripts can be replayed with a [`Simulator`], which checks every result
//! against an independent reference model.
//!
//! [`Registry`]: crate::Registry
//! [`SparseSet`]: crate::SparseSet

use alloc::vec::Vec;
use core::fmt;

use smallvec::SmallVec;

use super::display::{HexByte, display_iter};
use crate::{FieldType, FieldValue, Id};

#[cfg(feature = "arbitrary")]
mod arbitrary;
#[cfg(feature = "arbitrary")]
pub use arbitrary::ArbitraryScriptConfig;

#[cfg(feature = "parse")]
mod parse;

mod simulate;
pub use simulate::{Simulator, Stats};

/// Inline payload bytes carried by an [`Op::Insert`].
pub type Payload = SmallVec<[u8; 16]>;

/// A single operation in a [`Script`].
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// `Registry::create`.
    Create,

    /// `Registry::recycle`.
    Recycle(Id),

    /// `SparseSet::insert`, with an optional payload record.
    Insert(Id, Option<Payload>),

    /// `SparseSet::remove`.
    Remove(Id),

    /// `SparseSet::swap_at`.
    Swap(usize, usize),

    /// `SparseSet::clear`.
    Clear,

    /// `SparseSet::set_field` at the given byte offset.
    SetField(Id, usize, FieldValue),

    /// `SparseSet::get_field` at the given byte offset.
    GetField(Id, usize, FieldType),
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Create => write!(f, "create"),
            Op::Recycle(id) => write!(f, "recycle {id}"),
            Op::Insert(id, None) => write!(f, "insert {id}"),
            Op::Insert(id, Some(payload)) => write!(
                f,
                "insert {id} [{}]",
                display_iter(payload.iter().map(|&b| HexByte(b)), " ")
            ),
            Op::Remove(id) => write!(f, "remove {id}"),
            Op::Swap(a, b) => write!(f, "swap {a} {b}"),
            Op::Clear => write!(f, "clear"),
            Op::SetField(id, offset, value) => {
                write!(f, "set_field {id} {offset} {} {value}", value.ty())
            }
            Op::GetField(id, offset, ty) => write!(f, "get_field {id} {offset} {ty}"),
        }
    }
}

/// A payload stride and a sequence of operations to replay against a fresh
/// [`Registry`](crate::Registry) and [`SparseSet`](crate::SparseSet).
///
/// The [`Display`](fmt::Display) output is the text format accepted by
/// `Script::parse` (requires the `parse` cargo feature).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Script {
    /// Payload stride passed to `SparseSet::set_stride` before any operation.
    pub stride: usize,

    /// Operations, in order.
    pub ops: Vec<Op>,
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "stride {}", self.stride)?;
        for op in &self.ops {
            writeln!(f, "{op}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;

    use smallvec::smallvec;

    use super::*;

    #[test]
    fn display_format() {
        let script = Script {
            stride: 4,
            ops: vec![
                Op::Create,
                Op::Insert(Id::new(0, 0), Some(smallvec![1, 2, 0xfe, 0xff])),
                Op::Insert(Id::new(1, 3), None),
                Op::SetField(Id::new(0, 0), 0, FieldValue::F32(1.5)),
                Op::GetField(Id::new(0, 0), 0, FieldType::I32),
                Op::Swap(0, 1),
                Op::Remove(Id::new(1, 3)),
                Op::Recycle(Id::NULL),
                Op::Clear,
            ],
        };
        assert_eq!(
            script.to_string(),
            "stride 4\n\
             create\n\
             insert 0v0 [01 02 fe ff]\n\
             insert 1v3\n\
             set_field 0v0 0 f32 1.5\n\
             get_field 0v0 0 i32\n\
             swap 0 1\n\
             remove 1v3\n\
             recycle null\n\
             clear\n"
        );
    }
}
