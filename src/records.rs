//! Fixed-stride payload records and typed field access.

use alloc::vec::Vec;
use core::fmt;

use crate::Error;

/// Growable buffer of fixed-size byte records, one per dense position.
///
/// Records are moved and swapped with slice copies, so a stride of any size
/// is handled without intermediate buffers.
#[derive(Clone, Default)]
pub(crate) struct RecordBuffer {
    bytes: Vec<u8>,
    stride: usize,
}

impl RecordBuffer {
    #[inline]
    pub(crate) const fn new() -> Self {
        Self {
            bytes: Vec::new(),
            stride: 0,
        }
    }

    #[inline]
    pub(crate) fn stride(&self) -> usize {
        self.stride
    }

    /// Only valid while the buffer is empty.
    #[inline]
    pub(crate) fn set_stride(&mut self, stride: usize) {
        debug_assert!(self.bytes.is_empty());
        self.stride = stride;
    }

    /// Raw contents of all records.
    #[inline]
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    fn range(&self, pos: usize) -> core::ops::Range<usize> {
        pos * self.stride..(pos + 1) * self.stride
    }

    #[inline]
    pub(crate) fn record(&self, pos: usize) -> &[u8] {
        &self.bytes[self.range(pos)]
    }

    #[inline]
    pub(crate) fn record_mut(&mut self, pos: usize) -> &mut [u8] {
        let range = self.range(pos);
        &mut self.bytes[range]
    }

    /// Makes room for `additional` more records beyond the current capacity
    /// requirement of `len` records.
    pub(crate) fn try_reserve(&mut self, len: usize, additional: usize) -> Result<(), Error> {
        if self.stride == 0 {
            return Ok(());
        }
        let wanted = (len + additional)
            .checked_mul(self.stride)
            .ok_or(Error::OutOfMemory)?;
        if wanted > self.bytes.capacity() {
            self.bytes.try_reserve_exact(wanted - self.bytes.len())?;
        }
        Ok(())
    }

    /// Appends a record, zero-filled if `payload` is `None`.
    ///
    /// The caller must have reserved capacity beforehand.
    #[inline]
    pub(crate) fn push(&mut self, payload: Option<&[u8]>) {
        match payload {
            Some(payload) => {
                debug_assert_eq!(payload.len(), self.stride);
                self.bytes.extend_from_slice(payload);
            }
            None => self.bytes.resize(self.bytes.len() + self.stride, 0),
        }
    }

    /// Moves the record at `from` over the record at `to`.
    #[inline]
    pub(crate) fn copy_record(&mut self, from: usize, to: usize) {
        let src = self.range(from);
        self.bytes.copy_within(src, to * self.stride);
    }

    /// Exchanges the records at `a` and `b`.
    #[inline]
    pub(crate) fn swap_records(&mut self, a: usize, b: usize) {
        if a == b || self.stride == 0 {
            return;
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.bytes.split_at_mut(hi * self.stride);
        head[lo * self.stride..(lo + 1) * self.stride].swap_with_slice(&mut tail[..self.stride]);
    }

    /// Shortens the buffer to `len` records.
    #[inline]
    pub(crate) fn truncate(&mut self, len: usize) {
        self.bytes.truncate(len * self.stride);
    }

    #[inline]
    pub(crate) fn clear(&mut self) {
        self.bytes.clear();
    }
}

/// Type of a field stored inside a payload record.
///
/// All multi-byte fields are stored in little-endian byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum FieldType {
    /// Unsigned byte.
    U8,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
}

impl FieldType {
    /// Size of the field in bytes.
    #[inline]
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            FieldType::U8 => 1,
            FieldType::I32 | FieldType::F32 => 4,
            FieldType::I64 | FieldType::F64 => 8,
        }
    }

    /// Name used in the textual script format.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            FieldType::U8 => "u8",
            FieldType::I32 => "i32",
            FieldType::I64 => "i64",
            FieldType::F32 => "f32",
            FieldType::F64 => "f64",
        }
    }

    /// Checks that a field of this type at `offset` fits in a record of
    /// `stride` bytes.
    pub(crate) fn check_bounds(self, offset: usize, stride: usize) -> Result<(), Error> {
        match offset.checked_add(self.size()) {
            Some(end) if end <= stride => Ok(()),
            _ => Err(Error::FieldOutOfBounds {
                offset,
                size: self.size(),
                stride,
            }),
        }
    }

    /// Decodes a value of this type from the start of `bytes`.
    pub(crate) fn read(self, bytes: &[u8]) -> FieldValue {
        fn array<const N: usize>(bytes: &[u8]) -> [u8; N] {
            let mut out = [0; N];
            out.copy_from_slice(&bytes[..N]);
            out
        }
        match self {
            FieldType::U8 => FieldValue::U8(bytes[0]),
            FieldType::I32 => FieldValue::I32(i32::from_le_bytes(array(bytes))),
            FieldType::I64 => FieldValue::I64(i64::from_le_bytes(array(bytes))),
            FieldType::F32 => FieldValue::F32(f32::from_le_bytes(array(bytes))),
            FieldType::F64 => FieldValue::F64(f64::from_le_bytes(array(bytes))),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed value read from or written to a payload record.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum FieldValue {
    /// Unsigned byte.
    U8(u8),
    /// 32-bit signed integer.
    I32(i32),
    /// 64-bit signed integer.
    I64(i64),
    /// 32-bit float.
    F32(f32),
    /// 64-bit float.
    F64(f64),
}

impl FieldValue {
    /// Type of this value.
    #[inline]
    #[must_use]
    pub const fn ty(self) -> FieldType {
        match self {
            FieldValue::U8(_) => FieldType::U8,
            FieldValue::I32(_) => FieldType::I32,
            FieldValue::I64(_) => FieldType::I64,
            FieldValue::F32(_) => FieldType::F32,
            FieldValue::F64(_) => FieldType::F64,
        }
    }

    /// Encodes the value into the start of `bytes`.
    pub(crate) fn write(self, bytes: &mut [u8]) {
        match self {
            FieldValue::U8(v) => bytes[0] = v,
            FieldValue::I32(v) => bytes[..4].copy_from_slice(&v.to_le_bytes()),
            FieldValue::I64(v) => bytes[..8].copy_from_slice(&v.to_le_bytes()),
            FieldValue::F32(v) => bytes[..4].copy_from_slice(&v.to_le_bytes()),
            FieldValue::F64(v) => bytes[..8].copy_from_slice(&v.to_le_bytes()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FieldValue::U8(v) => write!(f, "{v}"),
            FieldValue::I32(v) => write!(f, "{v}"),
            FieldValue::I64(v) => write!(f, "{v}"),
            FieldValue::F32(v) => write!(f, "{v}"),
            FieldValue::F64(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(stride: usize, records: &[&[u8]]) -> RecordBuffer {
        let mut buf = RecordBuffer::new();
        buf.set_stride(stride);
        buf.try_reserve(0, records.len()).unwrap();
        for &r in records {
            buf.push(Some(r));
        }
        buf
    }

    #[test]
    fn swap_and_copy() {
        let mut buf = buffer(3, &[&[1, 2, 3], &[4, 5, 6], &[7, 8, 9]]);
        buf.swap_records(2, 0);
        assert_eq!(buf.as_bytes(), [7, 8, 9, 4, 5, 6, 1, 2, 3]);
        buf.copy_record(2, 1);
        buf.truncate(2);
        assert_eq!(buf.as_bytes(), [7, 8, 9, 1, 2, 3]);
        buf.push(None);
        assert_eq!(buf.record(2), [0, 0, 0]);
    }

    #[test]
    fn zero_stride_is_empty() {
        let mut buf = buffer(0, &[&[], &[]]);
        buf.swap_records(0, 1);
        assert!(buf.as_bytes().is_empty());
        assert!(buf.record(1).is_empty());
    }

    #[test]
    fn field_round_trip() {
        let mut record = [0u8; 12];
        FieldValue::F64(-0.25).write(&mut record[4..]);
        assert_eq!(FieldType::F64.read(&record[4..]), FieldValue::F64(-0.25));
        FieldValue::I32(-7).write(&mut record[..]);
        assert_eq!(record[..4], (-7i32).to_le_bytes());
        assert_eq!(FieldType::I32.read(&record), FieldValue::I32(-7));
    }

    #[test]
    fn field_bounds() {
        assert!(FieldType::I64.check_bounds(0, 8).is_ok());
        assert_eq!(
            FieldType::I64.check_bounds(1, 8),
            Err(Error::FieldOutOfBounds {
                offset: 1,
                size: 8,
                stride: 8
            })
        );
        assert!(FieldType::U8.check_bounds(usize::MAX, 8).is_err());
    }
}
