use byteorder::{BigEndian, ByteOrder};

use crate::error::FieldError;

/// Returns true if `size` bytes starting at `start` end at or before `end`.
pub fn is_within(start: usize, size: usize, end: usize) -> bool {
    match start.checked_add(size) {
        Some(stop) => stop <= end,
        None => false,
    }
}

/// Reads a big-endian u16 at `offset`, if two bytes are available there.
///
/// This always decodes byte-wise, so odd offsets are fine.
pub fn read_u16_at(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset.checked_add(2)?)?;
    Some(BigEndian::read_u16(bytes))
}

/// A `{be16 length}{payload}` field, with the length counting itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthPrefixedField<'a> {
    /// Absolute offset of the length field.
    pub offset: usize,
    /// The length as stored, including the two length bytes.
    pub total_len: usize,
    pub payload: &'a [u8],
}

impl<'a> LengthPrefixedField<'a> {
    pub const LENGTH_SIZE: usize = 2;

    /// Reads the field whose length prefix starts at `cursor`. The whole field
    /// has to end at or before `bound`, which is clamped to the buffer.
    pub fn read(data: &'a [u8], cursor: usize, bound: usize) -> Result<Self, FieldError> {
        let bound = bound.min(data.len());
        if !is_within(cursor, Self::LENGTH_SIZE, bound) {
            return Err(FieldError::OutOfBounds {
                offset: cursor,
                len: Self::LENGTH_SIZE,
                bound,
            });
        }
        if cursor % 2 != 0 {
            tracing::warn!("length field not aligned at offset {cursor}");
        }
        let len = BigEndian::read_u16(&data[cursor..cursor + Self::LENGTH_SIZE]);
        if (len as usize) < Self::LENGTH_SIZE {
            return Err(FieldError::ShortField { offset: cursor, len });
        }
        let total_len = len as usize;
        if !is_within(cursor, total_len, bound) {
            return Err(FieldError::OutOfBounds {
                offset: cursor,
                len: total_len,
                bound,
            });
        }
        Ok(Self {
            offset: cursor,
            total_len,
            payload: &data[cursor + Self::LENGTH_SIZE..cursor + total_len],
        })
    }

    /// Offset of the byte right after this field, where the next field starts.
    pub fn end(&self) -> usize {
        self.offset + self.total_len
    }
}

/// Reads `N` length-prefixed fields packed back to back starting at `cursor`.
pub fn read_packed_fields<'a, const N: usize>(
    data: &'a [u8],
    mut cursor: usize,
    bound: usize,
) -> Result<[LengthPrefixedField<'a>; N], FieldError> {
    let mut fields = [LengthPrefixedField {
        offset: cursor,
        total_len: 0,
        payload: &[],
    }; N];
    for field in fields.iter_mut() {
        *field = LengthPrefixedField::read(data, cursor, bound)?;
        cursor = field.end();
    }
    Ok(fields)
}
