use crate::error::{ErrorKind, Result};

/// Offset of the first field; the two bytes before it are a record-local
/// sequence counter.
const FIELD_START: usize = 2;
/// Bytes in front of every field's data: a little-endian `u16` length
/// followed by a one-byte type tag.
const FIELD_HEADER_LEN: usize = 3;

/// A typed, length-delimited chunk of a record.
///
/// Tokenizing is purely positional: the tag is not interpreted here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field<'a> {
    pub kind: u8,
    pub data: &'a [u8],
}

/// Lazy tokenizer over a record body (the payload after its sub-header).
///
/// Yields an error, then stops, if a field runs past the end of the body.
#[derive(Clone, Debug)]
pub struct Fields<'a> {
    body: &'a [u8],
    cursor: usize,
    failed: bool,
}

impl<'a> Fields<'a> {
    pub fn new(body: &'a [u8]) -> Self {
        Self { body, cursor: FIELD_START, failed: false }
    }

    fn field_at(&self, at: usize) -> Result<(Field<'a>, usize)> {
        let Some(&[lo, hi, kind]) = self.body.get(at..at + FIELD_HEADER_LEN) else {
            exn::bail!(ErrorKind::Truncated("field"));
        };
        let length = usize::from(u16::from_le_bytes([lo, hi]));
        let start = at + FIELD_HEADER_LEN;
        let Some(data) = self.body.get(start..start + length) else {
            exn::bail!(ErrorKind::Truncated("field"));
        };
        // The device format advances by the length word plus two, then steps
        // one more byte past the tag: fields sit back to back.
        let next = at + length + 2 + 1;
        Ok((Field { kind, data }, next))
    }
}

impl<'a> Iterator for Fields<'a> {
    type Item = Result<Field<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor >= self.body.len() {
            return None;
        }
        match self.field_at(self.cursor) {
            Ok((field, next)) => {
                self.cursor = next;
                Some(Ok(field))
            },
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            },
        }
    }
}

impl std::iter::FusedIterator for Fields<'_> {}
