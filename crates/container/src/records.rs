use crate::error::{ErrorKind, Result};
use crate::fields::Fields;
use crate::util::fill;
use exn::{OptionExt, ResultExt};
use std::io::{Read, sink};

/// Bytes in front of every record: owner id, one unused byte, then a
/// little-endian `u32` payload length.
const RECORD_HEADER_LEN: usize = 6;
/// Bytes at the start of a payload before the field stream: database
/// handle, sub-version and the low half of the record's unique id.
const SUBHEADER_LEN: usize = 5;

/// One frame from the data region, owned independently of the stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawRecord {
    owner: u8,
    payload: Vec<u8>,
}

impl RawRecord {
    pub fn new(owner: u8, payload: Vec<u8>) -> Self {
        Self { owner, payload }
    }

    /// Index of the sub-database this record belongs to.
    pub fn owner(&self) -> u8 {
        self.owner
    }

    /// Payload bytes, excluding the 6-byte record header.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Tokenize the payload into fields, skipping the record sub-header.
    pub fn fields(&self) -> Result<Fields<'_>> {
        let body = self.payload.get(SUBHEADER_LEN..).ok_or_raise(|| ErrorKind::Truncated("record"))?;
        Ok(Fields::new(body))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Streaming,
    Exhausted,
}

enum Frame {
    Kept(RawRecord),
    Skipped,
}

/// Lazy, non-restartable sequence of records from the data region.
///
/// Records owned by other sub-databases are skipped without being buffered.
/// A clean end of input at a record boundary ends the sequence; a record cut
/// short yields [`ErrorKind::Truncated`] and nothing afterwards.
pub struct Records<R> {
    reader: R,
    owner: Option<u32>,
    state: State,
    processed: u64,
    offset: u64,
}

impl<R: Read> Records<R> {
    pub(crate) fn new(reader: R, owner: Option<u32>, offset: u64) -> Self {
        Self {
            reader,
            owner,
            state: State::Streaming,
            processed: 0,
            offset,
        }
    }

    /// Number of records read so far, including skipped ones.
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Byte offset of the stream cursor from the start of the container.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == State::Exhausted
    }

    /// Advance by exactly one frame, whether or not it is kept.
    ///
    /// `Some(Ok(None))` is a frame owned by another sub-database and `None`
    /// is the end of the sequence. Callers that report progress or honour
    /// cancellation per frame drive the stream with this instead of
    /// [`Iterator::next`].
    pub fn step(&mut self) -> Option<Result<Option<RawRecord>>> {
        if self.state == State::Exhausted {
            return None;
        }
        match self.read_frame() {
            Ok(Some(Frame::Kept(record))) => Some(Ok(Some(record))),
            Ok(Some(Frame::Skipped)) => Some(Ok(None)),
            Ok(None) => {
                self.state = State::Exhausted;
                None
            },
            Err(err) => {
                self.state = State::Exhausted;
                Some(Err(err))
            },
        }
    }

    fn wants(&self, owner: u8) -> bool {
        self.owner.is_none_or(|wanted| wanted == u32::from(owner))
    }

    fn read_frame(&mut self) -> Result<Option<Frame>> {
        let mut header = [0u8; RECORD_HEADER_LEN];
        match fill(&mut self.reader, &mut header)? {
            0 => return Ok(None),
            RECORD_HEADER_LEN => {},
            _ => exn::bail!(ErrorKind::Truncated("record")),
        }
        let owner = header[0];
        let length = u64::from(u32::from_le_bytes([header[2], header[3], header[4], header[5]]));
        let keep = self.wants(owner);
        self.processed += 1;
        self.offset += RECORD_HEADER_LEN as u64;
        let mut limited = (&mut self.reader).take(length);
        let (frame, read) = if keep {
            let mut payload = Vec::new();
            let read = limited.read_to_end(&mut payload).or_raise(|| ErrorKind::Io)?;
            (Frame::Kept(RawRecord::new(owner, payload)), read as u64)
        } else {
            let read = std::io::copy(&mut limited, &mut sink()).or_raise(|| ErrorKind::Io)?;
            (Frame::Skipped, read)
        };
        self.offset += read;
        if read < length {
            exn::bail!(ErrorKind::Truncated("record"));
        }
        tracing::trace!(owner, length, keep, "record");
        Ok(Some(frame))
    }
}

impl<R: Read> Iterator for Records<R> {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.step()? {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

impl<R: Read> std::iter::FusedIterator for Records<R> {}
