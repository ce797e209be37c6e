use crate::codec::TextEncoding;
use time::UtcDateTime;

/// Whether a message left or arrived at the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    Outgoing,
    #[default]
    Incoming,
}

/// One decoded short message.
///
/// The body is kept as stored; [`Message::text`] decodes it on demand.
/// Timestamps are `None` when the record had no timing field. The raw
/// millisecond values are kept alongside because they are what the export
/// writes, and in one direction they disagree with the converted timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub sent_at: Option<UtcDateTime>,
    pub sent_millis: i64,
    pub received_at: Option<UtcDateTime>,
    pub received_millis: i64,
    pub direction: Direction,
    /// Correspondent address, empty when the record had none.
    pub number: String,
    pub raw_text: Vec<u8>,
    pub encoding: TextEncoding,
}

impl Message {
    pub fn is_outgoing(&self) -> bool {
        self.direction == Direction::Outgoing
    }

    /// Decoded body text.
    pub fn text(&self) -> String {
        self.encoding.decode(&self.raw_text)
    }

    /// Raw milliseconds for the side of the conversation the device saw:
    /// sent for outgoing, received for incoming.
    pub fn date_millis(&self) -> i64 {
        match self.direction {
            Direction::Outgoing => self.sent_millis,
            Direction::Incoming => self.received_millis,
        }
    }

    /// Timestamp matching [`Message::date_millis`].
    pub fn date(&self) -> Option<UtcDateTime> {
        match self.direction {
            Direction::Outgoing => self.sent_at,
            Direction::Incoming => self.received_at,
        }
    }
}

/// Convert milliseconds since the Unix epoch, negative values lying before it.
/// Values beyond the range `time` can represent yield `None`.
pub fn millis_to_datetime(millis: i64) -> Option<UtcDateTime> {
    UtcDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()
}
