use crate::codec::TextEncoding;
use crate::consts::*;
use crate::error::{ErrorKind, Result};
use crate::models::{Direction, Message, millis_to_datetime};
use ipdsms_container::{Field, RawRecord};
use tracing::instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Timing {
    direction: Direction,
    first: i64,
    second: i64,
}

impl Timing {
    fn parse(data: &[u8]) -> Result<Self> {
        let malformed = || ErrorKind::MalformedField { kind: FIELD_TIMING, length: data.len() };
        if data.len() < TIMING_MIN_LEN {
            exn::bail!(malformed());
        }
        let read = |at: usize| -> Option<i64> { Some(i64::from_le_bytes(data.get(at..at + 8)?.try_into().ok()?)) };
        let (Some(first), Some(second)) = (read(TIMING_FIRST_OFFSET), read(TIMING_SECOND_OFFSET)) else {
            exn::bail!(malformed());
        };
        let direction = match data[0] {
            TIMING_OUTGOING => Direction::Outgoing,
            _ => Direction::Incoming,
        };
        Ok(Self { direction, first, second })
    }
}

/// Accumulates the fields of one record.
///
/// Each step consumes the builder and returns a new one, so a record is a
/// fold over its fields finished by [`MessageBuilder::build`]. A field that
/// repeats replaces the earlier value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageBuilder {
    timing: Option<Timing>,
    number: Option<String>,
    body: Option<Vec<u8>>,
    encoding: Option<TextEncoding>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one field in. Unknown field types are ignored.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::MalformedField`] when a timing or number field is too short.
    pub fn field(self, field: Field<'_>) -> Result<Self> {
        Ok(match field.kind {
            FIELD_TIMING => Self { timing: Some(Timing::parse(field.data)?), ..self },
            FIELD_NUMBER => Self { number: Some(parse_number(field.data)?), ..self },
            FIELD_BODY => Self { body: Some(field.data.to_vec()), ..self },
            FIELD_ENCODING => Self { encoding: Some(TextEncoding::from_marker(field.data)), ..self },
            kind => {
                tracing::trace!(kind, length = field.data.len(), "ignoring field");
                self
            },
        })
    }

    pub fn build(self) -> Message {
        let mut message = Message {
            number: self.number.unwrap_or_default(),
            raw_text: self.body.unwrap_or_default(),
            encoding: self.encoding.unwrap_or_default(),
            ..Message::default()
        };
        if let Some(Timing { direction, first, second }) = self.timing {
            message.direction = direction;
            match direction {
                Direction::Outgoing => {
                    message.sent_at = millis_to_datetime(first);
                    message.sent_millis = first;
                    message.received_at = millis_to_datetime(second);
                    message.received_millis = second;
                },
                Direction::Incoming => {
                    // Received timestamp and raw value disagree in this branch;
                    // the export writes the raw value.
                    message.sent_at = millis_to_datetime(second);
                    message.sent_millis = second;
                    message.received_at = millis_to_datetime(first);
                    message.received_millis = second;
                },
            }
        }
        message
    }
}

fn parse_number(data: &[u8]) -> Result<String> {
    if data.len() < NUMBER_MIN_LEN {
        exn::bail!(ErrorKind::MalformedField { kind: FIELD_NUMBER, length: data.len() });
    }
    let digits = &data[NUMBER_OFFSET..data.len() - 1];
    Ok(digits.iter().map(|&b| if b.is_ascii() { char::from(b) } else { '?' }).collect())
}

/// Decode one record into a [`Message`].
///
/// # Errors
///
/// Fails if the record cannot be tokenized or a known field is malformed.
#[instrument(level = "trace", skip(record), fields(length = record.payload().len()))]
pub fn decode(record: &RawRecord) -> Result<Message> {
    let fields = record.fields().map_err(ErrorKind::container)?;
    let builder = fields.into_iter().try_fold(MessageBuilder::new(), |builder, field| {
        builder.field(field.map_err(ErrorKind::container)?)
    })?;
    Ok(builder.build())
}
