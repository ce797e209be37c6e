use crate::encode::html_encode;
use ipdsms_message::{Message, TextEncoding};
use time::UtcOffset;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const READABLE_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[month repr:short] [day], [year] [hour repr:12 padding:none]:[minute] [period]");
/// What the backup app shows for a message without timestamps.
pub const UNSET_READABLE_DATE: &str = "Jan 01, 0001 12:00 AM";

/// The `type` attribute of an `sms` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Received,
    Sent,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "1",
            Self::Sent => "2",
        }
    }
}

/// A message body ready for an attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Already entity-encoded; written verbatim.
    Encoded(String),
    /// Plain text; the XML writer escapes it.
    Plain(String),
}

/// The flat attribute set of one `sms` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedMessage {
    pub address: String,
    pub date: i64,
    pub kind: MessageType,
    pub body: Body,
    pub readable_date: String,
}

impl ExportedMessage {
    /// Flatten a decoded message, rendering its readable date at `offset`.
    pub fn new(message: &Message, offset: UtcOffset) -> Self {
        let text = message.text();
        let body = match message.encoding {
            TextEncoding::WideBe => Body::Encoded(html_encode(&text)),
            TextEncoding::Legacy7Bit => Body::Plain(text),
        };
        let readable_date = message
            .date()
            .and_then(|date| date.checked_to_offset(offset)?.format(READABLE_DATE).ok())
            .unwrap_or_else(|| UNSET_READABLE_DATE.to_owned());
        Self {
            address: message.number.clone(),
            date: message.date_millis(),
            kind: if message.is_outgoing() { MessageType::Sent } else { MessageType::Received },
            body,
            readable_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipdsms_message::Direction;
    use ipdsms_message::models::millis_to_datetime;
    use rstest::rstest;
    use time::macros::offset;

    fn message(millis: i64, direction: Direction) -> Message {
        Message {
            sent_at: millis_to_datetime(millis),
            sent_millis: millis,
            received_at: millis_to_datetime(millis),
            received_millis: millis,
            direction,
            number: "5551234".to_owned(),
            raw_text: b"Hi".to_vec(),
            ..Message::default()
        }
    }

    #[rstest]
    // 2010-01-05T15:07:00Z
    #[case(1_262_704_020_000, offset!(UTC), "Jan 05, 2010 3:07 PM")]
    #[case(1_262_704_020_000, offset!(-5), "Jan 05, 2010 10:07 AM")]
    #[case(1_262_704_020_000, offset!(+9), "Jan 06, 2010 12:07 AM")]
    #[case(0, offset!(UTC), "Jan 01, 1970 12:00 AM")]
    fn readable_date(#[case] millis: i64, #[case] offset: UtcOffset, #[case] expected: &str) {
        let exported = ExportedMessage::new(&message(millis, Direction::Incoming), offset);
        assert_eq!(exported.readable_date, expected);
        assert_eq!(exported.date, millis);
    }

    #[test]
    fn unset_timestamps() {
        let exported = ExportedMessage::new(&Message::default(), UtcOffset::UTC);
        assert_eq!(exported.readable_date, UNSET_READABLE_DATE);
        assert_eq!(exported.date, 0);
        assert_eq!(exported.kind, MessageType::Received);
        assert_eq!(exported.address, "");
    }

    #[rstest]
    #[case(Direction::Outgoing, MessageType::Sent, "2")]
    #[case(Direction::Incoming, MessageType::Received, "1")]
    fn message_type(#[case] direction: Direction, #[case] kind: MessageType, #[case] attr: &str) {
        let exported = ExportedMessage::new(&message(0, direction), UtcOffset::UTC);
        assert_eq!(exported.kind, kind);
        assert_eq!(exported.kind.as_str(), attr);
    }

    #[rstest]
    #[case(TextEncoding::WideBe, &[0x00, 0x3C, 0x00, 0xE9], Body::Encoded("&lt;&#233;".to_owned()))]
    #[case(TextEncoding::Legacy7Bit, b"<\x05", Body::Plain("<é".to_owned()))]
    fn body_escaping(#[case] encoding: TextEncoding, #[case] raw: &[u8], #[case] expected: Body) {
        let message = Message { raw_text: raw.to_vec(), encoding, ..Message::default() };
        assert_eq!(ExportedMessage::new(&message, UtcOffset::UTC).body, expected);
    }
}
