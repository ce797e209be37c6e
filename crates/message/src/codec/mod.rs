pub mod gsm;
pub mod wide;

/// How a message body is stored on the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    /// Big-endian UTF-16.
    WideBe,
    /// GSM 03.38, one septet per byte.
    #[default]
    Legacy7Bit,
}

impl TextEncoding {
    /// Marker value carried by the encoding field for wide text.
    const WIDE_MARKER: u8 = 2;

    /// Interpret the first byte of an encoding field. Empty data means legacy.
    pub fn from_marker(data: &[u8]) -> Self {
        match data.first() {
            Some(&Self::WIDE_MARKER) => Self::WideBe,
            _ => Self::Legacy7Bit,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WideBe => "UCS-2",
            Self::Legacy7Bit => "GSM 03.38",
        }
    }

    /// Decode raw body bytes. Total: unrepresentable input is substituted.
    pub fn decode(&self, raw: &[u8]) -> String {
        match self {
            Self::WideBe => wide::decode(raw),
            Self::Legacy7Bit => gsm::decode(raw),
        }
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[2], TextEncoding::WideBe)]
    #[case(&[2, 9], TextEncoding::WideBe)]
    #[case(&[0], TextEncoding::Legacy7Bit)]
    #[case(&[1], TextEncoding::Legacy7Bit)]
    #[case(&[], TextEncoding::Legacy7Bit)]
    fn from_marker(#[case] data: &[u8], #[case] expected: TextEncoding) {
        assert_eq!(TextEncoding::from_marker(data), expected);
    }

    #[test]
    fn dispatch() {
        assert_eq!(TextEncoding::WideBe.decode(&[0x00, 0x40]), "@");
        assert_eq!(TextEncoding::Legacy7Bit.decode(&[0x00]), "@");
    }
}
