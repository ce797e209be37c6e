//! Big-endian UTF-16 ("wide") text.

/// Decode big-endian 16-bit code units, replacing unpaired surrogates and a
/// dangling odd byte with U+FFFD.
pub fn decode(raw: &[u8]) -> String {
    let chunks = raw.chunks_exact(2);
    let dangling = !chunks.remainder().is_empty();
    let units = chunks.map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
    let mut text: String = char::decode_utf16(units).map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER)).collect();
    if dangling {
        text.push(char::REPLACEMENT_CHARACTER);
    }
    text
}
