//! ISO-8859-1 text codec.
//!
//! Every byte maps to the code point of the same value, so decoding never
//! fails and never loses a byte.

pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Encode text back to single bytes. Returns `None` if any character lies
/// outside U+0000..=U+00FF.
pub fn encode(text: &str) -> Option<Vec<u8>> {
    text.chars().map(|c| u8::try_from(u32::from(c)).ok()).collect()
}
