//! Typed text views over raw PDF bytes.
//!
//! Two conversions exist and they are deliberately separate types:
//!
//! - [`Latin1Text`] maps every byte to exactly one `char` (U+0000..=U+00FF).
//!   The mapping is lossless, so any matched range can be turned back into the
//!   original bytes with [`Latin1Text::slice_bytes`].
//! - [`decode_utf8`] interprets bytes as UTF-8 and reports, through
//!   [`TextEncoding`], whether it had to fall back to the byte-preserving
//!   decoding.

use std::borrow::Cow;
use std::ops::Range;

// ── Latin1Text ───────────────────────────────────────────────────────────────

/// Byte-preserving single-byte-per-character view of a buffer.
///
/// Only constructible from bytes, so every `char` it holds is ≤ U+00FF and the
/// reverse mapping in [`slice_bytes`](Self::slice_bytes) is total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Latin1Text {
    text: String,
}

impl Latin1Text {
    /// Build the view. Bytes ≥ 0x80 become the code point of the same value.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            text: bytes.iter().map(|&b| char::from(b)).collect(),
        }
    }

    /// The view as a `&str` for pattern matching.
    ///
    /// Offsets into this string are UTF-8 offsets, not byte offsets into the
    /// source buffer; use [`slice_bytes`](Self::slice_bytes) to go back.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Restore the source bytes for a range of [`as_str`](Self::as_str).
    ///
    /// Returns `None` when the range is out of bounds or does not fall on
    /// `char` boundaries.
    pub fn slice_bytes(&self, range: Range<usize>) -> Option<Vec<u8>> {
        self.text.get(range).map(latin1_to_bytes)
    }
}

/// Reverse of [`Latin1Text::from_bytes`] for any sub-slice of its text.
///
/// Every char in a `Latin1Text` is ≤ U+00FF, so the cast never truncates.
fn latin1_to_bytes(text: &str) -> Vec<u8> {
    text.chars().map(|c| c as u8).collect()
}

// ── UTF-8 view ───────────────────────────────────────────────────────────────

/// How a byte sequence was turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// The bytes were valid UTF-8.
    Utf8,
    /// The bytes were not valid UTF-8 and were decoded one byte per char.
    Latin1Fallback,
}

/// Text produced by [`decode_utf8`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText<'a> {
    /// The decoded text.
    pub text: Cow<'a, str>,
    /// Which decoding produced `text`.
    pub encoding: TextEncoding,
}

/// Decode bytes as UTF-8, falling back to the byte-preserving decoding.
pub fn decode_utf8(bytes: &[u8]) -> DecodedText<'_> {
    match std::str::from_utf8(bytes) {
        Ok(text) => DecodedText {
            text: Cow::Borrowed(text),
            encoding: TextEncoding::Utf8,
        },
        Err(_) => DecodedText {
            text: Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
            encoding: TextEncoding::Latin1Fallback,
        },
    }
}
