//! Matchers for the two textual shapes an XMP packet takes.
//!
//! Both are lazy, case-insensitive and compiled once. The `regex` crate runs in
//! time linear in the haystack, so hostile input cannot trigger runaway
//! backtracking.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// `<?xpacket … ?>` followed by the next `<?xpacket … ?>`.
static XPACKET_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<\?xpacket[\s\S]*?\?>[\s\S]*?<\?xpacket[\s\S]*?\?>")
        .expect("xpacket pattern is valid")
});

/// A complete `<x:xmpmeta …>…</x:xmpmeta>` element.
static XMPMETA_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<x:xmpmeta[\s\S]*?</x:xmpmeta>").expect("xmpmeta pattern is valid")
});

/// First span running from an opening `<?xpacket` through the close of the
/// next xpacket instruction.
pub fn find_xpacket_pair(text: &str) -> Option<Range<usize>> {
    XPACKET_PAIR.find(text).map(|m| m.range())
}

/// First complete `x:xmpmeta` element.
pub fn find_xmpmeta(text: &str) -> Option<Range<usize>> {
    XMPMETA_ELEMENT.find(text).map(|m| m.range())
}

/// Wrapped packet if there is one, otherwise a bare `x:xmpmeta` element.
pub fn find_packet(text: &str) -> Option<Range<usize>> {
    find_xpacket_pair(text).or_else(|| find_xmpmeta(text))
}
