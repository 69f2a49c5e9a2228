use crate::text::{decode_utf8, TextEncoding};
use std::borrow::Cow;
use std::fmt;

// ── Strategy ─────────────────────────────────────────────────────────────────

/// Which detection step recovered a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Two consecutive `<?xpacket ?>` instructions in the file text.
    XpacketPair,
    /// A bare `<x:xmpmeta>` element in the file text.
    XmpMeta,
    /// A metadata object's stream.
    ObjectStream {
        /// Object number of the stream's enclosing object.
        object: u64,
        /// Generation number of the stream's enclosing object.
        generation: u64,
        /// `true` when the stream was FlateDecode-compressed.
        inflated: bool,
    },
    /// Raw `<?xpacket` … `</x:xmpmeta>` byte slice.
    RawBytes,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::XpacketPair => f.write_str("xpacket wrapper"),
            Strategy::XmpMeta => f.write_str("bare x:xmpmeta element"),
            Strategy::ObjectStream {
                object,
                generation,
                inflated: true,
            } => write!(f, "FlateDecode stream of object {object} {generation}"),
            Strategy::ObjectStream {
                object, generation, ..
            } => write!(f, "stream of object {object} {generation}"),
            Strategy::RawBytes => f.write_str("raw byte scan"),
        }
    }
}

// ── XmpPacket ────────────────────────────────────────────────────────────────

/// An XMP packet recovered from a PDF.
///
/// `bytes` are exactly what the file (or the decompressed stream) contained;
/// [`to_text`](Self::to_text) normalises them to UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmpPacket {
    bytes: Vec<u8>,
    strategy: Strategy,
}

impl XmpPacket {
    pub(crate) fn new(bytes: Vec<u8>, strategy: Strategy) -> Self {
        Self { bytes, strategy }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// How the packet was found.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Whether [`to_text`](Self::to_text) decodes as UTF-8 or has to fall back
    /// to one char per byte.
    pub fn encoding(&self) -> TextEncoding {
        decode_utf8(&self.bytes).encoding
    }

    /// The packet as UTF-8 text.
    ///
    /// Packets that are not valid UTF-8 are decoded one byte per char rather
    /// than rejected; [`encoding`](Self::encoding) reports when that happened.
    pub fn to_text(&self) -> Cow<'_, str> {
        decode_utf8(&self.bytes).text
    }

    /// The PDF/A identification declared in the packet, if any.
    pub fn pdfa_conformance(&self) -> Option<PdfAConformance> {
        PdfAConformance::from_xmp(&self.to_text())
    }
}

// ── PdfAConformance ──────────────────────────────────────────────────────────

/// PDF/A part and conformance level from the `pdfaid` XMP schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdfAConformance {
    /// `pdfaid:part`, e.g. `3`.
    pub part: u8,
    /// `pdfaid:conformance`, one of `A`, `B` or `U`. Absent for PDF/A-4, which
    /// dropped conformance levels.
    pub level: Option<char>,
}

impl PdfAConformance {
    /// Parse the `pdfaid` properties in either serialisation form:
    /// - attribute syntax : `pdfaid:part="3"`
    /// - element syntax   : `<pdfaid:part>3</pdfaid:part>`
    pub fn from_xmp(xmp: &str) -> Option<Self> {
        let part = ["1", "2", "3", "4"]
            .into_iter()
            .find(|p| declares(xmp, "part", p))?
            .parse()
            .ok()?;

        // Level letters are case-sensitive in the schema.
        let level = ["A", "B", "U"]
            .into_iter()
            .find(|l| declares(xmp, "conformance", l))
            .and_then(|l| l.chars().next());

        Some(Self { part, level })
    }
}

fn declares(xmp: &str, property: &str, value: &str) -> bool {
    xmp.contains(&format!(r#"pdfaid:{property}="{value}""#))
        || xmp.contains(&format!("<pdfaid:{property}>{value}</pdfaid:{property}>"))
}

impl fmt::Display for PdfAConformance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PDF/A-{}", self.part)?;
        if let Some(level) = self.level {
            write!(f, "{level}")?;
        }
        Ok(())
    }
}
