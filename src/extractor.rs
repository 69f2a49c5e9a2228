use crate::packet::{Strategy, XmpPacket};
use crate::scanner::{IndirectObject, ObjectScanner};
use crate::text::{decode_utf8, Latin1Text, TextEncoding};
use crate::{filters, patterns, ExtractorConfig, Result, XmpError};
use std::path::Path;
use tracing::{debug, warn};

const XPACKET_OPEN: &[u8] = b"<?xpacket";
const XMPMETA_CLOSE: &[u8] = b"</x:xmpmeta>";

// ── XmpExtractor ─────────────────────────────────────────────────────────────

/// Recovers the XMP packet embedded in a PDF without building an object graph.
///
/// Four detection steps run in order and the first hit wins:
///
/// 1. an `<?xpacket ?>` … `<?xpacket ?>` span anywhere in the file;
/// 2. a bare `<x:xmpmeta>` element anywhere in the file;
/// 3. the stream of each object that looks like metadata, inflated when it
///    declares `/FlateDecode`, searched for (1) or (2);
/// 4. the raw bytes from `<?xpacket` to the next `</x:xmpmeta>`.
///
/// Malformed input never produces an error: a stream that fails to inflate is
/// logged and skipped.
///
/// ```
/// use pdfxmp::XmpExtractor;
///
/// let pdf = b"%PDF-1.4\n<x:xmpmeta xmlns:x=\"adobe:ns:meta/\"></x:xmpmeta>\n%%EOF";
/// let packet = XmpExtractor::new().extract(pdf).unwrap();
/// assert!(packet.to_text().starts_with("<x:xmpmeta"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct XmpExtractor {
    config: ExtractorConfig,
}

impl XmpExtractor {
    // ── Constructors ──────────────────────────────────────────────────────────

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ExtractorConfig) -> Self {
        Self { config }
    }

    // ── Extraction ────────────────────────────────────────────────────────────

    /// Run the detection cascade over an in-memory PDF.
    ///
    /// Returns `None` when no step finds a packet. The buffer is only read.
    pub fn extract(&self, data: &[u8]) -> Option<XmpPacket> {
        let view = Latin1Text::from_bytes(data);

        let packet = scan_text(&view)
            .or_else(|| self.scan_objects(&view))
            .or_else(|| scan_raw_bytes(data));

        match &packet {
            Some(p) => debug!(strategy = %p.strategy(), bytes = p.len(), "found XMP packet"),
            None => debug!(bytes = data.len(), "no XMP packet found"),
        }

        packet
    }

    /// Read a PDF from disk and extract its packet.
    ///
    /// Fails with [`XmpError::FileTooLarge`] before reading when the file is
    /// larger than [`ExtractorConfig::max_file_size`], and with
    /// [`XmpError::NoXmpFound`] when the cascade comes up empty.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> Result<XmpPacket> {
        let path = path.as_ref();

        if let Some(limit) = self.config.max_file_size {
            let size = std::fs::metadata(path)?.len();
            if size > limit {
                return Err(XmpError::FileTooLarge { size, limit });
            }
        }

        let data = std::fs::read(path)?;
        self.extract(&data).ok_or(XmpError::NoXmpFound)
    }

    // ── Private: object/stream scan ──────────────────────────────────────────

    fn scan_objects(&self, view: &Latin1Text) -> Option<XmpPacket> {
        ObjectScanner::new(view.as_str())
            .filter(IndirectObject::is_metadata_candidate)
            .find_map(|object| self.scan_object_stream(view, &object))
    }

    fn scan_object_stream(
        &self,
        view: &Latin1Text,
        object: &IndirectObject<'_>,
    ) -> Option<XmpPacket> {
        let stream = object.stream()?;
        let raw = view.slice_bytes(stream.data_range.clone())?;

        let inflated = stream.declares_flate();
        let content = if inflated {
            self.try_inflate(object, &raw)?
        } else {
            raw
        };

        // Non-UTF-8 content is matched on its byte-per-char view so the packet
        // keeps the stream's original bytes.
        let decoded = decode_utf8(&content);
        let range = patterns::find_packet(&decoded.text)?;
        let bytes = match decoded.encoding {
            TextEncoding::Utf8 => content.get(range)?.to_vec(),
            TextEncoding::Latin1Fallback => Latin1Text::from_bytes(&content).slice_bytes(range)?,
        };

        Some(XmpPacket::new(
            bytes,
            Strategy::ObjectStream {
                object: object.number,
                generation: object.generation,
                inflated,
            },
        ))
    }

    /// One candidate's decompression; failure only skips this object.
    fn try_inflate(&self, object: &IndirectObject<'_>, raw: &[u8]) -> Option<Vec<u8>> {
        match filters::inflate(raw, self.config.max_inflated_size) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(
                    object = object.number,
                    generation = object.generation,
                    error = %e,
                    "skipping metadata stream that failed to inflate"
                );
                None
            }
        }
    }
}

/// Extract with the default configuration.
pub fn extract_xmp(data: &[u8]) -> Option<XmpPacket> {
    XmpExtractor::new().extract(data)
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn scan_text(view: &Latin1Text) -> Option<XmpPacket> {
    if let Some(range) = patterns::find_xpacket_pair(view.as_str()) {
        return view
            .slice_bytes(range)
            .map(|bytes| XmpPacket::new(bytes, Strategy::XpacketPair));
    }

    let range = patterns::find_xmpmeta(view.as_str())?;
    view.slice_bytes(range)
        .map(|bytes| XmpPacket::new(bytes, Strategy::XmpMeta))
}

fn scan_raw_bytes(data: &[u8]) -> Option<XmpPacket> {
    let start = find_bytes(data, XPACKET_OPEN)?;
    let end = start + find_bytes(&data[start..], XMPMETA_CLOSE)? + XMPMETA_CLOSE.len();
    Some(XmpPacket::new(data[start..end].to_vec(), Strategy::RawBytes))
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
