//! # pdfxmp
//!
//! A Rust library for recovering the XMP metadata packet embedded in a PDF.
//!
//! ## What this crate does
//!
//! 1. **Find wrapped packets** — locates an `<?xpacket ?>` … `<?xpacket ?>`
//!    span anywhere in the file bytes.
//! 2. **Find bare packets** — falls back to a lone `<x:xmpmeta>` element.
//! 3. **Decode metadata streams** — scans indirect objects that look like
//!    `/Type /Metadata` or `/Subtype /XML`, inflates `/FlateDecode` streams and
//!    searches the result.
//! 4. **Raw fallback** — slices the bytes from `<?xpacket` to `</x:xmpmeta>`.
//!
//! No PDF object graph is built and no cross-reference table is read, so
//! damaged or unusual files still yield their metadata when it is there.
//!
//! The [`server`] module wraps the extractor in a small upload service.
//!
//! ## Quick example
//!
//! ```no_run
//! use pdfxmp::XmpExtractor;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let packet = XmpExtractor::new().extract_file("report.pdf")?;
//!
//! println!("found via {}", packet.strategy());
//! if let Some(level) = packet.pdfa_conformance() {
//!     println!("declares {level}");
//! }
//! std::fs::write("report_xmp.xml", packet.to_text().as_bytes())?;
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

mod extractor;
mod filters;
mod packet;
pub mod patterns;
pub mod scanner;
pub mod server;
pub mod text;

pub use extractor::{extract_xmp, XmpExtractor};
pub use packet::{PdfAConformance, Strategy, XmpPacket};
pub use text::{Latin1Text, TextEncoding};

/// Upload ceiling used by the service and the CLI: 20 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 20 * 1024 * 1024;

/// Cap on the output of a single inflated stream: 64 MiB.
pub const DEFAULT_MAX_INFLATED_SIZE: usize = 64 * 1024 * 1024;

// ── Configuration ────────────────────────────────────────────────────────────

/// Runtime configuration for [`XmpExtractor`].
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// If set, [`XmpExtractor::extract_file`] returns
    /// [`XmpError::FileTooLarge`] for larger files without reading them.
    pub max_file_size: Option<u64>,

    /// Upper bound on the decompressed size of one metadata stream. A stream
    /// that inflates past it is skipped like any other undecodable stream.
    pub max_inflated_size: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_file_size: None,
            max_inflated_size: DEFAULT_MAX_INFLATED_SIZE,
        }
    }
}

// ── Error type ───────────────────────────────────────────────────────────────

/// Every error that this crate can produce.
#[derive(Error, Debug)]
pub enum XmpError {
    /// A filesystem I/O error occurred while reading the PDF.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stream declared `/FlateDecode` but did not inflate.
    #[error("Failed to inflate stream: {0}")]
    Decompression(String),

    /// The file is larger than the configured `max_file_size`.
    #[error("File is {size} bytes, the limit is {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    /// No detection step found a packet.
    #[error("No XMP metadata found in this PDF")]
    NoXmpFound,
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, XmpError>;
