//! Stream filter decoding. Only FlateDecode is supported.

use crate::{Result, XmpError};
use flate2::read::ZlibDecoder;
use std::io::Read;

/// Inflate a zlib/DEFLATE stream, refusing to produce more than `limit` bytes.
pub fn inflate(data: &[u8], limit: usize) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data).take((limit as u64).saturating_add(1));
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| XmpError::Decompression(e.to_string()))?;

    if decompressed.len() > limit {
        return Err(XmpError::Decompression(format!(
            "inflated data exceeds {limit} bytes"
        )));
    }

    Ok(decompressed)
}
