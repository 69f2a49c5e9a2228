// Fixture builders shared by the integration tests. PDFs are assembled in
// memory so the tests need no files on disk.

#![allow(dead_code)]

use flate2::{write::ZlibEncoder, Compression};
use std::io::Write;

pub const SAMPLE_XMP: &str = concat!(
    "<?xpacket begin=\"\u{feff}\" id=\"W5M0MpCehiHzreSzNTczkc9d\"?>\n",
    "<x:xmpmeta xmlns:x=\"adobe:ns:meta/\">\n",
    " <rdf:RDF xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\">\n",
    "  <rdf:Description rdf:about=\"\"\n",
    "    xmlns:dc=\"http://purl.org/dc/elements/1.1/\"\n",
    "    xmlns:pdfaid=\"http://www.aiim.org/pdfa/ns/id/\"\n",
    "    pdfaid:part=\"3\" pdfaid:conformance=\"B\">\n",
    "   <dc:title><rdf:Alt><rdf:li xml:lang=\"x-default\">Jahresbericht \u{e4}\u{f6}\u{fc}</rdf:li></rdf:Alt></dc:title>\n",
    "  </rdf:Description>\n",
    " </rdf:RDF>\n",
    "</x:xmpmeta>\n",
    "<?xpacket end=\"w\"?>"
);

/// The `x:xmpmeta` element inside [`SAMPLE_XMP`].
pub fn sample_xmpmeta() -> &'static str {
    let start = SAMPLE_XMP.find("<x:xmpmeta").unwrap();
    let end = SAMPLE_XMP.find("</x:xmpmeta>").unwrap() + "</x:xmpmeta>".len();
    &SAMPLE_XMP[start..end]
}

/// zlib-compress `data`, choosing a level whose output does not end in a
/// carriage return (which would merge into the `\r\n` before `endstream`).
pub fn deflate(data: &[u8]) -> Vec<u8> {
    (1..=9)
        .map(|level| {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(level));
            encoder.write_all(data).unwrap();
            encoder.finish().unwrap()
        })
        .find(|packed| packed.last() != Some(&b'\r'))
        .expect("some compression level avoids a trailing CR")
}

/// A stream object body: dictionary plus `stream … endstream`.
pub fn stream_object(dict_entries: &str, data: &[u8]) -> Vec<u8> {
    let mut body = format!("<< {dict_entries} /Length {} >>\nstream\r\n", data.len()).into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(b"\r\nendstream");
    body
}

/// A `/Type /Metadata` stream object, compressed when `flate` is set.
pub fn metadata_object(xmp: &[u8], flate: bool) -> Vec<u8> {
    if flate {
        stream_object("/Type /Metadata /Subtype /XML /Filter /FlateDecode", &deflate(xmp))
    } else {
        stream_object("/Type /Metadata /Subtype /XML", xmp)
    }
}

/// Assemble a PDF from object bodies numbered 1.. in order. Object 1 should be
/// the catalog. The xref offsets are real so the file is also readable by
/// ordinary PDF tools.
pub fn build_pdf(objects: &[Vec<u8>]) -> Vec<u8> {
    let mut out = b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());

    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_at = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for offset in offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    out
}

/// Catalog, page tree and one empty page; `metadata` becomes object 4.
pub fn simple_pdf(metadata: Option<Vec<u8>>) -> Vec<u8> {
    let catalog = if metadata.is_some() {
        "<< /Type /Catalog /Pages 2 0 R /Metadata 4 0 R >>"
    } else {
        "<< /Type /Catalog /Pages 2 0 R >>"
    };
    let mut objects = vec![
        catalog.as_bytes().to_vec(),
        b"<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_vec(),
        b"<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] >>".to_vec(),
    ];
    objects.extend(metadata);
    build_pdf(&objects)
}
