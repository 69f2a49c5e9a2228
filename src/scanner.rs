//! Lightweight scanner for PDF indirect objects and their streams.
//!
//! No object model is built. An object is the text between an `N G obj` header
//! and the next literal `endobj`; a stream is the text between `stream` and
//! `endstream` inside that body. Each step is a bounded forward search, so a
//! scan over the whole file is linear in its length.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

// `\s` stays ASCII: over the byte-per-char view, Unicode `\s` would also
// accept 0x85 and 0xA0.

static OBJECT_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+)(?-u:\s)+([0-9]+)(?-u:\s)+obj")
        .expect("object header pattern is valid")
});

static METADATA_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Metadata|Type(?-u:\s)*/Metadata|/Subtype(?-u:\s)*/XML")
        .expect("metadata hint pattern is valid")
});

static STREAM_PAYLOAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)stream\r?\n([\s\S]*?)\r?\nendstream").expect("stream pattern is valid")
});

static FLATE_FILTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)/Filter(?-u:\s)*/FlateDecode|/Filter(?-u:\s)*\[[^\]]*?/FlateDecode")
        .expect("filter pattern is valid")
});

const END_OBJ: &str = "endobj";

// ── IndirectObject ───────────────────────────────────────────────────────────

/// One `N G obj … endobj` span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndirectObject<'a> {
    /// Object number.
    pub number: u64,
    /// Generation number.
    pub generation: u64,
    /// Text between `obj` and `endobj`.
    pub body: &'a str,
    body_start: usize,
}

impl<'a> IndirectObject<'a> {
    /// `true` when the body mentions metadata or an XML subtype.
    pub fn is_metadata_candidate(&self) -> bool {
        METADATA_HINT.is_match(self.body)
    }

    /// The first `stream … endstream` payload in the body, if any.
    pub fn stream(&self) -> Option<StreamPayload<'a>> {
        let caps = STREAM_PAYLOAD.captures(self.body)?;
        let data = caps.get(1)?;

        let dictionary = match self.body.find("stream") {
            Some(idx) => &self.body[..idx],
            None => self.body,
        };

        Some(StreamPayload {
            dictionary,
            data: data.as_str(),
            data_range: self.body_start + data.start()..self.body_start + data.end(),
        })
    }
}

// ── StreamPayload ────────────────────────────────────────────────────────────

/// Raw stream data plus the dictionary text that precedes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamPayload<'a> {
    /// Object body up to the first `stream` keyword.
    pub dictionary: &'a str,
    /// Stream data as it appears in the scanned text.
    pub data: &'a str,
    /// Position of `data` in the scanned text.
    pub data_range: Range<usize>,
}

impl StreamPayload<'_> {
    /// `true` for `/Filter /FlateDecode` or a filter array naming FlateDecode.
    pub fn declares_flate(&self) -> bool {
        FLATE_FILTER.is_match(self.dictionary)
    }
}

// ── ObjectScanner ────────────────────────────────────────────────────────────

/// Iterates over indirect objects in file order.
#[derive(Debug, Clone)]
pub struct ObjectScanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> ObjectScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

impl<'a> Iterator for ObjectScanner<'a> {
    type Item = IndirectObject<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.pos >= self.text.len() {
                return None;
            }

            let caps = OBJECT_HEADER.captures_at(self.text, self.pos)?;
            let header = caps.get(0)?;
            let body_start = header.end();

            // Any later header would close on this same `endobj` search, so a
            // missing terminator ends the scan.
            let Some(rel) = self.text[body_start..].find(END_OBJ) else {
                self.pos = self.text.len();
                return None;
            };
            let body_end = body_start + rel;
            self.pos = body_end + END_OBJ.len();

            let (Ok(number), Ok(generation)) = (caps[1].parse::<u64>(), caps[2].parse::<u64>())
            else {
                continue;
            };

            return Some(IndirectObject {
                number,
                generation,
                body: &self.text[body_start..body_end],
                body_start,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "%PDF-1.7\n\
        1 0 obj\n<< /Type /Catalog /Metadata 3 0 R >>\nendobj\n\
        2 0 obj\n<< /Length 5 >>\nstream\nhello\nendstream\nendobj\n\
        3 0 obj\n<< /Type /Metadata /Subtype /XML /Filter [ /ASCII85Decode /FlateDecode ] >>\n\
        stream\r\nDATA\r\nendstream\nendobj\n";

    #[test]
    fn objects_are_yielded_in_file_order() {
        let numbers: Vec<u64> = ObjectScanner::new(SAMPLE).map(|o| o.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn metadata_candidates_are_detected() {
        let flags: Vec<bool> = ObjectScanner::new(SAMPLE)
            .map(|o| o.is_metadata_candidate())
            .collect();
        assert_eq!(flags, vec![true, false, true]);
    }

    #[test]
    fn subtype_xml_alone_is_a_candidate() {
        let text = "7 0 obj << /SUBTYPE  /xml >> endobj";
        let obj = ObjectScanner::new(text).next().unwrap();
        assert!(obj.is_metadata_candidate());
    }

    #[test]
    fn stream_payload_and_dictionary_are_split() {
        let obj = ObjectScanner::new(SAMPLE).nth(2).unwrap();
        let stream = obj.stream().unwrap();
        assert_eq!(stream.data, "DATA");
        assert_eq!(&SAMPLE[stream.data_range.clone()], "DATA");
        assert!(stream.dictionary.contains("/Type /Metadata"));
        assert!(!stream.dictionary.contains("stream"));
        assert!(stream.declares_flate());
    }

    #[test]
    fn flate_declaration_forms() {
        let declares = |dict: &str| {
            let text = format!("1 0 obj {dict}\nstream\nx\nendstream endobj");
            let obj = ObjectScanner::new(&text).next().unwrap();
            obj.stream().unwrap().declares_flate()
        };
        assert!(declares("<< /Filter /FlateDecode >>"));
        assert!(declares("<</Filter/flatedecode>>"));
        assert!(declares("<< /Filter [/FlateDecode] >>"));
        assert!(declares("<< /Filter [ /ASCIIHexDecode /FlateDecode ] >>"));
        assert!(!declares("<< /Filter /LZWDecode >>"));
        assert!(!declares("<< /Length 1 >>"));
    }

    #[test]
    fn object_without_stream_has_no_payload() {
        let obj = ObjectScanner::new(SAMPLE).next().unwrap();
        assert!(obj.stream().is_none());
    }

    #[test]
    fn unterminated_object_ends_the_scan() {
        let text = "1 0 obj << >> endobj 2 0 obj << /Metadata";
        let objects: Vec<_> = ObjectScanner::new(text).collect();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].number, 1);
    }

    #[test]
    fn non_ascii_whitespace_does_not_separate_tokens() {
        let text = "4\u{85}0\u{a0}obj << /Type /Metadata >> endobj 5 0 obj x endobj";
        let numbers: Vec<u64> = ObjectScanner::new(text).map(|o| o.number).collect();
        assert_eq!(numbers, vec![5]);

        let dict =
            "6 0 obj << /Subtype\u{a0}/XML /Filter\u{85}/FlateDecode >>\nstream\nx\nendstream endobj";
        let obj = ObjectScanner::new(dict).next().unwrap();
        assert!(!METADATA_HINT.is_match("/Subtype\u{a0}/XML"));
        assert!(!obj.stream().unwrap().declares_flate());
    }

    #[test]
    fn oversized_numbers_are_skipped() {
        let text = "99999999999999999999999 0 obj x endobj 4 0 obj y endobj";
        let numbers: Vec<u64> = ObjectScanner::new(text).map(|o| o.number).collect();
        assert_eq!(numbers, vec![4]);
    }
}
