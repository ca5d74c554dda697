//! Character set handling.
//!
//! Stylesheets decide the encoding of the HTML we write, through
//! `xsl:output/@encoding`. The encoding declared by the XML document itself
//! only matters for decoding it.

use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use encoding_rs::{EncoderResult, Encoding, UTF_8};
use thiserror::Error;

use crate::document::XmlDocument;

pub const DEFAULT_ENCODING: &str = "UTF-8";

const SHIFT_JIS: &str = "Shift_JIS";
const SHIFT_JIS_ALIASES: [&str; 5] = ["shift_jis", "shift-jis", "sjis", "ms932", "cp932"];

static XML_DECLARATION_ENCODING: LazyLock<regex::bytes::Regex> = LazyLock::new(|| {
    regex::bytes::Regex::new(r#"^<\?xml\s[^>]*?\bencoding\s*=\s*["']([A-Za-z0-9._:\-]+)["']"#)
        .unwrap()
});

/// Canonicalize a declared encoding name.
///
/// A missing or blank name means UTF-8, the usual spellings of Shift_JIS
/// (including the Windows code page 932 names) collapse into `Shift_JIS`,
/// and everything else passes through trimmed.
pub fn normalize(declared: Option<&str>) -> String {
    let declared = declared.map(str::trim).unwrap_or_default();
    if declared.is_empty() {
        return DEFAULT_ENCODING.to_string();
    }
    if SHIFT_JIS_ALIASES
        .iter()
        .any(|alias| alias.eq_ignore_ascii_case(declared))
    {
        return SHIFT_JIS.to_string();
    }
    declared.to_string()
}

/// The normalized output encoding a stylesheet declares.
///
/// This never fails: an unreadable or unparseable stylesheet, or one
/// without an `xsl:output` encoding, yields UTF-8.
pub fn declared_output_encoding(stylesheet: &Path) -> String {
    let declared = std::fs::read(stylesheet)
        .map_err(|e| e.to_string())
        .and_then(|bytes| decode_source(&bytes).map_err(|e| e.to_string()))
        .and_then(|text| XmlDocument::parse(text).map_err(|e| e.to_string()));
    match declared {
        Ok(document) => normalize(document.output_encoding()),
        Err(reason) => {
            log::debug!(
                "no output encoding read from {}, using {}: {}",
                stylesheet.display(),
                DEFAULT_ENCODING,
                reason
            );
            DEFAULT_ENCODING.to_string()
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unsupported encoding {0:?} in XML declaration")]
    UnknownEncoding(String),
    #[error("input is not valid {0}")]
    Malformed(&'static str),
}

/// Decode XML source bytes to text.
///
/// A byte order mark wins, then the `encoding` of the XML declaration, then
/// UTF-8. Malformed byte sequences are an error rather than being replaced.
pub fn decode_source(bytes: &[u8]) -> Result<String, DecodeError> {
    if let Some((encoding, bom_length)) = Encoding::for_bom(bytes) {
        return decode_with(encoding, &bytes[bom_length..]);
    }
    let encoding = match XML_DECLARATION_ENCODING.captures(bytes) {
        Some(captures) => {
            let label = &captures[1];
            // a declaration readable as ASCII rules out UTF-16
            Encoding::for_label(label)
                .map(Encoding::output_encoding)
                .ok_or_else(|| {
                    DecodeError::UnknownEncoding(String::from_utf8_lossy(label).into_owned())
                })?
        }
        None => UTF_8,
    };
    decode_with(encoding, bytes)
}

fn decode_with(encoding: &'static Encoding, bytes: &[u8]) -> Result<String, DecodeError> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
        .ok_or(DecodeError::Malformed(encoding.name()))
}

/// The encoding HTML output is written in.
///
/// Only encodings we can actually encode to are representable. Anything
/// else, such as an unknown label or UTF-16, becomes UTF-8 so that the
/// `<meta charset>` we declare always matches the bytes on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputEncoding(&'static Encoding);

impl OutputEncoding {
    pub fn from_declared(name: &str) -> Self {
        match Encoding::for_label(name.trim().as_bytes()) {
            Some(encoding) => {
                let output = encoding.output_encoding();
                if output != encoding {
                    log::warn!(
                        "cannot write HTML as {}, using {} instead",
                        encoding.name(),
                        output.name()
                    );
                }
                Self(output)
            }
            None => {
                log::warn!(
                    "unknown output encoding {:?}, using {}",
                    name,
                    DEFAULT_ENCODING
                );
                Self(UTF_8)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Encode text, writing `?` for characters this encoding cannot
    /// represent.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        if self.0 == UTF_8 {
            return text.as_bytes().to_vec();
        }
        let mut encoder = self.0.new_encoder();
        let mut out = Vec::with_capacity(
            encoder
                .max_buffer_length_from_utf8_without_replacement(text.len())
                .unwrap_or(text.len()),
        );
        let mut remaining = text;
        loop {
            let (result, read) =
                encoder.encode_from_utf8_to_vec_without_replacement(remaining, &mut out, true);
            remaining = &remaining[read..];
            match result {
                EncoderResult::InputEmpty => return out,
                EncoderResult::OutputFull => {
                    let needed = encoder
                        .max_buffer_length_from_utf8_without_replacement(remaining.len())
                        .unwrap_or(remaining.len());
                    out.reserve(needed.max(16));
                }
                EncoderResult::Unmappable(c) => {
                    log::debug!("{:?} cannot be encoded as {}", c, self.name());
                    out.push(b'?');
                }
            }
        }
    }
}

impl Default for OutputEncoding {
    fn default() -> Self {
        Self(UTF_8)
    }
}

impl fmt::Display for OutputEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_default() {
        assert_eq!(normalize(None), "UTF-8");
        assert_eq!(normalize(Some("")), "UTF-8");
        assert_eq!(normalize(Some("   ")), "UTF-8");
    }

    #[test]
    fn test_normalize_shift_jis_aliases() {
        for alias in ["shift_jis", "Shift-JIS", "SJIS", "ms932", "CP932", " sjis "] {
            assert_eq!(normalize(Some(alias)), "Shift_JIS", "alias {alias}");
        }
    }

    #[test]
    fn test_normalize_passes_through() {
        assert_eq!(normalize(Some(" euc-jp ")), "euc-jp");
        assert_eq!(normalize(Some("ISO-8859-1")), "ISO-8859-1");
    }

    #[test]
    fn test_declared_output_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.xsl");
        std::fs::write(
            &path,
            r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:output method="html" encoding="cp932"/>
</xsl:stylesheet>"#,
        )
        .unwrap();
        assert_eq!(declared_output_encoding(&path), "Shift_JIS");
    }

    #[test]
    fn test_declared_output_encoding_other_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.xsl");
        std::fs::write(
            &path,
            r#"<t:transform version="1.0" xmlns:t="http://www.w3.org/1999/XSL/Transform">
  <t:output encoding="EUC-JP"/>
</t:transform>"#,
        )
        .unwrap();
        assert_eq!(declared_output_encoding(&path), "EUC-JP");
    }

    #[test]
    fn test_declared_output_encoding_falls_back() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.xsl");
        assert_eq!(declared_output_encoding(&missing), "UTF-8");

        let broken = dir.path().join("broken.xsl");
        std::fs::write(&broken, "<xsl:stylesheet").unwrap();
        assert_eq!(declared_output_encoding(&broken), "UTF-8");

        let no_output = dir.path().join("plain.xsl");
        std::fs::write(
            &no_output,
            r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform"/>"#,
        )
        .unwrap();
        assert_eq!(declared_output_encoding(&no_output), "UTF-8");

        // output in a foreign namespace is not an XSLT output declaration
        let foreign = dir.path().join("foreign.xsl");
        std::fs::write(
            &foreign,
            r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform" xmlns:o="urn:other">
  <o:output encoding="Shift_JIS"/>
</xsl:stylesheet>"#,
        )
        .unwrap();
        assert_eq!(declared_output_encoding(&foreign), "UTF-8");
    }

    #[test]
    fn test_decode_source_declared_encoding() {
        let (bytes, _, _) = encoding_rs::SHIFT_JIS
            .encode("<?xml version=\"1.0\" encoding=\"Shift_JIS\"?><p>お知らせ</p>");
        let text = decode_source(&bytes).unwrap();
        assert!(text.ends_with("<p>お知らせ</p>"));
    }

    #[test]
    fn test_decode_source_utf16_without_bom() {
        let text = "<?xml version=\"1.0\" encoding=\"UTF-16\"?><a/>";
        assert_eq!(decode_source(text.as_bytes()).unwrap(), text);
    }

    #[test]
    fn test_decode_source_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("<p>é</p>".as_bytes());
        assert_eq!(decode_source(&bytes).unwrap(), "<p>é</p>");
    }

    #[test]
    fn test_decode_source_errors() {
        assert_eq!(
            decode_source(b"<?xml version=\"1.0\" encoding=\"x-nope\"?><a/>"),
            Err(DecodeError::UnknownEncoding("x-nope".to_string()))
        );
        assert_eq!(
            decode_source(b"<a>\xff\xfe\xfd</a>"),
            Err(DecodeError::Malformed("UTF-8"))
        );
    }

    #[test]
    fn test_output_encoding_names() {
        assert_eq!(OutputEncoding::from_declared("Shift_JIS").name(), "Shift_JIS");
        assert_eq!(OutputEncoding::from_declared("utf-8").name(), "UTF-8");
        assert_eq!(OutputEncoding::from_declared("UTF-16").name(), "UTF-8");
        assert_eq!(OutputEncoding::from_declared("no-such-thing").name(), "UTF-8");
        assert_eq!(OutputEncoding::default().name(), "UTF-8");
    }

    #[test]
    fn test_encode_replaces_unmappable() {
        let sjis = OutputEncoding::from_declared("Shift_JIS");
        let bytes = sjis.encode("日本😀語");
        let (decoded, _, had_errors) = encoding_rs::SHIFT_JIS.decode(&bytes);
        assert!(!had_errors);
        assert_eq!(decoded, "日本?語");
    }

    #[test]
    fn test_encode_utf8_is_verbatim() {
        let text = "<p>日本😀語</p>";
        assert_eq!(OutputEncoding::default().encode(text), text.as_bytes());
    }
}
