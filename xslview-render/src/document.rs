use std::borrow::Cow;
use std::io;
use std::ops::Range;
use std::path::Path;

use thiserror::Error;
use xot::{Node, Xot};

use crate::charset::{decode_source, DecodeError};
use crate::error::{Error, Result};

pub const XSLT_NAMESPACE: &str = "http://www.w3.org/1999/XSL/Transform";
const STYLESHEET_PI_TARGET: &str = "xml-stylesheet";

/// A parsed XML document together with the text it was parsed from.
pub struct XmlDocument {
    xot: Xot,
    root: Node,
    text: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PseudoAttributeError {
    #[error("cannot split xml-stylesheet pseudo-attributes: {0:?}")]
    Unbalanced(String),
}

enum ReadError {
    NotFound,
    Io(io::Error),
    Decode(DecodeError),
}

impl ReadError {
    fn message(&self) -> String {
        match self {
            ReadError::NotFound => "file not found".to_string(),
            ReadError::Io(e) => e.to_string(),
            ReadError::Decode(e) => e.to_string(),
        }
    }
}

fn read_text(path: &Path) -> std::result::Result<String, ReadError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ReadError::NotFound,
        _ => ReadError::Io(e),
    })?;
    decode_source(&bytes).map_err(ReadError::Decode)
}

impl XmlDocument {
    /// Parse `text`. A document type declaration is accepted but not
    /// interpreted.
    pub fn parse(text: String) -> std::result::Result<Self, xot::ParseError> {
        let mut xot = Xot::new();
        let root = xot.parse(&blank_doctype(&text))?;
        Ok(Self { xot, root, text })
    }

    /// Load the XML document to be rendered.
    pub fn load(xml_path: &Path) -> Result<Self> {
        let text = read_text(xml_path).map_err(|e| match e {
            ReadError::NotFound => Error::XmlNotFound {
                xml_path: xml_path.to_path_buf(),
            },
            e => Error::MalformedInput {
                xml_path: xml_path.to_path_buf(),
                message: e.message(),
                span: None,
            },
        })?;
        Self::parse(text).map_err(|e| Error::MalformedInput {
            xml_path: xml_path.to_path_buf(),
            message: e.to_string(),
            span: Some(e.span().range()),
        })
    }

    /// Load a stylesheet as an XML document.
    ///
    /// The stylesheet has already been resolved, so even a missing file is
    /// reported as a malformed stylesheet.
    pub fn load_stylesheet(stylesheet: &Path) -> Result<Self> {
        let text = read_text(stylesheet).map_err(|e| Error::MalformedStylesheet {
            stylesheet: stylesheet.to_path_buf(),
            message: e.message(),
            span: None,
        })?;
        Self::parse(text).map_err(|e| Error::MalformedStylesheet {
            stylesheet: stylesheet.to_path_buf(),
            message: e.to_string(),
            span: Some(e.span().range()),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The `href` of the `xml-stylesheet` processing instruction closest
    /// to the document element.
    ///
    /// Only processing instructions before the document element count. One
    /// without any data is skipped; one with data but no `href` ends the
    /// search with `None`.
    pub fn stylesheet_href(&self) -> std::result::Result<Option<String>, PseudoAttributeError> {
        let Ok(document_element) = self.xot.document_element(self.root) else {
            return Ok(None);
        };
        let mut node = self.xot.previous_sibling(document_element);
        while let Some(current) = node {
            if let Some(pi) = self.xot.processing_instruction(current) {
                if self.xot.local_name_str(pi.target()) == STYLESHEET_PI_TARGET {
                    if let Some(data) = pi.data().filter(|data| !data.is_empty()) {
                        return pseudo_attribute(data, "href");
                    }
                }
            }
            node = self.xot.previous_sibling(current);
        }
        Ok(None)
    }

    /// The `encoding` of the first top-level `xsl:output` declaration, when
    /// this document is a stylesheet.
    pub fn output_encoding(&self) -> Option<&str> {
        self.output_attribute("encoding")
    }

    /// The `method` of the first top-level `xsl:output` declaration.
    pub fn output_method(&self) -> Option<&str> {
        self.output_attribute("method")
    }

    fn output_attribute(&self, attribute: &str) -> Option<&str> {
        let document_element = self.xot.document_element(self.root).ok()?;
        let namespace = self.xot.namespace(XSLT_NAMESPACE)?;
        let output = self.xot.name_ns("output", namespace)?;
        let attribute = self.xot.name(attribute)?;
        let declaration = self
            .xot
            .children(document_element)
            .find(|child| {
                self.xot
                    .element(*child)
                    .is_some_and(|element| element.name() == output)
            })?;
        self.xot.get_attribute(declaration, attribute)
    }
}

// Replace the document type declaration with whitespace of the same byte
// length, so parse error spans still point into the original text.
fn blank_doctype(text: &str) -> Cow<'_, str> {
    let Some(range) = doctype_span(text) else {
        return Cow::Borrowed(text);
    };
    let mut blanked = String::with_capacity(text.len());
    blanked.push_str(&text[..range.start]);
    for c in text[range.clone()].chars() {
        if matches!(c, '\n' | '\r') {
            blanked.push(c);
        } else {
            blanked.extend(std::iter::repeat(' ').take(c.len_utf8()));
        }
    }
    blanked.push_str(&text[range.end..]);
    Cow::Owned(blanked)
}

/// Byte range of the `<!DOCTYPE ...>` declaration in the prolog, including
/// any internal subset.
fn doctype_span(text: &str) -> Option<Range<usize>> {
    let mut position = 0;
    loop {
        let rest = &text[position..];
        let trimmed = rest.trim_start();
        position += rest.len() - trimmed.len();
        if trimmed.starts_with("<?") {
            position += trimmed.find("?>")? + 2;
        } else if trimmed.starts_with("<!--") {
            position += trimmed.find("-->")? + 3;
        } else if trimmed.starts_with("<!DOCTYPE") {
            let end = doctype_end(trimmed)?;
            return Some(position..position + end);
        } else {
            return None;
        }
    }
}

// Offset just past the `>` closing a declaration that starts at `text[0]`.
fn doctype_end(text: &str) -> Option<usize> {
    let mut quote = None;
    let mut in_subset = false;
    let mut index = 0;
    while let Some(c) = text[index..].chars().next() {
        match (quote, c) {
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => in_subset = true,
            (None, ']') => in_subset = false,
            (None, '<') if in_subset && text[index..].starts_with("<!--") => {
                index += text[index..].find("-->")? + 3;
                continue;
            }
            (None, '>') if !in_subset => return Some(index + 1),
            _ => {}
        }
        index += c.len_utf8();
    }
    None
}

/// Look up a pseudo-attribute in processing instruction data.
///
/// The data is split like a shell command line, so quotes group and are
/// removed; each word is then split on its first `=`. When a name repeats
/// the last value wins.
pub fn pseudo_attribute(
    data: &str,
    name: &str,
) -> std::result::Result<Option<String>, PseudoAttributeError> {
    let words =
        shlex::split(data).ok_or_else(|| PseudoAttributeError::Unbalanced(data.to_string()))?;
    Ok(words
        .into_iter()
        .filter_map(|word| {
            let (key, value) = word.split_once('=')?;
            (key == name).then(|| value.to_string())
        })
        .last())
}
