use std::ops::Range;
use std::path::PathBuf;

use thiserror::Error;

/// The category of a rendering failure.
///
/// Callers that only care about what went wrong, not the details, can
/// match on this instead of on [`Error`] itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    PolicyViolation,
    MalformedInput,
    MalformedStylesheet,
    TransformFailed,
    WriteFailed,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("XML file not found: {}", xml_path.display())]
    XmlNotFound { xml_path: PathBuf },
    #[error(
        "stylesheet not found for {}: expected {expected} at {}",
        xml_path.display(),
        candidate.display()
    )]
    StylesheetNotFound {
        xml_path: PathBuf,
        expected: String,
        candidate: PathBuf,
    },
    #[error(
        "xml-stylesheet href of {} does not follow the naming rule: expected {expected}, found {href}",
        xml_path.display()
    )]
    PolicyViolation {
        xml_path: PathBuf,
        expected: String,
        href: String,
    },
    #[error("malformed XML in {}: {message}", xml_path.display())]
    MalformedInput {
        xml_path: PathBuf,
        message: String,
        span: Option<Range<usize>>,
    },
    #[error("malformed stylesheet {}: {message}", stylesheet.display())]
    MalformedStylesheet {
        stylesheet: PathBuf,
        message: String,
        span: Option<Range<usize>>,
    },
    #[error(
        "transform of {} with {} failed: {message}",
        xml_path.display(),
        stylesheet.display()
    )]
    TransformFailed {
        xml_path: PathBuf,
        stylesheet: PathBuf,
        message: String,
    },
    #[error("cannot write {}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::XmlNotFound { .. } | Error::StylesheetNotFound { .. } => ErrorKind::NotFound,
            Error::PolicyViolation { .. } => ErrorKind::PolicyViolation,
            Error::MalformedInput { .. } => ErrorKind::MalformedInput,
            Error::MalformedStylesheet { .. } => ErrorKind::MalformedStylesheet,
            Error::TransformFailed { .. } => ErrorKind::TransformFailed,
            Error::WriteFailed { .. } => ErrorKind::WriteFailed,
        }
    }

    /// The file whose text a span in this error points into, if any.
    pub fn source_path(&self) -> Option<&std::path::Path> {
        match self {
            Error::MalformedInput {
                xml_path,
                span: Some(_),
                ..
            } => Some(xml_path),
            Error::MalformedStylesheet {
                stylesheet,
                span: Some(_),
                ..
            } => Some(stylesheet),
            _ => None,
        }
    }

    /// Byte range in the decoded source text that the error refers to.
    pub fn span(&self) -> Option<Range<usize>> {
        match self {
            Error::MalformedInput { span, .. } | Error::MalformedStylesheet { span, .. } => {
                span.clone()
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    #[test]
    fn test_policy_violation_message() {
        let e = Error::PolicyViolation {
            xml_path: PathBuf::from("docs/invoice.xml"),
            expected: "invoice.xsl".to_string(),
            href: "wrong.xsl".to_string(),
        };
        assert_eq!(e.kind(), ErrorKind::PolicyViolation);
        assert_snapshot!(e.to_string(), @"xml-stylesheet href of docs/invoice.xml does not follow the naming rule: expected invoice.xsl, found wrong.xsl");
    }

    #[test]
    fn test_not_found_kinds() {
        let xml = Error::XmlNotFound {
            xml_path: PathBuf::from("a.xml"),
        };
        let xsl = Error::StylesheetNotFound {
            xml_path: PathBuf::from("a.xml"),
            expected: "a.xsl".to_string(),
            candidate: PathBuf::from("/tmp/a.xsl"),
        };
        assert_eq!(xml.kind(), ErrorKind::NotFound);
        assert_eq!(xsl.kind(), ErrorKind::NotFound);
        assert_snapshot!(xsl.to_string(), @"stylesheet not found for a.xml: expected a.xsl at /tmp/a.xsl");
    }

    #[test]
    fn test_span_only_for_parse_errors() {
        let e = Error::MalformedInput {
            xml_path: PathBuf::from("a.xml"),
            message: "unclosed tag".to_string(),
            span: Some(3..5),
        };
        assert_eq!(e.span(), Some(3..5));
        assert_eq!(e.source_path(), Some(std::path::Path::new("a.xml")));

        let e = Error::TransformFailed {
            xml_path: PathBuf::from("a.xml"),
            stylesheet: PathBuf::from("a.xsl"),
            message: "boom".to_string(),
        };
        assert_eq!(e.span(), None);
        assert_eq!(e.source_path(), None);
    }
}
