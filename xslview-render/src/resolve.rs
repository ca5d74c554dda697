//! Deciding which stylesheet may render an XML document.
//!
//! A document `name.xml` is rendered by `name.xsl`. By default that file is
//! looked up next to the document. An `xml-stylesheet` processing
//! instruction may point somewhere else, but the file it names must still
//! be called `name.xsl`; anything else is refused outright.

use std::path::{Path, PathBuf};

use crate::document::XmlDocument;
use crate::error::{Error, Result};

/// Where a resolved stylesheet came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StylesheetOrigin {
    /// Named by an `xml-stylesheet` processing instruction.
    Declared { href: String },
    /// Found by naming convention next to the document.
    Convention,
}

/// An existing stylesheet file that satisfies the naming rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStylesheet {
    path: PathBuf,
    origin: StylesheetOrigin,
}

impl ResolvedStylesheet {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn origin(&self) -> &StylesheetOrigin {
        &self.origin
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

/// The file name of the stylesheet for `xml_path`: its stem plus `.xsl`.
pub fn expected_stylesheet_name(xml_path: &Path) -> String {
    let stem = xml_path
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    format!("{stem}.xsl")
}

/// Resolve the stylesheet for `xml_path`, whose parsed content is
/// `document`.
pub fn resolve_stylesheet(xml_path: &Path, document: &XmlDocument) -> Result<ResolvedStylesheet> {
    let expected = expected_stylesheet_name(xml_path);
    let xml_dir = xml_path.parent().unwrap_or_else(|| Path::new(""));

    let href = document
        .stylesheet_href()
        .map_err(|e| Error::MalformedInput {
            xml_path: xml_path.to_path_buf(),
            message: e.to_string(),
            span: None,
        })?
        .filter(|href| !href.is_empty());

    let (candidate, origin) = match href {
        Some(href) => {
            let href_name = Path::new(&href)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            if href_name != expected {
                return Err(Error::PolicyViolation {
                    xml_path: xml_path.to_path_buf(),
                    expected,
                    href,
                });
            }
            (xml_dir.join(&href), StylesheetOrigin::Declared { href })
        }
        None => (xml_dir.join(&expected), StylesheetOrigin::Convention),
    };

    let not_found = |candidate: PathBuf| Error::StylesheetNotFound {
        xml_path: xml_path.to_path_buf(),
        expected: expected.clone(),
        candidate,
    };
    if !candidate.is_file() {
        let candidate = std::path::absolute(&candidate).unwrap_or(candidate);
        return Err(not_found(candidate));
    }
    let path = candidate
        .canonicalize()
        .map_err(|_| not_found(candidate.clone()))?;

    log::debug!(
        "stylesheet for {} is {} ({:?})",
        xml_path.display(),
        path.display(),
        origin
    );
    Ok(ResolvedStylesheet { path, origin })
}
