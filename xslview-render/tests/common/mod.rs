#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use xslview_render::{ProcessorError, XsltProcessor};

pub const XSLT_HEADER: &str =
    r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">"#;

/// A stylesheet with the given top-level declarations and a root template
/// producing `body`.
pub fn stylesheet(declarations: &str, body: &str) -> String {
    format!(
        "{XSLT_HEADER}\n{declarations}\n<xsl:template match=\"/\">{body}</xsl:template>\n</xsl:stylesheet>"
    )
}

pub fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Processor that ignores its input and returns fixed markup, recording
/// the stylesheet paths it was called with.
pub struct CannedProcessor {
    html: Result<String, ProcessorError>,
    pub calls: RefCell<Vec<PathBuf>>,
}

impl CannedProcessor {
    pub fn new(html: &str) -> Self {
        Self {
            html: Ok(html.to_string()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(error: ProcessorError) -> Self {
        Self {
            html: Err(error),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl XsltProcessor for CannedProcessor {
    fn transform(
        &self,
        _source: &str,
        _stylesheet: &str,
        stylesheet_path: &Path,
    ) -> Result<String, ProcessorError> {
        self.calls.borrow_mut().push(stylesheet_path.to_path_buf());
        self.html.clone()
    }
}
