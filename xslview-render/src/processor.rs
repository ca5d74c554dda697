//! The XSLT engine seam.
//!
//! Rendering only needs four things from an XSLT processor: parse the
//! stylesheet, parse the source document, apply the one to the other and
//! serialize the result. [`XsltProcessor`] is exactly that.

use std::path::Path;

use thiserror::Error;
use url::Url;
use xrust::item::Item;
use xrust::parser::xml::parse;
use xrust::transform::context::StaticContextBuilder;
use xrust::trees::smite::RNode;
use xrust::xdmerror::{Error as XrustError, ErrorKind};
use xrust::xslt::from_document;
use xrust::Node;
use xrust::SequenceTrait;

use crate::document::XmlDocument;
use crate::serialize::{serialize_result, OutputMethod};

/// Failure reported by an XSLT processor, by stage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProcessorError {
    /// The source document was rejected.
    #[error("{0}")]
    Source(String),
    /// The stylesheet could not be parsed or compiled.
    #[error("{0}")]
    Stylesheet(String),
    /// Applying the stylesheet failed.
    #[error("{0}")]
    Execution(String),
}

pub trait XsltProcessor {
    /// Transform `source` with `stylesheet` and serialize the result with
    /// the method the stylesheet's `xsl:output` declares.
    ///
    /// `stylesheet_path` is where the stylesheet text was read from; it is
    /// the base for relative `xsl:include` and `xsl:import` references.
    fn transform(
        &self,
        source: &str,
        stylesheet: &str,
        stylesheet_path: &Path,
    ) -> Result<String, ProcessorError>;
}

impl<T: XsltProcessor + ?Sized> XsltProcessor for &T {
    fn transform(
        &self,
        source: &str,
        stylesheet: &str,
        stylesheet_path: &Path,
    ) -> Result<String, ProcessorError> {
        (**self).transform(source, stylesheet, stylesheet_path)
    }
}

/// XSLT 1.0 processing with the `xrust` engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct XrustProcessor;

impl XrustProcessor {
    pub fn new() -> Self {
        XrustProcessor
    }

    fn parse_xml(s: &str) -> Result<RNode, XrustError> {
        let doc = RNode::new_document();
        parse(doc.clone(), s, None)?;
        Ok(doc)
    }

    fn load_resource(url: &Url) -> Result<String, XrustError> {
        let path = url.to_file_path().map_err(|_| {
            XrustError::new(
                ErrorKind::NotImplemented,
                &format!("only local resources can be loaded, not {url}"),
            )
        })?;
        std::fs::read_to_string(&path).map_err(|e| {
            XrustError::new(
                ErrorKind::Unknown,
                &format!("cannot read {}: {e}", path.display()),
            )
        })
    }
}

impl XsltProcessor for XrustProcessor {
    fn transform(
        &self,
        source: &str,
        stylesheet: &str,
        stylesheet_path: &Path,
    ) -> Result<String, ProcessorError> {
        let method = XmlDocument::parse(stylesheet.to_string())
            .map_err(|e| ProcessorError::Stylesheet(e.to_string()))
            .map(|document| OutputMethod::from_declared(document.output_method()))?;
        let style_doc = Self::parse_xml(stylesheet)
            .map_err(|e| ProcessorError::Stylesheet(e.to_string()))?;
        let base = Url::from_file_path(stylesheet_path).ok();
        let compiled = from_document(
            style_doc,
            base,
            |s| Self::parse_xml(s),
            |url: &Url| Self::load_resource(url),
        )
        .map_err(|e| ProcessorError::Stylesheet(e.to_string()))?;

        let src_doc =
            Self::parse_xml(source).map_err(|e| ProcessorError::Source(e.to_string()))?;

        let mut ctx = compiled;
        ctx.context(vec![Item::Node(src_doc)], 0);
        ctx.result_document(RNode::new_document());

        let mut static_context = StaticContextBuilder::new()
            .message(|message| {
                log::info!("xsl:message: {}", message);
                Ok(())
            })
            .fetcher(|url: &Url| Self::load_resource(url))
            .parser(|s| Self::parse_xml(s))
            .build();

        let result = ctx
            .evaluate(&mut static_context)
            .map_err(|e| ProcessorError::Execution(e.to_string()))?;
        serialize_result(&result.to_xml(), method)
            .map_err(|e| ProcessorError::Execution(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTITY_LIKE: &str = r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="/">
    <html><head><title>t</title></head><body><p><xsl:value-of select="/doc/msg"/></p></body></html>
  </xsl:template>
</xsl:stylesheet>"#;

    #[test]
    fn test_transform() {
        let output = XrustProcessor::new()
            .transform(
                "<doc><msg>hello</msg></doc>",
                IDENTITY_LIKE,
                Path::new("/nonexistent/doc.xsl"),
            )
            .unwrap();
        assert!(output.contains("<p>hello</p>"), "{output}");
        assert!(output.contains("</head>"), "{output}");
    }

    #[test]
    fn test_html_method() {
        let stylesheet = r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:output method="html"/>
  <xsl:template match="/">
    <html><head><title>t</title></head><body><p>a<br/>b</p></body></html>
  </xsl:template>
</xsl:stylesheet>"#;
        let output = XrustProcessor::new()
            .transform("<doc/>", stylesheet, Path::new("/nonexistent/doc.xsl"))
            .unwrap();
        assert!(output.contains("a<br>b"), "{output}");
        assert!(!output.contains("</br>"), "{output}");
    }

    #[test]
    fn test_doctype_source() {
        let output = XrustProcessor::new()
            .transform(
                "<?xml version=\"1.0\"?>\n<!DOCTYPE doc>\n<doc><msg>hello</msg></doc>",
                IDENTITY_LIKE,
                Path::new("/nonexistent/doc.xsl"),
            )
            .unwrap();
        assert!(output.contains("<p>hello</p>"), "{output}");
    }

    #[test]
    fn test_broken_stylesheet() {
        let e = XrustProcessor::new()
            .transform(
                "<doc/>",
                "<xsl:stylesheet xmlns:xsl='http://www.w3.org/1999/XSL/Transform'>",
                Path::new("/nonexistent/doc.xsl"),
            )
            .unwrap_err();
        assert!(matches!(e, ProcessorError::Stylesheet(_)));
    }
}
