use std::path::{Path, PathBuf};

use crate::charset::{normalize, OutputEncoding};
use crate::document::XmlDocument;
use crate::error::{Error, Result};
use crate::markup::{MarkupInjector, SpliceInjector};
use crate::output::{
    debug_html_sibling_path, html_sibling_path, preview_path_for, write_html,
};
use crate::processor::{ProcessorError, XrustProcessor, XsltProcessor};
use crate::resolve::{resolve_stylesheet, ResolvedStylesheet};

/// Final HTML text together with the encoding it is meant to be written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub html: String,
    pub encoding: OutputEncoding,
}

impl RenderedDocument {
    pub fn write_to(&self, destination: &Path) -> Result<PathBuf> {
        write_html(&self.html, self.encoding, destination)
    }
}

/// Raw transform output plus what was learned from the stylesheet.
#[derive(Debug)]
pub struct Transformed {
    pub html: String,
    pub stylesheet: ResolvedStylesheet,
    /// Normalized `xsl:output/@encoding` of the stylesheet, by the same rule
    /// as [`declared_output_encoding`](crate::declared_output_encoding).
    pub declared_encoding: String,
}

/// Renders XML documents to HTML with their own stylesheet.
///
/// Nothing is cached: every call reads the document and stylesheet from
/// disk again.
pub struct Transformer<P = XrustProcessor, M = SpliceInjector> {
    processor: P,
    injector: M,
}

impl Transformer {
    pub fn new() -> Self {
        Self::with_processor(XrustProcessor::new())
    }
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: XsltProcessor> Transformer<P> {
    pub fn with_processor(processor: P) -> Self {
        Transformer {
            processor,
            injector: SpliceInjector,
        }
    }
}

impl<P: XsltProcessor, M: MarkupInjector> Transformer<P, M> {
    pub fn with_injector<N: MarkupInjector>(self, injector: N) -> Transformer<P, N> {
        Transformer {
            processor: self.processor,
            injector,
        }
    }

    /// Transform `xml_path` with its stylesheet, without post-processing.
    pub fn execute(&self, xml_path: &Path) -> Result<String> {
        self.transform(xml_path).map(|transformed| transformed.html)
    }

    /// Parse, resolve and transform.
    pub fn transform(&self, xml_path: &Path) -> Result<Transformed> {
        let document = XmlDocument::load(xml_path)?;
        let stylesheet = resolve_stylesheet(xml_path, &document)?;
        let stylesheet_document = XmlDocument::load_stylesheet(stylesheet.path())?;
        let declared_encoding = normalize(stylesheet_document.output_encoding());

        let html = self
            .processor
            .transform(
                document.text(),
                stylesheet_document.text(),
                stylesheet.path(),
            )
            .map_err(|e| match e {
                ProcessorError::Source(message) => Error::MalformedInput {
                    xml_path: xml_path.to_path_buf(),
                    message,
                    span: None,
                },
                ProcessorError::Stylesheet(message) => Error::MalformedStylesheet {
                    stylesheet: stylesheet.path().to_path_buf(),
                    message,
                    span: None,
                },
                ProcessorError::Execution(message) => Error::TransformFailed {
                    xml_path: xml_path.to_path_buf(),
                    stylesheet: stylesheet.path().to_path_buf(),
                    message,
                },
            })?;
        log::debug!(
            "transformed {} with {}",
            xml_path.display(),
            stylesheet.path().display()
        );
        Ok(Transformed {
            html,
            stylesheet,
            declared_encoding,
        })
    }

    /// The transform output with the style block injected.
    pub fn transform_to_html_string(&self, xml_path: &Path) -> Result<String> {
        let transformed = self.transform(xml_path)?;
        Ok(self.injector.inject_style(&transformed.html))
    }

    /// The complete document: style block first, then the charset
    /// declaration for the encoding the stylesheet asks for.
    pub fn render(&self, xml_path: &Path) -> Result<RenderedDocument> {
        let transformed = self.transform(xml_path)?;
        let encoding = OutputEncoding::from_declared(&transformed.declared_encoding);
        let html = self.injector.inject_style(&transformed.html);
        let html = self.injector.inject_charset_meta(&html, encoding.name());
        Ok(RenderedDocument { html, encoding })
    }

    /// Render `xml_path` to `output_path`, by default `name.html` next to
    /// the document. Returns the path written.
    pub fn transform_to_html_file(
        &self,
        xml_path: &Path,
        output_path: Option<&Path>,
    ) -> Result<PathBuf> {
        let destination = output_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| html_sibling_path(xml_path));
        self.render(xml_path)?.write_to(&destination)
    }

    /// Like [`Self::transform_to_html_file`], defaulting to
    /// `name.debug.html`.
    pub fn transform_to_debug_html_file(
        &self,
        xml_path: &Path,
        output_path: Option<&Path>,
    ) -> Result<PathBuf> {
        let destination = output_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| debug_html_sibling_path(xml_path));
        self.transform_to_html_file(xml_path, Some(&destination))
    }

    /// Render `xml_path` into its preview slot under `temp_root`, creating
    /// `temp_root` if needed.
    pub fn transform_to_preview(&self, xml_path: &Path, temp_root: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(temp_root).map_err(|source| Error::WriteFailed {
            path: temp_root.to_path_buf(),
            source,
        })?;
        let destination = preview_path_for(xml_path, temp_root);
        self.transform_to_html_file(xml_path, Some(&destination))
    }
}
