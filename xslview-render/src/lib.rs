//! Render XML documents to HTML through their own XSLT stylesheet.
//!
//! Every document `name.xml` is governed by exactly one stylesheet,
//! `name.xsl`. It lives next to the document, or wherever an
//! `xml-stylesheet` processing instruction says, as long as the file name
//! still matches. The [`Transformer`] resolves that stylesheet, runs the
//! transform, adds a fixed style block and a `<meta charset>`, and writes
//! the result in the encoding the stylesheet declares.
//!
//! ```no_run
//! use std::path::Path;
//! use xslview_render::Transformer;
//!
//! let transformer = Transformer::new();
//! let written = transformer.transform_to_html_file(Path::new("invoice.xml"), None)?;
//! assert_eq!(written, Path::new("invoice.html"));
//! # Ok::<(), xslview_render::Error>(())
//! ```

mod charset;
mod document;
mod error;
mod markup;
mod output;
mod processor;
mod resolve;
mod serialize;
mod transform;

pub use crate::charset::{
    declared_output_encoding, decode_source, normalize, DecodeError, OutputEncoding,
    DEFAULT_ENCODING,
};
pub use crate::document::{pseudo_attribute, PseudoAttributeError, XmlDocument, XSLT_NAMESPACE};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::markup::{
    has_meta_charset, inject_charset_meta, inject_style, style_block, MarkupInjector,
    SpliceInjector, STYLE_RULES,
};
pub use crate::output::{
    debug_html_sibling_path, default_preview_root, html_sibling_path, preview_path_for,
    write_html,
};
pub use crate::processor::{ProcessorError, XrustProcessor, XsltProcessor};
pub use crate::resolve::{
    expected_stylesheet_name, resolve_stylesheet, ResolvedStylesheet, StylesheetOrigin,
};
pub use crate::serialize::{OutputMethod, SerializeError};
pub use crate::transform::{RenderedDocument, Transformed, Transformer};
