//! HTML serialization of transform results.
//!
//! The XSLT engine writes its result tree as XML. When the stylesheet asks
//! for HTML output we read that XML back into a `xot` tree and write it out
//! again with HTML rules, so void elements like `<br>` lose their end tag.

use thiserror::Error;
use xot::output::html5::Parameters;
use xot::{Node, Xot};

const FRAGMENT_WRAPPER: &str = "xslview-result";

/// The serialization method a transform result is written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMethod {
    Xml,
    Html,
}

impl OutputMethod {
    /// The method named by `xsl:output/@method`. Methods other than `html`
    /// are written as XML.
    ///
    /// `None` means the method was not declared; the result decides.
    pub fn from_declared(method: Option<&str>) -> Option<Self> {
        let method = method.map(str::trim)?;
        if method.is_empty() {
            return None;
        }
        if method.eq_ignore_ascii_case("html") {
            Some(OutputMethod::Html)
        } else {
            Some(OutputMethod::Xml)
        }
    }
}

#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("transform result is not well-formed: {0}")]
    Parse(#[from] xot::ParseError),
    #[error(transparent)]
    Xot(#[from] xot::Error),
}

/// Re-serialize XML `markup` as HTML.
///
/// With no declared method the XSLT 1.0 default applies: HTML only when
/// the result's document element is `html` in no namespace. Anything else
/// is returned unchanged.
pub(crate) fn serialize_result(
    markup: &str,
    method: Option<OutputMethod>,
) -> Result<String, SerializeError> {
    if method == Some(OutputMethod::Xml) {
        return Ok(markup.to_string());
    }
    let mut xot = Xot::new();
    let body = strip_xml_declaration(markup);
    let wrapped = format!("<{FRAGMENT_WRAPPER}>{body}</{FRAGMENT_WRAPPER}>");
    let root = xot.parse(&wrapped)?;
    let wrapper = xot.document_element(root)?;
    let children: Vec<Node> = xot.children(wrapper).collect();

    if method.is_none() && !has_html_root(&xot, &children) {
        return Ok(markup.to_string());
    }

    let html5 = xot.html5();
    let mut html = String::with_capacity(markup.len());
    for child in children {
        html.push_str(&html5.serialize_string(Parameters::default(), child)?);
    }
    Ok(html)
}

fn strip_xml_declaration(markup: &str) -> &str {
    if markup.starts_with("<?xml ") {
        if let Some(end) = markup.find("?>") {
            return markup[end + 2..].trim_start();
        }
    }
    markup
}

// The first element child decides, as long as no text precedes it.
fn has_html_root(xot: &Xot, children: &[Node]) -> bool {
    for child in children {
        if let Some(element) = xot.element(*child) {
            let (local, namespace) = xot.name_ns_str(element.name());
            return namespace.is_empty() && local.eq_ignore_ascii_case("html");
        }
        if xot.text_str(*child).is_some_and(|text| !text.trim().is_empty()) {
            return false;
        }
    }
    false
}
