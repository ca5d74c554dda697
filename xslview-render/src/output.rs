use std::path::{Path, PathBuf};

use sha1::{Digest, Sha1};

use crate::charset::OutputEncoding;
use crate::error::{Error, Result};

const PREVIEW_MARKER: &str = "__preview__";
const PREVIEW_HASH_LENGTH: usize = 10;

/// Encode `html` and write it to `destination`, replacing any existing
/// file.
///
/// Characters that `encoding` cannot represent are written as `?`.
pub fn write_html(html: &str, encoding: OutputEncoding, destination: &Path) -> Result<PathBuf> {
    let bytes = encoding.encode(html);
    std::fs::write(destination, bytes).map_err(|source| Error::WriteFailed {
        path: destination.to_path_buf(),
        source,
    })?;
    log::debug!("wrote {} as {}", destination.display(), encoding);
    Ok(destination.to_path_buf())
}

/// The temporary file a preview of `xml_path` is written to.
///
/// The name combines the document's stem with a hash of its absolute path:
/// one document always gets the same slot, and documents with the same
/// name in different folders never share one.
pub fn preview_path_for(xml_path: &Path, temp_root: &Path) -> PathBuf {
    let absolute = std::path::absolute(xml_path).unwrap_or_else(|_| xml_path.to_path_buf());
    let digest = Sha1::digest(absolute.to_string_lossy().as_bytes());
    let hash = hex::encode(digest);
    let stem = xml_path
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    temp_root.join(format!(
        "{stem}{PREVIEW_MARKER}{}.html",
        &hash[..PREVIEW_HASH_LENGTH]
    ))
}

/// Where previews go unless told otherwise.
pub fn default_preview_root() -> PathBuf {
    std::env::temp_dir().join("xslview")
}

/// `name.xml` becomes `name.html` in the same directory.
pub fn html_sibling_path(xml_path: &Path) -> PathBuf {
    xml_path.with_extension("html")
}

/// `name.xml` becomes `name.debug.html` in the same directory.
pub fn debug_html_sibling_path(xml_path: &Path) -> PathBuf {
    xml_path.with_extension("debug.html")
}
