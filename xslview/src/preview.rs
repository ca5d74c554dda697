use std::path::PathBuf;

use clap::Parser;
use xslview_render::{default_preview_root, Transformer};

#[derive(Debug, Parser)]
pub(crate) struct Preview {
    /// input xml file
    pub(crate) infile: PathBuf,
    /// Directory preview files are written to
    /// (default: `xslview` in the system temporary directory)
    #[arg(long, env = "XSLVIEW_PREVIEW_DIR")]
    pub(crate) preview_dir: Option<PathBuf>,
}

impl Preview {
    pub(crate) fn run(&self) -> xslview_render::Result<()> {
        let temp_root = self
            .preview_dir
            .clone()
            .unwrap_or_else(default_preview_root);
        let written = Transformer::new().transform_to_preview(&self.infile, &temp_root)?;
        println!("{}", written.display());
        Ok(())
    }
}
