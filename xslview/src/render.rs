use std::path::PathBuf;

use clap::Parser;
use xslview_render::Transformer;

#[derive(Debug, Parser)]
pub(crate) struct Render {
    /// input xml file
    pub(crate) infile: PathBuf,
    /// output html file (default: next to the input, `.html`)
    #[arg(long, short)]
    pub(crate) output: Option<PathBuf>,
    /// Write `name.debug.html` instead of `name.html`.
    /// Ignored when --output is given.
    #[arg(long)]
    pub(crate) debug: bool,
}

impl Render {
    pub(crate) fn run(&self) -> xslview_render::Result<()> {
        let transformer = Transformer::new();
        let output = self.output.as_deref();
        let written = if self.debug {
            transformer.transform_to_debug_html_file(&self.infile, output)?
        } else {
            transformer.transform_to_html_file(&self.infile, output)?
        };
        println!("{}", written.display());
        Ok(())
    }
}
