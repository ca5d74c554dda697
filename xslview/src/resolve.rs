use std::path::PathBuf;

use clap::Parser;
use xslview_render::{declared_output_encoding, resolve_stylesheet, StylesheetOrigin, XmlDocument};

#[derive(Debug, Parser)]
pub(crate) struct Resolve {
    /// input xml file
    pub(crate) infile: PathBuf,
}

impl Resolve {
    pub(crate) fn run(&self) -> xslview_render::Result<()> {
        let document = XmlDocument::load(&self.infile)?;
        let resolved = resolve_stylesheet(&self.infile, &document)?;
        let origin = match resolved.origin() {
            StylesheetOrigin::Declared { href } => format!("xml-stylesheet href=\"{href}\""),
            StylesheetOrigin::Convention => "naming convention".to_string(),
        };
        println!("stylesheet: {}", resolved.path().display());
        println!("found by:   {origin}");
        println!("encoding:   {}", declared_output_encoding(resolved.path()));
        Ok(())
    }
}
