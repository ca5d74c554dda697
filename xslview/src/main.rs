mod error;
mod preview;
mod render;
mod resolve;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::error::render_error;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log what happens along the way (resolution, encodings, paths)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an XML document to HTML with its own stylesheet.
    ///
    /// By default the result is written next to the document as
    /// `name.html`.
    Render(render::Render),
    /// Render an XML document into a temporary preview file.
    ///
    /// A document always gets the same preview file, so repeated previews
    /// overwrite each other instead of piling up.
    Preview(preview::Preview),
    /// Show which stylesheet governs an XML document.
    Resolve(resolve::Resolve),
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let result = match cli.command {
        Commands::Render(render) => render.run(),
        Commands::Preview(preview) => preview.run(),
        Commands::Resolve(resolve) => resolve.run(),
    };
    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            render_error(&e)?;
            Ok(ExitCode::FAILURE)
        }
    }
}
