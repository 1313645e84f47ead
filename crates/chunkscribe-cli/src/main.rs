mod app;
mod args;
mod error;
mod hooks;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    // Run CLI and handle errors with helpful messages
    if let Err(err) = run() {
        error::display_error(&err);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<()> {
    let cli = args::Cli::parse();

    // Enable verbose logging if requested
    chunkscribe_core::set_verbose(cli.verbose);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(app::run(cli))
}
