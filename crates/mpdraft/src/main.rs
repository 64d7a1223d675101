//! Main entry point for mpdraft.
//!
//! With no subcommand the web UI is served on `0.0.0.0:8000`.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(err) = mpdraft_cli::run().await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
    Ok(())
}
