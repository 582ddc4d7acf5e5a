//! mdsearch - search file names across several root directories.

use anyhow::Result;
use clap::Parser;

use multidir_search_cli::cli::{Cli, run};
use multidir_search_cli::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init(&cli)?;
    run(cli).await
}
