//! Build the dataset from a directory of hand-saved storefront snapshots
//! instead of the web archive. Files are named `YYYY-MM...`; `.json` files
//! hold a listing API response, anything else is storefront markup.
//!
//! Usage: guildrank-replay-dir <dir> [--output dmsguild.json]

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use guildrank_common::Config;
use guildrank_ingest::{replay_dir, OutputWriter};

#[derive(Parser)]
#[command(name = "guildrank-replay-dir", about = "Build the ranking dataset from saved snapshots")]
struct Cli {
    /// Directory of snapshot files
    dir: PathBuf,

    /// Output file (defaults to GUILDRANK_OUTPUT)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    guildrank_ingest::logging::init()?;

    let cli = Cli::parse();
    let config = Config::from_env();
    let output = cli.output.unwrap_or(config.output_path);

    replay_dir(&cli.dir, &config.dataset_name, OutputWriter::new(output)).await?;
    Ok(())
}
