//! ## vidlink-cli
//! Command-line front end for the vidlink decoders: decode single frames,
//! scan capture files of back-to-back frames and show the channel ports.

use clap::Parser;

mod commands;

use commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    commands::run_command(cli).await
}
