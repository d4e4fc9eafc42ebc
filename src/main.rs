//! ctgpipe CLI: score a directory of CTG traces; use --visualize to render charts.

use anyhow::Result;
use clap::Parser;
use ctgpipe::engine::arg_parser::Cli;
use ctgpipe::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
