//! Wordscan CLI: rank the most frequent words of every `.txt` file under a directory, rescanning periodically.

use anyhow::Result;
use clap::Parser;
use std::time::Instant;
use wordscan::engine::arg_parser::Cli;
use wordscan::engine::handle_run;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
