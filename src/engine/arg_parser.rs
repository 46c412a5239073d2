use clap::Parser;
use std::path::PathBuf;

/// Continuously rank the most frequent words of every `.txt` file under a directory.
#[derive(Clone, Debug, Parser)]
#[command(name = "wordscan")]
#[command(
    about = "Scan a directory tree for .txt files and report the most frequent words per file, rescanning periodically."
)]
pub struct Cli {
    /// Directory to scan. Default: `files` (or `root` from the config file).
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Seconds between two full scan passes.
    #[arg(long, short = 'i', value_name = "SECS")]
    pub interval: Option<u64>,

    /// Number of consumer workers (also the queue capacity).
    #[arg(long, short = 'c', value_name = "N")]
    pub consumers: Option<usize>,

    /// Number of words reported per file.
    #[arg(long, short = 'k', value_name = "K")]
    pub top_k: Option<usize>,

    /// Minimum word length; shorter tokens are ignored.
    #[arg(long, short = 'm', value_name = "LEN")]
    pub min_word_length: Option<usize>,

    /// Follow symbolic links while walking.
    #[arg(long, short = 'f', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub follow_links: Option<bool>,

    /// Print results as JSON lines instead of the console format.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub json: Option<bool>,

    /// Read `start` / `stop` / `status` / `quit` commands from stdin instead of starting right away.
    #[arg(long)]
    pub interactive: bool,

    /// Config file. Default: `.wordscan.toml` in the working directory, if present.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}
