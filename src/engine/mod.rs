//! Engine module: word analysis, path filters and the CLI driver

pub mod arg_parser;
pub mod cli;
pub mod control;
pub mod tools;
pub mod words;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::{apply_cli_to_opts, build_opts, handle_run};
pub use control::{Command, parse_command};
pub use tools::{check_root, has_text_suffix, should_queue};
pub use words::{WordCounts, count_words, is_word, rank_words, tokenize};
