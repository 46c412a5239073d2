pub mod config;
pub mod logger;
pub mod wordscan_toml;

pub use config::*;
pub use logger::setup_logging;
pub use wordscan_toml::{WordscanToml, apply_file_to_opts, parse_wordscan_toml};
