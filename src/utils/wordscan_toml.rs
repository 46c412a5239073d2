//! Load `.wordscan.toml` (CLI only). The library takes an [`Opts`] built by the caller.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::Opts;

#[derive(Debug, Default, Deserialize)]
pub struct WordscanToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsSection {
    root: Option<String>,
    scan_interval_secs: Option<u64>,
    consumer_count: Option<usize>,
    producer_count: Option<usize>,
    top_k: Option<usize>,
    min_word_length: Option<usize>,
    follow_links: Option<bool>,
    verbose: Option<bool>,
    json: Option<bool>,
}

/// Parse config text (a `[settings]` table). Unknown keys are an error.
pub fn parse_wordscan_toml(s: &str) -> Result<WordscanToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($section:expr, $opts:expr, $field:ident) => {
        if let Some(v) = $section.$field {
            $opts.$field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI flags.
pub fn apply_file_to_opts(file: &WordscanToml, opts: &mut Opts) {
    let s = &file.settings;
    if let Some(ref root) = s.root {
        opts.root = PathBuf::from(root);
    }
    if let Some(secs) = s.scan_interval_secs {
        opts.scan_interval = Duration::from_secs(secs);
    }
    apply_file_opt!(s, opts, consumer_count);
    apply_file_opt!(s, opts, producer_count);
    apply_file_opt!(s, opts, top_k);
    apply_file_opt!(s, opts, min_word_length);
    apply_file_opt!(s, opts, follow_links);
    apply_file_opt!(s, opts, verbose);
    apply_file_opt!(s, opts, json);
}
