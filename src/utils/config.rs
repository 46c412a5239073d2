//! Application configuration constants.
//! Defaults and tuning in one place.

use std::sync::OnceLock;
use std::time::Duration;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
    worker_prefix: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!(".{pkg}.toml"),
                worker_prefix: format!("{pkg}-worker"),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Config file looked up in the working directory when `--config` is not given.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// Thread name for worker pool slot `index`.
    pub fn worker_thread_name(&self, index: usize) -> String {
        format!("{}-{}", self.worker_prefix, index)
    }
}

// ---- Pipeline defaults ----

/// Default option values.
pub struct Defaults;

impl Defaults {
    pub const ROOT_DIR: &'static str = "files";
    pub const SCAN_INTERVAL_SECS: u64 = 60;
    pub const CONSUMER_COUNT: usize = 2;
    pub const PRODUCER_COUNT: usize = 1;
    pub const TOP_K: usize = 10;
    pub const MIN_WORD_LENGTH: usize = 3;
}

/// File extension picked up by the scanner (case-sensitive, on the file name).
pub const TEXT_FILE_SUFFIX: &str = ".txt";

// ---- CLI control ----

/// Timing for the CLI driver.
pub struct ControlConsts;

impl ControlConsts {
    /// After a stop, how long the CLI waits for consumers to drain before forcing shutdown.
    pub const STOP_GRACE: Duration = Duration::from_secs(10);
}
