//! Public and internal types for the wordscan API and pipeline.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::utils::config::Defaults;

/// One item on the handoff queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileTask {
    /// A `.txt` file found by the scanner.
    PathItem(PathBuf),
    /// Sentinel telling one consumer to exit. Never a real path.
    Termination,
}

/// Up to K `(word, count)` pairs for one file, most frequent first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RankedResult {
    /// Label of the consumer that processed the file (e.g. `consumer-2`).
    pub worker: String,
    pub path: PathBuf,
    pub words: Vec<(String, u64)>,
}

/// Everything a [`ResultSink`](crate::report::ResultSink) can receive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScanEvent {
    Ranked(RankedResult),
    /// A queued file could not be read; the consumer continued.
    FileError {
        worker: String,
        path: PathBuf,
        error: String,
    },
    /// Part of the tree could not be walked; the pass continued.
    WalkError {
        path: Option<PathBuf>,
        error: String,
    },
}

impl ScanEvent {
    /// File the event refers to, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ScanEvent::Ranked(r) => Some(&r.path),
            ScanEvent::FileError { path, .. } => Some(path),
            ScanEvent::WalkError { path, .. } => path.as_ref(),
        }
    }

    /// True for per-file events (ranked result or read error).
    pub fn is_file_event(&self) -> bool {
        matches!(self, ScanEvent::Ranked(_) | ScanEvent::FileError { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Running,
}

/// How a producer or consumer task ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskExit {
    /// Producer saw the stop flag and delivered `markers` termination markers.
    /// Fewer than the consumer count means delivery was cut short by shutdown.
    Stopped { markers: usize },
    /// Consumer took a termination marker.
    Terminated,
    /// Forced cancellation with no graceful stop in progress.
    Cancelled,
    /// The task panicked; caught at the task boundary.
    Panicked,
}

/// Pipeline options. Defaults come from [`Defaults`]; the CLI layers the config file and flags on top.
#[derive(Clone, Debug)]
pub struct Opts {
    /// Directory scanned on every pass.
    pub root: PathBuf,
    /// Pause between two full scan passes.
    pub scan_interval: Duration,
    /// Number of consumer tasks; also the queue capacity.
    pub consumer_count: usize,
    /// Number of producer tasks. Must be 1 (marker fan-out assumes a single producer).
    pub producer_count: usize,
    /// How many words to report per file.
    pub top_k: usize,
    /// Shorter tokens are dropped.
    pub min_word_length: usize,
    /// Follow symbolic links while walking.
    pub follow_links: bool,
    /// Debug logging.
    pub verbose: bool,
    /// Emit events as JSON lines instead of the console format (CLI).
    pub json: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            root: PathBuf::from(Defaults::ROOT_DIR),
            scan_interval: Duration::from_secs(Defaults::SCAN_INTERVAL_SECS),
            consumer_count: Defaults::CONSUMER_COUNT,
            producer_count: Defaults::PRODUCER_COUNT,
            top_k: Defaults::TOP_K,
            min_word_length: Defaults::MIN_WORD_LENGTH,
            follow_links: false,
            verbose: false,
            json: false,
        }
    }
}

impl Opts {
    /// Check the invariants the pipeline relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.consumer_count == 0 {
            return Err(ConfigError::NoConsumers(self.consumer_count));
        }
        if self.producer_count != 1 {
            return Err(ConfigError::ProducerCount(self.producer_count));
        }
        if self.min_word_length == 0 {
            return Err(ConfigError::ZeroWordLength);
        }
        Ok(())
    }

    /// Worker pool size: producers + consumers.
    pub fn pool_size(&self) -> usize {
        self.producer_count + self.consumer_count
    }
}
