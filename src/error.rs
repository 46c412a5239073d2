//! Error types for the scan pipeline and its controller.
//!
//! Library code returns these typed errors; the binary wraps them with `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a blocking queue operation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// The caller's cancellation token fired while waiting (or before the call).
    #[error("queue operation cancelled")]
    Cancelled,

    /// The other side of the channel is gone.
    #[error("queue disconnected")]
    Disconnected,
}

/// A blocking wait (sleep) was interrupted by forced cancellation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("wait cancelled")]
pub struct Cancelled;

impl From<Cancelled> for QueueError {
    fn from(_: Cancelled) -> Self {
        QueueError::Cancelled
    }
}

/// Per-file analysis failure. Non-fatal: reported and the consumer moves on.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    /// Open/read failed, or the content was not valid UTF-8.
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Rejected control operation.
#[derive(Error, Debug)]
pub enum ControlError {
    /// The previous run's producer is still active.
    #[error("cannot start a new run: the producer of the current run is still active")]
    AlreadyRunning,

    /// `shutdown()` already released the worker pool.
    #[error("controller has been shut down")]
    ShutDown,

    /// Options failed validation at construction.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The worker pool could not be built.
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Invalid configuration value.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("consumer count must be at least 1 (got {0})")]
    NoConsumers(usize),

    #[error("exactly one producer is supported (got {0})")]
    ProducerCount(usize),

    #[error("minimum word length must be at least 1")]
    ZeroWordLength,
}
