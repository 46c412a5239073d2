//! Wordscan: continuous per-file word frequency over a directory tree.
//!
//! A single producer walks the root directory every `scan_interval`, pushing `.txt`
//! paths into a bounded queue sized to the consumer count. Consumers rank the words of
//! each file and report to a [`ResultSink`](report::ResultSink). A [`Controller`] owns
//! the worker pool and exposes `start` / `stop` / `shutdown`.

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use error::{AnalyzeError, Cancelled, ConfigError, ControlError, QueueError};
pub use pipeline::Controller;
pub use report::{ChannelSink, ConsoleSink, JsonLinesSink, ResultSink};

use std::sync::Arc;

/// Result alias used by the binary and top-level helpers
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Build a controller for `opts` reporting to `sink`, and start the first run.
///
/// ```ignore
/// let opts = wordscan::Opts { root: "books".into(), ..Default::default() };
/// let controller = wordscan::start_scan(opts, Arc::new(wordscan::ConsoleSink))?;
/// // ...
/// controller.stop();
/// controller.wait_idle(std::time::Duration::from_secs(5));
/// controller.shutdown();
/// ```
pub fn start_scan(opts: Opts, sink: Arc<dyn ResultSink>) -> Result<Controller> {
    let config_str = format!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_string().to_uppercase(),
        opts
    );
    log::debug!("{}", config_str);

    let controller = Controller::new(opts, sink)?;
    controller.start()?;
    Ok(controller)
}
