//! Pipeline context: shared data handed to the producer and consumer tasks of one run.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::cancel::CancelToken;
use super::queue::HandoffQueue;
use crate::Opts;
use crate::report::ResultSink;

/// Cooperative stop flag for one run. Written by the controller, read by the producer.
#[derive(Clone, Debug, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything the producer loop needs.
pub struct ScannerContext {
    pub label: String,
    pub root: PathBuf,
    pub follow_links: bool,
    pub scan_interval: Duration,
    /// Number of termination markers to deliver on stop.
    pub consumer_count: usize,
    pub queue: Arc<HandoffQueue>,
    pub stop: StopFlag,
    /// Fired by `stop()` and `shutdown()`.
    pub cancel: CancelToken,
    /// The consumers' token. Guards marker delivery so that only `shutdown()` aborts it.
    pub consumers_cancel: CancelToken,
    pub sink: Arc<dyn ResultSink>,
}

/// Everything one consumer loop needs.
pub struct AnalyzerContext {
    pub label: String,
    pub top_k: usize,
    pub min_word_length: usize,
    pub queue: Arc<HandoffQueue>,
    /// Fired by `shutdown()` only.
    pub cancel: CancelToken,
    pub sink: Arc<dyn ResultSink>,
}

/// Shared pieces of one run, from which the per-task contexts are cut.
pub struct RunContext {
    pub opts: Opts,
    pub queue: Arc<HandoffQueue>,
    pub stop: StopFlag,
    pub producer_cancel: CancelToken,
    pub consumers_cancel: CancelToken,
    pub sink: Arc<dyn ResultSink>,
}

impl RunContext {
    /// Fresh queue, stop flag and tokens for a new run.
    pub fn new(opts: &Opts, sink: &Arc<dyn ResultSink>) -> Self {
        Self {
            opts: opts.clone(),
            queue: Arc::new(HandoffQueue::new(opts.consumer_count)),
            stop: StopFlag::new(),
            producer_cancel: CancelToken::new(),
            consumers_cancel: CancelToken::new(),
            sink: Arc::clone(sink),
        }
    }

    pub fn scanner(&self, label: String) -> ScannerContext {
        ScannerContext {
            label,
            root: self.opts.root.clone(),
            follow_links: self.opts.follow_links,
            scan_interval: self.opts.scan_interval,
            consumer_count: self.opts.consumer_count,
            queue: Arc::clone(&self.queue),
            stop: self.stop.clone(),
            cancel: self.producer_cancel.clone(),
            consumers_cancel: self.consumers_cancel.clone(),
            sink: Arc::clone(&self.sink),
        }
    }

    pub fn analyzer(&self, label: String) -> AnalyzerContext {
        AnalyzerContext {
            label,
            top_k: self.opts.top_k,
            min_word_length: self.opts.min_word_length,
            queue: Arc::clone(&self.queue),
            cancel: self.consumers_cancel.clone(),
            sink: Arc::clone(&self.sink),
        }
    }
}
