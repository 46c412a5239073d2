//! Result sinks: where per-file results and errors go.

use crossbeam_channel::Sender;
use log::warn;
use std::fmt::Write as _;
use std::io::Write;
use std::sync::{Mutex, PoisonError};

use crate::{RankedResult, ScanEvent};

/// Receiver of pipeline events. Called concurrently from every consumer and the producer,
/// so implementations must be cheap or hand off to another thread.
pub trait ResultSink: Send + Sync {
    fn report(&self, event: ScanEvent);
}

impl<F> ResultSink for F
where
    F: Fn(ScanEvent) + Send + Sync,
{
    fn report(&self, event: ScanEvent) {
        self(event)
    }
}

/// Console block for one ranked file: a header line, then one `"word": count` line per entry.
pub fn render_ranked(result: &RankedResult) -> String {
    let mut out = format!(
        "Worker: {}. File = {}\n",
        result.worker,
        result.path.display()
    );
    for (word, count) in &result.words {
        let _ = writeln!(out, "\"{}\": {}", word, count);
    }
    out
}

/// Ranked results to stdout in the console format; errors to the log.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ResultSink for ConsoleSink {
    fn report(&self, event: ScanEvent) {
        match event {
            ScanEvent::Ranked(result) => {
                // One write under the stdout lock keeps blocks from interleaving.
                let block = render_ranked(&result);
                let _ = std::io::stdout().lock().write_all(block.as_bytes());
            }
            ScanEvent::FileError {
                worker,
                path,
                error,
            } => warn!("{}: skipped {}: {}", worker, path.display(), error),
            ScanEvent::WalkError { path, error } => match path {
                Some(p) => warn!("Cannot walk {}: {}", p.display(), error),
                None => warn!("Walk error: {}", error),
            },
        }
    }
}

/// One JSON object per event per line.
pub struct JsonLinesSink<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl JsonLinesSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ResultSink for JsonLinesSink<W> {
    fn report(&self, event: ScanEvent) {
        let line = match serde_json::to_string(&event) {
            Ok(line) => line,
            Err(e) => {
                warn!("Cannot serialize event for {:?}: {}", event.path(), e);
                return;
            }
        };
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            warn!("Cannot write event: {}", e);
        }
    }
}

/// Forwards events into a channel. Events are dropped once the receiver is gone.
#[derive(Clone)]
pub struct ChannelSink {
    tx: Sender<ScanEvent>,
}

impl ChannelSink {
    pub fn new(tx: Sender<ScanEvent>) -> Self {
        Self { tx }
    }
}

impl ResultSink for ChannelSink {
    fn report(&self, event: ScanEvent) {
        let _ = self.tx.send(event);
    }
}
