//! Directory scanner (producer): repeated full walks of the root, feeding `.txt` paths into the queue.

use log::{debug, info};
use std::path::PathBuf;
use walkdir::WalkDir;

use super::context::ScannerContext;
use super::error_handler::{log_pass_summary, report_walk_error};
use crate::engine::tools::should_queue;
use crate::error::QueueError;
use crate::{FileTask, TaskExit};

/// One result from a directory walk: either an entry to consider or an error with optional path.
pub enum WalkOutcome {
    Ok { path: PathBuf, is_file: bool },
    Err { msg: String, path: Option<PathBuf> },
}

/// Convert a walkdir result into [`WalkOutcome`].
pub fn to_outcome_walkdir(r: Result<walkdir::DirEntry, walkdir::Error>) -> WalkOutcome {
    match r {
        Ok(entry) => {
            let is_file = entry.file_type().is_file();
            WalkOutcome::Ok {
                path: entry.into_path(),
                is_file,
            }
        }
        Err(err) => WalkOutcome::Err {
            msg: format!("{}", err),
            path: err.path().map(PathBuf::from),
        },
    }
}

fn walkdir_iter(ctx: &ScannerContext) -> Box<dyn Iterator<Item = WalkOutcome>> {
    Box::new(
        WalkDir::new(&ctx.root)
            .follow_links(ctx.follow_links)
            .into_iter()
            .map(to_outcome_walkdir),
    )
}

/// Counts for one finished pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Paths handed to the queue.
    pub queued: usize,
    /// Walk errors reported (unreadable dirs, missing root, ...).
    pub errors: usize,
}

/// Walk the tree once and enqueue every `.txt` regular file, blocking while the queue is full.
///
/// Walk errors are reported to the sink and skipped. Returns `Err` only when a blocking
/// `put` is cancelled, in which case the pass is abandoned.
pub fn scan_pass(ctx: &ScannerContext) -> Result<PassSummary, QueueError> {
    let mut summary = PassSummary::default();
    for outcome in walkdir_iter(ctx) {
        match outcome {
            WalkOutcome::Ok { path, is_file } => {
                if should_queue(&path, is_file) {
                    debug!("{}: queueing {}", ctx.label, path.display());
                    ctx.queue.put(FileTask::PathItem(path), &ctx.cancel)?;
                    summary.queued += 1;
                }
            }
            WalkOutcome::Err { msg, path } => {
                report_walk_error(ctx.sink.as_ref(), path, msg);
                summary.errors += 1;
            }
        }
    }
    Ok(summary)
}

/// Deliver one termination marker per consumer.
///
/// Guarded by the consumers' token: a plain `stop()` (which fires only the producer token)
/// cannot cut delivery short, `shutdown()` can. Returns the number delivered.
fn deliver_markers(ctx: &ScannerContext) -> usize {
    let mut delivered = 0;
    for _ in 0..ctx.consumer_count {
        if ctx
            .queue
            .put(FileTask::Termination, &ctx.consumers_cancel)
            .is_err()
        {
            info!(
                "{}: marker delivery cut short ({} of {})",
                ctx.label, delivered, ctx.consumer_count
            );
            break;
        }
        delivered += 1;
    }
    delivered
}

/// Producer loop. Runs until the stop flag is observed (graceful, markers delivered)
/// or the producer token fires without the stop flag (abrupt teardown).
pub fn run_producer(ctx: ScannerContext) -> TaskExit {
    info!("PRODUCER {} STARTED ...", ctx.label);
    let exit = loop {
        if ctx.stop.is_set() {
            let markers = deliver_markers(&ctx);
            break TaskExit::Stopped { markers };
        }

        match scan_pass(&ctx) {
            Ok(summary) => log_pass_summary(&ctx.label, &ctx.root, &summary),
            Err(_) => {
                info!("{}: scan pass interrupted", ctx.label);
                if ctx.stop.is_set() {
                    continue;
                }
                break TaskExit::Cancelled;
            }
        }

        info!(
            "Producer {} will rescan in {} seconds",
            ctx.label,
            ctx.scan_interval.as_secs()
        );
        if ctx.cancel.sleep(ctx.scan_interval).is_err() {
            info!("Producer {} sleep interrupted!", ctx.label);
            if !ctx.stop.is_set() {
                break TaskExit::Cancelled;
            }
        }
    };
    info!("PRODUCER {} FINISHED ({:?})", ctx.label, exit);
    exit
}
