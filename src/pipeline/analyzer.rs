//! Word frequency analyzer (consumer): drains the queue and ranks the words of each file.

use log::{debug, error, info};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};

use super::context::AnalyzerContext;
use crate::engine::words::rank_words;
use crate::error::AnalyzeError;
use crate::{FileTask, RankedResult, ScanEvent, TaskExit};

/// Read `path` as UTF-8 and return its top `top_k` words.
pub fn analyze_file(
    path: &Path,
    min_word_length: usize,
    top_k: usize,
) -> Result<Vec<(String, u64)>, AnalyzeError> {
    let text = std::fs::read_to_string(path).map_err(|source| AnalyzeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(rank_words(&text, min_word_length, top_k))
}

/// Process one queued file and report the outcome. Never fails: read errors become events.
fn process_file(ctx: &AnalyzerContext, path: PathBuf) {
    let event = match analyze_file(&path, ctx.min_word_length, ctx.top_k) {
        Ok(words) => ScanEvent::Ranked(RankedResult {
            worker: ctx.label.clone(),
            path,
            words,
        }),
        Err(e) => {
            debug!("{}: {}", ctx.label, e);
            ScanEvent::FileError {
                worker: ctx.label.clone(),
                path,
                error: e.to_string(),
            }
        }
    };
    ctx.sink.report(event);
}

/// Run [`process_file`] with panic capture so one bad item cannot end the consumer.
///
/// A panic (e.g. in the sink) is logged and reported as a `FileError`; a sink that also
/// panics on that event is only logged.
fn process_file_guarded(ctx: &AnalyzerContext, path: PathBuf) {
    let item = path.clone();
    if catch_unwind(AssertUnwindSafe(|| process_file(ctx, path))).is_ok() {
        return;
    }
    error!("{}: panic while handling {}", ctx.label, item.display());
    let event = ScanEvent::FileError {
        worker: ctx.label.clone(),
        path: item,
        error: "panic while handling file".to_string(),
    };
    if catch_unwind(AssertUnwindSafe(|| ctx.sink.report(event))).is_err() {
        error!("{}: sink panicked again, item dropped", ctx.label);
    }
}

/// Consumer loop. Exits on a termination marker, or immediately when its token fires.
pub fn run_consumer(ctx: AnalyzerContext) -> TaskExit {
    info!("CONSUMER {} STARTED ...", ctx.label);
    let exit = loop {
        match ctx.queue.take(&ctx.cancel) {
            Ok(FileTask::Termination) => break TaskExit::Terminated,
            Ok(FileTask::PathItem(path)) => process_file_guarded(&ctx, path),
            Err(_) => {
                info!("Consumer {} wait for the next item interrupted!", ctx.label);
                break TaskExit::Cancelled;
            }
        }
    };
    info!("CONSUMER {} FINISHED ({:?})", ctx.label, exit);
    exit
}
