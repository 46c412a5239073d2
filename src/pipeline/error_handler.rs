use log::{info, warn};
use std::path::{Path, PathBuf};

use super::walk::PassSummary;
use crate::ScanEvent;
use crate::report::ResultSink;

/// Report one walk failure. Non-fatal: the pass goes on and the next pass retries.
pub fn report_walk_error(sink: &dyn ResultSink, path: Option<PathBuf>, msg: String) {
    sink.report(ScanEvent::WalkError { path, error: msg });
}

/// Log the outcome of a finished pass; warn when part of the tree was skipped.
pub fn log_pass_summary(label: &str, root: &Path, summary: &PassSummary) {
    info!(
        "{}: pass over {} queued {} file(s)",
        label,
        root.display(),
        summary.queued
    );
    if summary.errors > 0 {
        warn!(
            "{}: skipped {} path(s) due to permission errors or access issues",
            label, summary.errors
        );
    }
}
