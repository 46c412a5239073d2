//! Pipeline components: cancellation, handoff queue, scanner, analyzer, controller.

pub mod analyzer;
pub mod cancel;
pub mod context;
pub mod controller;
pub mod error_handler;
pub mod queue;
pub mod task;
pub mod walk;

pub use analyzer::{analyze_file, run_consumer};
pub use cancel::CancelToken;
pub use context::{AnalyzerContext, RunContext, ScannerContext, StopFlag};
pub use controller::Controller;
pub use queue::HandoffQueue;
pub use task::{TaskHandle, spawn_task, wait_all};
pub use walk::{PassSummary, WalkOutcome, run_producer, scan_pass, to_outcome_walkdir};
