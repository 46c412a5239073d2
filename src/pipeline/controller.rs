//! Pipeline controller: owns the worker pool and the current run, and serializes
//! `start` / `stop` / `shutdown`.

use log::{debug, info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::analyzer::run_consumer;
use super::cancel::CancelToken;
use super::context::{RunContext, StopFlag};
use super::queue::HandoffQueue;
use super::task::{TaskHandle, spawn_task, wait_all};
use super::walk::run_producer;
use crate::error::ControlError;
use crate::report::ResultSink;
use crate::utils::config::PackagePaths;
use crate::{Opts, PipelineState, TaskExit};

/// Record of the current (or last) run. Only the controller touches it.
struct RunHandle {
    stop: StopFlag,
    queue: Arc<HandoffQueue>,
    producer: TaskHandle,
    consumers: Vec<TaskHandle>,
    consumers_cancel: CancelToken,
}

impl RunHandle {
    fn producer_active(&self) -> bool {
        !self.producer.is_finished()
    }

    fn tasks(&self) -> impl Iterator<Item = &TaskHandle> {
        std::iter::once(&self.producer).chain(self.consumers.iter())
    }

    /// Fire every token of the run. No marker delivery is attempted.
    fn cancel_all(&self) {
        self.producer.cancel();
        self.consumers_cancel.cancel();
    }
}

struct ControllerInner {
    /// `None` after shutdown.
    pool: Option<rayon::ThreadPool>,
    run: Option<RunHandle>,
    runs_started: usize,
}

/// Process-wide lifecycle owner of the scan pipeline.
///
/// At most one run is active at a time. Control calls return immediately; the
/// producer and consumers run on a fixed pool of `producer_count + consumer_count` threads.
pub struct Controller {
    opts: Opts,
    sink: Arc<dyn ResultSink>,
    inner: Mutex<ControllerInner>,
}

impl Controller {
    /// Validate `opts` and build the worker pool.
    pub fn new(opts: Opts, sink: Arc<dyn ResultSink>) -> Result<Self, ControlError> {
        opts.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(opts.pool_size())
            .thread_name(|i| PackagePaths::get().worker_thread_name(i))
            .build()?;
        debug!("Worker pool size: {}", opts.pool_size());
        Ok(Self {
            opts,
            sink,
            inner: Mutex::new(ControllerInner {
                pool: Some(pool),
                run: None,
                runs_started: 0,
            }),
        })
    }

    pub fn opts(&self) -> &Opts {
        &self.opts
    }

    fn lock(&self) -> MutexGuard<'_, ControllerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a run: 1 producer + `consumer_count` consumers sharing a fresh queue.
    ///
    /// Rejected with [`ControlError::AlreadyRunning`] while the previous run's producer is
    /// still active; nothing is spawned and the active run is untouched.
    pub fn start(&self) -> Result<(), ControlError> {
        let mut inner = self.lock();
        if let Some(run) = &inner.run
            && run.producer_active()
        {
            warn!("Cannot start a new run! The producer is still running.");
            return Err(ControlError::AlreadyRunning);
        }
        let Some(pool) = inner.pool.as_ref() else {
            warn!("Cannot start: controller has been shut down.");
            return Err(ControlError::ShutDown);
        };

        let ctx = RunContext::new(&self.opts, &self.sink);

        let producer = {
            let scanner = ctx.scanner("producer-1".to_string());
            spawn_task(pool, scanner.label.clone(), ctx.producer_cancel.clone(), move || {
                run_producer(scanner)
            })
        };
        let consumers = (1..=self.opts.consumer_count)
            .map(|n| {
                let analyzer = ctx.analyzer(format!("consumer-{n}"));
                spawn_task(pool, analyzer.label.clone(), ctx.consumers_cancel.clone(), move || {
                    run_consumer(analyzer)
                })
            })
            .collect();

        inner.run = Some(RunHandle {
            stop: ctx.stop,
            queue: ctx.queue,
            producer,
            consumers,
            consumers_cancel: ctx.consumers_cancel,
        });
        inner.runs_started += 1;
        info!(
            "Run {} started on {} ({} consumer(s), rescan every {}s)",
            inner.runs_started,
            self.opts.root.display(),
            self.opts.consumer_count,
            self.opts.scan_interval.as_secs()
        );
        Ok(())
    }

    /// Graceful stop: set the stop flag and cancel the producer's blocking wait.
    ///
    /// The producer then delivers one termination marker per consumer. Returns true
    /// if an active run was signalled.
    pub fn stop(&self) -> bool {
        let inner = self.lock();
        match &inner.run {
            Some(run) if run.producer_active() => {
                run.stop.set();
                run.producer.cancel();
                info!("Stop requested");
                true
            }
            _ => {
                debug!("Stop requested but no run is active");
                false
            }
        }
    }

    /// Teardown: cancel every task of the current run and release the worker pool.
    ///
    /// Idempotent. Consumers exit on cancellation; termination markers are not relied on.
    pub fn shutdown(&self) {
        let mut inner = self.lock();
        if let Some(run) = &inner.run {
            run.cancel_all();
        }
        if inner.pool.take().is_some() {
            info!("Controller shut down");
        }
    }

    pub fn state(&self) -> PipelineState {
        match &self.lock().run {
            Some(run) if run.producer_active() => PipelineState::Running,
            _ => PipelineState::Idle,
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.lock().pool.is_none()
    }

    /// Number of runs started so far.
    pub fn runs_started(&self) -> usize {
        self.lock().runs_started
    }

    /// Block until every task of the current run has finished, or `timeout` elapses.
    /// Waits outside the controller lock. Returns true if all tasks finished (or there is no run).
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let signals: Vec<_> = match &self.lock().run {
            Some(run) => run.tasks().map(TaskHandle::done_signal).collect(),
            None => return true,
        };
        match deadline {
            Some(deadline) => wait_all(&signals, deadline),
            // Unrepresentable deadline: wait without one.
            None => {
                signals.iter().for_each(|done| while done.recv().is_ok() {});
                true
            }
        }
    }

    /// Label and recorded exit of every task of the current (or last) run; producer first.
    pub fn task_exits(&self) -> Vec<(String, Option<TaskExit>)> {
        match &self.lock().run {
            Some(run) => run
                .tasks()
                .map(|t| (t.label().to_string(), t.exit()))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Items currently waiting in the current run's queue.
    pub fn queue_len(&self) -> usize {
        self.lock().run.as_ref().map_or(0, |run| run.queue.len())
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.shutdown();
    }
}
