//! Pipeline tests: scanner, analyzer and controller lifecycle against temp directory trees.

use crossbeam_channel::{Receiver, unbounded};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Barrier};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wordscan::pipeline::{
    CancelToken, RunContext, run_consumer, run_producer, scan_pass, spawn_task, wait_all,
};
use wordscan::report::ChannelSink;
use wordscan::{
    ConfigError, ControlError, Controller, FileTask, Opts, PipelineState, ResultSink, ScanEvent,
    TaskExit,
};

const WAIT: Duration = Duration::from_secs(10);

fn channel_sink() -> (Arc<dyn ResultSink>, Receiver<ScanEvent>) {
    let (tx, rx) = unbounded();
    (Arc::new(ChannelSink::new(tx)), rx)
}

fn opts_for(root: &Path, consumers: usize) -> Opts {
    Opts {
        root: root.to_path_buf(),
        scan_interval: Duration::from_secs(3600),
        consumer_count: consumers,
        ..Default::default()
    }
}

fn write(root: &Path, rel: &str, content: &[u8]) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

/// Tree with `n` `.txt` files, some nested.
fn text_tree(n: usize) -> (TempDir, HashSet<PathBuf>) {
    let dir = TempDir::new().unwrap();
    let files = (0..n)
        .map(|i| {
            let rel = if i % 2 == 0 {
                format!("doc{i}.txt")
            } else {
                format!("nested/deeper/doc{i}.txt")
            };
            write(dir.path(), &rel, b"alpha beta alpha gamma")
        })
        .collect();
    (dir, files)
}

/// Receive exactly `n` per-file events (walk errors are skipped).
fn recv_file_events(rx: &Receiver<ScanEvent>, n: usize) -> Vec<ScanEvent> {
    let mut events = Vec::new();
    while events.len() < n {
        let event = rx.recv_timeout(WAIT).expect("timed out waiting for events");
        if event.is_file_event() {
            events.push(event);
        }
    }
    events
}

fn assert_graceful_exits(controller: &Controller, consumers: usize) {
    let exits = controller.task_exits();
    assert_eq!(exits.len(), consumers + 1);
    assert_eq!(exits[0].0, "producer-1");
    assert_eq!(exits[0].1, Some(TaskExit::Stopped { markers: consumers }));
    for (label, exit) in &exits[1..] {
        assert!(label.starts_with("consumer-"));
        assert_eq!(*exit, Some(TaskExit::Terminated));
    }
}

// --- scanner ---

#[test]
fn test_scan_pass_queues_only_txt_regular_files() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.txt", b"one");
    let b = write(dir.path(), "sub/b.txt", b"two");
    write(dir.path(), "c.TXT", b"no");
    write(dir.path(), "d.md", b"no");
    write(dir.path(), "e.txt.bak", b"no");
    fs::create_dir_all(dir.path().join("folder.txt")).unwrap();

    let (sink, _rx) = channel_sink();
    let run = RunContext::new(&opts_for(dir.path(), 8), &sink);
    let scanner = run.scanner("producer-1".to_string());
    let summary = scan_pass(&scanner).unwrap();
    assert_eq!(summary.queued, 2);
    assert_eq!(summary.errors, 0);

    let token = run.consumers_cancel.clone();
    let mut queued = HashSet::new();
    while !run.queue.is_empty() {
        match run.queue.take(&token).unwrap() {
            FileTask::PathItem(p) => queued.insert(p),
            FileTask::Termination => panic!("no marker expected"),
        };
    }
    assert_eq!(queued, HashSet::from([a, b]));
}

#[test]
fn test_scan_pass_missing_root_is_reported_not_fatal() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");
    let (sink, rx) = channel_sink();
    let run = RunContext::new(&opts_for(&missing, 1), &sink);
    let summary = scan_pass(&run.scanner("producer-1".to_string())).unwrap();
    assert_eq!(summary.queued, 0);
    assert_eq!(summary.errors, 1);
    match rx.try_recv().unwrap() {
        ScanEvent::WalkError { path, .. } => assert_eq!(path, Some(missing)),
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn test_scan_pass_blocks_at_capacity() {
    let (dir, files) = text_tree(10);
    let (sink, _rx) = channel_sink();
    let run = RunContext::new(&opts_for(dir.path(), 1), &sink);
    let scanner = run.scanner("producer-1".to_string());
    let handle = thread::spawn(move || scan_pass(&scanner));

    thread::sleep(Duration::from_millis(200));
    assert_eq!(run.queue.len(), 1);
    assert!(!handle.is_finished(), "producer should be blocked on put");

    let token = run.consumers_cancel.clone();
    let mut taken = HashSet::new();
    while taken.len() < files.len() {
        assert!(run.queue.len() <= run.queue.capacity());
        match run.queue.take(&token).unwrap() {
            FileTask::PathItem(p) => taken.insert(p),
            FileTask::Termination => panic!("no marker expected"),
        };
        thread::sleep(Duration::from_millis(5));
    }
    let summary = handle.join().unwrap().unwrap();
    assert_eq!(summary.queued, 10);
    assert_eq!(taken, files);
}

#[test]
fn test_producer_stop_flag_delivers_one_marker_per_consumer() {
    let dir = TempDir::new().unwrap();
    let (sink, _rx) = channel_sink();
    let run = RunContext::new(&opts_for(dir.path(), 3), &sink);
    run.stop.set();

    let exit = run_producer(run.scanner("producer-1".to_string()));
    assert_eq!(exit, TaskExit::Stopped { markers: 3 });

    let token = run.consumers_cancel.clone();
    for _ in 0..3 {
        assert_eq!(run.queue.take(&token).unwrap(), FileTask::Termination);
    }
    assert!(run.queue.is_empty());
}

#[test]
fn test_producer_forced_cancel_without_stop_sends_no_markers() {
    let dir = TempDir::new().unwrap();
    let (sink, _rx) = channel_sink();
    let run = RunContext::new(&opts_for(dir.path(), 2), &sink);
    let scanner = run.scanner("producer-1".to_string());
    let handle = thread::spawn(move || run_producer(scanner));

    thread::sleep(Duration::from_millis(100));
    run.producer_cancel.cancel();
    assert_eq!(handle.join().unwrap(), TaskExit::Cancelled);
    assert!(run.queue.is_empty());
}

#[test]
fn test_producer_stop_while_blocked_on_put_still_delivers_markers() {
    let (dir, files) = text_tree(3);
    let (sink, _rx) = channel_sink();
    let run = RunContext::new(&opts_for(dir.path(), 1), &sink);
    let scanner = run.scanner("producer-1".to_string());
    let handle = thread::spawn(move || run_producer(scanner));

    thread::sleep(Duration::from_millis(100));
    assert!(run.queue.is_full());
    run.stop.set();
    run.producer_cancel.cancel();

    // Drain like a consumer would: queued paths, then the marker.
    let token = run.consumers_cancel.clone();
    let mut paths = 0;
    loop {
        match run.queue.take(&token).unwrap() {
            FileTask::PathItem(p) => {
                assert!(files.contains(&p));
                paths += 1;
            }
            FileTask::Termination => break,
        }
    }
    assert!(paths >= 1 && paths < files.len());
    assert_eq!(handle.join().unwrap(), TaskExit::Stopped { markers: 1 });
    assert!(run.queue.is_empty());
}

#[test]
fn test_producer_marker_delivery_aborted_by_consumer_cancel() {
    let (dir, _files) = text_tree(3);
    let (sink, _rx) = channel_sink();
    let run = RunContext::new(&opts_for(dir.path(), 1), &sink);
    let scanner = run.scanner("producer-1".to_string());
    let handle = thread::spawn(move || run_producer(scanner));

    thread::sleep(Duration::from_millis(100));
    run.stop.set();
    run.producer_cancel.cancel();
    thread::sleep(Duration::from_millis(50));
    run.consumers_cancel.cancel();
    assert_eq!(handle.join().unwrap(), TaskExit::Stopped { markers: 0 });
}

// --- analyzer ---

#[test]
fn test_consumer_reports_and_survives_read_errors() {
    let dir = TempDir::new().unwrap();
    let good = write(dir.path(), "good.txt", b"The the THE cat sat a it2 42");
    let bad = write(dir.path(), "bad.txt", &[0xff, 0xfe, 0x00, 0x41]);
    let missing = dir.path().join("gone.txt");

    let (sink, rx) = channel_sink();
    let mut opts = opts_for(dir.path(), 4);
    opts.top_k = 2;
    let run = RunContext::new(&opts, &sink);
    let token = run.consumers_cancel.clone();
    run.queue.put(FileTask::PathItem(bad.clone()), &token).unwrap();
    run.queue.put(FileTask::PathItem(missing.clone()), &token).unwrap();
    run.queue.put(FileTask::PathItem(good.clone()), &token).unwrap();
    run.queue.put(FileTask::Termination, &token).unwrap();

    let exit = run_consumer(run.analyzer("consumer-1".to_string()));
    assert_eq!(exit, TaskExit::Terminated);

    let events: Vec<ScanEvent> = rx.try_iter().collect();
    assert_eq!(events.len(), 3);
    assert!(matches!(&events[0], ScanEvent::FileError { path, .. } if *path == bad));
    assert!(matches!(&events[1], ScanEvent::FileError { path, .. } if *path == missing));
    match &events[2] {
        ScanEvent::Ranked(r) => {
            assert_eq!(r.worker, "consumer-1");
            assert_eq!(r.path, good);
            assert_eq!(
                r.words,
                vec![("the".to_string(), 3), ("cat".to_string(), 1)]
            );
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn test_consumer_exits_on_cancel_while_waiting() {
    let dir = TempDir::new().unwrap();
    let (sink, rx) = channel_sink();
    let run = RunContext::new(&opts_for(dir.path(), 1), &sink);
    let analyzer = run.analyzer("consumer-1".to_string());
    let handle = thread::spawn(move || run_consumer(analyzer));

    thread::sleep(Duration::from_millis(100));
    run.consumers_cancel.cancel();
    assert_eq!(handle.join().unwrap(), TaskExit::Cancelled);
    assert!(rx.try_recv().is_err());
}

// --- controller ---

#[test]
fn test_controller_rejects_invalid_opts() {
    let (sink, _rx) = channel_sink();
    let opts = Opts {
        consumer_count: 0,
        ..Default::default()
    };
    match Controller::new(opts, sink) {
        Err(ControlError::Config(ConfigError::NoConsumers(0))) => {}
        Err(e) => panic!("unexpected error {e}"),
        Ok(_) => panic!("controller should be rejected"),
    }
}

#[test]
fn test_one_pass_reports_every_file_once_then_stops_gracefully() {
    let (dir, files) = text_tree(6);
    let (sink, rx) = channel_sink();
    let controller = Controller::new(opts_for(dir.path(), 2), sink).unwrap();
    assert_eq!(controller.state(), PipelineState::Idle);

    controller.start().unwrap();
    assert_eq!(controller.state(), PipelineState::Running);

    let events = recv_file_events(&rx, files.len());
    let seen: HashSet<PathBuf> = events.iter().filter_map(|e| e.path().cloned()).collect();
    assert_eq!(seen, files);
    for event in &events {
        match event {
            ScanEvent::Ranked(r) => assert_eq!(
                r.words,
                vec![
                    ("alpha".to_string(), 2),
                    ("beta".to_string(), 1),
                    ("gamma".to_string(), 1)
                ]
            ),
            other => panic!("unexpected event {other:?}"),
        }
    }

    // Producer is now sleeping until the next pass; nothing else arrives.
    assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());

    assert!(controller.stop());
    assert!(controller.wait_idle(WAIT));
    assert_eq!(controller.state(), PipelineState::Idle);
    assert_graceful_exits(&controller, 2);
    assert_eq!(controller.queue_len(), 0);
    controller.shutdown();
}

#[test]
fn test_start_while_running_is_rejected() {
    let (dir, _files) = text_tree(2);
    let (sink, _rx) = channel_sink();
    let controller = Controller::new(opts_for(dir.path(), 2), sink).unwrap();
    controller.start().unwrap();

    assert!(matches!(controller.start(), Err(ControlError::AlreadyRunning)));
    assert_eq!(controller.runs_started(), 1);
    assert_eq!(controller.task_exits().len(), 3);
    assert_eq!(controller.state(), PipelineState::Running);

    controller.stop();
    assert!(controller.wait_idle(WAIT));
    assert_graceful_exits(&controller, 2);
}

#[test]
fn test_restart_after_stop_rescans() {
    let (dir, files) = text_tree(3);
    let (sink, rx) = channel_sink();
    let controller = Controller::new(opts_for(dir.path(), 2), sink).unwrap();

    controller.start().unwrap();
    recv_file_events(&rx, files.len());
    controller.stop();
    assert!(controller.wait_idle(WAIT));

    controller.start().unwrap();
    assert_eq!(controller.runs_started(), 2);
    let events = recv_file_events(&rx, files.len());
    let seen: HashSet<PathBuf> = events.iter().filter_map(|e| e.path().cloned()).collect();
    assert_eq!(seen, files);

    controller.stop();
    assert!(controller.wait_idle(WAIT));
    assert_graceful_exits(&controller, 2);
}

#[test]
fn test_stop_without_run_is_noop() {
    let dir = TempDir::new().unwrap();
    let (sink, _rx) = channel_sink();
    let controller = Controller::new(opts_for(dir.path(), 1), sink).unwrap();
    assert!(!controller.stop());
    assert!(controller.wait_idle(Duration::from_millis(10)));
    assert!(controller.task_exits().is_empty());
}

#[test]
fn test_shutdown_cancels_all_tasks_without_markers() {
    let dir = TempDir::new().unwrap();
    let (sink, _rx) = channel_sink();
    let controller = Controller::new(opts_for(dir.path(), 2), sink).unwrap();
    controller.start().unwrap();
    thread::sleep(Duration::from_millis(100));

    controller.shutdown();
    assert!(controller.is_shut_down());
    assert!(controller.wait_idle(WAIT));
    let exits = controller.task_exits();
    assert_eq!(exits.len(), 3);
    for (label, exit) in exits {
        assert_eq!(exit, Some(TaskExit::Cancelled), "{label}");
    }

    assert!(matches!(controller.start(), Err(ControlError::ShutDown)));
    controller.shutdown();
}

#[test]
fn test_queue_never_exceeds_consumer_count_with_slow_consumers() {
    let (dir, files) = text_tree(12);
    let processed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&processed);
    let sink: Arc<dyn ResultSink> = Arc::new(move |event: ScanEvent| {
        if event.is_file_event() {
            thread::sleep(Duration::from_millis(20));
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });
    let controller = Controller::new(opts_for(dir.path(), 2), sink).unwrap();
    controller.start().unwrap();

    let mut waited = Duration::ZERO;
    while processed.load(Ordering::SeqCst) < files.len() {
        assert!(controller.queue_len() <= 2);
        thread::sleep(Duration::from_millis(2));
        waited += Duration::from_millis(2);
        assert!(waited < WAIT, "consumers did not drain the pass");
    }

    controller.stop();
    assert!(controller.wait_idle(WAIT));
    assert_graceful_exits(&controller, 2);
}

#[test]
fn test_panicking_sink_does_not_end_consumer() {
    // One consumer, more files than queue slots: the consumer must keep draining
    // after each panic or the stop marker would never fit.
    let (dir, files) = text_tree(4);
    let (tx, rx) = unbounded();
    let sink: Arc<dyn ResultSink> = Arc::new(move |event: ScanEvent| {
        if let ScanEvent::Ranked(_) = event {
            panic!("sink failure");
        }
        let _ = tx.send(event);
    });
    let controller = Controller::new(opts_for(dir.path(), 1), sink).unwrap();
    controller.start().unwrap();

    let events = recv_file_events(&rx, files.len());
    for event in &events {
        assert!(matches!(event, ScanEvent::FileError { .. }), "{event:?}");
    }
    let seen: HashSet<PathBuf> = events
        .iter()
        .filter_map(|e| e.path().cloned())
        .collect();
    assert_eq!(seen, files);

    assert!(controller.stop());
    assert!(controller.wait_idle(WAIT));
    assert_eq!(controller.state(), PipelineState::Idle);
    assert_eq!(
        controller.task_exits(),
        vec![
            ("producer-1".to_string(), Some(TaskExit::Stopped { markers: 1 })),
            ("consumer-1".to_string(), Some(TaskExit::Terminated)),
        ]
    );
    controller.start().unwrap();
    controller.shutdown();
}

#[test]
fn test_spawn_task_records_panic() {
    let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
    let handle = spawn_task(&pool, "boom".to_string(), CancelToken::new(), || {
        panic!("task failure")
    });
    assert!(wait_all(&[handle.done_signal()], Instant::now() + WAIT));
    assert_eq!(handle.exit(), Some(TaskExit::Panicked));
    assert!(handle.is_finished());
}

#[test]
fn test_concurrent_start_admits_one_run() {
    const CALLERS: usize = 8;
    let (dir, _files) = text_tree(2);
    let (sink, _rx) = channel_sink();
    let controller = Arc::new(Controller::new(opts_for(dir.path(), 2), sink).unwrap());
    let barrier = Arc::new(Barrier::new(CALLERS));

    let results: Vec<_> = (0..CALLERS)
        .map(|_| {
            let controller = Arc::clone(&controller);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                controller.start()
            })
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(ControlError::AlreadyRunning)))
            .count(),
        CALLERS - 1
    );
    assert_eq!(controller.runs_started(), 1);
    assert_eq!(controller.task_exits().len(), 2 + 1);

    assert!(controller.stop());
    assert!(controller.wait_idle(WAIT));
}

#[test]
fn test_wait_idle_with_unbounded_timeout() {
    let (dir, _files) = text_tree(1);
    let (sink, _rx) = channel_sink();
    let controller = Controller::new(opts_for(dir.path(), 1), sink).unwrap();
    assert!(controller.wait_idle(Duration::MAX));

    controller.start().unwrap();
    assert!(controller.stop());
    assert!(controller.wait_idle(Duration::MAX));
    assert_eq!(controller.state(), PipelineState::Idle);
}
