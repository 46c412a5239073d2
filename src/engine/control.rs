//! Control surface for the CLI: Ctrl-C and stdin commands driving a [`Controller`].

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{info, warn};
use std::io::BufRead;
use std::time::{Duration, Instant};

use crate::Controller;
use crate::error::ControlError;
use crate::utils::config::ControlConsts;

/// What the operator asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Status,
    Quit,
    /// Ctrl-C.
    Interrupt,
}

/// Parse one line of interactive input. Case-insensitive; surrounding whitespace ignored.
pub fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "start" => Some(Command::Start),
        "stop" => Some(Command::Stop),
        "status" => Some(Command::Status),
        "quit" | "exit" | "close" => Some(Command::Quit),
        _ => None,
    }
}

/// Install the Ctrl-C handler and, when `interactive`, a stdin reader thread.
/// Both feed one command channel. End of stdin counts as `quit`.
pub fn command_channel(interactive: bool) -> Result<Receiver<Command>> {
    let (tx, rx) = unbounded();
    let ctrlc_tx = tx.clone();
    ctrlc::set_handler(move || {
        let _ = ctrlc_tx.send(Command::Interrupt);
    })
    .context("install Ctrl-C handler")?;

    if interactive {
        std::thread::Builder::new()
            .name("stdin".to_string())
            .spawn(move || read_commands(std::io::stdin().lock(), tx))
            .context("spawn stdin reader")?;
    }
    Ok(rx)
}

fn read_commands<R: BufRead>(input: R, tx: Sender<Command>) {
    for line in input.lines() {
        let Ok(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Some(cmd) => {
                if tx.send(cmd).is_err() {
                    return;
                }
            }
            None => warn!("Unknown command {:?} (start, stop, status, quit)", line.trim()),
        }
    }
    let _ = tx.send(Command::Quit);
}

/// Graceful stop: signal, then wait for the run to drain. A second Ctrl-C (or the grace
/// period running out) ends the wait early. Returns true if the run drained.
fn stop_and_drain(controller: &Controller, commands: &Receiver<Command>, grace: Duration) -> bool {
    if !controller.stop() {
        return true;
    }
    let deadline = Instant::now() + grace;
    while Instant::now() < deadline {
        if controller.wait_idle(Duration::from_millis(200)) {
            return true;
        }
        if let Ok(Command::Interrupt) = commands.try_recv() {
            warn!("Second interrupt: forcing shutdown");
            return false;
        }
    }
    warn!("Run did not drain within {}s: forcing shutdown", grace.as_secs());
    false
}

fn print_status(controller: &Controller) {
    println!(
        "state: {:?}, runs started: {}, queued: {}",
        controller.state(),
        controller.runs_started(),
        controller.queue_len()
    );
    for (label, exit) in controller.task_exits() {
        match exit {
            Some(exit) => println!("  {label}: finished ({exit:?})"),
            None => println!("  {label}: running"),
        }
    }
}

/// Non-interactive mode: the run is already started; the first Ctrl-C stops it gracefully.
pub fn run_until_interrupted(controller: &Controller, commands: &Receiver<Command>) -> Result<()> {
    while let Ok(cmd) = commands.recv() {
        if matches!(cmd, Command::Interrupt | Command::Quit) {
            info!("Interrupted: stopping");
            stop_and_drain(controller, commands, ControlConsts::STOP_GRACE);
            break;
        }
    }
    controller.shutdown();
    Ok(())
}

/// Interactive mode: the operator drives start / stop; `quit` or Ctrl-C tears everything down.
pub fn run_interactive(controller: &Controller, commands: &Receiver<Command>) -> Result<()> {
    println!("Commands: start, stop, status, quit");
    while let Ok(cmd) = commands.recv() {
        match cmd {
            Command::Start => match controller.start() {
                Ok(()) => {}
                Err(ControlError::AlreadyRunning) => {
                    println!("Cannot start a new run: at least one producer is still running!")
                }
                Err(e) => return Err(e).context("start run"),
            },
            Command::Stop => {
                controller.stop();
            }
            Command::Status => print_status(controller),
            Command::Quit | Command::Interrupt => break,
        }
    }
    controller.shutdown();
    Ok(())
}
