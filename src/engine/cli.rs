//! CLI command handler: build options (defaults < config file < flags), then drive the controller.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::arg_parser::Cli;
use crate::engine::control::{command_channel, run_interactive, run_until_interrupted};
use crate::engine::tools::check_root;
use crate::report::{ConsoleSink, JsonLinesSink, ResultSink};
use crate::utils::{PackagePaths, apply_file_to_opts, parse_wordscan_toml, setup_logging};
use crate::{Controller, Opts};

/// Apply CLI flags over `opts`. Only flags that were given override.
pub fn apply_cli_to_opts(cli: &Cli, opts: &mut Opts) {
    if let Some(ref dir) = cli.dir {
        opts.root = dir.clone();
    }
    if let Some(secs) = cli.interval {
        opts.scan_interval = Duration::from_secs(secs);
    }
    if let Some(n) = cli.consumers {
        opts.consumer_count = n;
    }
    if let Some(k) = cli.top_k {
        opts.top_k = k;
    }
    if let Some(len) = cli.min_word_length {
        opts.min_word_length = len;
    }
    if let Some(v) = cli.follow_links {
        opts.follow_links = v;
    }
    if let Some(v) = cli.json {
        opts.json = v;
    }
    if let Some(v) = cli.verbose {
        opts.verbose = v;
    }
}

fn config_path(cli: &Cli) -> PathBuf {
    cli.config
        .clone()
        .unwrap_or_else(|| PathBuf::from(PackagePaths::get().config_filename()))
}

/// Defaults, then the config file (if any), then CLI flags.
///
/// A malformed config file is skipped. So is a missing one, which is only worth mentioning
/// when it was named with `--config`. The problem is returned so it can be logged once
/// logging is set up (the file may itself turn on verbose output).
pub fn build_opts(cli: &Cli) -> (Opts, Option<String>) {
    let mut opts = Opts::default();
    let path = config_path(cli);
    let mut problem = None;
    match std::fs::read_to_string(&path) {
        Ok(s) => match parse_wordscan_toml(&s) {
            Ok(file) => apply_file_to_opts(&file, &mut opts),
            Err(e) => problem = Some(format!("{}: {}", path.display(), e)),
        },
        Err(e) if cli.config.is_some() => problem = Some(format!("{}: {}", path.display(), e)),
        Err(_) => {}
    }
    apply_cli_to_opts(cli, &mut opts);
    (opts, problem)
}

/// Run the scanner until interrupted (or until `quit` in interactive mode).
pub fn handle_run(cli: &Cli) -> Result<()> {
    let (opts, config_problem) = build_opts(cli);
    setup_logging(opts.verbose);
    if let Some(problem) = config_problem {
        warn!("Ignoring config file: {}", problem);
    }
    debug!("{} CONFIG:{:#?}", PackagePaths::get().pkg_name().to_uppercase(), opts);

    if let Err(e) = check_root(&opts.root) {
        warn!("{:#}; retrying on every pass", e);
    }

    let sink: Arc<dyn ResultSink> = if opts.json {
        Arc::new(JsonLinesSink::stdout())
    } else {
        Arc::new(ConsoleSink)
    };
    let controller = Controller::new(opts, sink).context("create controller")?;
    let commands = command_channel(cli.interactive)?;

    if cli.interactive {
        run_interactive(&controller, &commands)
    } else {
        controller.start().context("start run")?;
        run_until_interrupted(&controller, &commands)
    }
}
