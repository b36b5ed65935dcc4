#![forbid(unsafe_code)]

//! vrange demo binary entry point.

use std::io::{self, Write};
use std::process;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vrange_core::VirtualizerConfig;
use vrange_demo::cli;
use vrange_demo::session::Session;

fn init_logging(json: bool) {
    if json {
        vrange_core::logging::init_json_subscriber();
        return;
    }
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn main() {
    let opts = cli::Opts::parse();
    init_logging(opts.log_json);

    let parsed = VirtualizerConfig::from_env_with_diagnostics();
    for err in &parsed.errors {
        warn!(field = err.field(), error = %err, "ignoring invalid environment value");
    }
    let config = parsed.config;
    info!(
        config = %config.summary_short(),
        items = opts.items,
        steps = opts.steps,
        "starting scroll session"
    );

    let mut session = match Session::new(&config, opts.items, opts.seed, opts.settle_passes) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            process::exit(1);
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for step in 0..opts.steps {
        let delta = if step == 0 { 0.0 } else { opts.step_px };
        let record = session.step(step, delta);
        let line = if opts.jsonl {
            record.to_json().to_string()
        } else {
            record.summary_line()
        };
        // Stop quietly when the reader goes away (e.g. piped into `head`).
        if writeln!(out, "{line}").is_err() {
            break;
        }
        if opts.append > 0 {
            session.append(opts.append);
        }
    }
}
