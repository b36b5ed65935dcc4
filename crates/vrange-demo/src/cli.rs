#![forbid(unsafe_code)]

//! Command-line argument parsing for the demo.
//!
//! Parses args manually to keep the binary lean. Supports environment
//! variable overrides via the `VRANGE_DEMO_*` prefix. List configuration
//! (item height, overscan, container height...) comes from the `VRANGE_*`
//! variables read by `VirtualizerConfig::from_env_with_diagnostics`.

use std::env;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
vrange demo: scripted scroll session over a virtualized list

USAGE:
    vrange-demo [OPTIONS]

OPTIONS:
    --items=N            Number of list items (default: 10000)
    --steps=N            Number of scroll steps (default: 20)
    --step-px=F          Scroll delta per step in pixels (default: 250)
    --seed=N             Seed for the simulated item heights (default: 42)
    --settle-passes=N    Max render/measure passes per step (default: 8)
    --append=N           Items appended after each step (default: 0)
    --jsonl              Print one JSON object per step instead of text
    --log-json           Emit tracing logs as JSON (filtered by RUST_LOG)
    --help, -h           Show this help message
    --version, -V        Show version

ENVIRONMENT VARIABLES:
    VRANGE_DEMO_ITEMS          Override --items
    VRANGE_DEMO_STEPS          Override --steps
    VRANGE_DEMO_STEP_PX        Override --step-px
    VRANGE_DEMO_SEED           Override --seed
    VRANGE_DEMO_SETTLE_PASSES  Override --settle-passes
    VRANGE_DEMO_APPEND         Override --append
    VRANGE_DEMO_JSONL          Enable JSONL output (1/true)
    VRANGE_DEMO_LOG_JSON       Enable JSON logs (1/true)
    VRANGE_ITEM_HEIGHT         auto | fixed item height in pixels
    VRANGE_ESTIMATED_HEIGHT    Estimate for unmeasured items
    VRANGE_OVERSCAN            Items rendered past each viewport edge
    VRANGE_CONTAINER_HEIGHT    Viewport height in pixels
    VRANGE_HEIGHT_INDEX        linear | fenwick
    VRANGE_FOLLOW              Keep the viewport pinned to the bottom (1/true)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct Opts {
    /// Number of list items.
    pub items: usize,
    /// Number of scroll steps.
    pub steps: usize,
    /// Scroll delta per step.
    pub step_px: f64,
    /// Seed for simulated item heights.
    pub seed: u64,
    /// Max render/measure passes per step.
    pub settle_passes: usize,
    /// Items appended after each step.
    pub append: usize,
    /// Print JSONL records instead of text.
    pub jsonl: bool,
    /// JSON tracing output.
    pub log_json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ParseError {
    Help,
    Version,
    InvalidValue { flag: &'static str, value: String },
    UnknownArg(String),
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            items: 10_000,
            steps: 20,
            step_px: 250.0,
            seed: 42,
            settle_passes: 8,
            append: 0,
            jsonl: false,
            log_json: false,
        }
    }
}

fn parse_flag_bool(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

impl Opts {
    /// Parse command-line arguments and environment variables.
    ///
    /// Environment variables take precedence over defaults but are overridden
    /// by explicit command-line flags.
    pub fn parse() -> Self {
        match Self::parse_from_env_and_args(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(opts) => opts,
            Err(ParseError::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Err(ParseError::Version) => {
                println!("vrange-demo {VERSION}");
                process::exit(0);
            }
            Err(ParseError::InvalidValue { flag, value }) => {
                eprintln!("Invalid {flag} value: {value}");
                process::exit(1);
            }
            Err(ParseError::UnknownArg(arg)) => {
                eprintln!("Unknown argument: {arg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    fn parse_from_env_and_args<I, S, F>(args: I, get_env: F) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        // Apply environment variable defaults first
        if let Some(val) = get_env("VRANGE_DEMO_ITEMS")
            && let Ok(n) = val.parse()
        {
            opts.items = n;
        }
        if let Some(val) = get_env("VRANGE_DEMO_STEPS")
            && let Ok(n) = val.parse()
        {
            opts.steps = n;
        }
        if let Some(val) = get_env("VRANGE_DEMO_STEP_PX")
            && let Ok(n) = val.parse()
        {
            opts.step_px = n;
        }
        if let Some(val) = get_env("VRANGE_DEMO_SEED")
            && let Ok(n) = val.parse()
        {
            opts.seed = n;
        }
        if let Some(val) = get_env("VRANGE_DEMO_SETTLE_PASSES")
            && let Ok(n) = val.parse()
        {
            opts.settle_passes = n;
        }
        if let Some(val) = get_env("VRANGE_DEMO_APPEND")
            && let Ok(n) = val.parse()
        {
            opts.append = n;
        }
        if let Some(val) = get_env("VRANGE_DEMO_JSONL") {
            opts.jsonl = parse_flag_bool(&val);
        }
        if let Some(val) = get_env("VRANGE_DEMO_LOG_JSON") {
            opts.log_json = parse_flag_bool(&val);
        }

        // Parse command-line args (override env vars)
        for arg in args {
            let arg = arg.as_ref();
            match arg {
                "--help" | "-h" => return Err(ParseError::Help),
                "--version" | "-V" => return Err(ParseError::Version),
                "--jsonl" => opts.jsonl = true,
                "--log-json" => opts.log_json = true,
                other => {
                    let Some((flag, val)) = other.split_once('=') else {
                        return Err(ParseError::UnknownArg(other.to_string()));
                    };
                    let invalid = |flag: &'static str| ParseError::InvalidValue {
                        flag,
                        value: val.to_string(),
                    };
                    match flag {
                        "--items" => opts.items = val.parse().map_err(|_| invalid("--items"))?,
                        "--steps" => opts.steps = val.parse().map_err(|_| invalid("--steps"))?,
                        "--step-px" => {
                            opts.step_px = val
                                .parse::<f64>()
                                .ok()
                                .filter(|v| v.is_finite())
                                .ok_or_else(|| invalid("--step-px"))?;
                        }
                        "--seed" => opts.seed = val.parse().map_err(|_| invalid("--seed"))?,
                        "--settle-passes" => {
                            opts.settle_passes =
                                val.parse().map_err(|_| invalid("--settle-passes"))?;
                        }
                        "--append" => opts.append = val.parse().map_err(|_| invalid("--append"))?,
                        _ => return Err(ParseError::UnknownArg(other.to_string())),
                    }
                }
            }
        }

        Ok(opts)
    }
}
