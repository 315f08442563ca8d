//! Output formatting and progress indicators
//!
//! Spinners for running stages, status-prefixed messages, and the global
//! output mode selected by `--quiet` / `--json` / `-v`.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::core::pipeline::{PipelineObserver, Stage};

static QUIET: AtomicBool = AtomicBool::new(false);
static JSON: AtomicBool = AtomicBool::new(false);

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";

    /// Skipped stage prefix
    pub const SKIPPED: &str = "-";
}

/// Output mode chosen on the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    pub quiet: bool,
    pub json: bool,
    pub verbose: u8,
}

impl OutputConfig {
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Make this configuration visible to the `is_*` helpers
    pub fn apply_global(self) {
        QUIET.store(self.quiet, Ordering::Relaxed);
        JSON.store(self.json, Ordering::Relaxed);
    }

    /// Default tracing directive for this verbosity
    pub fn log_directive(self) -> &'static str {
        if self.json {
            return "off";
        }
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    /// Whether stage spinners should be drawn
    pub fn shows_progress(self) -> bool {
        !self.quiet && !self.json && self.verbose == 0
    }
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

pub fn is_json() -> bool {
    JSON.load(Ordering::Relaxed)
}

/// Print a success line unless quiet or JSON
pub fn print_success(message: &str) {
    if !is_quiet() && !is_json() {
        println!("{} {message}", status::SUCCESS);
    }
}

/// Print an informational line unless quiet or JSON
pub fn print_info(message: &str) {
    if !is_quiet() && !is_json() {
        println!("{} {message}", status::INFO);
    }
}

/// Print an indented detail line unless quiet or JSON
pub fn print_detail(message: &str) {
    if !is_quiet() && !is_json() {
        println!("    {message}");
    }
}

/// Print a warning to stderr unless JSON
pub fn print_warning(message: &str) {
    if !is_json() {
        eprintln!("{} {message}", status::WARNING);
    }
}

/// Print an error and its full cause chain to stderr
pub fn display_error(error: &anyhow::Error) {
    if is_json() {
        let causes: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
        let json = serde_json::json!({
            "status": "error",
            "error": error.to_string(),
            "causes": causes,
        });
        eprintln!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        return;
    }

    eprintln!("{} {error}", status::ERROR);
    for cause in error.chain().skip(1) {
        for line in cause.to_string().lines() {
            eprintln!("    {line}");
        }
    }
}

/// Create a spinner for operations with unknown duration
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Draws one spinner per running stage and a status line per transition
#[derive(Default)]
pub struct StageProgress {
    enabled: bool,
    current: Option<ProgressBar>,
}

impl StageProgress {
    pub fn new(config: OutputConfig) -> Self {
        Self {
            enabled: config.shows_progress(),
            current: None,
        }
    }

    fn finish(&mut self, line: String) {
        match self.current.take() {
            Some(pb) if pb.is_hidden() => {
                pb.finish_and_clear();
                println!("{line}");
            }
            Some(pb) => pb.finish_with_message(line),
            None => {
                if self.enabled {
                    println!("{line}");
                }
            }
        }
    }
}

impl PipelineObserver for StageProgress {
    fn stage_started(&mut self, stage: Stage) {
        if self.enabled {
            self.current = Some(create_spinner(&format!("{stage}...")));
        }
    }

    fn stage_finished(&mut self, stage: Stage, elapsed: Duration) {
        let line = format!("{} {stage} ({:.1}s)", status::SUCCESS, elapsed.as_secs_f64());
        self.finish(line);
    }

    fn stage_skipped(&mut self, stage: Stage) {
        self.finish(format!("{} {stage} (skipped)", status::SKIPPED));
    }

    fn stage_failed(&mut self, stage: Stage) {
        if let Some(pb) = self.current.take() {
            pb.abandon_with_message(format!("{} {stage}", status::ERROR));
        }
    }
}
