//! Terminal UI components and styling for utilkit.
//!
//! This module provides consistent terminal output styling using a hierarchical
//! system with minimal symbols and consistent spacing. All output goes through
//! the `log` facade so that the CLI's logger decides where it ends up.

use console::{Term, style};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::sync::{LazyLock, Mutex};
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

/// Represents the visual hierarchy levels in the CLI output
#[derive(Debug, Clone, Copy)]
pub enum OutputLevel {
    /// Level 1: Main sections (===== SECTION =====)
    Section,
    /// Level 2: Subsections and major operations (» Operation)
    Subsection,
    /// Level 3: Progress items and sub-operations
    Progress,
    /// Level 4: Key-value status information
    Status,
}

impl OutputLevel {
    fn indent(&self) -> &'static str {
        match self {
            OutputLevel::Section => "",
            OutputLevel::Subsection => "  ",
            OutputLevel::Progress => "    ",
            OutputLevel::Status => "      ",
        }
    }
}

struct TerminalState {
    current_progress: Option<ProgressBar>,
}

static TERMINAL_STATE: LazyLock<Mutex<TerminalState>> =
    LazyLock::new(|| Mutex::new(TerminalState { current_progress: None }));

/// Check if color should be used (respects NO_COLOR and terminal support)
fn should_use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none()
        && supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Print a section header for major workflow phases
pub fn print_section(title: &str) {
    info!("");
    if should_use_color() {
        info!("===== {} =====", title.to_uppercase().cyan());
    } else {
        info!("===== {} =====", title.to_uppercase());
    }
    info!("");
}

/// Print an item at the specified hierarchy level
pub fn print_item(level: OutputLevel, symbol: Option<&str>, text: &str, bold: bool) {
    let indent = level.indent();
    let output = match (symbol, should_use_color() && bold) {
        (Some(sym), true) => format!("{indent}{sym} {}", style(text).bold()),
        (None, true) => format!("{indent}{}", style(text).bold()),
        (Some(sym), false) => format!("{indent}{sym} {text}"),
        (None, false) => format!("{indent}{text}"),
    };
    info!("{output}");
}

/// Print a subsection or processing step
pub fn print_processing(message: &str) {
    info!("");
    print_item(OutputLevel::Subsection, Some("»"), message, true);
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    info!("");
    print_item(OutputLevel::Subsection, None, title, true);
}

/// Print a success message
pub fn print_success(message: &str) {
    info!("");
    if should_use_color() {
        info!("  ✓ {}", message.green());
    } else {
        info!("  ✓ {message}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emphasis {
    Good,
    Caution,
    Bad,
    Strong,
    Plain,
}

fn value_emphasis(label: &str, value: &str, highlight: bool) -> Emphasis {
    match label {
        "Target" if value == "met" => Emphasis::Good,
        "Target" if value == "missed" => Emphasis::Caution,
        "Files failed" if value != "0" => Emphasis::Bad,
        "Bitrate" => Emphasis::Strong,
        _ if highlight => Emphasis::Strong,
        _ => Emphasis::Plain,
    }
}

/// Print a status line (key-value pair)
pub fn print_status(label: &str, value: &str, highlight: bool) {
    let label_width = 15;
    let padding = if label.width() < label_width {
        label_width - label.width()
    } else {
        1
    };
    let indent = OutputLevel::Status.indent();

    if !should_use_color() {
        info!("{indent}{label}:{} {value}", " ".repeat(padding));
        return;
    }

    let colored_value = match value_emphasis(label, value, highlight) {
        Emphasis::Good => value.green().to_string(),
        Emphasis::Caution => value.yellow().to_string(),
        Emphasis::Bad => value.red().to_string(),
        Emphasis::Strong => value.bold().to_string(),
        Emphasis::Plain => value.to_string(),
    };

    info!("{indent}{label}:{} {colored_value}", " ".repeat(padding));
}

/// Print an error message
pub fn print_error(title: &str, message: &str, suggestion: Option<&str>) {
    if should_use_color() {
        info!("✗ {}", title.red().bold());
    } else {
        info!("✗ {title}");
    }

    info!("");
    info!("  Message:  {message}");

    if let Some(suggestion_text) = suggestion {
        info!("");
        info!("  Suggestion: {suggestion_text}");
    }

    info!("");
}

/// Print a warning message
pub fn print_warning(message: &str) {
    if should_use_color() {
        info!("  ⚠ {}", message.yellow());
    } else {
        info!("  ⚠ {message}");
    }
}

/// Print a sub-item under a processing step
pub fn print_sub_item(message: &str) {
    print_item(OutputLevel::Progress, None, message, false);
}

fn progress_style(label: &str) -> ProgressStyle {
    let term_width = Term::stderr().size().1 as usize;
    let template = if term_width >= 100 {
        format!("  ⧖ {label}: {{percent:>3}}% [{{bar:30}}] ({{elapsed_precise}} / {{eta_precise}})")
    } else if term_width >= 60 {
        format!("  ⧖ {label}: {{percent:>3}}% [{{bar:20}}]\n    ETA: {{eta_precise}}")
    } else {
        "  ⧖ {percent:>3}% [{bar:10}]".to_string()
    };

    ProgressStyle::default_bar()
        .template(&template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##.")
}

fn init_progress_bar(label: &str, total_secs: f64) -> ProgressBar {
    let pb = ProgressBar::new((total_secs.max(0.0) * 1000.0) as u64);
    pb.set_style(progress_style(label));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Updates (creating on first call) the progress bar for a running ffmpeg job.
///
/// Does nothing when stderr is not a terminal.
pub fn print_progress_bar(label: &str, elapsed_secs: f64, total_secs: f64, speed: Option<f32>) {
    if !std::io::stderr().is_terminal() {
        return;
    }

    let Ok(mut state) = TERMINAL_STATE.lock() else {
        return;
    };

    let pb = state
        .current_progress
        .get_or_insert_with(|| init_progress_bar(label, total_secs));
    pb.set_position((elapsed_secs.max(0.0) * 1000.0) as u64);
    if let Some(speed_val) = speed {
        pb.set_message(format!("{label} - Speed: {speed_val:.2}x"));
    }
    pb.tick();
}

/// Finish the current progress bar (leave final state visible)
pub fn finish_progress_bar() {
    if let Ok(mut state) = TERMINAL_STATE.lock() {
        if let Some(pb) = state.current_progress.take() {
            pb.finish();
        }
    }
}
