// ============================================================================
// utilkit-cli/src/logging.rs
// ============================================================================
//
// LOGGING: fern Backend for the `log` Facade
//
// Everything the tools print, including the styled terminal output of
// utilkit-core, goes through `log`. The console receives the bare message;
// an optional log file receives timestamped lines with ANSI codes removed.
//
// KEY COMPONENTS:
// - init_logging: Installs the global logger
// - resolve_level: -v flag and UTILKIT_LOG_LEVEL handling
//
// USAGE:
// - default: info
// - -v/--verbose: debug (ffmpeg command lines, per-file details)
// - UTILKIT_LOG_LEVEL=<off|error|warn|info|debug|trace> overrides both
//
// AI-ASSISTANT-INFO: Logger setup for the CLI (console + optional file)

use anyhow::{Context, Result};
use log::{Level, LevelFilter};
use owo_colors::OwoColorize;
use std::path::Path;
use std::str::FromStr;

/// Picks the log level: `UTILKIT_LOG_LEVEL` if it parses, otherwise the -v flag.
pub fn resolve_level(verbose: bool) -> LevelFilter {
    std::env::var("UTILKIT_LOG_LEVEL")
        .ok()
        .and_then(|raw| LevelFilter::from_str(raw.trim()).ok())
        .unwrap_or(if verbose { LevelFilter::Debug } else { LevelFilter::Info })
}

fn use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none()
        && supports_color::on(supports_color::Stream::Stdout).is_some()
}

fn console_line(level: Level, message: &str, color: bool) -> String {
    match (level, color) {
        (Level::Error, true) => format!("{} {message}", "✗".red().bold()),
        (Level::Error, false) => format!("✗ {message}"),
        (Level::Warn, true) => format!("{} {message}", "⚠".yellow()),
        (Level::Warn, false) => format!("⚠ {message}"),
        _ => message.to_string(),
    }
}

fn file_line(level: Level, target: &str, message: &str) -> String {
    format!(
        "[{} {:<5} {target}] {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        level,
        strip_ansi_escapes::strip_str(message)
    )
}

/// Installs the global logger.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = resolve_level(verbose);
    let color = use_color();

    let console = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{}",
                console_line(record.level(), &message.to_string(), color)
            ))
        })
        .chain(std::io::stdout());

    let mut dispatch = fern::Dispatch::new()
        .level(level)
        .level_for("lopdf", LevelFilter::Warn)
        .level_for("pdf_extract", LevelFilter::Warn)
        .chain(console);

    if let Some(path) = log_file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("could not create log directory {}", parent.display()))?;
        }
        let file = fern::log_file(path)
            .with_context(|| format!("could not open log file {}", path.display()))?;
        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "{}",
                        file_line(record.level(), record.target(), &message.to_string())
                    ))
                })
                .chain(file),
        );
    }

    dispatch.apply().context("logger was already initialized")?;
    log::debug!("Log level: {level}");
    Ok(())
}
