//! Terminal output formatting utilities.

use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use tether_core::SyncStatus;

static QUIET_MODE: AtomicBool = AtomicBool::new(false);

/// Set quiet mode globally. Call once at startup.
pub fn set_quiet(quiet: bool) {
    QUIET_MODE.store(quiet, Ordering::Relaxed);
}

fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::Relaxed)
}

/// Print a success message (suppressed in quiet mode).
pub fn success(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "✓".green(), msg);
    }
}

/// Print an error message (always prints to stderr).
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print multi-line diagnostic text under an error, indented (stderr).
pub fn error_detail(text: &str) {
    for line in text.lines() {
        eprintln!("    {}", line.dimmed());
    }
}

/// Print an info message (suppressed in quiet mode).
pub fn info(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "→".blue(), msg);
    }
}

/// Print essential machine-readable output (always prints).
///
/// Use for results that should be available for piping, like JSON reports.
pub fn essential(msg: &str) {
    println!("{msg}");
}

/// Colored status word for summaries.
#[must_use]
pub fn status_label(status: SyncStatus) -> String {
    let text = status.to_string();
    match status {
        SyncStatus::Succeeded => text.green().to_string(),
        SyncStatus::Skipped => text.dimmed().to_string(),
        SyncStatus::Failed => text.red().to_string(),
    }
}
