//! Styled terminal output utilities.

use std::time::Duration;

use owo_colors::OwoColorize;

/// Print a success message
pub fn success(text: &str) {
    println!("{} {}", "✔".green().bold(), text.green());
}

/// Print an info message
pub fn info(text: &str) {
    println!("{} {}", "ℹ".blue().bold(), text);
}

/// Print an error message
pub fn error(text: &str) {
    eprintln!("{} {}", "✖".red().bold(), text.red());
}

/// Print a newline
pub fn newline() {
    println!();
}

/// Round a duration to a precision worth reporting in the summary line.
pub fn round_duration(d: Duration) -> Duration {
    let mut d = d;
    if d > Duration::from_millis(1) {
        d = Duration::from_millis(d.as_millis() as u64);
    }
    if d > Duration::from_millis(100) {
        d = Duration::from_millis(d.as_millis() as u64 / 100 * 100);
    }
    if d > Duration::from_secs(10) {
        d = Duration::from_secs(d.as_secs());
    }
    if d > Duration::from_secs(600) {
        d = Duration::from_secs(d.as_secs() / 60 * 60);
    }
    d
}
