// src/console/mod.rs

//! ANSI-tagged console output.
//!
//! The binary and the watch engine's verbose mode report significant events
//! as short `[OK]`/`[WARN]`/`[FAIL]` lines. The tags are colored; the
//! message text is left alone so it stays grep-able.

use std::fmt::Display;
use std::io::{self, Write};

use owo_colors::OwoColorize;

/// Print an `[OK]`-tagged line to stdout.
pub fn ok(message: impl Display) {
    println!("[{}] {}", "OK".green(), message);
}

/// Print a `[WARN]`-tagged line to stderr.
pub fn warn(message: impl Display) {
    eprintln!("[{}] {}", "WARN".yellow(), message);
}

/// Print a `[FAIL]`-tagged line to stderr.
pub fn fail(message: impl Display) {
    eprintln!("[{}] {}", "FAIL".red(), message);
}

/// Clear the terminal and put the cursor back in the top-left corner.
pub fn clear() {
    print!("\x1B[2J\x1B[1;1H");
    let _ = io::stdout().flush();
}
