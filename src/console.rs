//! Console presentation helpers

use crossterm::execute;
use crossterm::terminal::SetTitle;
use std::io::{self, BufRead, Write};

const BANNER: &str = r"
 _____ _ _ _ _____ _____ _____
|   __| | | |   __|   __|  _  |
|__   | | | |   __|   __|   __|
|_____|_____|_____|_____|__|

Concurrent proxy tester with live progress
";

/// Print the startup banner
pub fn display_banner() {
    println!("{BANNER}");
}

/// Update the terminal title. Best-effort: ignored on terminals that do
/// not support title changes.
pub fn set_console_title(title: &str) {
    let _ = execute!(io::stdout(), SetTitle(title));
}

/// Block until the operator presses enter. Suppressed when stdin or
/// stdout is unavailable.
pub fn pause_for_exit() {
    print!("\nPress Enter to exit...");
    if io::stdout().flush().is_err() {
        return;
    }

    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}
