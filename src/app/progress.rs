//! Terminal progress bar.
//!
//! Rendered on stderr with a carriage return so it rewrites itself in place.
//! Rendering is a pure function; the bar only adds the terminal side effects.

use std::io::Write;
use std::sync::Mutex;

use colored::*;

/// Renders `[#####     ] completed/total (n broken)` with a bar of `width` cells.
pub fn render_progress(completed: usize, broken: usize, total: usize, width: usize) -> String {
    let filled = if total == 0 {
        width
    } else {
        (completed.min(total) * width) / total
    };
    let bar = format!("{}{}", "#".repeat(filled), " ".repeat(width - filled));
    let broken_part = if broken > 0 {
        format!(" ({broken} broken)").red().to_string()
    } else {
        String::new()
    };
    format!("[{bar}] {completed}/{total}{broken_part}")
}

/// Stderr progress bar sized to `width` cells.
pub struct ProgressBar {
    width: usize,
    // Serializes writes from concurrent tasks
    out: Mutex<()>,
}

impl ProgressBar {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            out: Mutex::new(()),
        }
    }

    /// Redraws the bar.
    pub fn update(&self, completed: usize, broken: usize, total: usize) {
        let line = render_progress(completed, broken, total, self.width);
        let _guard = self.out.lock().unwrap_or_else(|e| e.into_inner());
        let mut stderr = std::io::stderr().lock();
        // A closed stderr only loses the bar
        let _ = write!(stderr, "\r{line}");
        let _ = stderr.flush();
    }

    /// Ends the bar's line so later output starts on a fresh one.
    pub fn finish(&self) {
        let _guard = self.out.lock().unwrap_or_else(|e| e.into_inner());
        let _ = writeln!(std::io::stderr());
    }
}
