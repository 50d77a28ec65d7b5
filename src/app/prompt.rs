//! End-of-run retry confirmation.

use std::io::{BufRead, IsTerminal, Write};

/// Asks on the terminal whether to retry `broken` domains.
///
/// Returns `false` without asking when stdin is not a terminal (piped input,
/// CI), so unattended runs never block.
pub fn confirm_retry(broken: usize) -> bool {
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        return false;
    }

    eprint!(
        "{broken} domain{} could not be checked. Retry {}? [y/N] ",
        if broken == 1 { "" } else { "s" },
        if broken == 1 { "it" } else { "them" }
    );
    let _ = std::io::stderr().flush();

    let mut answer = String::new();
    match stdin.lock().read_line(&mut answer) {
        Ok(_) => is_affirmative(&answer),
        Err(e) => {
            log::warn!("Failed to read retry answer: {e}");
            false
        }
    }
}

/// `y` or `yes`, case-insensitive; anything else is a no.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
