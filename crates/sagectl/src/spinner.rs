//! Thinking spinner shown while a model call is in flight.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner with the action's loading label. Finish with
/// `finish_and_clear` so the result is not printed under a stale line.
pub fn thinking_spinner(label: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", " "])
            .template("{spinner} {msg}")
            .expect("spinner template is static"),
    );
    spinner.set_message(label.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
