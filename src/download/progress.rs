//! Per-artifact progress line.
//!
//! On an interactive stdout each artifact gets one overwritten line showing
//! its URL and a percentage. Otherwise the bar is hidden and draws nothing.

use std::io::IsTerminal;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const PROGRESS_TEMPLATE: &str = "{msg:66} {percent:>3}%";

/// True when stdout is attached to a terminal.
#[must_use]
pub fn stdout_is_interactive() -> bool {
    std::io::stdout().is_terminal()
}

/// Creates the progress line for one artifact.
#[must_use]
pub fn artifact_progress(label: &str, interactive: bool) -> ProgressBar {
    if !interactive {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
    bar.set_style(
        ProgressStyle::with_template(PROGRESS_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.set_message(label.to_string());
    bar
}

/// Marks the artifact as fully received after `bytes` bytes.
///
/// Without a `Content-Length` the bar has no usable length; the received
/// size becomes the length so the line ends at 100%.
pub fn complete(bar: &ProgressBar, bytes: u64) {
    if bar.length().is_none_or(|len| len < bytes) {
        bar.set_length(bytes);
    }
    bar.set_position(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_interactive_progress_is_hidden() {
        let bar = artifact_progress("http://springerlink.com/content/a/1.pdf", false);
        assert!(bar.is_hidden());
        bar.set_position(10);
        bar.finish();
    }

    #[test]
    fn test_progress_template_is_valid() {
        assert!(ProgressStyle::with_template(PROGRESS_TEMPLATE).is_ok());
    }

    #[test]
    fn test_complete_without_declared_length_reaches_full() {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden());
        bar.set_position(4096);
        complete(&bar, 4096);
        assert_eq!(bar.length(), Some(4096));
        assert_eq!(bar.position(), 4096);
    }

    #[test]
    fn test_complete_keeps_declared_length() {
        let bar = ProgressBar::with_draw_target(Some(1000), ProgressDrawTarget::hidden());
        complete(&bar, 1000);
        assert_eq!(bar.length(), Some(1000));
        assert_eq!(bar.position(), 1000);
    }
}
