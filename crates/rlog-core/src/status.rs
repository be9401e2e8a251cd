//! Spinner shown while something slow runs.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"];

/// A running spinner. Cleared on [`finish`](Self::finish) or drop.
#[derive(Debug)]
pub struct Status {
    bar: ProgressBar,
}

impl Status {
    /// Start a spinner with `message`, drawn on `target`.
    pub fn new(message: impl Into<String>, target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(None, target)
            .with_style(
                ProgressStyle::with_template("{spinner:.cyan} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_strings(TICKS),
            )
            .with_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    /// Replace the message.
    pub fn update(&self, message: impl Into<String>) {
        self.bar.set_message(message.into());
    }

    /// Current message.
    pub fn message(&self) -> String {
        self.bar.message()
    }

    /// Whether the spinner draws nowhere.
    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }

    /// Run `f` with the spinner hidden, so regular output isn't torn.
    pub fn suspend<R>(&self, f: impl FnOnce() -> R) -> R {
        self.bar.suspend(f)
    }

    /// Stop and clear the spinner.
    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for Status {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_replaces_message() {
        let status = Status::new("working", ProgressDrawTarget::hidden());
        assert_eq!(status.message(), "working");
        status.update("still working");
        assert_eq!(status.message(), "still working");
        status.finish();
    }

    #[test]
    fn suspend_returns_closure_value() {
        let status = Status::new("busy", ProgressDrawTarget::hidden());
        assert_eq!(status.suspend(|| 7), 7);
    }

    #[test]
    fn hidden_target_draws_nothing() {
        let status = Status::new("quiet", ProgressDrawTarget::hidden());
        assert!(status.is_hidden());
        status.finish();
    }
}
