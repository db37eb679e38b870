//! Progress indicators with CI fallback

use super::context::UiContext;
use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar for batch operations over many deliverables.
///
/// Shows an indicatif bar in interactive mode and one line per item in CI.
pub struct BatchProgress {
    bar: Option<ProgressBar>,
    label: String,
}

impl BatchProgress {
    pub fn new(ctx: &UiContext, label: &str) -> Self {
        let bar = if ctx.use_fancy_output() {
            let bar = ProgressBar::new(0);
            let style = ProgressStyle::default_bar()
                .template("  {spinner:.cyan} {prefix}  {bar:20.cyan/dim} {pos}/{len} {msg:.dim}")
                .map(|s| s.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ").progress_chars("━╸─"))
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            bar.set_style(style);
            bar.set_prefix(label.to_string());
            bar.enable_steady_tick(std::time::Duration::from_millis(120));
            Some(bar)
        } else {
            None
        };
        Self {
            bar,
            label: label.to_string(),
        }
    }

    /// Record that `done` of `total` items are finished
    pub fn advance(&self, done: usize, total: usize, item: &str) {
        if let Some(ref bar) = self.bar {
            bar.set_length(total as u64);
            bar.set_position(done as u64);
            bar.set_message(item.to_string());
        } else {
            println!("  {} {}/{}: {}", self.label, done, total, item);
        }
    }

    /// Finish and clear the progress bar.
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_progress_non_interactive() {
        let ctx = UiContext::non_interactive();
        let progress = BatchProgress::new(&ctx, "Exporting");
        progress.advance(1, 2, "deliverable 1");
        progress.advance(2, 2, "deliverable 2");
        progress.finish();
        // Should not panic
    }
}
