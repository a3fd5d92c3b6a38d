//! Progress reporting for folder conversions

use indicatif::{ProgressBar, ProgressStyle};

/// Bar counting converted templates
pub fn template_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.cyan} {msg} [{bar:40.cyan/blue}] {pos}/{len} templates")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░ ");
    bar.set_style(style);
    bar
}

/// Replace the bar with a final status line, green when nothing failed
pub fn finish_templates(bar: &ProgressBar, converted: usize, failed: usize) {
    let (template, prefix) = if failed == 0 {
        ("{prefix:.green} {msg}", "✓")
    } else {
        ("{prefix:.red} {msg}", "✗")
    };
    bar.set_style(
        ProgressStyle::default_bar()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.set_prefix(prefix);
    bar.finish_with_message(format!("{} converted, {} failed", converted, failed));
}
