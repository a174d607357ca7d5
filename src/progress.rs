//! Progress rendering.
//!
//! [`ProgressFormatter`] turns one [`ProgressEvent`] into one line of text, and
//! [`TerminalProgress`] draws those lines in place on the terminal.

use indicatif::{HumanBytes, MultiProgress, ProgressBar, ProgressStyle};
use std::path::Path;
use ytgrab_dlp::progress::{ProgressEvent, ProgressListener, ProgressStatus};

pub const DEFAULT_BAR_WIDTH: usize = 30;

const BYTES_PER_MB: f64 = 1_048_576.0;

/// Renders progress events. Stateless: the same event always gives the same line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressFormatter {
    width: usize,
}

impl Default for ProgressFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_BAR_WIDTH)
    }
}

impl ProgressFormatter {
    pub fn new(width: usize) -> Self {
        Self { width }
    }

    /// One line, without trailing newline, meant to be redrawn in place.
    pub fn format(&self, event: &ProgressEvent) -> String {
        match event.status {
            ProgressStatus::Finished => self.format_finished(event),
            ProgressStatus::Error => {
                format!("✗ Download error: {}", base_name(event.filename.as_deref()))
            }
            ProgressStatus::Downloading => match event.total_bytes.filter(|total| *total > 0) {
                Some(total) => {
                    let percentage = percentage(event.downloaded_bytes, total);
                    format!(
                        "⏬ [{}] {:.1}% | {} | ETA: {}",
                        self.bar(event.downloaded_bytes, total),
                        percentage,
                        format_speed(event.speed),
                        format_eta(event.eta)
                    )
                }
                None => format!(
                    "⏬ {} downloaded | {}",
                    HumanBytes(event.downloaded_bytes),
                    format_speed(event.speed)
                ),
            },
        }
    }

    /// The permanent line printed once a file is complete.
    pub fn format_finished(&self, event: &ProgressEvent) -> String {
        format!("✓ Download complete: {}", base_name(event.filename.as_deref()))
    }

    fn bar(&self, downloaded: u64, total: u64) -> String {
        let filled = filled_cells(self.width, downloaded, total);
        format!("{}{}", "█".repeat(filled), "░".repeat(self.width - filled))
    }
}

/// Downloaded share of `total` in percent, clamped to `[0, 100]`.
pub fn percentage(downloaded: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }

    (downloaded as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

/// Whole cells of a `width`-cell bar covered by `downloaded` out of `total` bytes.
pub fn filled_cells(width: usize, downloaded: u64, total: u64) -> usize {
    if total == 0 {
        return 0;
    }

    (width as u128 * u128::from(downloaded.min(total)) / u128::from(total)) as usize
}

/// Speed in MB/s with two decimals; unknown speed reads as zero.
pub fn format_speed(speed: Option<f64>) -> String {
    let mb = speed.filter(|s| s.is_finite() && *s > 0.0).unwrap_or(0.0) / BYTES_PER_MB;
    format!("{:.2} MB/s", mb)
}

/// Remaining time: `45s`, `2m5s`, `1h30m`; zero or unknown is `Unknown`.
pub fn format_eta(seconds: Option<u64>) -> String {
    match seconds {
        None | Some(0) => "Unknown".to_string(),
        Some(s) if s < 60 => format!("{}s", s),
        Some(s) if s < 3600 => format!("{}m{}s", s / 60, s % 60),
        Some(s) => format!("{}h{}m", s / 3600, (s % 3600) / 60),
    }
}

fn base_name(filename: Option<&str>) -> String {
    filename
        .and_then(|name| Path::new(name).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Draws progress on stdout, redrawing the current line in place.
pub struct TerminalProgress {
    bar: ProgressBar,
    formatter: ProgressFormatter,
    enabled: bool,
}

impl TerminalProgress {
    /// Adds a line to `multi`; with `enabled == false` every event is dropped.
    pub fn new(multi: &MultiProgress, formatter: ProgressFormatter, enabled: bool) -> Self {
        let bar = if enabled {
            multi.add(ProgressBar::new_spinner())
        } else {
            ProgressBar::hidden()
        };

        if let Ok(style) = ProgressStyle::with_template("{msg}") {
            bar.set_style(style);
        }

        Self {
            bar,
            formatter,
            enabled,
        }
    }

    /// Prints above the in-place line, or plainly when nothing is drawn.
    fn print_line(&self, line: String) {
        if self.bar.is_hidden() {
            println!("{}", line);
        } else {
            self.bar.println(line);
        }
    }
}

impl ProgressListener for TerminalProgress {
    fn on_progress(&mut self, event: &ProgressEvent) {
        if !self.enabled {
            return;
        }

        match event.status {
            ProgressStatus::Downloading => self.bar.set_message(self.formatter.format(event)),
            ProgressStatus::Finished | ProgressStatus::Error => {
                self.bar.set_message("");
                self.print_line(self.formatter.format(event));
            }
        }
    }
}

impl Drop for TerminalProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}
