//! Progress events emitted while 'yt-dlp' downloads.
//!
//! 'yt-dlp' is asked to print one machine-readable line per progress update
//! (see [`PROGRESS_TEMPLATE`]); those lines are turned into [`ProgressEvent`]s
//! and handed to a [`ProgressListener`] on the task driving the download.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The marker prefixing every progress line.
pub const PROGRESS_MARKER: &str = "ytgrab-progress|";

/// The marker prefixing the final path of every downloaded file.
pub const FILE_MARKER: &str = "ytgrab-file|";

/// The value passed to '--progress-template'.
///
/// The filename comes last since it may itself contain the separator.
pub const PROGRESS_TEMPLATE: &str = concat!(
    "download:ytgrab-progress|",
    "%(progress.status)s|",
    "%(progress.downloaded_bytes)s|",
    "%(progress.total_bytes)s|",
    "%(progress.total_bytes_estimate)s|",
    "%(progress.speed)s|",
    "%(progress.eta)s|",
    "%(progress.filename)s"
);

/// The value passed to '--print' to report the final path of each file.
pub const FILE_TEMPLATE: &str = "after_move:ytgrab-file|%(filepath)s";

/// The status of a download, as reported by 'yt-dlp'.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    /// Bytes are still being transferred.
    Downloading,
    /// The file has been fully transferred.
    Finished,
    /// The transfer failed.
    Error,
}

/// A snapshot of one download, emitted at arbitrary intervals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// The status of the download.
    pub status: ProgressStatus,
    /// The number of bytes already downloaded.
    pub downloaded_bytes: u64,
    /// The total size, exact or estimated, if known.
    pub total_bytes: Option<u64>,
    /// The current speed in bytes per second, if known.
    pub speed: Option<f64>,
    /// The estimated remaining time in seconds, if known.
    pub eta: Option<u64>,
    /// The file being written, if known.
    pub filename: Option<String>,
}

/// Receives progress events synchronously, in emission order.
pub trait ProgressListener: Send {
    /// Called for every progress event.
    fn on_progress(&mut self, event: &ProgressEvent);
}

/// A listener that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentListener;

impl ProgressListener for SilentListener {
    fn on_progress(&mut self, _event: &ProgressEvent) {}
}

impl<F> ProgressListener for F
where
    F: FnMut(&ProgressEvent) + Send,
{
    fn on_progress(&mut self, event: &ProgressEvent) {
        self(event)
    }
}

impl ProgressStatus {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "downloading" => Some(ProgressStatus::Downloading),
            "finished" => Some(ProgressStatus::Finished),
            "error" => Some(ProgressStatus::Error),
            _ => None,
        }
    }
}

impl ProgressEvent {
    /// Creates a downloading event with only the byte counters set.
    pub fn downloading(downloaded_bytes: u64, total_bytes: Option<u64>) -> Self {
        Self {
            status: ProgressStatus::Downloading,
            downloaded_bytes,
            total_bytes,
            speed: None,
            eta: None,
            filename: None,
        }
    }

    /// Parses a line printed with [`PROGRESS_TEMPLATE`].
    ///
    /// Returns `None` for any other line. Fields 'yt-dlp' could not fill in
    /// (printed as `NA`) become `None`; the exact total falls back to the estimate.
    pub fn parse_line(line: &str) -> Option<Self> {
        let payload = line.trim_start().strip_prefix(PROGRESS_MARKER)?;
        let mut fields = payload.splitn(7, '|');

        let status = ProgressStatus::parse(fields.next()?)?;
        let downloaded_bytes = parse_number(fields.next()?).map(|n| n as u64);
        let total_bytes = parse_number(fields.next()?);
        let total_estimate = parse_number(fields.next()?);
        let speed = parse_number(fields.next()?);
        let eta = parse_number(fields.next()?).map(|n| n as u64);
        let filename = fields
            .next()
            .map(str::trim)
            .filter(|name| !name.is_empty() && !is_missing(name))
            .map(ToString::to_string);

        Some(Self {
            status,
            downloaded_bytes: downloaded_bytes.unwrap_or(0),
            total_bytes: total_bytes.or(total_estimate).map(|n| n as u64),
            speed,
            eta,
            filename,
        })
    }
}

fn is_missing(raw: &str) -> bool {
    matches!(raw, "NA" | "None" | "null")
}

fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if is_missing(raw) {
        return None;
    }

    raw.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0)
}

/// Extracts the path from a line printed with [`FILE_TEMPLATE`].
pub fn parse_file_line(line: &str) -> Option<&str> {
    line.trim_start()
        .strip_prefix(FILE_MARKER)
        .map(str::trim)
        .filter(|path| !path.is_empty())
}

// Implementation of the Display trait for ProgressStatus
impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressStatus::Downloading => write!(f, "downloading"),
            ProgressStatus::Finished => write!(f, "finished"),
            ProgressStatus::Error => write!(f, "error"),
        }
    }
}

// Implementation of the Display trait for ProgressEvent
impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ProgressEvent(status = {}, downloaded = {}, total = {:?})",
            self.status, self.downloaded_bytes, self.total_bytes
        )
    }
}
