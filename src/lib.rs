//! Downloads YouTube videos by driving 'yt-dlp'.
//!
//! The pieces, in the order a fetch uses them:
//! [`config`] and [`request`] describe what to fetch, [`path`] resolves where
//! it goes, [`orchestrator`] runs the fetch through a [`MediaFetcher`],
//! drawing [`progress`] and printing a [`summary`] on the way.

pub mod config;
pub mod error;
pub mod formats;
pub mod orchestrator;
pub mod path;
pub mod progress;
pub mod request;
pub mod summary;

pub use config::Config;
pub use error::AppError;
pub use orchestrator::{FetchOrchestrator, FetchReport, SubtitleOutcome};
pub use path::{OutputSpec, OutputTarget, PathResolver};
pub use progress::{ProgressFormatter, TerminalProgress};
pub use request::{Container, DownloadRequest};
pub use ytgrab_dlp::{MediaFetcher, YtDlp};
