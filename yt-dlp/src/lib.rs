//! A typed driver for the 'yt-dlp' executable.
//!
//! The crate exposes the media fetch capability as the [`MediaFetcher`] trait:
//! reading metadata without downloading, and downloading with a progress
//! listener. [`YtDlp`] implements it by running the 'yt-dlp' executable found
//! on the `PATH` (or at an explicit location).
//!
//! # Examples
//!
//! ```rust,no_run
//! # use ytgrab_dlp::{MediaFetcher, YtDlp};
//! # use ytgrab_dlp::options::FetchOptions;
//! # use ytgrab_dlp::progress::ProgressEvent;
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = YtDlp::locate(None::<&str>)?;
//! let options = FetchOptions::builder("bv*+ba/b", "%(title)s.%(ext)s").build();
//!
//! let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
//! let video = fetcher.extract_info(url, &options).await?;
//! println!("Video title: {:?}", video.title);
//!
//! let mut listener = |event: &ProgressEvent| println!("{}", event);
//! fetcher.download(url, &options, &mut listener).await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::model::Video;
use crate::options::FetchOptions;
use crate::progress::{ProgressEvent, ProgressListener};
use async_trait::async_trait;
use derive_more::Constructor;
use std::fmt;
use std::path::{Path, PathBuf};

pub mod error;
pub mod executor;
pub mod model;
pub mod options;
pub mod progress;
pub mod utils;

pub use error::Error as FetchError;

/// The media fetch capability.
///
/// Every retry, format negotiation and muxing decision belongs to the implementation.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Reads the metadata of `url` without downloading anything.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Download`] when the capability cannot read the metadata.
    async fn extract_info(&self, url: &str, options: &FetchOptions) -> Result<Video>;

    /// Downloads `url`, reporting progress to `listener` as it goes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Download`] when the capability cannot retrieve the media.
    async fn download(
        &self,
        url: &str,
        options: &FetchOptions,
        listener: &mut dyn ProgressListener,
    ) -> Result<DownloadOutcome>;
}

/// What a successful download left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadOutcome {
    /// The final path of every file written, in order.
    pub files: Vec<PathBuf>,
    /// The warnings printed while downloading.
    pub warnings: Vec<String>,
}

/// The 'yt-dlp' executable.
#[derive(Constructor, Clone, Debug, PartialEq, Eq)]
pub struct YtDlp {
    /// The path to the executable.
    pub executable: PathBuf,
}

impl fmt::Display for YtDlp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "YtDlp(executable = {:?})", self.executable)
    }
}

impl YtDlp {
    /// Locates the executable: `custom` if given (a path or a bare name), else 'yt-dlp' on the `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Binary`] if no executable can be found.
    pub fn locate(custom: Option<impl AsRef<Path>>) -> Result<Self> {
        let candidate = match custom {
            Some(path) => path.as_ref().to_path_buf(),
            None => PathBuf::from(utils::find_executable("yt-dlp")),
        };

        #[cfg(feature = "tracing")]
        tracing::debug!("Looking for yt-dlp at {:?}", candidate);

        let executable = which::which(&candidate).map_err(|_| Error::Binary(candidate))?;
        Ok(Self::new(executable))
    }
}

#[async_trait]
impl MediaFetcher for YtDlp {
    async fn extract_info(&self, url: &str, options: &FetchOptions) -> Result<Video> {
        #[cfg(feature = "tracing")]
        tracing::debug!("Fetching metadata for {}", url);

        let mut args = options.to_args();
        args.extend(utils::to_owned([
            "--dump-single-json",
            "--skip-download",
            "--no-warnings",
            "--",
            url,
        ]));

        let executor = Executor::new(self.executable.clone(), args);
        let output = executor.execute().await?;

        let video: Video = serde_json::from_str(&output.stdout)?;
        Ok(video)
    }

    async fn download(
        &self,
        url: &str,
        options: &FetchOptions,
        listener: &mut dyn ProgressListener,
    ) -> Result<DownloadOutcome> {
        #[cfg(feature = "tracing")]
        tracing::debug!("Downloading {} with {}", url, options);

        let mut args = options.to_download_args();
        args.extend(utils::to_owned(["--", url]));

        let executor = Executor::new(self.executable.clone(), args);
        let mut files = Vec::new();

        let output = executor
            .stream(|line| {
                if let Some(event) = ProgressEvent::parse_line(line) {
                    listener.on_progress(&event);
                } else if let Some(path) = progress::parse_file_line(line) {
                    files.push(PathBuf::from(path));
                } else {
                    #[cfg(feature = "tracing")]
                    tracing::trace!("yt-dlp: {}", line);
                }
            })
            .await?;

        let warnings = output
            .stderr
            .lines()
            .filter_map(|line| line.trim().strip_prefix("WARNING:"))
            .map(|line| line.trim().to_string())
            .collect();

        Ok(DownloadOutcome { files, warnings })
    }
}
