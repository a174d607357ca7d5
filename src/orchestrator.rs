//! One fetch, from the URL to the exit code.
//!
//! The output location is resolved first, then the metadata summary is shown,
//! the media downloaded and, when languages were asked for, the subtitles
//! fetched in a second independent pass. A subtitle failure is reported but
//! never fails the run.

use crate::error::AppError;
use crate::formats::render_format_table;
use crate::path::{OutputSpec, PathResolver};
use crate::progress::{ProgressFormatter, TerminalProgress};
use crate::request::DownloadRequest;
use crate::summary::summary_lines;
use indicatif::MultiProgress;
use log::{debug, info, warn};
use regex::Regex;
use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;
use ytgrab_dlp::MediaFetcher;
use ytgrab_dlp::model::Video;
use ytgrab_dlp::options::FetchOptions;
use ytgrab_dlp::progress::{ProgressListener, SilentListener};

/// An `http(s)` URL, or a bare 11-character video id.
const URL_PATTERN: &str = r"^(https?://\S+|[A-Za-z0-9_-]{11})$";

/// Matches whenever the video has any format at all.
const LISTING_SELECTOR: &str = "bv*+ba/b/bv*/ba*";

/// How the subtitle pass ended.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubtitleOutcome {
    /// No languages were requested.
    Skipped,
    Fetched,
    Failed(String),
}

/// What a successful fetch produced.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchReport {
    pub output: OutputSpec,
    /// `None` when the summary was disabled or the metadata could not be read.
    pub metadata: Option<Video>,
    pub files: Vec<PathBuf>,
    pub subtitles: SubtitleOutcome,
}

/// Drives a [`MediaFetcher`] through one fetch.
pub struct FetchOrchestrator<F> {
    fetcher: F,
    multi: MultiProgress,
}

impl<F: MediaFetcher> FetchOrchestrator<F> {
    /// `multi` hosts the progress line and the log output.
    pub fn new(fetcher: F, multi: MultiProgress) -> Self {
        Self { fetcher, multi }
    }

    /// Fetches `url`, stopping at the first Ctrl-C, and reports the outcome.
    ///
    /// Failures are printed to stderr.
    pub async fn run(&self, url: &str, request: &DownloadRequest) -> ExitCode {
        let result = {
            let mut progress = TerminalProgress::new(
                &self.multi,
                ProgressFormatter::new(request.bar_width),
                !request.no_progress,
            );
            self.execute(url, request, &mut progress, ctrl_c()).await
        };

        ExitCode::from(conclude(&result))
    }

    /// Fetches `url`, reporting progress to `listener`.
    ///
    /// When `interrupt` completes first the in-flight call is dropped, which
    /// kills the 'yt-dlp' process, and [`AppError::UserInterrupted`] is returned.
    ///
    /// # Errors
    ///
    /// [`AppError::InvalidInput`] for a malformed URL, [`AppError::Filesystem`]
    /// when the output location cannot be prepared, [`AppError::DownloadFailed`]
    /// when the media cannot be retrieved.
    pub async fn execute(
        &self,
        url: &str,
        request: &DownloadRequest,
        listener: &mut dyn ProgressListener,
        interrupt: impl Future<Output = ()>,
    ) -> Result<FetchReport, AppError> {
        let url = validate_url(url)?;
        tokio::pin!(interrupt);

        let resolver = PathResolver::new(request.filename_template.clone());
        let hint = request.output_hint.as_deref();
        let output = if request.output_is_directory {
            resolver.resolve_directory(hint, request.container.extension())?
        } else {
            resolver.resolve(hint, request.container.extension())?
        };
        let options = fetch_options(request, &output);
        debug!("Fetching {} with {}", url, options);

        let metadata = if request.summary {
            tokio::select! {
                info = self.fetcher.extract_info(url, &options) => match info {
                    Ok(video) => {
                        self.print_lines(summary_lines(&video));
                        Some(video)
                    }
                    Err(e) => {
                        warn!("Could not read the video metadata: {}", e);
                        None
                    }
                },
                _ = &mut interrupt => return Err(AppError::UserInterrupted),
            }
        } else {
            None
        };

        let outcome = tokio::select! {
            outcome = self.fetcher.download(url, &options, listener) => outcome?,
            _ = &mut interrupt => return Err(AppError::UserInterrupted),
        };

        for warning in &outcome.warnings {
            warn!("yt-dlp: {}", warning);
        }
        for file in &outcome.files {
            info!("Saved to {}", file.display());
        }

        let subtitles = if options.subtitle_languages().is_empty() {
            SubtitleOutcome::Skipped
        } else {
            let subtitle_options = options.subtitles_only(output.subtitle_template());
            debug!("Fetching subtitles with {}", subtitle_options);

            let mut silent = SilentListener;
            tokio::select! {
                result = self.fetcher.download(url, &subtitle_options, &mut silent) => match result {
                    Ok(_) => {
                        info!("Subtitles saved in {}", output.directory().display());
                        SubtitleOutcome::Fetched
                    }
                    Err(e) => {
                        warn!("Subtitle download failed: {}", e);
                        SubtitleOutcome::Failed(e.to_string())
                    }
                },
                _ = &mut interrupt => return Err(AppError::UserInterrupted),
            }
        };

        Ok(FetchReport {
            output,
            metadata,
            files: outcome.files,
            subtitles,
        })
    }

    /// Prints the format table of `url`, stopping at the first Ctrl-C.
    pub async fn list_formats(&self, url: &str, request: &DownloadRequest) -> ExitCode {
        let result = self.format_table(url, request, ctrl_c()).await;

        match result {
            Ok(table) => {
                self.print_lines(table.lines().map(ToString::to_string));
                ExitCode::SUCCESS
            }
            Err(e) => ExitCode::from(conclude::<()>(&Err(e))),
        }
    }

    async fn format_table(
        &self,
        url: &str,
        request: &DownloadRequest,
        interrupt: impl Future<Output = ()>,
    ) -> Result<String, AppError> {
        let url = validate_url(url)?;

        let options = FetchOptions::builder(LISTING_SELECTOR, request.filename_template.clone())
            .client_identifiers(&request.client_identifiers)
            .no_check_certificate(request.no_check_certificate)
            .geo_bypass(request.geo_bypass)
            .build();

        let video = tokio::select! {
            video = self.fetcher.extract_info(url, &options) => video?,
            _ = interrupt => return Err(AppError::UserInterrupted),
        };
        Ok(render_format_table(&video))
    }

    fn print_lines(&self, lines: impl IntoIterator<Item = String>) {
        for line in lines {
            if self.multi.is_hidden() || self.multi.println(&line).is_err() {
                println!("{}", line);
            }
        }
    }
}

/// Trims `url` and checks its shape.
///
/// # Errors
///
/// [`AppError::InvalidInput`] when it is blank or neither a URL nor a video id.
pub fn validate_url(url: &str) -> Result<&str, AppError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(AppError::InvalidInput("the URL is empty".to_string()));
    }

    let pattern = Regex::new(URL_PATTERN).map_err(|e| AppError::Unexpected(e.to_string()))?;
    if !pattern.is_match(url) {
        return Err(AppError::InvalidInput(format!(
            "{:?} is neither a URL nor a video id",
            url
        )));
    }

    Ok(url)
}

/// The options of the main download for `request`, written to `output`.
pub fn fetch_options(request: &DownloadRequest, output: &OutputSpec) -> FetchOptions {
    FetchOptions::builder(request.format_selector.clone(), output.template())
        .client_identifiers(&request.client_identifiers)
        .merge_output_format(request.container.merge_format())
        .subtitle_languages(&request.subtitle_languages)
        .no_progress(request.no_progress)
        .no_check_certificate(request.no_check_certificate)
        .geo_bypass(request.geo_bypass)
        .embed_thumbnail(request.embed_thumbnail)
        .add_metadata(request.add_metadata)
        .build()
}

/// Prints the failure, if any, and returns the exit code.
fn conclude<T>(result: &Result<T, AppError>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(e) => {
            eprintln!("❌ {}", e);
            if e.wants_usage_hint() {
                eprintln!("Usage: ytgrab <URL> [OPTIONS], see --help for details");
            }
            e.exit_code()
        }
    }
}

/// Resolves on the first Ctrl-C; never, when the handler cannot be installed.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
