//! The option set passed to 'yt-dlp'.

use crate::progress::{FILE_TEMPLATE, PROGRESS_TEMPLATE};
use std::fmt;

/// The immutable configuration of one 'yt-dlp' invocation.
///
/// Built once with [`FetchOptions::builder`], then only read. The subtitle pass
/// gets its own value through [`FetchOptions::subtitles_only`].
///
/// # Examples
///
/// ```rust
/// # use ytgrab_dlp::options::FetchOptions;
/// let options = FetchOptions::builder("bv*+ba/b", "downloads/%(title)s.%(ext)s")
///     .client_identifiers(["android", "web"])
///     .merge_output_format(Some("mp4"))
///     .build();
///
/// assert!(options.to_args().contains(&"youtube:player_client=android,web".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    format_selector: String,
    output_template: String,
    client_identifiers: Vec<String>,
    merge_output_format: Option<String>,
    subtitle_languages: Vec<String>,
    write_subtitles: bool,
    skip_download: bool,
    no_progress: bool,
    quiet: bool,
    no_playlist: bool,
    no_check_certificate: bool,
    geo_bypass: bool,
    embed_thumbnail: bool,
    add_metadata: bool,
}

/// Builds a [`FetchOptions`].
#[derive(Debug, Clone)]
pub struct FetchOptionsBuilder {
    options: FetchOptions,
}

impl FetchOptions {
    /// Starts a builder with the two options every invocation needs.
    pub fn builder(
        format_selector: impl Into<String>,
        output_template: impl Into<String>,
    ) -> FetchOptionsBuilder {
        FetchOptionsBuilder {
            options: FetchOptions {
                format_selector: format_selector.into(),
                output_template: output_template.into(),
                client_identifiers: Vec::new(),
                merge_output_format: None,
                subtitle_languages: Vec::new(),
                write_subtitles: false,
                skip_download: false,
                no_progress: false,
                quiet: false,
                no_playlist: true,
                no_check_certificate: false,
                geo_bypass: false,
                embed_thumbnail: false,
                add_metadata: false,
            },
        }
    }

    /// The format selection expression.
    pub fn format_selector(&self) -> &str {
        &self.format_selector
    }

    /// The output template.
    pub fn output_template(&self) -> &str {
        &self.output_template
    }

    /// The player clients to try, in order.
    pub fn client_identifiers(&self) -> &[String] {
        &self.client_identifiers
    }

    /// The container to remux into, `None` to keep the native container.
    pub fn merge_output_format(&self) -> Option<&str> {
        self.merge_output_format.as_deref()
    }

    /// The subtitle languages requested for the subtitle pass.
    pub fn subtitle_languages(&self) -> &[String] {
        &self.subtitle_languages
    }

    /// Whether progress reporting is disabled.
    pub fn no_progress(&self) -> bool {
        self.no_progress
    }

    /// Whether the video payload is skipped.
    pub fn skip_download(&self) -> bool {
        self.skip_download
    }

    /// Derives the configuration of the subtitle pass.
    ///
    /// The video payload is skipped, manual and automatic captions are written
    /// for the requested languages, next to `output_template`.
    pub fn subtitles_only(&self, output_template: impl Into<String>) -> FetchOptions {
        FetchOptions {
            output_template: output_template.into(),
            write_subtitles: true,
            skip_download: true,
            no_progress: true,
            quiet: true,
            embed_thumbnail: false,
            add_metadata: false,
            merge_output_format: None,
            ..self.clone()
        }
    }

    /// Renders the arguments shared by every kind of invocation.
    ///
    /// The URL and the invocation-specific arguments are appended by the caller.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if !self.skip_download {
            args.push("--format".to_string());
            args.push(self.format_selector.clone());
        }

        args.push("--output".to_string());
        args.push(self.output_template.clone());

        if self.no_playlist {
            args.push("--no-playlist".to_string());
        }

        if !self.client_identifiers.is_empty() {
            args.push("--extractor-args".to_string());
            args.push(format!(
                "youtube:player_client={}",
                self.client_identifiers.join(",")
            ));
        }

        if let Some(container) = &self.merge_output_format {
            args.push("--merge-output-format".to_string());
            args.push(container.clone());
        }

        if self.skip_download {
            args.push("--skip-download".to_string());
        }

        if self.write_subtitles && !self.subtitle_languages.is_empty() {
            args.push("--write-subs".to_string());
            args.push("--write-auto-subs".to_string());
            args.push("--sub-langs".to_string());
            args.push(self.subtitle_languages.join(","));
        }

        if self.embed_thumbnail {
            args.push("--embed-thumbnail".to_string());
        }

        if self.add_metadata {
            args.push("--embed-metadata".to_string());
        }

        if self.no_check_certificate {
            args.push("--no-check-certificates".to_string());
        }

        if self.geo_bypass {
            args.push("--geo-bypass".to_string());
        }

        if self.quiet {
            args.push("--quiet".to_string());
            args.push("--no-warnings".to_string());
        }

        args
    }

    /// Renders the arguments of a download, reporting progress and final paths on stdout.
    pub fn to_download_args(&self) -> Vec<String> {
        let mut args = self.to_args();

        if self.no_progress {
            args.push("--no-progress".to_string());
        } else {
            args.push("--newline".to_string());
            args.push("--progress".to_string());
            args.push("--progress-template".to_string());
            args.push(PROGRESS_TEMPLATE.to_string());
        }

        args.push("--print".to_string());
        args.push(FILE_TEMPLATE.to_string());

        args
    }
}

impl FetchOptionsBuilder {
    /// Sets the player clients to try, in order. Blank identifiers are dropped.
    pub fn client_identifiers<I, S>(mut self, clients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.options.client_identifiers = clients
            .into_iter()
            .map(|client| client.as_ref().trim().to_string())
            .filter(|client| !client.is_empty())
            .collect();
        self
    }

    /// Sets the container to remux into, `None` keeps the native container.
    pub fn merge_output_format(mut self, container: Option<impl Into<String>>) -> Self {
        self.options.merge_output_format = container.map(Into::into);
        self
    }

    /// Sets the subtitle languages, in priority order. Duplicates are dropped.
    pub fn subtitle_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for language in languages {
            let language = language.as_ref().trim();
            if !language.is_empty() && !unique.iter().any(|known| known == language) {
                unique.push(language.to_string());
            }
        }

        self.options.subtitle_languages = unique;
        self
    }

    /// Disables progress reporting.
    pub fn no_progress(mut self, no_progress: bool) -> Self {
        self.options.no_progress = no_progress;
        self
    }

    /// Allows playlists to be expanded instead of downloading the single video.
    pub fn allow_playlist(mut self, allow: bool) -> Self {
        self.options.no_playlist = !allow;
        self
    }

    /// Skips TLS certificate validation.
    pub fn no_check_certificate(mut self, enabled: bool) -> Self {
        self.options.no_check_certificate = enabled;
        self
    }

    /// Bypasses geographic restrictions through a faked 'X-Forwarded-For' header.
    pub fn geo_bypass(mut self, enabled: bool) -> Self {
        self.options.geo_bypass = enabled;
        self
    }

    /// Embeds the thumbnail as cover art.
    pub fn embed_thumbnail(mut self, enabled: bool) -> Self {
        self.options.embed_thumbnail = enabled;
        self
    }

    /// Writes the video metadata into the file.
    pub fn add_metadata(mut self, enabled: bool) -> Self {
        self.options.add_metadata = enabled;
        self
    }

    /// Returns the configured options.
    pub fn build(self) -> FetchOptions {
        self.options
    }
}

// Implementation of the Display trait for FetchOptions
impl fmt::Display for FetchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FetchOptions(format = {}, output = {}, clients = [{}], merge = {})",
            self.format_selector,
            self.output_template,
            self.client_identifiers.join(","),
            self.merge_output_format.as_deref().unwrap_or("none")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(args: &[String], flag: &str) -> Option<usize> {
        args.iter().position(|arg| arg == flag)
    }

    fn value_of<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        position(args, flag).and_then(|i| args.get(i + 1)).map(String::as_str)
    }

    #[test]
    fn renders_the_download_options() {
        let options = FetchOptions::builder("bv*+ba/b", "out/%(title)s.mp4")
            .client_identifiers(["android", " web ", ""])
            .merge_output_format(Some("mp4"))
            .build();
        let args = options.to_args();

        assert_eq!(value_of(&args, "--format"), Some("bv*+ba/b"));
        assert_eq!(value_of(&args, "--output"), Some("out/%(title)s.mp4"));
        assert_eq!(
            value_of(&args, "--extractor-args"),
            Some("youtube:player_client=android,web")
        );
        assert_eq!(value_of(&args, "--merge-output-format"), Some("mp4"));
        assert!(position(&args, "--no-playlist").is_some());
        assert!(position(&args, "--write-subs").is_none());
    }

    #[test]
    fn native_container_omits_the_merge_directive() {
        let options = FetchOptions::builder("b", "%(title)s.%(ext)s")
            .merge_output_format(None::<String>)
            .build();

        assert!(position(&options.to_args(), "--merge-output-format").is_none());
    }

    #[test]
    fn download_args_request_machine_readable_progress() {
        let options = FetchOptions::builder("b", "%(title)s.mp4").build();
        let args = options.to_download_args();

        assert_eq!(value_of(&args, "--progress-template"), Some(PROGRESS_TEMPLATE));
        assert_eq!(value_of(&args, "--print"), Some(FILE_TEMPLATE));
        assert!(position(&args, "--newline").is_some());

        let quiet = FetchOptions::builder("b", "%(title)s.mp4")
            .no_progress(true)
            .build()
            .to_download_args();
        assert!(position(&quiet, "--progress-template").is_none());
        assert!(position(&quiet, "--no-progress").is_some());
    }

    #[test]
    fn subtitle_pass_skips_the_payload() {
        let options = FetchOptions::builder("b", "out/show.mp4")
            .subtitle_languages(["ja", "en", "ja"])
            .merge_output_format(Some("mp4"))
            .geo_bypass(true)
            .embed_thumbnail(true)
            .build();
        let subtitles = options.subtitles_only("out/show.%(ext)s");
        let args = subtitles.to_args();

        assert!(subtitles.skip_download());
        assert!(position(&args, "--format").is_none());
        assert!(position(&args, "--skip-download").is_some());
        assert!(position(&args, "--write-auto-subs").is_some());
        assert_eq!(value_of(&args, "--sub-langs"), Some("ja,en"));
        assert_eq!(value_of(&args, "--output"), Some("out/show.%(ext)s"));
        assert!(position(&args, "--merge-output-format").is_none());
        assert!(position(&args, "--embed-thumbnail").is_none());
        assert!(position(&args, "--geo-bypass").is_some());
        assert!(position(&args, "--quiet").is_some());

        // the original value is untouched
        assert!(!options.skip_download());
    }
}
