//! What the user asked for, before the output location is resolved.

use std::fmt;

/// Prefer mp4 video with m4a audio, then any video+audio pair, then the best single file.
pub const DEFAULT_FORMAT: &str = "bv*[ext=mp4]+ba[ext=m4a]/bv*+ba/b";

/// The Android client dodges the SABR streaming restrictions; the web client is the fallback.
pub const DEFAULT_PLAYER_CLIENTS: [&str; 2] = ["android", "web"];

pub const DEFAULT_MERGE_OUTPUT_FORMAT: &str = "mp4";

pub const DEFAULT_FILENAME_TEMPLATE: &str = "%(title)s";

/// The placeholder 'yt-dlp' replaces with the real extension of the file.
pub const NATIVE_EXTENSION: &str = "%(ext)s";

/// The container the streams end up in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Container {
    /// Remux into this container after download.
    Forced(String),
    /// Keep whatever container the selected streams come in, e.g. VP9 in WebM.
    Native,
}

impl Container {
    /// Parses a merge format name; blank or `none` means no forcing.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim().trim_start_matches('.');
        if raw.is_empty() || raw.eq_ignore_ascii_case("none") {
            Container::Native
        } else {
            Container::Forced(raw.to_ascii_lowercase())
        }
    }

    /// The extension the output file gets.
    pub fn extension(&self) -> &str {
        match self {
            Container::Forced(ext) => ext,
            Container::Native => NATIVE_EXTENSION,
        }
    }

    /// The value of the merge directive, `None` when nothing is forced.
    pub fn merge_format(&self) -> Option<&str> {
        match self {
            Container::Forced(ext) => Some(ext),
            Container::Native => None,
        }
    }
}

impl Default for Container {
    fn default() -> Self {
        Container::Forced(DEFAULT_MERGE_OUTPUT_FORMAT.to_string())
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Container::Forced(ext) => write!(f, "{}", ext),
            Container::Native => write!(f, "none"),
        }
    }
}

/// One download, as requested on the command line and in the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    /// A directory or a full file path; `None` means the current directory.
    pub output_hint: Option<String>,
    /// The hint came from a directory-only source, so it is never taken for a file.
    pub output_is_directory: bool,
    pub container: Container,
    pub format_selector: String,
    pub client_identifiers: Vec<String>,
    /// Empty disables the subtitle pass.
    pub subtitle_languages: Vec<String>,
    pub filename_template: String,
    pub bar_width: usize,
    pub no_progress: bool,
    pub summary: bool,
    pub no_check_certificate: bool,
    pub geo_bypass: bool,
    pub embed_thumbnail: bool,
    pub add_metadata: bool,
}

impl Default for DownloadRequest {
    fn default() -> Self {
        Self {
            output_hint: None,
            output_is_directory: false,
            container: Container::default(),
            format_selector: DEFAULT_FORMAT.to_string(),
            client_identifiers: DEFAULT_PLAYER_CLIENTS.iter().map(ToString::to_string).collect(),
            subtitle_languages: Vec::new(),
            filename_template: DEFAULT_FILENAME_TEMPLATE.to_string(),
            bar_width: crate::progress::DEFAULT_BAR_WIDTH,
            no_progress: false,
            summary: true,
            no_check_certificate: false,
            geo_bypass: false,
            embed_thumbnail: false,
            add_metadata: false,
        }
    }
}

/// Splits a comma-separated list, dropping blank items.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// The selector used when a single format id is picked: that format plus the best audio.
pub fn format_id_selector(format_id: &str) -> String {
    format!("{}+bestaudio/best", format_id.trim())
}
