//! The optional user config file.
//!
//! Lives at `<config dir>/ytgrab/config.toml` unless another path is given.
//! Every key is optional; a missing key keeps the built-in default.
//!
//! ```toml
//! format = "bv*+ba/b"
//! merge_output_format = "none"
//! player_clients = ["android", "web"]
//! subtitle_languages = ["ja", "en"]
//! output_dir = "~/Videos"
//! ```

use crate::error::AppError;
use crate::request::{Container, DownloadRequest};
use log::{debug, error};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub format: Option<String>,
    /// A container name, or `none` to keep the native container.
    pub merge_output_format: Option<String>,
    pub player_clients: Option<Vec<String>>,
    pub subtitle_languages: Option<Vec<String>>,
    pub output_dir: Option<String>,
    pub filename_template: Option<String>,
    pub bar_width: Option<usize>,
    pub yt_dlp_path: Option<PathBuf>,
    pub no_check_certificate: Option<bool>,
    pub geo_bypass: Option<bool>,
    pub embed_thumbnail: Option<bool>,
    pub add_metadata: Option<bool>,
    pub summary: Option<bool>,
}

impl Config {
    /// The default location, `None` when the platform has no config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ytgrab").join("config.toml"))
    }

    /// Loads `custom`, or the default location.
    ///
    /// Never fails: a missing file gives the defaults, a malformed one is
    /// reported and the defaults are used instead.
    pub fn load(custom: Option<&Path>) -> Self {
        let Some(path) = custom.map(Path::to_path_buf).or_else(Self::default_path) else {
            return Self::default();
        };

        match Self::read(&path) {
            Ok(Some(config)) => {
                debug!("Loaded config from {}", path.display());
                config
            }
            Ok(None) => Self::default(),
            Err(e) => {
                error!("{}", e);
                Self::default()
            }
        }
    }

    /// Reads and parses `path`; `Ok(None)` when it does not exist.
    ///
    /// # Errors
    ///
    /// [`AppError::Config`] if the file cannot be read or is not valid TOML.
    pub fn read(path: &Path) -> Result<Option<Self>, AppError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::Config {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
            }
        };

        Self::parse(&content)
            .map(Some)
            .map_err(|message| AppError::Config {
                path: path.to_path_buf(),
                message,
            })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.message().to_string())
    }

    /// The request these settings describe, built-in defaults filling the gaps.
    pub fn request(&self) -> DownloadRequest {
        let defaults = DownloadRequest::default();

        DownloadRequest {
            output_hint: self.output_dir.clone(),
            output_is_directory: self.output_dir.is_some(),
            container: self
                .merge_output_format
                .as_deref()
                .map_or(defaults.container, Container::parse),
            format_selector: self.format.clone().unwrap_or(defaults.format_selector),
            client_identifiers: self
                .player_clients
                .clone()
                .unwrap_or(defaults.client_identifiers),
            subtitle_languages: self
                .subtitle_languages
                .clone()
                .unwrap_or(defaults.subtitle_languages),
            filename_template: self
                .filename_template
                .clone()
                .unwrap_or(defaults.filename_template),
            bar_width: self.bar_width.unwrap_or(defaults.bar_width),
            no_progress: defaults.no_progress,
            summary: self.summary.unwrap_or(defaults.summary),
            no_check_certificate: self
                .no_check_certificate
                .unwrap_or(defaults.no_check_certificate),
            geo_bypass: self.geo_bypass.unwrap_or(defaults.geo_bypass),
            embed_thumbnail: self.embed_thumbnail.unwrap_or(defaults.embed_thumbnail),
            add_metadata: self.add_metadata.unwrap_or(defaults.add_metadata),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_file_means_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.request(), DownloadRequest::default());
    }

    #[test]
    fn merge_format_none_keeps_the_native_container() {
        let config = Config::parse(r#"merge_output_format = "none""#).unwrap();
        assert_eq!(config.request().container, Container::Native);

        let mkv = Config::parse(r#"merge_output_format = "mkv""#).unwrap();
        assert_eq!(mkv.request().container, Container::Forced("mkv".to_string()));
    }

    #[test]
    fn values_override_the_defaults() {
        let config = Config::parse(
            r#"
            format = "b"
            player_clients = ["web"]
            subtitle_languages = ["ja", "en"]
            output_dir = "downloads"
            bar_width = 40
            geo_bypass = true
            summary = false
            "#,
        )
        .unwrap();
        let request = config.request();

        assert_eq!(request.format_selector, "b");
        assert_eq!(request.client_identifiers, vec!["web"]);
        assert_eq!(request.subtitle_languages, vec!["ja", "en"]);
        assert_eq!(request.output_hint.as_deref(), Some("downloads"));
        assert!(request.output_is_directory);
        assert_eq!(request.bar_width, 40);
        assert!(request.geo_bypass);
        assert!(!request.summary);
        assert_eq!(request.filename_template, "%(title)s");
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let root = tempdir().unwrap();
        let path = root.path().join("config.toml");

        assert!(Config::read(&path).unwrap().is_none());
        assert_eq!(Config::load(Some(&path)), Config::default());
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let root = tempdir().unwrap();
        let path = root.path().join("config.toml");
        fs::write(&path, "bar_width = \"wide\"\n").unwrap();

        assert!(matches!(Config::read(&path), Err(AppError::Config { .. })));
        assert_eq!(Config::load(Some(&path)), Config::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::parse("colour = true").is_err());
    }
}
