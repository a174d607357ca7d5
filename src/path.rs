//! Output location resolution.
//!
//! The user hint is either nothing, a directory, or a full file path. It is
//! turned into the output template handed to 'yt-dlp', creating directories
//! on the way.

use crate::error::AppError;
use crate::request::{DEFAULT_FILENAME_TEMPLATE, NATIVE_EXTENSION};
use log::debug;
use std::fs;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// Where the media file goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// A literal file path.
    File(PathBuf),
    /// A file named after the video, inside `dir`.
    Directory {
        dir: PathBuf,
        filename_template: String,
    },
}

/// A resolved output location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSpec {
    pub raw_hint: Option<String>,
    pub target: OutputTarget,
    pub container_extension: String,
}

impl OutputSpec {
    /// The output template passed to 'yt-dlp'.
    pub fn template(&self) -> String {
        match &self.target {
            OutputTarget::File(path) => path.to_string_lossy().into_owned(),
            OutputTarget::Directory {
                dir,
                filename_template,
            } => join_template(
                dir,
                &format!("{}.{}", filename_template, self.container_extension),
            ),
        }
    }

    /// The template subtitle files are written with: same base name, their own extension.
    pub fn subtitle_template(&self) -> String {
        match &self.target {
            OutputTarget::File(path) => path
                .with_extension(NATIVE_EXTENSION)
                .to_string_lossy()
                .into_owned(),
            OutputTarget::Directory {
                dir,
                filename_template,
            } => join_template(dir, &format!("{}.{}", filename_template, NATIVE_EXTENSION)),
        }
    }

    /// The directory the file lands in.
    pub fn directory(&self) -> &Path {
        match &self.target {
            OutputTarget::File(path) => path.parent().unwrap_or(Path::new(".")),
            OutputTarget::Directory { dir, .. } => dir,
        }
    }
}

fn join_template(dir: &Path, file: &str) -> String {
    if dir.as_os_str().is_empty() || dir == Path::new(".") {
        file.to_string()
    } else {
        dir.join(file).to_string_lossy().into_owned()
    }
}

/// Turns output hints into output specs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    filename_template: String,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new(DEFAULT_FILENAME_TEMPLATE)
    }
}

impl PathResolver {
    /// `filename_template` names files placed in a directory, e.g. `%(title)s`.
    pub fn new(filename_template: impl Into<String>) -> Self {
        Self {
            filename_template: filename_template.into(),
        }
    }

    /// Resolves `hint` for a file with the `container_extension` extension.
    ///
    /// A file hint gets its extension rewritten and its parent directory
    /// created; a directory hint is created. Creation is idempotent.
    ///
    /// # Errors
    ///
    /// [`AppError::Filesystem`] if a directory cannot be created.
    pub fn resolve(
        &self,
        hint: Option<&str>,
        container_extension: &str,
    ) -> Result<OutputSpec, AppError> {
        self.resolve_as(hint, container_extension, false)
    }

    /// Like [`PathResolver::resolve`], but a hint is always a directory, whatever its suffix.
    ///
    /// # Errors
    ///
    /// [`AppError::Filesystem`] if the directory cannot be created.
    pub fn resolve_directory(
        &self,
        hint: Option<&str>,
        container_extension: &str,
    ) -> Result<OutputSpec, AppError> {
        self.resolve_as(hint, container_extension, true)
    }

    fn resolve_as(
        &self,
        hint: Option<&str>,
        container_extension: &str,
        directory_only: bool,
    ) -> Result<OutputSpec, AppError> {
        let raw_hint = hint.map(str::trim).filter(|hint| !hint.is_empty());
        let container_extension = container_extension.trim_start_matches('.').to_string();

        let Some(raw) = raw_hint else {
            return Ok(OutputSpec {
                raw_hint: None,
                target: OutputTarget::Directory {
                    dir: PathBuf::from("."),
                    filename_template: self.filename_template.clone(),
                },
                container_extension,
            });
        };

        let path = expand_home(raw);

        let target = if !directory_only && is_file_hint(raw, &path) {
            let path = normalize_extension(path, &container_extension);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                create_dir(parent)?;
            }

            OutputTarget::File(path)
        } else {
            create_dir(&path)?;

            OutputTarget::Directory {
                dir: path,
                filename_template: self.filename_template.clone(),
            }
        };

        let spec = OutputSpec {
            raw_hint: Some(raw.to_string()),
            target,
            container_extension,
        };
        debug!("Resolved output {:?} to {}", raw, spec.template());

        Ok(spec)
    }
}

fn create_dir(dir: &Path) -> Result<(), AppError> {
    fs::create_dir_all(dir).map_err(|e| AppError::filesystem(dir, e))
}

fn expand_home(raw: &str) -> PathBuf {
    let rest = if raw == "~" {
        Some("")
    } else {
        raw.strip_prefix("~/")
            .or_else(|| raw.strip_prefix("~\\"))
    };

    match (rest, dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(raw),
    }
}

/// A hint names a file when it has an extension-shaped suffix and is not
/// an existing directory or spelled with a trailing separator.
fn is_file_hint(raw: &str, path: &Path) -> bool {
    if raw.ends_with('/') || raw.ends_with(MAIN_SEPARATOR) || path.is_dir() {
        return false;
    }

    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(is_extension_shaped)
}

fn is_extension_shaped(ext: &str) -> bool {
    (1..=5).contains(&ext.len())
        && ext.chars().all(|c| c.is_ascii_alphanumeric())
        && ext.chars().any(|c| c.is_ascii_alphabetic())
}

fn normalize_extension(path: PathBuf, container_extension: &str) -> PathBuf {
    let same = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(container_extension));

    if same { path } else { path.with_extension(container_extension) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn hint(path: &Path) -> String {
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn no_hint_means_title_in_the_current_directory() {
        let spec = PathResolver::default().resolve(None, "mp4").unwrap();

        assert_eq!(spec.template(), "%(title)s.mp4");
        assert_eq!(spec.directory(), Path::new("."));
        assert_eq!(spec.raw_hint, None);

        let blank = PathResolver::default().resolve(Some("  "), "mp4").unwrap();
        assert_eq!(blank.template(), "%(title)s.mp4");
    }

    #[test]
    fn file_hint_gets_the_container_extension() {
        let root = tempdir().unwrap();
        let raw = root.path().join("clips").join("show.mkv");

        let spec = PathResolver::default()
            .resolve(Some(&hint(&raw)), "mp4")
            .unwrap();

        let expected = root.path().join("clips").join("show.mp4");
        assert_eq!(spec.target, OutputTarget::File(expected.clone()));
        assert_eq!(spec.template(), hint(&expected));
        assert!(root.path().join("clips").is_dir());
        assert!(!expected.exists());
    }

    #[test]
    fn matching_extension_is_kept_verbatim() {
        let root = tempdir().unwrap();
        let raw = root.path().join("Show.MP4");

        let spec = PathResolver::default()
            .resolve(Some(&hint(&raw)), "mp4")
            .unwrap();

        assert_eq!(spec.target, OutputTarget::File(raw));
    }

    #[test]
    fn file_hint_with_native_container_lets_yt_dlp_pick_the_extension() {
        let root = tempdir().unwrap();
        let raw = root.path().join("show.mkv");

        let spec = PathResolver::default()
            .resolve(Some(&hint(&raw)), NATIVE_EXTENSION)
            .unwrap();

        assert_eq!(spec.template(), hint(&root.path().join("show.%(ext)s")));
    }

    #[test]
    fn directory_hint_is_created_and_holds_the_title() {
        let root = tempdir().unwrap();
        let dir = root.path().join("downloads").join("music");

        let spec = PathResolver::default()
            .resolve(Some(&hint(&dir)), "mp4")
            .unwrap();

        assert!(dir.is_dir());
        assert_eq!(spec.template(), hint(&dir.join("%(title)s.mp4")));
        assert_eq!(spec.directory(), dir.as_path());

        // resolving again is a no-op
        PathResolver::default()
            .resolve(Some(&hint(&dir)), "mp4")
            .unwrap();
    }

    #[test]
    fn existing_directory_with_a_dot_stays_a_directory() {
        let root = tempdir().unwrap();
        let dir = root.path().join("season.two");
        fs::create_dir(&dir).unwrap();

        let spec = PathResolver::default()
            .resolve(Some(&hint(&dir)), "mp4")
            .unwrap();

        assert_eq!(
            spec.target,
            OutputTarget::Directory {
                dir: dir.clone(),
                filename_template: "%(title)s".to_string(),
            }
        );
    }

    #[test]
    fn numeric_suffix_is_not_an_extension() {
        let root = tempdir().unwrap();
        let dir = root.path().join("archive-v1.0");

        let spec = PathResolver::default()
            .resolve(Some(&hint(&dir)), "mp4")
            .unwrap();

        assert!(dir.is_dir());
        assert!(matches!(spec.target, OutputTarget::Directory { .. }));
    }

    #[test]
    fn directory_hint_keeps_an_extension_shaped_suffix() {
        let root = tempdir().unwrap();
        let dir = root.path().join("season.best");

        let spec = PathResolver::default()
            .resolve_directory(Some(&hint(&dir)), "mp4")
            .unwrap();

        assert!(dir.is_dir());
        assert_eq!(
            spec.target,
            OutputTarget::Directory {
                dir: dir.clone(),
                filename_template: "%(title)s".to_string(),
            }
        );
        assert_eq!(spec.template(), hint(&dir.join("%(title)s.mp4")));

        let none = PathResolver::default().resolve_directory(None, "mp4").unwrap();
        assert_eq!(none.template(), "%(title)s.mp4");
    }

    #[test]
    fn trailing_separator_forces_a_directory() {
        let root = tempdir().unwrap();
        let raw = format!("{}{}", hint(&root.path().join("out.mp4")), MAIN_SEPARATOR);

        let spec = PathResolver::default().resolve(Some(&raw), "mp4").unwrap();

        assert!(root.path().join("out.mp4").is_dir());
        assert!(matches!(spec.target, OutputTarget::Directory { .. }));
    }

    #[test]
    fn custom_filename_template_is_used_in_directories() {
        let root = tempdir().unwrap();

        let spec = PathResolver::new("%(title)s_%(id)s")
            .resolve(Some(&hint(root.path())), "mkv")
            .unwrap();

        assert_eq!(spec.template(), hint(&root.path().join("%(title)s_%(id)s.mkv")));
    }

    #[test]
    fn subtitles_share_the_base_name() {
        let root = tempdir().unwrap();
        let raw = root.path().join("show.mp4");

        let file = PathResolver::default()
            .resolve(Some(&hint(&raw)), "mp4")
            .unwrap();
        assert_eq!(file.subtitle_template(), hint(&root.path().join("show.%(ext)s")));

        let current = PathResolver::default().resolve(None, "mp4").unwrap();
        assert_eq!(current.subtitle_template(), "%(title)s.%(ext)s");
    }

    #[test]
    fn blocked_directory_is_a_filesystem_error() {
        let root = tempdir().unwrap();
        let blocker = root.path().join("blocker");
        fs::write(&blocker, b"not a directory").unwrap();

        let as_dir = PathResolver::default().resolve(Some(&hint(&blocker.join("sub"))), "mp4");
        assert!(matches!(as_dir, Err(AppError::Filesystem { .. })));

        let as_parent =
            PathResolver::default().resolve(Some(&hint(&blocker.join("video.mp4"))), "mp4");
        assert!(matches!(as_parent, Err(AppError::Filesystem { .. })));
    }

    #[test]
    fn home_is_expanded() {
        let Some(home) = dirs::home_dir() else {
            return;
        };

        assert_eq!(expand_home("~"), home);
        assert_eq!(expand_home("~/Videos"), home.join("Videos"));
        assert_eq!(expand_home("clips/~x"), PathBuf::from("clips/~x"));
    }
}
