//! The models used to represent the data fetched by 'yt-dlp'.
//!
//! Only the subset of the '--dump-single-json' output this crate reads is modelled.
//! Every field is optional or defaulted: 'yt-dlp' omits fields freely depending
//! on the extractor and the client used.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a video (or a playlist), the output of 'yt-dlp'.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Video {
    /// The ID of the video.
    pub id: Option<String>,
    /// The title of the video.
    pub title: Option<String>,
    /// The uploader display name.
    pub uploader: Option<String>,
    /// The channel display name.
    pub channel: Option<String>,
    /// The duration in seconds.
    pub duration: Option<f64>,
    /// The number of views the video has.
    pub view_count: Option<u64>,
    /// The upload date, formatted as 'YYYYMMDD'.
    pub upload_date: Option<String>,

    /// The available formats of the video.
    pub formats: Vec<Format>,

    /// The kind of result, 'playlist' for playlists.
    #[serde(rename = "_type")]
    pub kind: Option<String>,
    /// The entries of a playlist.
    pub entries: Option<Vec<serde_json::Value>>,
}

/// Represents one stream variant of a video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Format {
    /// The ID of the format, e.g. '137'.
    pub format_id: String,
    /// The container extension, e.g. 'mp4'.
    pub ext: Option<String>,
    /// The resolution, e.g. '1920x1080' or 'audio only'.
    pub resolution: Option<String>,
    /// The height in pixels.
    pub height: Option<u32>,
    /// The frame rate.
    pub fps: Option<f64>,
    /// The video codec, 'none' for audio-only formats.
    pub vcodec: Option<String>,
    /// The audio codec, 'none' for video-only formats.
    pub acodec: Option<String>,
    /// The exact size in bytes.
    pub filesize: Option<u64>,
    /// The approximate size in bytes.
    pub filesize_approx: Option<u64>,
    /// The direct URL of the stream, missing when it cannot be fetched.
    pub url: Option<String>,
}

impl Video {
    /// Whether this result is a playlist rather than a single video.
    pub fn is_playlist(&self) -> bool {
        self.kind.as_deref() == Some("playlist") || self.entries.is_some()
    }

    /// The number of entries of a playlist.
    pub fn entry_count(&self) -> usize {
        self.entries.as_ref().map_or(0, Vec::len)
    }

    /// The best uploader name available: the uploader, then the channel.
    pub fn uploader_name(&self) -> Option<&str> {
        self.uploader
            .as_deref()
            .or(self.channel.as_deref())
            .filter(|name| !name.trim().is_empty())
    }

    /// Returns the video formats, i.e. formats carrying a video stream.
    pub fn video_formats(&self) -> impl Iterator<Item = &Format> {
        self.formats.iter().filter(|f| f.is_video())
    }

    /// Returns the audio-only formats.
    pub fn audio_formats(&self) -> impl Iterator<Item = &Format> {
        self.formats.iter().filter(|f| f.is_audio_only())
    }
}

impl Format {
    /// Whether the format carries a video stream.
    pub fn is_video(&self) -> bool {
        !is_none_codec(self.vcodec.as_deref())
    }

    /// Whether the format carries only an audio stream.
    pub fn is_audio_only(&self) -> bool {
        !self.is_video() && !is_none_codec(self.acodec.as_deref())
    }

    /// Whether 'yt-dlp' returned a URL for this format.
    pub fn is_available(&self) -> bool {
        self.url.is_some()
    }

    /// The exact size if known, else the approximate one.
    pub fn size(&self) -> Option<u64> {
        self.filesize.or(self.filesize_approx).filter(|size| *size > 0)
    }
}

fn is_none_codec(codec: Option<&str>) -> bool {
    matches!(codec, None | Some("none"))
}

// Implementation of the Display trait for Video
impl fmt::Display for Video {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Video(id = {}, title = \"{}\", formats = {})",
            self.id.as_deref().unwrap_or("unknown"),
            self.title.as_deref().unwrap_or("unknown"),
            self.formats.len()
        )
    }
}

// Implementation of the Display trait for Format
impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Format(id = {}, ext = {}, resolution = {})",
            self.format_id,
            self.ext.as_deref().unwrap_or("unknown"),
            self.resolution.as_deref().unwrap_or("unknown")
        )
    }
}
