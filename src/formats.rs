//! The `--list-formats` table.

use std::cmp::Reverse;
use ytgrab_dlp::model::{Format, Video};

const NOT_AVAILABLE: &str = "N/A";
const BYTES_PER_MB: f64 = 1_048_576.0;
const RETRY_HINT: &str = "💡 YouTube may be restricting access for now, try again later";
const FORMAT_ID_HINT: &str = "💡 Download a specific format with --format-id <ID>";

/// Renders the formats of `video`: video formats first, best available on top, then audio formats.
pub fn render_format_table(video: &Video) -> String {
    let mut lines = vec![
        format!("📹 Title: {}", video.title.as_deref().unwrap_or("Unknown")),
        "-".repeat(60),
    ];

    if video.formats.is_empty() {
        lines.push("⚠️ No formats found".to_string());
        lines.push(RETRY_HINT.to_string());
        return lines.join("\n");
    }

    let mut videos: Vec<&Format> = video.video_formats().collect();
    videos.sort_by_key(|f| Reverse((f.is_available(), f.height.unwrap_or(0))));
    let audios: Vec<&Format> = video.audio_formats().collect();

    if !videos.is_empty() {
        lines.push(String::new());
        lines.push("🎥 Video formats:".to_string());
        lines.push(format!(
            "{:<6} {:<10} {:<5} {:<5} {:<10} {:<8} CODEC",
            "ID", "RESOLUTION", "FPS", "EXT", "SIZE", "STATUS"
        ));
        lines.push("-".repeat(70));
        lines.extend(videos.iter().map(|f| {
            format!(
                "{:<6} {:<10} {:<5} {:<5} {:<10} {:<8} {}",
                f.format_id,
                f.resolution.as_deref().unwrap_or(NOT_AVAILABLE),
                f.fps.map_or_else(|| NOT_AVAILABLE.to_string(), |fps| fps.to_string()),
                f.ext.as_deref().unwrap_or(NOT_AVAILABLE),
                format_size(f.size()),
                status(f),
                f.vcodec.as_deref().unwrap_or(NOT_AVAILABLE)
            )
        }));
    }

    if !audios.is_empty() {
        lines.push(String::new());
        lines.push("🎵 Audio formats:".to_string());
        lines.push(format!(
            "{:<6} {:<5} {:<10} {:<8} CODEC",
            "ID", "EXT", "SIZE", "STATUS"
        ));
        lines.push("-".repeat(50));
        lines.extend(audios.iter().map(|f| {
            format!(
                "{:<6} {:<5} {:<10} {:<8} {}",
                f.format_id,
                f.ext.as_deref().unwrap_or(NOT_AVAILABLE),
                format_size(f.size()),
                status(f),
                f.acodec.as_deref().unwrap_or(NOT_AVAILABLE)
            )
        }));
    }

    let best_video = videos.iter().find(|f| f.is_available());
    let any_audio = audios.iter().any(|f| f.is_available());

    lines.push(String::new());
    match best_video {
        Some(best) => {
            lines.push(FORMAT_ID_HINT.to_string());
            lines.push(format!("   Best video: --format-id {}", best.format_id));
        }
        None if any_audio => lines.push(FORMAT_ID_HINT.to_string()),
        None => {
            lines.push("⚠️ No format is currently downloadable".to_string());
            lines.push(RETRY_HINT.to_string());
        }
    }

    lines.join("\n")
}

/// Size in MB with one decimal, `N/A` when unknown.
pub fn format_size(bytes: Option<u64>) -> String {
    match bytes {
        Some(bytes) if bytes > 0 => format!("{:.1}MB", bytes as f64 / BYTES_PER_MB),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn status(format: &Format) -> &'static str {
    if format.is_available() { "✓" } else { "✗" }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_format(id: &str, height: u32, url: bool) -> Format {
        Format {
            format_id: id.to_string(),
            ext: Some("mp4".to_string()),
            resolution: Some(format!("{}p", height)),
            height: Some(height),
            vcodec: Some("avc1".to_string()),
            acodec: Some("none".to_string()),
            url: url.then(|| "https://example.com/stream".to_string()),
            ..Format::default()
        }
    }

    fn position(table: &str, needle: &str) -> usize {
        table.find(needle).unwrap()
    }

    #[test]
    fn sizes() {
        assert_eq!(format_size(Some(1_572_864)), "1.5MB");
        assert_eq!(format_size(Some(0)), "N/A");
        assert_eq!(format_size(None), "N/A");
    }

    #[test]
    fn empty_format_list_prints_a_notice() {
        let table = render_format_table(&Video::default());
        assert!(table.contains("No formats found"));
        assert!(!table.contains("Video formats"));
    }

    #[test]
    fn available_formats_come_first_then_by_height() {
        let video = Video {
            title: Some("Clip".to_string()),
            formats: vec![
                video_format("18", 360, true),
                video_format("137", 1080, false),
                video_format("22", 720, true),
                Format {
                    format_id: "140".to_string(),
                    ext: Some("m4a".to_string()),
                    vcodec: Some("none".to_string()),
                    acodec: Some("mp4a.40.2".to_string()),
                    filesize: Some(3_145_728),
                    url: Some("https://example.com/audio".to_string()),
                    ..Format::default()
                },
            ],
            ..Video::default()
        };

        let table = render_format_table(&video);

        assert!(position(&table, "\n22 ") < position(&table, "\n18 "));
        assert!(position(&table, "\n18 ") < position(&table, "\n137 "));
        assert!(position(&table, "Audio formats") < position(&table, "\n140 "));
        assert!(table.contains("3.0MB"));
        assert!(table.contains("Best video: --format-id 22"));
    }

    #[test]
    fn nothing_downloadable_is_reported() {
        let video = Video {
            formats: vec![video_format("137", 1080, false)],
            ..Video::default()
        };

        let table = render_format_table(&video);
        assert!(table.contains("✗"));
        assert!(table.contains("No format is currently downloadable"));
    }

    #[test]
    fn table_is_built_line_by_line() {
        let video = Video {
            formats: vec![video_format("22", 720, true)],
            ..Video::default()
        };

        let table = render_format_table(&video);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "📹 Title: Unknown");
        assert!(lines.contains(&"🎥 Video formats:"));
        assert_eq!(lines.last(), Some(&"   Best video: --format-id 22"));
        assert!(!table.ends_with('\n'));
    }
}
