//! The human-readable metadata summary printed before a download.

use ytgrab_dlp::model::Video;

const UNKNOWN: &str = "Unknown";

/// The summary lines for `video`. Missing fields read `Unknown`.
pub fn summary_lines(video: &Video) -> Vec<String> {
    let title = video.title.as_deref().unwrap_or(UNKNOWN);

    if video.is_playlist() {
        return vec![
            format!("📋 Playlist: {}", title),
            format!("📊 Videos: {}", video.entry_count()),
        ];
    }

    let mut lines = vec![
        format!("📹 Title: {}", title),
        format!("👤 Uploader: {}", video.uploader_name().unwrap_or(UNKNOWN)),
        format!("⏱️ Duration: {}", format_duration(video.duration)),
        format!(
            "👁️ Views: {}",
            video
                .view_count
                .map(group_thousands)
                .unwrap_or_else(|| UNKNOWN.to_string())
        ),
    ];

    if let Some(date) = video.upload_date.as_deref().filter(|d| !d.is_empty()) {
        lines.push(format!("📅 Uploaded: {}", format_upload_date(date)));
    }

    lines
}

/// `HH:MM:SS` for an hour or more, `MM:SS` below; zero or unknown is `Unknown`.
pub fn format_duration(seconds: Option<f64>) -> String {
    let seconds = match seconds {
        Some(s) if s.is_finite() && s >= 1.0 => s as u64,
        _ => return UNKNOWN.to_string(),
    };

    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

/// `YYYYMMDD` becomes `YYYY-MM-DD`; anything else is returned unchanged.
pub fn format_upload_date(date: &str) -> String {
    if date.len() == 8 && date.chars().all(|c| c.is_ascii_digit()) {
        format!("{}-{}-{}", &date[..4], &date[4..6], &date[6..])
    } else {
        date.to_string()
    }
}

/// `1234567` becomes `1,234,567`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    grouped
}
