//! Video id extraction from user-supplied URLs

use regex::Regex;

/// Canonical watch URL for a video id
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Extract a video id from the YouTube URL shapes we understand
///
/// Returns None for any other host or malformed path; an unresolved input
/// blocks all downstream action but is not an error.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();

    // Bare 11-character video id
    if Regex::new(r"^[a-zA-Z0-9_-]{11}$").unwrap().is_match(input) {
        return Some(input.to_string());
    }

    let patterns = [
        // youtu.be/ID
        r"youtu\.be/([a-zA-Z0-9_-]+)",
        // youtube.com/watch?v=ID
        r"youtube\.com/watch\?[^\s]*?v=([a-zA-Z0-9_-]+)",
        // youtube.com/embed/ID
        r"youtube\.com/embed/([a-zA-Z0-9_-]+)",
        // youtube.com/v/ID
        r"youtube\.com/v/([a-zA-Z0-9_-]+)",
    ];

    for pattern in patterns {
        if let Some(caps) = Regex::new(pattern).unwrap().captures(input) {
            return Some(caps[1].to_string());
        }
    }

    None
}
