//! Object-key checks and display helpers for video files.

pub const VIDEO_EXTENSIONS: [&str; 5] = [".mp4", ".webm", ".mov", ".avi", ".mkv"];

/// Case-insensitive extension match.
#[must_use]
pub fn has_video_extension(key: &str) -> bool {
    let lower = key.to_lowercase();
    VIDEO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Accept only keys that cannot escape the bucket root or smuggle control bytes.
#[must_use]
pub fn is_valid_video_key(key: &str) -> bool {
    if key.trim().is_empty() {
        return false;
    }
    if key.contains("..") || key.contains("./") || key.starts_with('/') {
        return false;
    }
    // NUL is a control character too.
    if key.chars().any(|c| matches!(c, '\u{0}'..='\u{1f}' | '\u{7f}')) {
        return false;
    }
    has_video_extension(key)
}

/// Last path segment, used for display and download filenames.
#[must_use]
pub fn file_name(key: &str) -> &str {
    match key.rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => key,
    }
}

/// Human-readable size with binary multiples, e.g. `1.5 KB`.
#[must_use]
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut unit = 0;
    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 10.0).round() / 10.0;
    let mut text = format!("{rounded:.1}");
    if text.ends_with(".0") {
        text.truncate(text.len() - 2);
    }
    format!("{text} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_video_keys() {
        assert!(is_valid_video_key("movie.mp4"));
        assert!(is_valid_video_key("trips/2024/Beach Day.MOV"));
        assert!(is_valid_video_key("a/b/c.mkv"));
    }

    #[test]
    fn rejects_traversal_and_absolute_keys() {
        assert!(!is_valid_video_key("../secret.mp4"));
        assert!(!is_valid_video_key("a/../b.mp4"));
        assert!(!is_valid_video_key("./a.mp4"));
        assert!(!is_valid_video_key("/root.mp4"));
    }

    #[test]
    fn rejects_blank_and_control_characters() {
        assert!(!is_valid_video_key(""));
        assert!(!is_valid_video_key("   "));
        assert!(!is_valid_video_key("bad\0name.mp4"));
        assert!(!is_valid_video_key("bad\nname.mp4"));
        assert!(!is_valid_video_key("bad\u{7f}name.mp4"));
    }

    #[test]
    fn rejects_non_video_extensions() {
        assert!(!is_valid_video_key("notes.txt"));
        assert!(!is_valid_video_key("movie.mp4.exe"));
        assert!(!is_valid_video_key("mp4"));
    }

    #[test]
    fn file_name_takes_last_segment() {
        assert_eq!(file_name("a/b/clip.webm"), "clip.webm");
        assert_eq!(file_name("clip.webm"), "clip.webm");
        assert_eq!(file_name("folder/"), "folder/");
    }

    #[test]
    fn formats_sizes() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5 MB");
        assert_eq!(format_file_size(1_288_490_189), "1.2 GB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024 * 1024), "3 TB");
    }
}
