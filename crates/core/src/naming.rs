//! Media filename convention.
//!
//! Committed files are named `{prefix}_{YYYYMMDD_HHMMSS}.{ext}`. When two
//! uploads of the same kind land in the same second, the store appends a
//! numeric suffix (`video_20240101_120000_1.mp4`) instead of overwriting.

use chrono::{DateTime, Local};

/// Filename prefix for recorded videos.
pub const VIDEO_PREFIX: &str = "video";

/// Filename prefix for captured photos.
pub const PHOTO_PREFIX: &str = "photo";

/// Timestamp layout used in filenames (second resolution).
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Build the extension-less base name for `prefix` at time `at`.
///
/// # Examples
///
/// ```
/// use chrono::{Local, TimeZone};
/// use snapbox_core::naming::base_name;
///
/// let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
/// assert_eq!(base_name("video", at), "video_20240309_070501");
/// ```
pub fn base_name(prefix: &str, at: DateTime<Local>) -> String {
    format!("{prefix}_{}", at.format(TIMESTAMP_FORMAT))
}

/// Base name stamped with the current local time.
pub fn base_name_now(prefix: &str) -> String {
    base_name(prefix, Local::now())
}

/// Candidate filename for the `attempt`-th commit try.
///
/// Attempt 0 is the plain name; later attempts add `_{attempt}`.
pub fn candidate_name(base: &str, ext: &str, attempt: u32) -> String {
    if attempt == 0 {
        format!("{base}.{ext}")
    } else {
        format!("{base}_{attempt}.{ext}")
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn base_name_is_zero_padded() {
        let at = Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(base_name(PHOTO_PREFIX, at), "photo_20250102_030405");
    }

    #[test]
    fn base_name_now_has_expected_shape() {
        let name = base_name_now(VIDEO_PREFIX);
        // video_ + 8 digits + _ + 6 digits
        assert_eq!(name.len(), "video_".len() + 15);
        assert!(name.starts_with("video_"));
    }

    #[test]
    fn first_candidate_has_no_suffix() {
        assert_eq!(candidate_name("video_20250102_030405", "mp4", 0), "video_20250102_030405.mp4");
    }

    #[test]
    fn later_candidates_are_suffixed() {
        assert_eq!(candidate_name("photo_20250102_030405", "jpg", 2), "photo_20250102_030405_2.jpg");
    }
}
