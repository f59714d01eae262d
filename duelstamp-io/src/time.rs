/// Formats a second count as `h:mm:ss`, the shape video platforms accept
/// in comments and descriptions.
pub fn hms(seconds: f64) -> String {
    let total = seconds.max(0.0) as i64;
    format!("{}:{:02}:{:02}", total / 3600, total / 60 % 60, total % 60)
}

/// Video position of a frame index as `h:mm:ss`.
pub fn frame_hms(index: i64, fps: f64) -> String {
    if fps <= 0.0 {
        return hms(0.0);
    }
    hms(index as f64 / fps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_hours_minutes_seconds() {
        assert_eq!(hms(0.0), "0:00:00");
        assert_eq!(hms(59.9), "0:00:59");
        assert_eq!(hms(3600.0 + 62.0), "1:01:02");
    }

    #[test]
    fn frame_position_uses_frame_rate() {
        assert_eq!(frame_hms(0, 30.0), "0:00:00");
        assert_eq!(frame_hms(1800, 30.0), "0:01:00");
        assert_eq!(frame_hms(1800, 0.0), "0:00:00");
    }
}
