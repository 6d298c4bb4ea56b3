/// Shown while the remaining time is unknown.
pub const COUNTDOWN_PLACEHOLDER: &str = "--:--";

/// `MM:SS` for a countdown, or the placeholder when the time is unknown.
#[must_use]
pub fn format_countdown(seconds: Option<u32>) -> String {
    match seconds {
        Some(seconds) => format!("{:02}:{:02}", seconds / 60, seconds % 60),
        None => COUNTDOWN_PLACEHOLDER.to_string(),
    }
}
