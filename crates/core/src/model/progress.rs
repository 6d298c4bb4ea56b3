/// Server-reported progress through a topic's practice quiz.
///
/// Every field is copied from the latest API payload. Nothing here is derived
/// client-side; see [`accuracy_percent`] for the one display fallback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub answered: u32,
    pub correct: u32,
    pub total: u32,
    /// Raw percent as sent by the server; may be out of range.
    pub percent: i32,
}

impl Progress {
    /// Whether the answered count has reached the question count.
    #[must_use]
    pub fn all_answered(&self) -> bool {
        self.total > 0 && self.answered >= self.total
    }

    /// Progress bar fill, clamped to `0..=100`.
    #[must_use]
    pub fn bar_percent(&self) -> u8 {
        // The clamp keeps the value inside u8 range.
        u8::try_from(self.percent.clamp(0, 100)).unwrap_or(100)
    }
}

/// Accuracy shown on the results screen.
///
/// The server's `score_percent` wins when present; otherwise it is
/// `round(correct * 100 / total)`, and an empty topic reads as 0%.
#[must_use]
pub fn accuracy_percent(score_percent: Option<i32>, correct: u32, total: u32) -> u32 {
    if let Some(score) = score_percent {
        return u32::try_from(score.max(0)).unwrap_or(0);
    }
    if total == 0 {
        return 0;
    }
    let correct = u64::from(correct);
    let total = u64::from(total);
    let rounded = (correct * 200 + total) / (2 * total);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_prefers_server_score() {
        assert_eq!(accuracy_percent(Some(40), 3, 3), 40);
    }

    #[test]
    fn accuracy_rounds_half_up() {
        assert_eq!(accuracy_percent(None, 1, 3), 33);
        assert_eq!(accuracy_percent(None, 2, 3), 67);
        assert_eq!(accuracy_percent(None, 1, 8), 13);
    }

    #[test]
    fn accuracy_guards_empty_topic() {
        assert_eq!(accuracy_percent(None, 0, 0), 0);
    }

    #[test]
    fn bar_percent_is_clamped() {
        let over = Progress { percent: 140, ..Progress::default() };
        let under = Progress { percent: -5, ..Progress::default() };
        assert_eq!(over.bar_percent(), 100);
        assert_eq!(under.bar_percent(), 0);
    }

    #[test]
    fn all_answered_needs_questions() {
        assert!(!Progress::default().all_answered());
        let done = Progress { answered: 2, total: 2, ..Progress::default() };
        assert!(done.all_answered());
    }
}
