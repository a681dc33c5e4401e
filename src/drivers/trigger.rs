//! Trigger gesture detection: single activation vs. rapid double activation.
//!
//! ## Gesture detection
//!
//! | Gesture       | Condition                                   | Result   |
//! |---------------|---------------------------------------------|----------|
//! | Activation    | First ever, or ≥ 400ms since last `Start`   | `Start`  |
//! | Double tap    | < 400ms since last `Start`                  | `Bypass` |
//!
//! Only a `Start` re-arms the reference timestamp.  A burst of taps after a
//! `Start` keeps classifying as `Bypass` until the window lapses.

/// Default double-activation window.
pub const BYPASS_WINDOW_MS: u64 = 400;

/// Classified activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    /// Begin the countdown.
    Start,
    /// Skip the countdown and go active immediately.
    Bypass,
}

/// One instance per app session, owned by the orchestrator.
pub struct TriggerDetector {
    window_ms: u64,
    last_start_ms: Option<u64>,
}

impl TriggerDetector {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            last_start_ms: None,
        }
    }

    /// Classify an activation at monotonic time `now_ms`.
    pub fn classify(&mut self, now_ms: u64) -> TriggerKind {
        if let Some(last) = self.last_start_ms {
            if now_ms.saturating_sub(last) < self.window_ms {
                return TriggerKind::Bypass;
            }
        }
        self.last_start_ms = Some(now_ms);
        TriggerKind::Start
    }

    /// Timestamp of the last `Start`, if any.
    pub fn last_start_ms(&self) -> Option<u64> {
        self.last_start_ms
    }
}

impl Default for TriggerDetector {
    fn default() -> Self {
        Self::new(BYPASS_WINDOW_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_activation_always_starts() {
        let mut det = TriggerDetector::default();
        assert_eq!(det.classify(0), TriggerKind::Start);
    }

    #[test]
    fn second_tap_inside_window_bypasses() {
        let mut det = TriggerDetector::default();
        assert_eq!(det.classify(10_000), TriggerKind::Start);
        assert_eq!(det.classify(10_100), TriggerKind::Bypass);
    }

    #[test]
    fn window_edge_is_exclusive() {
        let mut det = TriggerDetector::default();
        det.classify(1_000);
        assert_eq!(det.classify(1_399), TriggerKind::Bypass);
        assert_eq!(det.classify(1_400), TriggerKind::Start);
    }

    #[test]
    fn bypass_does_not_rearm() {
        let mut det = TriggerDetector::default();
        det.classify(0);
        assert_eq!(det.classify(300), TriggerKind::Bypass);
        // 350ms after the bypass but 650ms after the start
        assert_eq!(det.classify(650), TriggerKind::Start);
        assert_eq!(det.last_start_ms(), Some(650));
    }

    #[test]
    fn third_rapid_tap_also_bypasses() {
        let mut det = TriggerDetector::default();
        det.classify(0);
        assert_eq!(det.classify(100), TriggerKind::Bypass);
        assert_eq!(det.classify(200), TriggerKind::Bypass);
    }

    #[test]
    fn clock_going_backwards_counts_as_rapid() {
        let mut det = TriggerDetector::default();
        det.classify(5_000);
        assert_eq!(det.classify(4_000), TriggerKind::Bypass);
    }
}
