//! Strobe pattern engine.
//!
//! Generates the time-varying background colour for the visual strobe.
//! The UI calls `AppService::strobe_frame` each animation frame and paints
//! the returned RGB.  Nothing here touches the screen.
//!
//! | Pattern  | Description                         | Cycle  |
//! |----------|-------------------------------------|--------|
//! | Strobe   | White first half, red second half   | 50 ms  |
//! | Off      | Black (UI falls back to its theme)  | n/a    |

/// Colour as (R, G, B) tuple, each 0-255.
pub type Rgb = (u8, u8, u8);

pub const COLOUR_WHITE: Rgb = (255, 255, 255);
pub const COLOUR_RED: Rgb = (255, 0, 0);
pub const COLOUR_OFF: Rgb = (0, 0, 0);

/// Full white→red cycle length.
pub const STROBE_CYCLE_MS: u32 = 50;

pub struct StrobePattern {
    phase_ms: u32,
    active: bool,
}

impl StrobePattern {
    pub fn new() -> Self {
        Self {
            phase_ms: 0,
            active: false,
        }
    }

    /// Switch on or off.  Switching on restarts the cycle at white.
    pub fn set_active(&mut self, active: bool) {
        if active && !self.active {
            self.phase_ms = 0;
        }
        self.active = active;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advance by `delta_ms` and return the colour to paint.
    pub fn tick(&mut self, delta_ms: u32) -> Rgb {
        self.phase_ms = self.phase_ms.wrapping_add(delta_ms);
        if self.active {
            Self::frame(self.phase_ms)
        } else {
            COLOUR_OFF
        }
    }

    /// Colour at an absolute phase.
    pub fn frame(phase_ms: u32) -> Rgb {
        if phase_ms % STROBE_CYCLE_MS < STROBE_CYCLE_MS / 2 {
            COLOUR_WHITE
        } else {
            COLOUR_RED
        }
    }
}

impl Default for StrobePattern {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_returns_black() {
        let mut s = StrobePattern::new();
        assert_eq!(s.tick(10), COLOUR_OFF);
    }

    #[test]
    fn alternates_white_and_red() {
        let mut s = StrobePattern::new();
        s.set_active(true);
        assert_eq!(s.tick(0), COLOUR_WHITE);
        assert_eq!(s.tick(30), COLOUR_RED);
        assert_eq!(s.tick(20), COLOUR_WHITE); // 50ms: new cycle
    }

    #[test]
    fn reactivation_restarts_at_white() {
        let mut s = StrobePattern::new();
        s.set_active(true);
        s.tick(30);
        s.set_active(false);
        s.set_active(true);
        assert_eq!(s.tick(0), COLOUR_WHITE);
    }
}
