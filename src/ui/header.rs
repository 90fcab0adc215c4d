//! Header scroll shadow.
//!
//! The fixed header gains a drop shadow once the page scrolls at all and
//! loses it again near the top. The two thresholds differ on purpose: with a
//! single cutoff the shadow flickers on rubber-band scrolling around the
//! boundary.

/// Scroll offset below which the shadow is removed.
pub const SHADOW_OFF_BELOW: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeaderShadow {
    pub visible: bool,
}

impl HeaderShadow {
    /// Add shadow when scroll > 0, remove when scroll < 30, unchanged in
    /// between.
    pub fn on_scroll(self, y: f64) -> Self {
        if !self.visible && y > 0.0 {
            Self { visible: true }
        } else if self.visible && y < SHADOW_OFF_BELOW {
            Self { visible: false }
        } else {
            self
        }
    }
}
