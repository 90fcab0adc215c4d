//! Small-screen viewport clamp.
//!
//! Below 375px the layout is allowed to shrink no further; the viewport meta
//! switches to a fixed width and the browser scales the page down instead.
//! Writing the meta tag on every resize forces reflow, so the update is a
//! no-op when the content string is unchanged.

pub const MIN_VIEWPORT_WIDTH: u32 = 375;

pub const DEFAULT_CONTENT: &str = "width=device-width, initial-scale=1";
pub const CLAMPED_CONTENT: &str = "width=375";

/// The viewport meta content for a given outer width.
pub fn viewport_content(outer_width: u32) -> &'static str {
    if outer_width > MIN_VIEWPORT_WIDTH {
        DEFAULT_CONTENT
    } else {
        CLAMPED_CONTENT
    }
}

/// Returns the new content only when it differs from what is already set.
pub fn viewport_update(current: &str, outer_width: u32) -> Option<&'static str> {
    let next = viewport_content(outer_width);
    if next == current { None } else { Some(next) }
}
