//! Anchor-link classification and scroll-mode decision.
//!
//! The runtime intercepts clicks on same-document anchors and scrolls to the
//! target itself; cross-document links (even ones carrying a fragment) are
//! never intercepted, the browser navigates and the landing scroll happens
//! on load. `#top` is a pseudo-target for the document root, so pages do not
//! need an element with that id.
//!
//! Scroll mode: user clicks honor `prefers-reduced-motion`; the initial
//! landing on a fragment URL and `hashchange` events are always instant, so
//! a shared URL opens directly at its target instead of animating past the
//! whole page.
//!
//! The build reuses [`classify_click`] to validate that every same-document
//! anchor in a rendered page has a matching `id`.

/// Where an intercepted scroll goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorTarget {
    /// Document root (`#top` or an empty fragment).
    Top,
    /// Element with this id.
    Element(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// What the click handler should do with a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
    /// Same-document anchor: prevent default and scroll.
    Scroll {
        target: AnchorTarget,
        behavior: ScrollBehavior,
    },
    /// Anything else: let the browser handle it.
    Navigate,
}

/// Split an href into its path part and optional fragment.
pub fn split_href(href: &str) -> (&str, Option<&str>) {
    match href.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (href, None),
    }
}

pub fn anchor_target(fragment: &str) -> AnchorTarget {
    if fragment.is_empty() || fragment == "top" {
        AnchorTarget::Top
    } else {
        AnchorTarget::Element(fragment.to_string())
    }
}

/// Collapse trailing `index.html` so `/about/` and `/about/index.html`
/// compare equal.
fn normalize_path(path: &str) -> &str {
    let path = path.strip_suffix("index.html").unwrap_or(path);
    if path.is_empty() { "/" } else { path }
}

/// Whether an href with a fragment stays within the document at
/// `current_path`.
pub fn is_same_document(href_path: &str, current_path: &str) -> bool {
    if href_path.is_empty() {
        return true;
    }
    // Absolute URLs to other origins are always cross-document.
    if href_path.contains("://") {
        return false;
    }
    normalize_path(href_path) == normalize_path(current_path)
}

/// Classify a clicked link.
pub fn classify_click(href: &str, current_path: &str, reduced_motion: bool) -> ClickAction {
    let (path, fragment) = split_href(href);
    let Some(fragment) = fragment else {
        return ClickAction::Navigate;
    };
    if !is_same_document(path, current_path) {
        return ClickAction::Navigate;
    }
    let behavior = if reduced_motion {
        ScrollBehavior::Instant
    } else {
        ScrollBehavior::Smooth
    };
    ClickAction::Scroll {
        target: anchor_target(fragment),
        behavior,
    }
}

/// A `hashchange` (back/forward through fragment history) always scrolls
/// instantly.
pub fn on_hashchange(fragment: &str) -> ClickAction {
    ClickAction::Scroll {
        target: anchor_target(fragment),
        behavior: ScrollBehavior::Instant,
    }
}

/// The initial landing on a fragment URL is also always instant.
pub fn on_load(fragment: &str) -> ClickAction {
    on_hashchange(fragment)
}
