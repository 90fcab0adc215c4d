//! Mobile navigation drawer.
//!
//! Two states, keyed on `aria-expanded`. The drawer only exists below the
//! desktop breakpoint; resizing past it force-closes so the menu cannot stay
//! stuck open on a layout that no longer shows a toggle button.

/// Viewport width at which the layout switches to desktop navigation.
pub const DESKTOP_BREAKPOINT: u32 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Drawer {
    pub expanded: bool,
}

/// Everything the runtime reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawerEvent {
    /// Hamburger button activated.
    ToggleClicked,
    /// A navigation link inside the drawer was activated.
    LinkClicked,
    /// The header logo was activated.
    LogoClicked,
    /// Viewport resized to the given outer width.
    Resized { width: u32 },
}

/// Class/attribute set the runtime applies for a given state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawerView {
    /// Value for `aria-expanded` on both the button and the menu.
    pub aria_expanded: &'static str,
    /// Whether the open-menu modifier class is present.
    pub open_class: bool,
    /// Body scrolling is locked while the drawer covers the page.
    pub scroll_locked: bool,
}

impl Drawer {
    /// The toggle transition is a pure function of the expanded state.
    pub fn toggle(self) -> Self {
        Self {
            expanded: !self.expanded,
        }
    }

    pub fn update(self, event: DrawerEvent) -> Self {
        match event {
            DrawerEvent::ToggleClicked => self.toggle(),
            // Navigating away always closes the drawer.
            DrawerEvent::LinkClicked | DrawerEvent::LogoClicked => Self { expanded: false },
            DrawerEvent::Resized { width } if width >= DESKTOP_BREAKPOINT => {
                Self { expanded: false }
            }
            DrawerEvent::Resized { .. } => self,
        }
    }

    pub fn view(self) -> DrawerView {
        DrawerView {
            aria_expanded: if self.expanded { "true" } else { "false" },
            open_class: self.expanded,
            scroll_locked: self.expanded,
        }
    }
}
