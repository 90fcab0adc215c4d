//! Client behavior state machines.
//!
//! The runtime JavaScript shipped with every site (`static/main.js`,
//! `static/confirm.js`) is deliberately thin: each behavior is an explicit
//! state object plus an update function, and those live here too, as pure
//! Rust. The build uses them directly (anchor validation in `check` and
//! `pages` runs on the [`scroll`] classifier), and the tests pin the exact
//! transition rules the JS mirrors.
//!
//! - [`drawer`] — mobile navigation open/closed machine
//! - [`scroll`] — anchor-link classification and scroll-mode decision
//! - [`header`] — scroll shadow hysteresis
//! - [`viewport`] — small-screen viewport clamp
//! - [`confirm`] — two-step form confirmation

pub mod confirm;
pub mod drawer;
pub mod header;
pub mod scroll;
pub mod viewport;
