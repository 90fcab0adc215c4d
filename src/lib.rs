//! Build tool for template-driven marketing sites.
//!
//! The source tree is the data source. HTML templates under `src/` become
//! pages, SCSS partial directories get generated `@forward` indexes, and
//! raster images grow WebP/AVIF siblings next to them. A full build runs
//! the stages in dependency order:
//!
//! ```text
//! 1. indexes     src/assets/styles/     →  _index.scss files
//! 2. images      source jpg/png         →  .webp/.avif siblings
//! 3. pages       src/*.html + site.toml →  dist/ (+ public/, runtime JS)
//! 4. css         dist/**/*.css          →  purged / minified CSS
//! 5. hash        dist/assets/           →  hashed names + rewritten refs
//! 6. recompress  dist/assets/images/    →  same files, never larger
//! ```
//!
//! A separate blocking `watch` mode fills in missing derived images as
//! sources appear, without ever overwriting existing output.
//!
//! # Module Map
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`config`] | `site.toml` parsing, defaults, env overrides, validation |
//! | [`indexes`] | SCSS partial index generation |
//! | [`imaging`] | encoder backend trait and the `image`-crate implementation |
//! | [`process`] | derived-image builds and in-place recompression primitives |
//! | [`recompress`] | standalone lossless recompression pass |
//! | [`watch`] | filesystem watcher that backfills missing siblings |
//! | [`meta`] | per-page metadata resolution and URL canonicalization |
//! | [`pages`] | template rendering, public copy, anchor validation |
//! | [`css`] | selector purge and minification of built stylesheets |
//! | [`assets`] | content hashing and reference rewriting |
//! | [`ui`] | page-behavior state machines mirrored by the runtime scripts |
//! | [`output`] | console formatting (pure `format_*` + `print_*` wrappers) |
//!
//! # Design Decisions
//!
//! **Sibling outputs, not a shadow tree.** Derived `.webp`/`.avif` files sit
//! next to their sources so templates can reference them with a predictable
//! path. A build overwrites siblings; watch mode only fills in missing ones.
//!
//! **Recompression never regresses.** An encode result replaces the source
//! only when it is strictly smaller. The comparison lives in the caller, so
//! the [`imaging::ImageBackend`] trait stays a pure bytes-in/bytes-out seam
//! and the pipeline is testable with a mock backend.
//!
//! **The UI modules are the source of truth.** Interactive page behaviors
//! (drawer, smooth scroll, header shadow, viewport clamp, confirm form) are
//! pure state machines in [`ui`]; the embedded runtime scripts mirror them
//! and the build's anchor validation reuses their classification logic.

pub mod assets;
pub mod config;
pub mod css;
pub mod imaging;
pub mod indexes;
pub mod meta;
pub mod output;
pub mod pages;
pub mod process;
pub mod recompress;
pub mod ui;
pub mod watch;
