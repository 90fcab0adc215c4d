//! Page rendering.
//!
//! Stage 3 of the build pipeline. Collects every `.html` template under the
//! source root (the partials directory is include-only), renders it through
//! minijinja with the resolved page metadata in scope, and writes the result
//! into the output directory at the same relative path. The public directory
//! is copied verbatim afterwards, and the embedded runtime scripts land in
//! `assets/scripts/`.
//!
//! Templates address partials by path relative to the source root, e.g.
//! `{% include "includes/header.html" %}`.
//!
//! ## Template context
//!
//! ```text
//! meta.title, meta.description, meta.canonical, meta.og_type,
//! meta.og_image, meta.twitter_card, meta.twitter_site
//! site.title, site.base_url
//! page_path
//! ```
//!
//! After rendering, every same-document anchor is checked against the ids
//! present in the page; a dangling `#section` is a warning, not an error,
//! since marketing pages get reshuffled constantly.

use crate::config::SiteConfig;
use crate::meta::resolve_page_meta;
use crate::ui::scroll::{AnchorTarget, ClickAction, classify_click};
use minijinja::{Environment, context, path_loader};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use walkdir::WalkDir;

/// Runtime behavior scripts shipped with every site.
pub const RUNTIME_MAIN_JS: &str = include_str!("../static/main.js");
pub const RUNTIME_CONFIRM_JS: &str = include_str!("../static/confirm.js");

#[derive(Error, Debug)]
pub enum PageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Template error in {page}: {source}")]
    Template {
        page: String,
        source: minijinja::Error,
    },
}

/// Collect page template paths relative to `src_dir`, sorted.
///
/// Only `.html` files count; anything under the partials directory or the
/// assets tree is not a page.
pub fn collect_pages(src_dir: &Path, partials_dir: &str) -> Result<Vec<PathBuf>, PageError> {
    let partials_root = src_dir.join(partials_dir);
    let assets_root = src_dir.join("assets");
    let mut pages = Vec::new();
    for entry in WalkDir::new(src_dir).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("html") {
            continue;
        }
        if path.starts_with(&partials_root) || path.starts_with(&assets_root) {
            continue;
        }
        if let Ok(rel) = path.strip_prefix(src_dir) {
            pages.push(rel.to_path_buf());
        }
    }
    pages.sort();
    Ok(pages)
}

/// The `/`-prefixed page path used for metadata lookup and reporting.
pub fn page_key(rel: &Path) -> String {
    let mut key = String::from("/");
    key.push_str(&rel.to_string_lossy().replace('\\', "/"));
    key
}

/// Render all pages into `out_dir` and return their page paths.
///
/// Dangling same-document anchors are reported as warnings through the
/// output module.
pub fn render_pages(
    config: &SiteConfig,
    project_root: &Path,
    out_dir: &Path,
) -> Result<Vec<String>, PageError> {
    render_all(config, project_root, Some(out_dir))
}

/// Render all pages without writing anything. Surfaces the same template
/// errors and anchor warnings as a real build.
pub fn check_pages(config: &SiteConfig, project_root: &Path) -> Result<Vec<String>, PageError> {
    render_all(config, project_root, None)
}

fn render_all(
    config: &SiteConfig,
    project_root: &Path,
    out_dir: Option<&Path>,
) -> Result<Vec<String>, PageError> {
    let src_dir = project_root.join(&config.build.src_dir);
    let mut env = Environment::new();
    env.set_loader(path_loader(&src_dir));

    let pages = collect_pages(&src_dir, &config.build.partials_dir)?;
    let mut rendered = Vec::with_capacity(pages.len());

    for rel in &pages {
        let key = page_key(rel);
        let meta = resolve_page_meta(config, &key);
        let name = rel.to_string_lossy().replace('\\', "/");
        let html = env
            .get_template(&name)
            .and_then(|tmpl| {
                tmpl.render(context! {
                    meta => meta,
                    site => context! {
                        title => config.site.title,
                        base_url => config.site.base_url,
                    },
                    page_path => key,
                })
            })
            .map_err(|source| PageError::Template {
                page: key.clone(),
                source,
            })?;

        for missing in validate_anchors(&html, &key) {
            crate::output::print_warning(&format!("{key}: anchor #{missing} has no target"));
        }

        if let Some(out_dir) = out_dir {
            let dest = out_dir.join(rel);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&dest, html)?;
        }
        rendered.push(key);
    }
    Ok(rendered)
}

/// Copy the public directory verbatim into the output. A missing public
/// directory is fine.
pub fn copy_public(public_dir: &Path, out_dir: &Path) -> Result<usize, PageError> {
    if !public_dir.is_dir() {
        return Ok(0);
    }
    let mut copied = 0;
    for entry in WalkDir::new(public_dir).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(public_dir)
            .expect("walkdir entry under its root");
        let dest = out_dir.join(rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &dest)?;
        copied += 1;
    }
    Ok(copied)
}

/// Write the embedded runtime scripts into `assets/scripts/`.
pub fn write_runtime_scripts(out_dir: &Path) -> Result<(), PageError> {
    let scripts = out_dir.join("assets/scripts");
    fs::create_dir_all(&scripts)?;
    fs::write(scripts.join("main.js"), RUNTIME_MAIN_JS)?;
    fs::write(scripts.join("confirm.js"), RUNTIME_CONFIRM_JS)?;
    Ok(())
}

static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="([^"]+)""#).expect("valid regex"));
static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"id="([^"]+)""#).expect("valid regex"));

/// Find same-document anchors whose target id does not exist in the page.
///
/// Uses the same classification as the shipped click handler, so the check
/// and the runtime agree on what counts as same-document. `#top` is a
/// pseudo-target and never dangling.
pub fn validate_anchors(html: &str, page_path: &str) -> Vec<String> {
    let ids: HashSet<&str> = ID_RE
        .captures_iter(html)
        .map(|c| c.get(1).expect("capture group").as_str())
        .collect();
    let mut missing = Vec::new();
    for cap in HREF_RE.captures_iter(html) {
        let href = cap.get(1).expect("capture group").as_str();
        if let ClickAction::Scroll {
            target: AnchorTarget::Element(id),
            ..
        } = classify_click(href, page_path, false)
        {
            if !ids.contains(id.as_str()) && !missing.contains(&id) {
                missing.push(id);
            }
        }
    }
    missing
}
