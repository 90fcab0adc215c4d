//! Site configuration module.
//!
//! Handles loading, validating, and merging `site.toml`. Configuration is
//! layered: stock defaults are overridden by the project's `site.toml`, and a
//! handful of build toggles can be overridden again from the environment so
//! CI can flip them without editing the file.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "My Company"
//! description = ""
//! base_url = ""                  # e.g. "https://example.com" (no trailing /)
//! twitter_card = "summary_large_image"
//! twitter_site = ""
//!
//! [site.ogp]
//! type = "website"
//! image = ""                     # root-relative path or absolute URL
//!
//! # Per-page overrides, keyed by the page path relative to the source root.
//! # Page values win over [site]; the nested ogp table is merged key-by-key.
//! [pages."/service/index.html"]
//! title = "Services | My Company"
//! [pages."/service/index.html".ogp]
//! type = "article"
//!
//! [styles]
//! index_dirs = ["src/assets/styles/module", "src/assets/styles/plugins", "src/assets/styles/page"]
//!
//! [images]
//! source_dirs = ["src/assets/images", "public/assets/images"]
//! jpeg_quality = 80              # 1-100
//! webp_quality = 80              # 1-100
//! avif_quality = 50              # 1-100
//! png_quality = 80               # 1-100
//! png_compression = 5            # 0-9
//!
//! [images.convert]
//! webp = true                    # generate .webp siblings at build time
//! avif = false                   # generate .avif siblings at build time
//!
//! [build]
//! src_dir = "src"
//! public_dir = "public"
//! out_dir = "dist"
//! partials_dir = "includes"      # relative to src_dir
//! hash_assets = true             # SITEKIT_HASH overrides
//! purge_css = true               # SITEKIT_PURGE overrides
//! minify_css = false             # SITEKIT_CSS_MINIFY overrides
//! purge_safelist = ["^is-", "^has-", "^active", "^open", "^current-", "^menu-", "^swiper-"]
//!
//! [processing]
//! max_processes = 4              # omit for auto = CPU cores
//! ```
//!
//! ## Partial Configuration
//!
//! `site.toml` is sparse — override just the values you want. Unknown keys
//! are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `site.toml`.
///
/// All fields have sensible defaults. The project file need only specify the
/// values it wants to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site-wide metadata injected into every page head.
    pub site: SiteMeta,
    /// Per-page metadata overrides, keyed by page path (e.g. `/index.html`).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub pages: BTreeMap<String, PageOverride>,
    /// SCSS partial-index generation settings.
    pub styles: StylesConfig,
    /// Image optimization settings.
    pub images: ImagesConfig,
    /// Build layout and toggles.
    pub build: BuildConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, q) in [
            ("images.jpeg_quality", self.images.jpeg_quality),
            ("images.webp_quality", self.images.webp_quality),
            ("images.avif_quality", self.images.avif_quality),
            ("images.png_quality", self.images.png_quality),
        ] {
            if q == 0 || q > 100 {
                return Err(ConfigError::Validation(format!("{name} must be 1-100")));
            }
        }
        if self.images.png_compression > 9 {
            return Err(ConfigError::Validation(
                "images.png_compression must be 0-9".into(),
            ));
        }
        for pattern in &self.build.purge_safelist {
            if regex::Regex::new(pattern).is_err() {
                return Err(ConfigError::Validation(format!(
                    "build.purge_safelist contains an invalid regex: {pattern}"
                )));
            }
        }
        Ok(())
    }
}

/// Site-wide metadata. `title`, `description`, and `ogp` can be overridden
/// per page; the rest are site-level concerns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteMeta {
    pub title: String,
    pub description: String,
    /// Absolute site origin used for canonical URLs and OGP image
    /// absolutization. Trailing slashes are stripped at use sites.
    pub base_url: String,
    pub twitter_card: String,
    pub twitter_site: String,
    pub ogp: OgpMeta,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            base_url: String::new(),
            twitter_card: "summary_large_image".to_string(),
            twitter_site: String::new(),
            ogp: OgpMeta::default(),
        }
    }
}

/// Open Graph metadata embedded in page heads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OgpMeta {
    #[serde(rename = "type")]
    pub kind: String,
    pub image: String,
}

impl Default for OgpMeta {
    fn default() -> Self {
        Self {
            kind: "website".to_string(),
            image: String::new(),
        }
    }
}

/// Per-page metadata override. Absent fields fall back to `[site]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageOverride {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ogp: Option<OgpOverride>,
}

/// Page-level OGP override, merged field-by-field over `[site.ogp]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OgpOverride {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub image: Option<String>,
}

/// SCSS partial-index generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StylesConfig {
    /// Directories that get a generated `_index.scss` forwarding their partials.
    pub index_dirs: Vec<String>,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            index_dirs: vec![
                "src/assets/styles/module".to_string(),
                "src/assets/styles/plugins".to_string(),
                "src/assets/styles/page".to_string(),
            ],
        }
    }
}

/// Image optimization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Directories scanned for source bitmaps (jpg/jpeg/png).
    pub source_dirs: Vec<String>,
    /// JPEG re-encode quality (1-100).
    pub jpeg_quality: u32,
    /// WebP sibling quality (1-100).
    pub webp_quality: u32,
    /// AVIF sibling quality (1-100).
    pub avif_quality: u32,
    /// PNG re-encode quality (1-100).
    pub png_quality: u32,
    /// PNG compression level (0-9).
    pub png_compression: u32,
    /// Which derived formats to generate at build time.
    pub convert: ConvertConfig,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            source_dirs: vec![
                "src/assets/images".to_string(),
                "public/assets/images".to_string(),
            ],
            jpeg_quality: 80,
            webp_quality: 80,
            avif_quality: 50,
            png_quality: 80,
            png_compression: 5,
            convert: ConvertConfig::default(),
        }
    }
}

/// Toggles for derived-format generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    pub webp: bool,
    pub avif: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            webp: true,
            avif: false,
        }
    }
}

/// Build layout and output toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Source root containing page templates and assets.
    pub src_dir: String,
    /// Static files copied verbatim into the output.
    pub public_dir: String,
    /// Build output directory.
    pub out_dir: String,
    /// Partials directory, relative to `src_dir`. Excluded from page collection.
    pub partials_dir: String,
    /// Content-hash asset filenames and rewrite references.
    pub hash_assets: bool,
    /// Drop CSS rules whose selectors are unused in the rendered output.
    pub purge_css: bool,
    /// Minify CSS output.
    pub minify_css: bool,
    /// Selector patterns (regex) that always survive purging.
    pub purge_safelist: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            src_dir: "src".to_string(),
            public_dir: "public".to_string(),
            out_dir: "dist".to_string(),
            partials_dir: "includes".to_string(),
            hash_assets: true,
            purge_css: true,
            minify_css: false,
            purge_safelist: vec![
                "^is-".to_string(),
                "^has-".to_string(),
                "^active".to_string(),
                "^open".to_string(),
                "^current-".to_string(),
                "^menu-".to_string(),
                "^swiper-".to_string(),
            ],
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Loading, merging, environment overrides
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging the project's overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `site.toml` as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, deserialize, apply
/// environment overrides, and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    let mut config: SiteConfig = merged.try_into()?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}

/// Load config from a `site.toml` path, falling back to defaults when the
/// file is absent.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    resolve_config(overlay)
}

/// Parse a toggle string: `true/on/1` → true, `false/off/0` → false,
/// anything else (including garbage) → the default.
pub fn resolve_toggle(default: bool, value: Option<&str>) -> bool {
    let Some(raw) = value else { return default };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "1" => true,
        "false" | "off" | "0" => false,
        _ => default,
    }
}

/// Apply environment-variable overrides for the build toggles and base URL.
///
/// `env` is injected so tests don't have to mutate the process environment.
pub fn apply_env_overrides(config: &mut SiteConfig, env: impl Fn(&str) -> Option<String>) {
    config.build.hash_assets =
        resolve_toggle(config.build.hash_assets, env("SITEKIT_HASH").as_deref());
    config.build.purge_css =
        resolve_toggle(config.build.purge_css, env("SITEKIT_PURGE").as_deref());
    config.build.minify_css = resolve_toggle(
        config.build.minify_css,
        env("SITEKIT_CSS_MINIFY").as_deref(),
    );
    if let Some(url) = env("SITEKIT_BASE_URL") {
        config.site.base_url = url;
    }
}

/// Returns a fully-commented stock `site.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# sitekit Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site metadata (injected into every page head)
# ---------------------------------------------------------------------------
[site]
title = ""
description = ""

# Absolute site origin, used for canonical URLs and OGP image absolutization.
# Can be overridden with SITEKIT_BASE_URL (useful for staging deploys).
base_url = ""

twitter_card = "summary_large_image"
twitter_site = ""

[site.ogp]
type = "website"
# Root-relative path (converted to an absolute URL) or a full URL.
image = ""

# ---------------------------------------------------------------------------
# Per-page overrides
# Keyed by the page path relative to the source root. Page values win over
# [site]; the nested ogp table is merged key-by-key, not replaced.
# ---------------------------------------------------------------------------
# [pages."/service/index.html"]
# title = "Services | My Company"
# description = "What we do."
# [pages."/service/index.html".ogp]
# type = "article"

# ---------------------------------------------------------------------------
# SCSS partial indexes
# Each listed directory gets a generated _index.scss forwarding its partials.
# ---------------------------------------------------------------------------
[styles]
index_dirs = ["src/assets/styles/module", "src/assets/styles/plugins", "src/assets/styles/page"]

# ---------------------------------------------------------------------------
# Image optimization
# ---------------------------------------------------------------------------
[images]
source_dirs = ["src/assets/images", "public/assets/images"]
jpeg_quality = 80
webp_quality = 80
avif_quality = 50
png_quality = 80
# PNG compression level, 0 (fastest) to 9 (smallest).
png_compression = 5

# Which derived formats to generate next to each source bitmap.
[images.convert]
webp = true
avif = false

# ---------------------------------------------------------------------------
# Build layout and toggles
# Toggles can be overridden from the environment: SITEKIT_HASH,
# SITEKIT_PURGE, SITEKIT_CSS_MINIFY (values: true/on/1, false/off/0).
# ---------------------------------------------------------------------------
[build]
src_dir = "src"
public_dir = "public"
out_dir = "dist"
# Partials directory, relative to src_dir. Not rendered as pages.
partials_dir = "includes"
hash_assets = true
purge_css = true
minify_css = false
# Selector patterns (regex) that always survive CSS purging.
purge_safelist = ["^is-", "^has-", "^active", "^open", "^current-", "^menu-", "^swiper-"]

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
