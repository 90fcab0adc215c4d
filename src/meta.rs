//! Page metadata resolution.
//!
//! Each rendered page gets a fully-resolved metadata record: the site-wide
//! values from `[site]` merged with any `[pages."<path>"]` override, plus the
//! derived canonical URL and an absolutized OGP image. Page values win over
//! site values; the nested OGP table is merged key-by-key rather than
//! replaced wholesale, so a page can change `ogp.type` without losing the
//! site-wide `ogp.image`.

use crate::config::{SiteConfig, SiteMeta};
use serde::Serialize;

/// Fully-resolved metadata for a single page, ready to inject into the
/// template context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    /// Absolute canonical URL for the page, derived from `base_url` and the
    /// page path. Empty when no `base_url` is configured.
    pub canonical: String,
    pub og_type: String,
    /// Absolute OGP image URL. Root-relative config values are joined onto
    /// `base_url`; values that already carry a scheme pass through unchanged.
    pub og_image: String,
    pub twitter_card: String,
    pub twitter_site: String,
}

/// Resolve the metadata for the page at `page_path` (e.g. `/about/index.html`).
///
/// Lookup keys are normalized to a leading slash, so `/index.html` and
/// `index.html` address the same override table.
pub fn resolve_page_meta(config: &SiteConfig, page_path: &str) -> PageMeta {
    let key = normalize_page_path(page_path);
    let site = &config.site;
    let over = config.pages.get(&key);

    let title = over
        .and_then(|o| o.title.clone())
        .unwrap_or_else(|| site.title.clone());
    let description = over
        .and_then(|o| o.description.clone())
        .unwrap_or_else(|| site.description.clone());

    let ogp = over.and_then(|o| o.ogp.as_ref());
    let og_type = ogp
        .and_then(|o| o.kind.clone())
        .unwrap_or_else(|| site.ogp.kind.clone());
    let og_image_raw = ogp
        .and_then(|o| o.image.clone())
        .unwrap_or_else(|| site.ogp.image.clone());

    PageMeta {
        title,
        description,
        canonical: canonical_url(site, &key),
        og_type,
        og_image: absolutize(site, &og_image_raw),
        twitter_card: site.twitter_card.clone(),
        twitter_site: site.twitter_site.clone(),
    }
}

fn normalize_page_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    if path.starts_with('/') {
        path
    } else {
        format!("/{path}")
    }
}

/// Derive the canonical URL for a page path.
///
/// Directory indexes collapse to their directory: `/index.html` becomes `/`
/// and `/foo/index.html` becomes `/foo/`. Other pages keep their full path.
/// Returns an empty string when `base_url` is unset.
pub fn canonical_url(site: &SiteMeta, page_path: &str) -> String {
    let base = site.base_url.trim_end_matches('/');
    if base.is_empty() {
        return String::new();
    }
    let path = normalize_page_path(page_path);
    let pretty = if path == "/index.html" {
        "/".to_string()
    } else if let Some(dir) = path.strip_suffix("/index.html") {
        format!("{dir}/")
    } else {
        path
    };
    format!("{base}{pretty}")
}

/// Turn a root-relative image path into an absolute URL.
///
/// Values that already carry a scheme (or are empty) pass through. Without a
/// configured `base_url`, root-relative values also pass through unchanged.
pub fn absolutize(site: &SiteMeta, value: &str) -> String {
    if value.is_empty() || value.contains("://") {
        return value.to_string();
    }
    let base = site.base_url.trim_end_matches('/');
    if base.is_empty() {
        return value.to_string();
    }
    if value.starts_with('/') {
        format!("{base}{value}")
    } else {
        format!("{base}/{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OgpOverride, PageOverride, SiteConfig};

    fn test_config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.site.title = "Acme Inc.".to_string();
        config.site.description = "We make things.".to_string();
        config.site.base_url = "https://acme.example".to_string();
        config.site.ogp.image = "/assets/images/ogp.png".to_string();
        config
    }

    #[test]
    fn site_values_used_without_override() {
        let config = test_config();
        let meta = resolve_page_meta(&config, "/about/index.html");
        assert_eq!(meta.title, "Acme Inc.");
        assert_eq!(meta.description, "We make things.");
        assert_eq!(meta.og_type, "website");
    }

    #[test]
    fn page_values_win_over_site_values() {
        let mut config = test_config();
        config.pages.insert(
            "/about/index.html".to_string(),
            PageOverride {
                title: Some("About | Acme Inc.".to_string()),
                ..Default::default()
            },
        );
        let meta = resolve_page_meta(&config, "/about/index.html");
        assert_eq!(meta.title, "About | Acme Inc.");
        // Unset fields still fall back to site values.
        assert_eq!(meta.description, "We make things.");
    }

    #[test]
    fn ogp_override_merged_not_replaced() {
        let mut config = test_config();
        config.pages.insert(
            "/news/first-post.html".to_string(),
            PageOverride {
                ogp: Some(OgpOverride {
                    kind: Some("article".to_string()),
                    image: None,
                }),
                ..Default::default()
            },
        );
        let meta = resolve_page_meta(&config, "/news/first-post.html");
        assert_eq!(meta.og_type, "article");
        // Site-wide image survives a partial ogp override.
        assert_eq!(meta.og_image, "https://acme.example/assets/images/ogp.png");
    }

    #[test]
    fn canonical_collapses_directory_indexes() {
        let site = test_config().site;
        assert_eq!(canonical_url(&site, "/index.html"), "https://acme.example/");
        assert_eq!(
            canonical_url(&site, "/service/index.html"),
            "https://acme.example/service/"
        );
        assert_eq!(
            canonical_url(&site, "/privacy.html"),
            "https://acme.example/privacy.html"
        );
    }

    #[test]
    fn canonical_tolerates_trailing_slash_in_base() {
        let mut site = test_config().site;
        site.base_url = "https://acme.example/".to_string();
        assert_eq!(canonical_url(&site, "/index.html"), "https://acme.example/");
    }

    #[test]
    fn canonical_empty_without_base_url() {
        let mut site = test_config().site;
        site.base_url = String::new();
        assert_eq!(canonical_url(&site, "/index.html"), "");
    }

    #[test]
    fn absolutize_passes_through_full_urls() {
        let site = test_config().site;
        assert_eq!(
            absolutize(&site, "https://cdn.example/ogp.png"),
            "https://cdn.example/ogp.png"
        );
        assert_eq!(absolutize(&site, ""), "");
    }

    #[test]
    fn absolutize_joins_root_relative_paths() {
        let site = test_config().site;
        assert_eq!(
            absolutize(&site, "/assets/ogp.png"),
            "https://acme.example/assets/ogp.png"
        );
        assert_eq!(
            absolutize(&site, "assets/ogp.png"),
            "https://acme.example/assets/ogp.png"
        );
    }

    #[test]
    fn lookup_normalizes_leading_slash() {
        let mut config = test_config();
        config.pages.insert(
            "/contact/index.html".to_string(),
            PageOverride {
                title: Some("Contact".to_string()),
                ..Default::default()
            },
        );
        let meta = resolve_page_meta(&config, "contact/index.html");
        assert_eq!(meta.title, "Contact");
    }
}
