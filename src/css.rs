//! CSS purging and minification.
//!
//! Stage 4 of the build pipeline, operating on the stylesheets already in
//! the output directory.
//!
//! Purging is token-based: every `[A-Za-z0-9_-]+` run in the rendered HTML
//! and JS counts as a potentially-used name, and a style rule survives when
//! any of its selectors references a used class/id (or matches a safelist
//! pattern). Selectors without class/id components (element and attribute
//! selectors) are always kept — dropping `body { … }` because "body" never
//! appears as a token would be absurd. Classes toggled at runtime never
//! appear verbatim in markup, which is what the safelist is for.
//!
//! Media blocks are purged recursively and dropped when emptied. All other
//! at-rules (keyframes, font-face, supports) pass through untouched.

use lightningcss::rules::CssRule;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::traits::ToCss;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum CssError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSS parse error in {file}: {message}")]
    Parse { file: String, message: String },
    #[error("CSS print error in {file}: {message}")]
    Print { file: String, message: String },
}

/// Size change for one stylesheet.
#[derive(Debug, Clone)]
pub struct CssReport {
    pub path: PathBuf,
    pub before: u64,
    pub after: u64,
}

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9_-]+").expect("valid regex"));
static CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(-?[A-Za-z_][A-Za-z0-9_-]*)").expect("valid regex"));
static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(-?[A-Za-z_][A-Za-z0-9_-]*)").expect("valid regex"));

/// Extract the used-token set from one content string.
pub fn extract_tokens(content: &str, into: &mut HashSet<String>) {
    for m in TOKEN_RE.find_iter(content) {
        into.insert(m.as_str().to_string());
    }
}

/// Collect used tokens from every rendered `.html` and `.js` file under
/// `out_dir`.
pub fn collect_used_tokens(out_dir: &Path) -> Result<HashSet<String>, CssError> {
    let mut tokens = HashSet::new();
    for entry in WalkDir::new(out_dir).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let ext = entry.path().extension().and_then(|e| e.to_str());
        if matches!(ext, Some("html") | Some("js")) {
            extract_tokens(&fs::read_to_string(entry.path())?, &mut tokens);
        }
    }
    Ok(tokens)
}

/// Whether a serialized selector list keeps its rule alive.
///
/// The rule survives when any single selector in the list is used; purging
/// is rule-granular, not selector-granular.
pub fn selector_used(selectors: &str, used: &HashSet<String>, safelist: &[Regex]) -> bool {
    selectors.split(',').any(|selector| {
        let names: Vec<&str> = CLASS_RE
            .captures_iter(selector)
            .chain(ID_RE.captures_iter(selector))
            .map(|c| c.get(1).expect("capture group").as_str())
            .collect();
        if names.is_empty() {
            // Element/attribute selectors are always kept.
            return true;
        }
        names
            .iter()
            .all(|name| used.contains(*name) || safelist.iter().any(|re| re.is_match(name)))
    })
}

fn purge_rules(rules: &mut Vec<CssRule>, used: &HashSet<String>, safelist: &[Regex]) {
    rules.retain_mut(|rule| match rule {
        CssRule::Style(style) => {
            let selectors = style
                .selectors
                .to_css_string(PrinterOptions::default())
                .unwrap_or_default();
            selector_used(&selectors, used, safelist)
        }
        CssRule::Media(media) => {
            purge_rules(&mut media.rules.0, used, safelist);
            !media.rules.0.is_empty()
        }
        _ => true,
    });
}

/// Compile the safelist patterns. Invalid patterns were rejected at config
/// validation, so this only sees good ones.
pub fn compile_safelist(patterns: &[String]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
}

/// Rewrite one stylesheet: optional purge, optional minify.
pub fn rewrite_css(
    source: &str,
    file: &str,
    used: Option<&HashSet<String>>,
    safelist: &[Regex],
    minify: bool,
) -> Result<String, CssError> {
    let mut sheet =
        StyleSheet::parse(source, ParserOptions::default()).map_err(|e| CssError::Parse {
            file: file.to_string(),
            message: e.to_string(),
        })?;
    if let Some(used) = used {
        purge_rules(&mut sheet.rules.0, used, safelist);
    }
    let result = sheet
        .to_css(PrinterOptions {
            minify,
            ..PrinterOptions::default()
        })
        .map_err(|e| CssError::Print {
            file: file.to_string(),
            message: e.to_string(),
        })?;
    Ok(result.code)
}

/// Run the CSS stage over every stylesheet in `out_dir`.
pub fn process_css(
    out_dir: &Path,
    purge: bool,
    minify: bool,
    safelist_patterns: &[String],
) -> Result<Vec<CssReport>, CssError> {
    if !purge && !minify {
        return Ok(Vec::new());
    }
    let used = if purge {
        Some(collect_used_tokens(out_dir)?)
    } else {
        None
    };
    let safelist = compile_safelist(safelist_patterns);

    let mut stylesheets: Vec<PathBuf> = WalkDir::new(out_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("css"))
        .collect();
    stylesheets.sort();

    let mut reports = Vec::with_capacity(stylesheets.len());
    for path in stylesheets {
        let source = fs::read_to_string(&path)?;
        let rewritten = rewrite_css(
            &source,
            &path.display().to_string(),
            used.as_ref(),
            &safelist,
            minify,
        )?;
        fs::write(&path, &rewritten)?;
        reports.push(CssReport {
            before: source.len() as u64,
            after: rewritten.len() as u64,
            path,
        });
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn used(tokens: &[&str]) -> HashSet<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn token_extraction_splits_on_non_word() {
        let mut tokens = HashSet::new();
        extract_tokens(r#"<div class="hero is-wide" id="top_block">"#, &mut tokens);
        assert!(tokens.contains("hero"));
        assert!(tokens.contains("is-wide"));
        assert!(tokens.contains("top_block"));
        assert!(!tokens.contains("hero is-wide"));
    }

    #[test]
    fn selector_without_classes_always_kept() {
        let empty = used(&[]);
        assert!(selector_used("body", &empty, &[]));
        assert!(selector_used("a:hover", &empty, &[]));
        assert!(selector_used("input[type=\"text\"]", &empty, &[]));
    }

    #[test]
    fn unused_class_dropped_used_kept() {
        let tokens = used(&["hero"]);
        assert!(selector_used(".hero", &tokens, &[]));
        assert!(!selector_used(".gone", &tokens, &[]));
        // One used selector in the list keeps the rule.
        assert!(selector_used(".gone, .hero", &tokens, &[]));
    }

    #[test]
    fn compound_selector_requires_all_names() {
        let tokens = used(&["card"]);
        assert!(!selector_used(".card.is-open", &tokens, &[]));
        let safelist = compile_safelist(&["^is-".to_string()]);
        assert!(selector_used(".card.is-open", &tokens, &safelist));
    }

    #[test]
    fn safelist_rescues_runtime_classes() {
        let empty = used(&[]);
        let safelist = compile_safelist(&["^is-".to_string(), "^swiper-".to_string()]);
        assert!(selector_used(".is-open", &empty, &safelist));
        assert!(selector_used(".swiper-slide", &empty, &safelist));
        assert!(!selector_used(".unused", &empty, &safelist));
    }

    #[test]
    fn purge_drops_unused_rules_and_empty_media() {
        let css = r#"
.hero { color: red; }
.gone { color: blue; }
@media (min-width: 768px) {
  .gone { color: green; }
}
@media (min-width: 1024px) {
  .hero { color: black; }
}
"#;
        let tokens = used(&["hero"]);
        let out = rewrite_css(css, "test.css", Some(&tokens), &[], false).unwrap();
        assert!(out.contains(".hero"));
        assert!(!out.contains(".gone"));
        // The emptied media block disappears entirely.
        assert!(!out.contains("768"));
        assert!(out.contains("1024"));
    }

    #[test]
    fn keyframes_and_fontface_survive_purge() {
        let css = r#"
@keyframes fade { from { opacity: 0; } to { opacity: 1; } }
@font-face { font-family: "Inter"; src: url("inter.woff2"); }
.gone { color: blue; }
"#;
        let out = rewrite_css(css, "test.css", Some(&used(&[])), &[], false).unwrap();
        assert!(out.contains("@keyframes"));
        assert!(out.contains("@font-face"));
        assert!(!out.contains(".gone"));
    }

    #[test]
    fn minify_shrinks_output() {
        let css = ".hero {\n    color: #ff0000;\n    margin: 0px;\n}\n";
        let out = rewrite_css(css, "test.css", None, &[], true).unwrap();
        assert!(out.len() < css.len());
        assert!(!out.contains('\n'));
    }

    #[test]
    fn process_css_end_to_end() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path();
        fs::create_dir_all(out.join("assets/styles")).unwrap();
        fs::write(out.join("index.html"), r#"<div class="hero"></div>"#).unwrap();
        fs::write(
            out.join("assets/styles/style.css"),
            ".hero { color: red; }\n.gone { color: blue; }\n",
        )
        .unwrap();

        let reports = process_css(out, true, true, &[]).unwrap();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].after < reports[0].before);

        let rewritten = fs::read_to_string(out.join("assets/styles/style.css")).unwrap();
        assert!(rewritten.contains("hero"));
        assert!(!rewritten.contains("gone"));
    }

    #[test]
    fn disabled_toggles_touch_nothing() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("style.css"), ".a { color: red; }").unwrap();
        let reports = process_css(tmp.path(), false, false, &[]).unwrap();
        assert!(reports.is_empty());
        assert_eq!(
            fs::read_to_string(tmp.path().join("style.css")).unwrap(),
            ".a { color: red; }"
        );
    }
}
