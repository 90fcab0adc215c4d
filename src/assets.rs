//! Asset fingerprinting.
//!
//! Stage 5 of the build pipeline. Renames every file under `dist/assets/` to
//! `<stem>-<hash8><ext>` (first 8 hex chars of the SHA-256 of its content)
//! and rewrites references, so far-future cache headers are safe.
//!
//! Rewriting happens in two passes because CSS/JS both reference assets and
//! are assets themselves:
//!
//! 1. hash everything that is not CSS/JS, rewriting references in HTML, CSS
//!    and JS;
//! 2. hash the (now final) CSS/JS files, rewriting references in HTML.
//!
//! References are matched as `assets/<path>` strings, which is the template
//! convention for asset URLs; the leading `/` of a root-relative URL is
//! untouched. A deterministic `asset-manifest.json` mapping original to
//! hashed paths is written at the output root for anything else (service
//! workers, deploy diffing) that needs the mapping.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

pub const MANIFEST_FILE: &str = "asset-manifest.json";

#[derive(Error, Debug)]
pub enum HashError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Original → hashed path mapping, both relative to the output root.
pub type AssetManifest = BTreeMap<String, String>;

#[derive(Debug, Default)]
pub struct HashSummary {
    pub manifest: AssetManifest,
}

impl HashSummary {
    pub fn renamed(&self) -> usize {
        self.manifest.len()
    }
}

/// First 8 hex chars of the SHA-256 of `content`.
pub fn short_hash(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    digest[..4].iter().map(|b| format!("{b:02x}")).collect()
}

/// `hero.png` + hash → `hero-1a2b3c4d.png`; extensionless files append.
pub fn hashed_file_name(name: &str, hash: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}-{hash}.{ext}"),
        None => format!("{name}-{hash}"),
    }
}

fn is_code(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("css") | Some("js")
    )
}

fn rel_url(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .expect("asset under output root")
        .to_string_lossy()
        .replace('\\', "/")
}

fn collect_files(dir: &Path, pred: impl Fn(&Path) -> bool) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| pred(p))
        .collect();
    files.sort();
    files
}

/// Hash and rename one file, recording the mapping.
fn rename_hashed(
    out_dir: &Path,
    path: &Path,
    manifest: &mut AssetManifest,
) -> Result<(), HashError> {
    let content = fs::read(path)?;
    let hash = short_hash(&content);
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let hashed = path.with_file_name(hashed_file_name(name, &hash));
    fs::rename(path, &hashed)?;
    manifest.insert(rel_url(out_dir, path), rel_url(out_dir, &hashed));
    Ok(())
}

/// Replace every mapped reference in the given files.
///
/// Longest originals are replaced first. A path that prefixes another
/// (`inter.woff` next to `inter.woff2`) must not clobber references to the
/// longer one with a hashed name that does not exist on disk.
fn rewrite_references(files: &[PathBuf], manifest: &AssetManifest) -> Result<(), HashError> {
    let mut mappings: Vec<(&String, &String)> = manifest.iter().collect();
    mappings.sort_by_key(|(original, _)| std::cmp::Reverse(original.len()));
    for path in files {
        let content = fs::read_to_string(path)?;
        let mut rewritten = content.clone();
        for (original, hashed) in &mappings {
            rewritten = rewritten.replace(original.as_str(), hashed);
        }
        if rewritten != content {
            fs::write(path, rewritten)?;
        }
    }
    Ok(())
}

/// Fingerprint all assets under `out_dir/assets` and rewrite references.
pub fn hash_assets(out_dir: &Path) -> Result<HashSummary, HashError> {
    let assets_dir = out_dir.join("assets");
    if !assets_dir.is_dir() {
        return Ok(HashSummary::default());
    }

    let html_files = collect_files(out_dir, |p| {
        p.extension().and_then(|e| e.to_str()) == Some("html")
    });

    // Pass 1: plain assets, referenced from HTML and code alike.
    let mut manifest = AssetManifest::new();
    for path in collect_files(&assets_dir, |p| !is_code(p)) {
        rename_hashed(out_dir, &path, &mut manifest)?;
    }
    let code_files = collect_files(&assets_dir, is_code);
    rewrite_references(&html_files, &manifest)?;
    rewrite_references(&code_files, &manifest)?;

    // Pass 2: CSS/JS, now content-final, referenced from HTML.
    let mut code_manifest = AssetManifest::new();
    for path in &code_files {
        rename_hashed(out_dir, path, &mut code_manifest)?;
    }
    rewrite_references(&html_files, &code_manifest)?;
    manifest.append(&mut code_manifest);

    fs::write(
        out_dir.join(MANIFEST_FILE),
        serde_json::to_string_pretty(&manifest)?,
    )?;
    Ok(HashSummary { manifest })
}
