//! Standalone in-place recompression, the final squeeze over built output.
//!
//! Runs the never-regress re-encode across every image under the given
//! directories, including derived `.webp` siblings. A result that comes out
//! larger than the file on disk keeps the original. `.avif` is left alone:
//! it was produced at final quality by the image stage and there is no AVIF
//! decoder compiled in anyway.

use crate::imaging::{ImageBackend, OutputFormat};
use crate::process::{EncodeSettings, FileReport, recompress_in_place};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Aggregate result of a recompress run.
#[derive(Debug, Default)]
pub struct RecompressSummary {
    pub files: Vec<FileReport>,
    pub skipped_dirs: Vec<String>,
}

impl RecompressSummary {
    pub fn shrunk(&self) -> usize {
        self.files.iter().filter(|f| f.saved > 0).count()
    }

    pub fn kept(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.saved == 0 && f.error.is_none())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.files.iter().filter(|f| f.error.is_some()).count()
    }

    pub fn total_saved(&self) -> u64 {
        self.files.iter().map(|f| f.saved).sum()
    }
}

/// Format to re-encode a file as, keyed on its extension. Unlike the image
/// stage this accepts `.webp`, since built output is fair game.
fn recompress_format(path: &Path) -> Option<OutputFormat> {
    OutputFormat::from_source_path(path).or_else(|| {
        path.extension()
            .and_then(|e| e.to_str())
            .filter(|e| e.eq_ignore_ascii_case("webp"))
            .map(|_| OutputFormat::WebP)
    })
}

fn scan_recompressible(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| recompress_format(p).is_some())
        .collect();
    files.sort();
    files
}

/// Recompress every image under the given directories.
///
/// Per-file failures are recorded, not fatal. Missing directories are skipped.
pub fn recompress_dirs(
    backend: &impl ImageBackend,
    project_root: &Path,
    dirs: &[String],
    settings: &EncodeSettings,
) -> RecompressSummary {
    let mut summary = RecompressSummary::default();
    for dir in dirs {
        let full = project_root.join(dir);
        if !full.is_dir() {
            summary.skipped_dirs.push(dir.clone());
            continue;
        }
        let mut reports: Vec<FileReport> = scan_recompressible(&full)
            .par_iter()
            .map(|source| {
                let mut report = FileReport {
                    path: source.clone(),
                    saved: 0,
                    derived: Vec::new(),
                    error: None,
                };
                // scan_recompressible only yields paths with a known format
                if let Some(format) = recompress_format(source) {
                    match recompress_in_place(backend, source, format, settings) {
                        Ok(saved) => report.saved = saved,
                        Err(e) => report.error = Some(e.to_string()),
                    }
                }
                report
            })
            .collect();
        summary.files.append(&mut reports);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockBackend;
    use std::fs;
    use tempfile::TempDir;

    fn write_file(path: &Path, len: usize) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, vec![0xAAu8; len]).unwrap();
    }

    #[test]
    fn summary_counts_shrunk_and_kept() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("images");
        write_file(&dir.join("a.jpg"), 1000);
        write_file(&dir.join("b.png"), 100);

        // Sizes pop from the back; files process in sorted order but the
        // totals are order-independent: one shrinks by 600, one is kept.
        let backend = MockBackend::with_sizes(vec![400, 400]);
        let summary = recompress_dirs(
            &backend,
            tmp.path(),
            &["images".to_string()],
            &EncodeSettings::default(),
        );

        assert_eq!(summary.shrunk(), 1);
        assert_eq!(summary.kept(), 1);
        assert_eq!(summary.failed(), 0);
        assert_eq!(summary.total_saved(), 600);
    }

    #[test]
    fn webp_is_recompressed_but_avif_is_not() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("images");
        write_file(&dir.join("hero.webp"), 1000);
        write_file(&dir.join("hero.avif"), 1000);

        let backend = MockBackend::with_sizes(vec![400]);
        let summary = recompress_dirs(
            &backend,
            tmp.path(),
            &["images".to_string()],
            &EncodeSettings::default(),
        );

        assert_eq!(summary.files.len(), 1);
        assert_eq!(summary.total_saved(), 600);
        assert_eq!(fs::metadata(dir.join("hero.webp")).unwrap().len(), 400);
        assert_eq!(fs::metadata(dir.join("hero.avif")).unwrap().len(), 1000);

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].format, OutputFormat::WebP);
    }

    #[test]
    fn missing_dir_skipped() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();
        let summary = recompress_dirs(
            &backend,
            tmp.path(),
            &["nope".to_string()],
            &EncodeSettings::default(),
        );
        assert_eq!(summary.skipped_dirs, vec!["nope"]);
    }
}
