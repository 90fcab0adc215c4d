//! Build-time image optimization.
//!
//! Stage 2 of the build pipeline. Scans the configured image directories for
//! source bitmaps (jpg/jpeg/png) and, for each one:
//!
//! - re-encodes it in place at the configured quality, keeping the original
//!   whenever the re-encode would be larger (never-regress rule), and
//! - generates `.webp` / `.avif` siblings next to it, per the
//!   `[images.convert]` toggles.
//!
//! Derived files keep the full source filename plus the new extension
//! (`hero.png` → `hero.png.webp` is *not* used; it is `hero.webp`), so a
//! `<picture>` element can swap extensions mechanically.
//!
//! ## Parallel Processing
//!
//! Files are processed in parallel using [rayon](https://docs.rs/rayon).
//! Per-file failures are reported and counted but never abort the run; a
//! broken bitmap should not take down a site build.

use crate::config::ImagesConfig;
use crate::imaging::{BackendError, EncodeParams, ImageBackend, OutputFormat, Quality};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding failed: {0}")]
    Imaging(#[from] BackendError),
}

/// Encoder settings resolved from `[images]` config.
#[derive(Debug, Clone)]
pub struct EncodeSettings {
    pub jpeg_quality: Quality,
    pub webp_quality: Quality,
    pub avif_quality: Quality,
    pub png_quality: Quality,
    pub png_compression: u32,
    pub avif_speed: u8,
    pub convert_webp: bool,
    pub convert_avif: bool,
}

impl EncodeSettings {
    pub fn from_config(config: &ImagesConfig) -> Self {
        Self {
            jpeg_quality: Quality::new(config.jpeg_quality),
            webp_quality: Quality::new(config.webp_quality),
            avif_quality: Quality::new(config.avif_quality),
            png_quality: Quality::new(config.png_quality),
            png_compression: config.png_compression,
            avif_speed: 6,
            convert_webp: config.convert.webp,
            convert_avif: config.convert.avif,
        }
    }

    /// Derived formats enabled by the convert toggles, in output order.
    pub fn derived_formats(&self) -> Vec<OutputFormat> {
        let mut formats = Vec::new();
        if self.convert_webp {
            formats.push(OutputFormat::WebP);
        }
        if self.convert_avif {
            formats.push(OutputFormat::Avif);
        }
        formats
    }

    /// Build the encode parameters for one source/format pair.
    pub fn params_for(&self, source: &Path, format: OutputFormat) -> EncodeParams {
        let quality = match format {
            OutputFormat::Jpeg => self.jpeg_quality,
            OutputFormat::Png => self.png_quality,
            OutputFormat::WebP => self.webp_quality,
            OutputFormat::Avif => self.avif_quality,
        };
        EncodeParams {
            source: source.to_path_buf(),
            format,
            quality,
            png_compression: self.png_compression,
            avif_speed: self.avif_speed,
        }
    }
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self::from_config(&ImagesConfig::default())
    }
}

/// Report for one processed source file.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    /// Bytes saved by the in-place re-encode (0 when the original was kept).
    pub saved: u64,
    /// Derived sibling extensions written.
    pub derived: Vec<&'static str>,
    pub error: Option<String>,
}

/// Aggregate result of an image build run.
#[derive(Debug, Default)]
pub struct BuildSummary {
    pub files: Vec<FileReport>,
    /// Configured directories that did not exist and were skipped.
    pub skipped_dirs: Vec<String>,
}

impl BuildSummary {
    pub fn processed(&self) -> usize {
        self.files.iter().filter(|f| f.error.is_none()).count()
    }

    pub fn failed(&self) -> usize {
        self.files.iter().filter(|f| f.error.is_some()).count()
    }

    pub fn total_saved(&self) -> u64 {
        self.files.iter().map(|f| f.saved).sum()
    }
}

/// The sibling path for a derived format: same directory, same stem, new
/// extension.
pub fn sibling_path(source: &Path, format: OutputFormat) -> PathBuf {
    source.with_extension(format.extension())
}

/// Recursively collect source bitmaps under `dir`, sorted for stable output.
///
/// Only jpg/jpeg/png count as sources. Derived formats (webp/avif) and
/// everything else (svg, ico, …) are left alone.
pub fn scan_sources(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| OutputFormat::from_source_path(p).is_some())
        .collect();
    files.sort();
    files
}

/// Re-encode one source bitmap in place, keeping the original when the
/// re-encode is not strictly smaller. Returns bytes saved.
pub fn recompress_in_place(
    backend: &impl ImageBackend,
    source: &Path,
    format: OutputFormat,
    settings: &EncodeSettings,
) -> Result<u64, ProcessError> {
    let original_len = std::fs::metadata(source)?.len();
    let encoded = backend.encode(&settings.params_for(source, format))?;
    if (encoded.len() as u64) < original_len {
        std::fs::write(source, &encoded)?;
        Ok(original_len - encoded.len() as u64)
    } else {
        Ok(0)
    }
}

/// Generate the enabled derived siblings for one source bitmap.
/// Existing siblings are overwritten; a build is authoritative.
pub fn write_derived(
    backend: &impl ImageBackend,
    source: &Path,
    settings: &EncodeSettings,
) -> Result<Vec<&'static str>, ProcessError> {
    let mut written = Vec::new();
    for format in settings.derived_formats() {
        let encoded = backend.encode(&settings.params_for(source, format))?;
        std::fs::write(sibling_path(source, format), &encoded)?;
        written.push(format.extension());
    }
    Ok(written)
}

fn process_file(
    backend: &impl ImageBackend,
    source: &Path,
    settings: &EncodeSettings,
) -> FileReport {
    let mut report = FileReport {
        path: source.to_path_buf(),
        saved: 0,
        derived: Vec::new(),
        error: None,
    };
    let Some(format) = OutputFormat::from_source_path(source) else {
        return report;
    };
    let outcome = recompress_in_place(backend, source, format, settings)
        .and_then(|saved| {
            report.saved = saved;
            write_derived(backend, source, settings)
        })
        .map(|derived| report.derived = derived);
    if let Err(e) = outcome {
        report.error = Some(e.to_string());
    }
    report
}

/// Run the image stage over every configured source directory.
pub fn build_images(
    backend: &impl ImageBackend,
    project_root: &Path,
    config: &ImagesConfig,
) -> BuildSummary {
    let settings = EncodeSettings::from_config(config);
    let mut summary = BuildSummary::default();

    for dir in &config.source_dirs {
        let full = project_root.join(dir);
        if !full.is_dir() {
            summary.skipped_dirs.push(dir.clone());
            continue;
        }
        let sources = scan_sources(&full);
        let mut reports: Vec<FileReport> = sources
            .par_iter()
            .map(|source| process_file(backend, source, &settings))
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
    fn settings_map_config_qualities() {
        let settings = EncodeSettings::default();
        assert_eq!(settings.jpeg_quality.value(), 80);
        assert_eq!(settings.avif_quality.value(), 50);
        assert_eq!(settings.png_compression, 5);
        assert_eq!(settings.derived_formats(), vec![OutputFormat::WebP]);
    }

    #[test]
    fn settings_respect_convert_toggles() {
        let mut config = ImagesConfig::default();
        config.convert.webp = false;
        config.convert.avif = true;
        let settings = EncodeSettings::from_config(&config);
        assert_eq!(settings.derived_formats(), vec![OutputFormat::Avif]);
    }

    #[test]
    fn sibling_path_swaps_extension() {
        assert_eq!(
            sibling_path(Path::new("/img/hero.png"), OutputFormat::WebP),
            PathBuf::from("/img/hero.webp")
        );
        assert_eq!(
            sibling_path(Path::new("/img/photo.jpeg"), OutputFormat::Avif),
            PathBuf::from("/img/photo.avif")
        );
    }

    #[test]
    fn scan_finds_only_source_bitmaps() {
        let tmp = TempDir::new().unwrap();
        write_file(&tmp.path().join("a.jpg"), 10);
        write_file(&tmp.path().join("nested/b.png"), 10);
        write_file(&tmp.path().join("a.webp"), 10);
        write_file(&tmp.path().join("logo.svg"), 10);
        write_file(&tmp.path().join("c.avif"), 10);

        let sources = scan_sources(tmp.path());
        let names: Vec<String> = sources
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.png"]);
    }

    #[test]
    fn recompress_writes_smaller_output() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("hero.jpg");
        write_file(&src, 1000);

        let backend = MockBackend::with_sizes(vec![400]);
        let settings = EncodeSettings::default();
        let saved = recompress_in_place(&backend, &src, OutputFormat::Jpeg, &settings).unwrap();
        assert_eq!(saved, 600);
        assert_eq!(fs::metadata(&src).unwrap().len(), 400);
    }

    #[test]
    fn recompress_never_grows_a_file() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("tiny.png");
        write_file(&src, 100);

        // Re-encode comes out larger; the original must survive untouched.
        let backend = MockBackend::with_sizes(vec![150]);
        let settings = EncodeSettings::default();
        let saved = recompress_in_place(&backend, &src, OutputFormat::Png, &settings).unwrap();
        assert_eq!(saved, 0);
        assert_eq!(fs::read(&src).unwrap(), vec![0xAAu8; 100]);

        // Equal size also keeps the original.
        let backend = MockBackend::with_sizes(vec![100]);
        let saved = recompress_in_place(&backend, &src, OutputFormat::Png, &settings).unwrap();
        assert_eq!(saved, 0);
    }

    #[test]
    fn derived_siblings_written_per_toggles() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("hero.png");
        write_file(&src, 100);

        let mut config = ImagesConfig::default();
        config.convert.avif = true;
        let settings = EncodeSettings::from_config(&config);

        let backend = MockBackend::new();
        let written = write_derived(&backend, &src, &settings).unwrap();
        assert_eq!(written, vec!["webp", "avif"]);
        assert!(tmp.path().join("hero.webp").exists());
        assert!(tmp.path().join("hero.avif").exists());

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].format, OutputFormat::WebP);
        assert_eq!(ops[0].quality, 80);
        assert_eq!(ops[1].format, OutputFormat::Avif);
        assert_eq!(ops[1].quality, 50);
    }

    #[test]
    fn build_skips_missing_dirs_and_counts_failures() {
        let tmp = TempDir::new().unwrap();
        let images = tmp.path().join("src/assets/images");
        write_file(&images.join("a.jpg"), 1000);

        let mut config = ImagesConfig::default();
        config.source_dirs = vec![
            "src/assets/images".to_string(),
            "public/assets/images".to_string(), // does not exist
        ];
        config.convert.webp = false;

        // One recompress encode per file.
        let backend = MockBackend::with_sizes(vec![500]);
        let summary = build_images(&backend, tmp.path(), &config);

        assert_eq!(summary.skipped_dirs, vec!["public/assets/images"]);
        assert_eq!(summary.processed(), 1);
        assert_eq!(summary.failed(), 0);
        assert_eq!(summary.total_saved(), 500);
    }
}
