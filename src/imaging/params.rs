//! Parameter types for image encoding.
//!
//! These structs describe *what* to encode, not *how* to encode it. They are
//! the interface between the high-level [`process`](crate::process) module
//! (which decides which outputs each source bitmap gets) and the
//! [`backend`](super::backend) (which does the actual pixel work). This
//! separation allows swapping backends (e.g. for testing with a mock) without
//! changing pipeline logic.

use std::path::{Path, PathBuf};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// Output encodings the pipeline can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
    Avif,
}

impl OutputFormat {
    /// The file extension written for this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
            OutputFormat::Avif => "avif",
        }
    }

    /// Map a source file extension to its in-place re-encode format.
    /// Returns `None` for extensions the pipeline does not optimize.
    pub fn from_source_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "png" => Some(OutputFormat::Png),
            _ => None,
        }
    }

    /// Map a path to its in-place re-encode format.
    pub fn from_source_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_source_extension)
    }
}

/// Full specification for one encode: which source bitmap, the target
/// format, and the format's tuning knobs. The backend returns encoded bytes
/// so callers can compare sizes before touching disk.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeParams {
    pub source: PathBuf,
    pub format: OutputFormat,
    pub quality: Quality,
    /// PNG compression level (0-9). Ignored by other formats.
    pub png_compression: u32,
    /// AVIF encoder speed (1-10, higher = faster). Ignored by other formats.
    pub avif_speed: u8,
}

impl EncodeParams {
    pub fn new(source: impl Into<PathBuf>, format: OutputFormat, quality: Quality) -> Self {
        Self {
            source: source.into(),
            format,
            quality,
            png_compression: 5,
            avif_speed: 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_80() {
        assert_eq!(Quality::default().value(), 80);
    }

    #[test]
    fn source_extension_mapping() {
        assert_eq!(
            OutputFormat::from_source_extension("JPG"),
            Some(OutputFormat::Jpeg)
        );
        assert_eq!(
            OutputFormat::from_source_extension("jpeg"),
            Some(OutputFormat::Jpeg)
        );
        assert_eq!(
            OutputFormat::from_source_extension("png"),
            Some(OutputFormat::Png)
        );
        // Derived formats are never re-encoded in place.
        assert_eq!(OutputFormat::from_source_extension("webp"), None);
        assert_eq!(OutputFormat::from_source_extension("avif"), None);
        assert_eq!(OutputFormat::from_source_extension("svg"), None);
    }

    #[test]
    fn source_path_mapping() {
        assert_eq!(
            OutputFormat::from_source_path(Path::new("/a/hero.PNG")),
            Some(OutputFormat::Png)
        );
        assert_eq!(OutputFormat::from_source_path(Path::new("/a/noext")), None);
    }
}
