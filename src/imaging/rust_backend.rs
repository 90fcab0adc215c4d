//! Pure Rust image encoding backend — zero external dependencies.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image` crate (pure Rust decoders) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless) |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e) |
//!
//! The WebP encoder in the `image` crate is lossless-only; the configured
//! WebP quality is accepted but has no effect here. Lossless WebP still
//! undercuts most PNG sources, and the never-regress comparison in the
//! caller drops any output that would be larger than its source.
//!
//! AVIF is encode-only: the `image` crate's `"avif"` feature enables rav1e
//! but not a decoder, so `.avif` files are never used as encode sources.

use super::backend::{BackendError, ImageBackend};
use super::params::{EncodeParams, OutputFormat};
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::EncodingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Map the 0-9 PNG compression level onto the encoder's three presets.
fn png_compression_type(level: u32) -> CompressionType {
    match level {
        0..=2 => CompressionType::Fast,
        3..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

impl ImageBackend for RustBackend {
    fn encode(&self, params: &EncodeParams) -> Result<Vec<u8>, BackendError> {
        let image = load_image(&params.source)?;
        let mut out = Vec::new();
        let failed = |e: image::ImageError| {
            BackendError::EncodingFailed(format!(
                "Failed to encode {}: {}",
                params.source.display(),
                e
            ))
        };
        match params.format {
            OutputFormat::Jpeg => {
                // JPEG has no alpha channel.
                let rgb = image.to_rgb8();
                let encoder =
                    JpegEncoder::new_with_quality(Cursor::new(&mut out), params.quality.value() as u8);
                rgb.write_with_encoder(encoder).map_err(failed)?;
            }
            OutputFormat::Png => {
                let encoder = PngEncoder::new_with_quality(
                    Cursor::new(&mut out),
                    png_compression_type(params.png_compression),
                    FilterType::Adaptive,
                );
                image.write_with_encoder(encoder).map_err(failed)?;
            }
            OutputFormat::WebP => {
                let encoder = WebPEncoder::new_lossless(Cursor::new(&mut out));
                if image.color().has_alpha() {
                    image.to_rgba8().write_with_encoder(encoder).map_err(failed)?;
                } else {
                    image.to_rgb8().write_with_encoder(encoder).map_err(failed)?;
                }
            }
            OutputFormat::Avif => {
                let encoder = AvifEncoder::new_with_speed_quality(
                    Cursor::new(&mut out),
                    params.avif_speed,
                    params.quality.value() as u8,
                );
                if image.color().has_alpha() {
                    image.to_rgba8().write_with_encoder(encoder).map_err(failed)?;
                } else {
                    image.to_rgb8().write_with_encoder(encoder).map_err(failed)?;
                }
            }
        }
        Ok(out)
    }
}
