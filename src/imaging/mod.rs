//! Image encoding — pure Rust, zero external dependencies.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image` crate (pure Rust decoders) |
//! | **Re-encode JPEG/PNG** | `JpegEncoder` / `PngEncoder` |
//! | **WebP siblings** | `WebPEncoder` (lossless) |
//! | **AVIF siblings** | `AvifEncoder` (rav1e) |
//!
//! The module is split into:
//! - **Parameters**: Data structures describing one encode
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//!
//! The high-level pipeline logic (scanning, never-regress comparison,
//! parallelism) lives in [`process`](crate::process) and
//! [`recompress`](crate::recompress).

pub mod backend;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use params::{EncodeParams, OutputFormat, Quality};
pub use rust_backend::RustBackend;
