//! Image encoding backend trait.
//!
//! The [`ImageBackend`] trait defines the single operation every backend must
//! support: encode a source bitmap into a target format and return the bytes.
//! Returning bytes instead of writing files keeps the never-regress size
//! comparison in the caller, where the write decision belongs.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend) — pure Rust, statically
//! linked into the binary.

use super::params::EncodeParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Trait for image encoding backends.
///
/// `Sync` so a single backend instance can be shared across rayon workers.
pub trait ImageBackend: Sync {
    /// Decode the source bitmap and encode it per `params`.
    fn encode(&self, params: &EncodeParams) -> Result<Vec<u8>, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::params::OutputFormat;
    use std::sync::Mutex;

    /// Mock backend that records operations without doing pixel work.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct MockBackend {
        /// Byte counts to hand out, popped per call. Empty → 16 zero bytes.
        pub encode_sizes: Mutex<Vec<usize>>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedOp {
        pub source: String,
        pub format: OutputFormat,
        pub quality: u32,
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Mock whose successive encodes produce outputs of the given sizes.
        pub fn with_sizes(sizes: Vec<usize>) -> Self {
            Self {
                encode_sizes: Mutex::new(sizes),
                operations: Mutex::new(Vec::new()),
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl ImageBackend for MockBackend {
        fn encode(&self, params: &EncodeParams) -> Result<Vec<u8>, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp {
                source: params.source.to_string_lossy().to_string(),
                format: params.format,
                quality: params.quality.value(),
            });
            let size = self.encode_sizes.lock().unwrap().pop().unwrap_or(16);
            Ok(vec![0u8; size])
        }
    }

    #[test]
    fn mock_records_encodes() {
        use crate::imaging::params::Quality;

        let backend = MockBackend::with_sizes(vec![100]);
        let bytes = backend
            .encode(&EncodeParams::new(
                "/img/hero.jpg",
                OutputFormat::WebP,
                Quality::new(80),
            ))
            .unwrap();
        assert_eq!(bytes.len(), 100);

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].source, "/img/hero.jpg");
        assert_eq!(ops[0].format, OutputFormat::WebP);
        assert_eq!(ops[0].quality, 80);
    }
}
