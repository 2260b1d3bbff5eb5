//! # Size-Targeted Compressor
//!
//! Il cuore della libreria: riduce la qualità di encoding finché il file
//! scritto non rientra nel budget in kilobyte, oppure finché la qualità arriva
//! al limite inferiore.
//!
//! ## Algoritmo
//! 1. Encode a `initial_quality`, misura il file (`bytes / 1024`, KB binari)
//! 2. Finché `size_kb > target_size_kb` **e** `quality > step`:
//!    - `quality -= step`
//!    - re-encode della stessa immagine sullo stesso path (sovrascrive)
//!    - nuova misura
//! 3. Ritorna dimensione e qualità dell'ultimo encode
//!
//! ## Note
//! - Confronto stretto (`>`): un file esattamente al target è accettato subito
//! - Si decrementa solo se `quality > step`: con i default la discesa è
//!   85, 75, ..., 15, 5 e si ferma lì
//! - Se il target non è raggiungibile il risultato è semplicemente fuori
//!   budget (`met_target() == false`), non un errore
//! - Qualsiasi errore di encode o di misura interrompe la compressione
//! - Esecuzione sincrona e bloccante sul thread del chiamante

use crate::codec::ImageCodec;
use crate::config::{CompressionConfig, DEFAULT_INITIAL_QUALITY, DEFAULT_STEP};
use crate::error::{CompressError, Result};
use crate::file_system::FileSystem;
use crate::utils::bytes_to_kb;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One compression run: what to encode, where, and how to search
#[derive(Debug, Clone)]
pub struct CompressionRequest<'a, I> {
    pub source: &'a I,
    pub destination: PathBuf,
    pub target_size_kb: f64,
    pub initial_quality: u8,
    pub step: u8,
}

impl<'a, I> CompressionRequest<'a, I> {
    /// Request with the default search parameters (quality 85, step 10)
    pub fn new(source: &'a I, destination: impl Into<PathBuf>, target_size_kb: f64) -> Self {
        Self {
            source,
            destination: destination.into(),
            target_size_kb,
            initial_quality: DEFAULT_INITIAL_QUALITY,
            step: DEFAULT_STEP,
        }
    }

    pub fn with_step(mut self, step: u8) -> Self {
        self.step = step;
        self
    }

    pub fn with_initial_quality(mut self, quality: u8) -> Self {
        self.initial_quality = quality;
        self
    }

    /// Apply step and initial quality from a config
    pub fn with_config(self, config: &CompressionConfig) -> Self {
        self.with_step(config.step)
            .with_initial_quality(config.initial_quality)
    }

    /// Check the preconditions of `SizeTargetedCompressor::compress`
    pub fn validate(&self) -> Result<()> {
        if !(self.target_size_kb.is_finite() && self.target_size_kb > 0.0) {
            return Err(CompressError::Input(format!(
                "Target size must be a positive number of KB, got {}",
                self.target_size_kb
            )));
        }
        CompressionConfig {
            step: self.step,
            initial_quality: self.initial_quality,
        }
        .validate()
    }
}

/// A single encode performed during the search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QualityAttempt {
    pub quality: u8,
    pub size_bytes: u64,
}

impl QualityAttempt {
    pub fn size_kb(&self) -> f64 {
        bytes_to_kb(self.size_bytes)
    }
}

/// Outcome of the last write performed by a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompressionResult {
    pub achieved_size_kb: f64,
    pub achieved_bytes: u64,
    pub final_quality: u8,
    pub target_size_kb: f64,
    /// Every encode in order; the last one is the file left on disk
    pub attempts: Vec<QualityAttempt>,
}

impl CompressionResult {
    /// Whether the file on disk fits the budget
    pub fn met_target(&self) -> bool {
        self.achieved_size_kb <= self.target_size_kb
    }
}

/// Lowers encoding quality until the written file fits a size budget
pub struct SizeTargetedCompressor<C, F> {
    codec: C,
    fs: F,
}

impl<C: ImageCodec, F: FileSystem> SizeTargetedCompressor<C, F> {
    pub fn new(codec: C, fs: F) -> Self {
        Self { codec, fs }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Run the quality search described by `request`.
    ///
    /// The destination is overwritten on every attempt; the returned size and
    /// quality always describe the file that remains on disk.
    ///
    /// # Errors
    /// - `CompressError::Input` if the request violates its preconditions
    ///   (nothing is written in that case)
    /// - any error from the codec or the file system, which aborts the run
    pub fn compress(&self, request: &CompressionRequest<'_, C::Image>) -> Result<CompressionResult> {
        request.validate()?;

        let destination = request.destination.as_path();
        let step = request.step;
        let mut quality = request.initial_quality;

        info!(
            "Compressing to {} (target {:.2} KB, quality {}, step {})",
            destination.display(),
            request.target_size_kb,
            quality,
            step
        );

        let mut last = self.attempt(request.source, destination, quality)?;
        let mut attempts = vec![last];

        while last.size_kb() > request.target_size_kb && quality > step {
            quality -= step;
            last = self.attempt(request.source, destination, quality)?;
            attempts.push(last);
        }

        let result = CompressionResult {
            achieved_size_kb: last.size_kb(),
            achieved_bytes: last.size_bytes,
            final_quality: last.quality,
            target_size_kb: request.target_size_kb,
            attempts,
        };

        if result.met_target() {
            info!(
                "Reached {:.2} KB at quality {} after {} attempt(s)",
                result.achieved_size_kb,
                result.final_quality,
                result.attempts.len()
            );
        } else {
            warn!(
                "Target {:.2} KB not reachable: stopped at {:.2} KB with quality {}",
                result.target_size_kb, result.achieved_size_kb, result.final_quality
            );
        }

        Ok(result)
    }

    /// Encode at `quality` and measure what landed on disk
    fn attempt(&self, source: &C::Image, destination: &Path, quality: u8) -> Result<QualityAttempt> {
        self.codec.encode(source, destination, quality)?;
        let attempt = QualityAttempt {
            quality,
            size_bytes: self.fs.size_in_bytes(destination)?,
        };
        debug!(
            "quality={} -> {} bytes ({:.2} KB)",
            attempt.quality,
            attempt.size_bytes,
            attempt.size_kb()
        );
        Ok(attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{tests::noise_image, ImageCrateCodec};
    use crate::file_system::LocalFileSystem;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Codec writing `curve(quality)` bytes, recording every quality it sees
    struct FakeCodec {
        curve: fn(u8) -> u64,
        calls: RefCell<Vec<u8>>,
        fail_at: Option<u8>,
    }

    impl FakeCodec {
        fn new(curve: fn(u8) -> u64) -> Self {
            Self {
                curve,
                calls: RefCell::new(Vec::new()),
                fail_at: None,
            }
        }

        fn failing_at(mut self, quality: u8) -> Self {
            self.fail_at = Some(quality);
            self
        }

        fn calls(&self) -> Vec<u8> {
            self.calls.borrow().clone()
        }
    }

    impl ImageCodec for FakeCodec {
        type Image = ();

        fn decode(&self, _input: &Path) -> Result<()> {
            Ok(())
        }

        fn encode(&self, _image: &(), output: &Path, quality: u8) -> Result<()> {
            self.calls.borrow_mut().push(quality);
            if self.fail_at == Some(quality) {
                return Err(CompressError::Encode {
                    path: output.to_path_buf(),
                    source: image::ImageError::IoError(std::io::Error::new(
                        std::io::ErrorKind::PermissionDenied,
                        "read-only destination",
                    )),
                });
            }
            std::fs::write(output, vec![0u8; (self.curve)(quality) as usize])?;
            Ok(())
        }
    }

    /// 10 KB per quality point
    fn linear_kb(quality: u8) -> u64 {
        quality as u64 * 10 * 1024
    }

    fn compressor(codec: FakeCodec) -> SizeTargetedCompressor<FakeCodec, LocalFileSystem> {
        SizeTargetedCompressor::new(codec, LocalFileSystem)
    }

    #[test]
    fn test_immediate_success_single_encode() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out.jpg");
        // 300 KB at quality 85
        let c = compressor(FakeCodec::new(|_| 300 * 1024));

        let result = c.compress(&CompressionRequest::new(&(), &out, 500.0)).unwrap();

        assert_eq!(result.final_quality, 85);
        assert_eq!(result.achieved_size_kb, 300.0);
        assert_eq!(c.codec().calls(), vec![85]);
        assert!(result.met_target());
    }

    #[test]
    fn test_descends_until_target_met() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out.jpg");
        let c = compressor(FakeCodec::new(linear_kb));

        // 85 -> 850KB, 75 -> 750KB, ..., 45 -> 450KB fits 500KB
        let result = c.compress(&CompressionRequest::new(&(), &out, 500.0)).unwrap();

        assert_eq!(c.codec().calls(), vec![85, 75, 65, 55, 45]);
        assert_eq!(result.final_quality, 45);
        assert_eq!(result.achieved_size_kb, 450.0);
        assert_eq!(result.attempts.len(), 5);
        assert_eq!(result.attempts.last().unwrap().quality, 45);
        assert_eq!(std::fs::metadata(&out).unwrap().len(), 450 * 1024);
    }

    #[test]
    fn test_exact_boundary_stops_immediately() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out.jpg");
        let c = compressor(FakeCodec::new(linear_kb));

        let result = c.compress(&CompressionRequest::new(&(), &out, 850.0)).unwrap();

        assert_eq!(c.codec().calls(), vec![85]);
        assert_eq!(result.final_quality, 85);
        assert!(result.met_target());
    }

    #[test]
    fn test_unreachable_target_stops_at_floor() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out.jpg");
        // never smaller than 5 KB
        let c = compressor(FakeCodec::new(|_| 5 * 1024));

        let request = CompressionRequest::new(&(), &out, 1.0)
            .with_initial_quality(20)
            .with_step(10);
        let result = c.compress(&request).unwrap();

        assert_eq!(c.codec().calls(), vec![20, 10]);
        assert_eq!(result.final_quality, 10);
        assert_eq!(result.achieved_size_kb, 5.0);
        assert!(!result.met_target());
    }

    #[test]
    fn test_default_floor_sequence() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out.jpg");
        let c = compressor(FakeCodec::new(linear_kb));

        let result = c.compress(&CompressionRequest::new(&(), &out, 0.5)).unwrap();

        // 15 > 10 allows one more decrement to 5; 5 > 10 is false
        assert_eq!(c.codec().calls(), vec![85, 75, 65, 55, 45, 35, 25, 15, 5]);
        assert_eq!(result.final_quality, 5);
        assert!(!result.met_target());
    }

    #[test]
    fn test_initial_quality_at_or_below_step_runs_once() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out.jpg");

        for (initial, step) in [(10u8, 10u8), (5, 10)] {
            let c = compressor(FakeCodec::new(linear_kb));
            let request = CompressionRequest::new(&(), &out, 0.001)
                .with_initial_quality(initial)
                .with_step(step);
            let result = c.compress(&request).unwrap();

            assert_eq!(c.codec().calls(), vec![initial]);
            assert_eq!(result.final_quality, initial);
        }
    }

    #[test]
    fn test_final_quality_is_in_step_sequence_and_above_step() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out.jpg");

        for (initial, step) in [(100u8, 7u8), (85, 10), (50, 3), (99, 33), (64, 1)] {
            for target in [0.5, 100.0, 333.0, 640.0, 2000.0] {
                let c = compressor(FakeCodec::new(linear_kb));
                let request = CompressionRequest::new(&(), &out, target)
                    .with_initial_quality(initial)
                    .with_step(step);
                let result = c.compress(&request).unwrap();

                let q = result.final_quality;
                assert_eq!((initial - q) % step, 0);
                assert!(q > 0);
                if q != initial {
                    // only left q + step because it was over budget and above the floor
                    let previous = result.attempts[result.attempts.len() - 2];
                    assert_eq!(previous.quality, q + step);
                    assert!(previous.size_kb() > target);
                    assert!(previous.quality > step);
                }
                if !result.met_target() {
                    assert!(q <= step);
                }
                // the invariant: last attempt is what is on disk
                assert_eq!(c.codec().calls().last(), Some(&q));
                assert_eq!(std::fs::metadata(&out).unwrap().len(), result.achieved_bytes);
            }
        }
    }

    #[test]
    fn test_rerun_at_final_quality_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out.jpg");
        let first = compressor(FakeCodec::new(linear_kb))
            .compress(&CompressionRequest::new(&(), &out, 500.0))
            .unwrap();

        let again = compressor(FakeCodec::new(linear_kb))
            .compress(
                &CompressionRequest::new(&(), &out, 500.0)
                    .with_initial_quality(first.final_quality)
                    .with_step(first.final_quality),
            )
            .unwrap();

        assert_eq!(again.achieved_size_kb, first.achieved_size_kb);
        assert_eq!(again.attempts.len(), 1);
    }

    #[test]
    fn test_encode_failure_aborts() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out.jpg");
        let c = compressor(FakeCodec::new(linear_kb).failing_at(65));

        let err = c
            .compress(&CompressionRequest::new(&(), &out, 100.0))
            .unwrap_err();

        assert!(matches!(err, CompressError::Encode { .. }));
        assert_eq!(c.codec().calls(), vec![85, 75, 65]);
    }

    #[test]
    fn test_missing_output_after_encode_is_not_found() {
        struct NoWriteCodec;
        impl ImageCodec for NoWriteCodec {
            type Image = ();
            fn decode(&self, _input: &Path) -> Result<()> {
                Ok(())
            }
            fn encode(&self, _image: &(), _output: &Path, _quality: u8) -> Result<()> {
                Ok(())
            }
        }

        let temp_dir = TempDir::new().unwrap();
        let c = SizeTargetedCompressor::new(NoWriteCodec, LocalFileSystem);
        let err = c
            .compress(&CompressionRequest::new(&(), temp_dir.path().join("x.jpg"), 10.0))
            .unwrap_err();
        assert!(matches!(err, CompressError::NotFound(_)));
    }

    #[test]
    fn test_invalid_request_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out.jpg");

        let bad_requests = [
            CompressionRequest::new(&(), &out, 0.0),
            CompressionRequest::new(&(), &out, -3.0),
            CompressionRequest::new(&(), &out, f64::NAN),
            CompressionRequest::new(&(), &out, 10.0).with_step(0),
            CompressionRequest::new(&(), &out, 10.0).with_initial_quality(0),
            CompressionRequest::new(&(), &out, 10.0).with_initial_quality(101),
        ];

        for request in &bad_requests {
            let c = compressor(FakeCodec::new(linear_kb));
            let err = c.compress(request).unwrap_err();
            assert!(matches!(err, CompressError::Input(_)));
            assert!(c.codec().calls().is_empty());
        }
        assert!(!out.exists());
    }

    #[test]
    fn test_with_config_applies_search_parameters() {
        let config = CompressionConfig {
            step: 4,
            initial_quality: 90,
        };
        let request = CompressionRequest::new(&(), "out.jpg", 10.0).with_config(&config);
        assert_eq!(request.step, 4);
        assert_eq!(request.initial_quality, 90);
    }

    #[test]
    fn test_real_jpeg_codec_reports_measured_size() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("real.jpg");
        let img = noise_image(96, 96);
        let c = SizeTargetedCompressor::new(ImageCrateCodec, LocalFileSystem);

        let result = c.compress(&CompressionRequest::new(&img, &out, 0.01)).unwrap();

        assert_eq!(std::fs::metadata(&out).unwrap().len(), result.achieved_bytes);
        assert_eq!(result.achieved_size_kb, result.achieved_bytes as f64 / 1024.0);
        assert_eq!(result.final_quality, 5);
        assert!(result.attempts.first().unwrap().size_bytes > result.achieved_bytes);
    }
}
