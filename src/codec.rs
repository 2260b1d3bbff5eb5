//! # Image Codec Module
//!
//! Questo modulo isola tutta la decodifica/codifica delle immagini dietro al
//! trait `ImageCodec`, così il loop di compressione non dipende dal crate `image`.
//!
//! ## Responsabilità:
//! - `decode()`: apre un'immagine rilevando il formato dal contenuto
//! - `encode()`: scrive l'immagine su disco alla qualità richiesta, sovrascrivendo
//! - Scelta del formato di output in base all'estensione (case-insensitive)
//!
//! ## Formati
//!
//! | Formato | Input | Output | Qualità |
//! |---------|-------|--------|---------|
//! | JPEG    | ✅    | ✅     | 1-100   |
//! | PNG     | ✅    | ✅     | ignorata (lossless) |
//! | WebP    | ✅    | ❌     | -       |
//! | BMP     | ✅    | ❌     | -       |
//! | GIF     | ✅    | ❌     | -       |
//!
//! Il PNG ignora la qualità: il loop arriva comunque al limite inferiore e
//! termina, ritornando la dimensione (invariata) dell'ultimo tentativo.

use crate::error::{CompressError, Result};
use image::{ColorType, DynamicImage, ImageError, ImageOutputFormat};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;
use tracing::debug;

/// Decode/encode capability the compressor is built on.
///
/// `encode` must overwrite `output` if it exists; the compressor relies on
/// this to keep a single file on disk across attempts.
pub trait ImageCodec {
    /// Decoded image handle
    type Image;

    fn decode(&self, input: &Path) -> Result<Self::Image>;

    fn encode(&self, image: &Self::Image, output: &Path, quality: u8) -> Result<()>;
}

/// Output formats `ImageCrateCodec` can write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    /// Pick the output format from the destination extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase());

        match ext.as_deref() {
            Some("jpg") | Some("jpeg") => Ok(Self::Jpeg),
            Some("png") => Ok(Self::Png),
            Some(other) => Err(CompressError::UnsupportedFormat(format!(
                "'.{}' ({}). Only JPEG and PNG output is supported.",
                other,
                path.display()
            ))),
            None => Err(CompressError::UnsupportedFormat(format!(
                "{} has no file extension",
                path.display()
            ))),
        }
    }

    fn to_image_format(self, quality: u8) -> ImageOutputFormat {
        match self {
            OutputFormat::Jpeg => ImageOutputFormat::Jpeg(quality),
            OutputFormat::Png => ImageOutputFormat::Png,
        }
    }
}

/// `ImageCodec` backed by the `image` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateCodec;

impl ImageCodec for ImageCrateCodec {
    type Image = DynamicImage;

    fn decode(&self, input: &Path) -> Result<DynamicImage> {
        let reader = image::io::Reader::open(input).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                CompressError::Input(format!("Input image not found: {}", input.display()))
            } else {
                CompressError::Input(format!("Cannot read input image {}: {}", input.display(), e))
            }
        })?;

        let decoded = reader
            .with_guessed_format()
            .map_err(|e| CompressError::Decode {
                path: input.to_path_buf(),
                source: ImageError::IoError(e),
            })?
            .decode()
            .map_err(|e| CompressError::Decode {
                path: input.to_path_buf(),
                source: e,
            })?;

        debug!(
            "Decoded {} ({}x{}, {:?})",
            input.display(),
            decoded.width(),
            decoded.height(),
            decoded.color()
        );
        Ok(decoded)
    }

    fn encode(&self, image: &DynamicImage, output: &Path, quality: u8) -> Result<()> {
        let format = OutputFormat::from_path(output)?;

        let encode_err = |source: ImageError| CompressError::Encode {
            path: output.to_path_buf(),
            source,
        };

        // JPEG has no alpha channel and only 8-bit gray/RGB layouts
        let image: Cow<'_, DynamicImage> = match (format, image.color()) {
            (OutputFormat::Jpeg, ColorType::L8 | ColorType::Rgb8) => Cow::Borrowed(image),
            (OutputFormat::Jpeg, _) => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
            (OutputFormat::Png, _) => Cow::Borrowed(image),
        };

        let file = File::create(output).map_err(|e| encode_err(ImageError::IoError(e)))?;
        let mut writer = BufWriter::new(file);
        image
            .write_to(&mut writer, format.to_image_format(quality))
            .map_err(encode_err)?;
        writer
            .flush()
            .map_err(|e| encode_err(ImageError::IoError(e)))?;

        Ok(())
    }
}
