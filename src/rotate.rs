//! In-place 180° rotation of generated wallpapers.
//!
//! Some e-readers show the lock screen upside down relative to how the images
//! were designed. [`rotate_all`] flips every image in a directory and writes
//! it back to the same path in the same format.
//!
//! PNG, BMP and TIFF are lossless, so rotating twice restores the original
//! pixels exactly. JPEG is re-encoded at quality 100.
//!
//! A file that fails to decode or write is reported and skipped; the rest of
//! the directory is still processed.

use crate::render::{RenderError, write_atomic};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

#[derive(Error, Debug)]
pub enum RotateError {
    #[error("Directory not found: {0}")]
    MissingDirectory(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unreadable image {path}: {reason}")]
    UnreadableImage { path: PathBuf, reason: String },
    #[error("Failed to save {path}: {reason}")]
    Write { path: PathBuf, reason: String },
}

/// Outcome of one file in a directory pass.
#[derive(Debug)]
pub enum RotateOutcome {
    Rotated(PathBuf),
    Failed(RotateError),
}

/// Result of [`rotate_all`].
#[derive(Debug, Default)]
pub struct RotateReport {
    pub outcomes: Vec<RotateOutcome>,
}

impl RotateReport {
    pub fn rotated(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RotateOutcome::Rotated(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.rotated()
    }
}

/// Whether `path` has an extension the rotator handles.
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

/// Rotate every image directly inside `dir` by 180°, in place.
///
/// Files are visited in name order; non-image files are ignored.
pub fn rotate_all(dir: &Path) -> Result<RotateReport, RotateError> {
    if !dir.is_dir() {
        return Err(RotateError::MissingDirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_image(&path) {
            files.push(path);
        }
    }
    files.sort();

    let mut report = RotateReport::default();
    for path in files {
        match rotate_file(&path) {
            Ok(()) => {
                log::info!("rotated {}", path.display());
                report.outcomes.push(RotateOutcome::Rotated(path));
            }
            Err(e) => {
                log::warn!("{e}");
                report.outcomes.push(RotateOutcome::Failed(e));
            }
        }
    }
    Ok(report)
}

/// Rotate a single image by 180° and overwrite it in its original format.
pub fn rotate_file(path: &Path) -> Result<(), RotateError> {
    let unreadable = |reason: String| RotateError::UnreadableImage {
        path: path.to_path_buf(),
        reason,
    };
    let reader = ImageReader::open(path)
        .map_err(|e| unreadable(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| unreadable(e.to_string()))?;
    let format = reader
        .format()
        .ok_or_else(|| unreadable("unknown image format".to_string()))?;
    let img = reader.decode().map_err(|e| unreadable(e.to_string()))?;

    let bytes = encode(&img.rotate180(), format).map_err(|e| RotateError::Write {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    write_atomic(path, &bytes).map_err(|e| match e {
        RenderError::Write { path, source } => RotateError::Write {
            path,
            reason: source.to_string(),
        },
        other => RotateError::Write {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    })
}

fn encode(img: &DynamicImage, format: ImageFormat) -> image::ImageResult<Vec<u8>> {
    let mut bytes = Vec::new();
    if format == ImageFormat::Jpeg {
        let encoder = JpegEncoder::new_with_quality(&mut bytes, 100);
        img.write_with_encoder(encoder)?;
    } else {
        img.write_to(&mut Cursor::new(&mut bytes), format)?;
    }
    Ok(bytes)
}
