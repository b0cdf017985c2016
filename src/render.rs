//! Rasterize a [`FitResult`] and write it out.
//!
//! Layout on the canvas:
//!
//! ```text
//! ┌──────────────────────────────┐
//! │          (margin_y)          │
//! │   "centered quote line 1     │  ← block starts at (height − total_height) / 2
//! │     centered quote line 2"   │
//! │                              │  ← ½ speaker line gap
//! │         — Speaker            │
//! │          (margin_y)          │
//! └──────────────────────────────┘
//! ```
//!
//! Every line is centered horizontally. Files are written to a temporary file
//! in the destination directory and renamed into place, so a failed or
//! interrupted write never leaves a truncated image behind.

use crate::canvas::CanvasSpec;
use crate::fit::FitResult;
use crate::fonts::Face;
use image::{ImageFormat, RgbImage};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Draw the fitted quote onto a fresh canvas.
pub fn render(
    fit: &FitResult,
    canvas: &CanvasSpec,
    face: &dyn Face,
    speaker_face: &dyn Face,
) -> RgbImage {
    let mut img = RgbImage::from_pixel(canvas.width, canvas.height, canvas.background);

    let px = fit.font_size as f32;
    let mut y = (canvas.height as f32 - fit.total_height as f32) / 2.0;

    for line in &fit.lines {
        let x = centered_x(canvas.width, face.text_width(line, px));
        face.draw(&mut img, line, px, (x, y.round() as i32), canvas.foreground);
        y += fit.line_height;
    }

    if let Some(speaker) = &fit.speaker_line {
        let s_px = fit.speaker_size as f32;
        y += fit.speaker_line_height * 0.5;
        let x = centered_x(canvas.width, speaker_face.text_width(speaker, s_px));
        speaker_face.draw(&mut img, speaker, s_px, (x, y.round() as i32), canvas.foreground);
    }

    img
}

fn centered_x(canvas_width: u32, text_width: f32) -> i32 {
    ((canvas_width as f32 - text_width) / 2.0).round() as i32
}

/// Encode an image as PNG bytes.
pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Write `bytes` to `path` atomically: temp file in the same directory, then rename.
///
/// Creates the parent directory if needed. On any failure the temp file is
/// removed and `path` is left untouched.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    let write_err = |source| RenderError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
