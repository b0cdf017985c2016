//! Shared test utilities.
//!
//! [`MonoFace`] is a deterministic stand-in for a real font: every character
//! advances half the pixel size, lines are exactly one pixel size tall, and
//! each non-space character is drawn as a solid block. Layout and rendering
//! tests can then reason about exact pixel positions without font files.

use crate::canvas::CanvasSpec;
use crate::config::FitConfig;
use crate::fonts::{Face, FontCatalog};
use crate::generate::QuoteGenerator;
use image::{Rgb, RgbImage};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::Path;
use std::sync::Arc;

/// Fixed-advance mock face.
pub struct MonoFace {
    name: String,
}

impl MonoFace {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    fn advance(size: f32) -> f32 {
        size * 0.5
    }
}

impl Face for MonoFace {
    fn name(&self) -> &str {
        &self.name
    }

    fn text_width(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * Self::advance(size)
    }

    fn line_height(&self, size: f32) -> f32 {
        size
    }

    fn draw(&self, canvas: &mut RgbImage, text: &str, size: f32, origin: (i32, i32), color: Rgb<u8>) {
        let advance = Self::advance(size);
        let height = size.round() as i32;
        for (i, c) in text.chars().enumerate() {
            if c.is_whitespace() {
                continue;
            }
            let x0 = origin.0 + (i as f32 * advance).round() as i32;
            let x1 = origin.0 + ((i + 1) as f32 * advance).round() as i32;
            for y in origin.1..origin.1 + height {
                for x in x0..x1 {
                    if x >= 0 && y >= 0 && (x as u32) < canvas.width() && (y as u32) < canvas.height()
                    {
                        canvas.put_pixel(x as u32, y as u32, color);
                    }
                }
            }
        }
    }
}

/// A generator over three mock faces with a seeded rng and default settings.
pub fn mono_generator(seed: u64) -> QuoteGenerator<StdRng> {
    let faces: Vec<Arc<dyn Face>> = ["alpha", "beta", "gamma"]
        .iter()
        .map(|n| Arc::new(MonoFace::named(n)) as Arc<dyn Face>)
        .collect();
    let catalog = FontCatalog::from_faces(faces, None).unwrap();
    QuoteGenerator::new(
        CanvasSpec::default(),
        FitConfig::default(),
        catalog,
        StdRng::seed_from_u64(seed),
    )
}

/// Bounding box `(min_x, min_y, max_x, max_y)` of pixels differing from `background`.
pub fn ink_bounds(img: &RgbImage, background: Rgb<u8>) -> Option<(u32, u32, u32, u32)> {
    img.enumerate_pixels()
        .filter(|(_, _, p)| **p != background)
        .fold(None, |acc, (x, y, _)| match acc {
            None => Some((x, y, x, y)),
            Some((x0, y0, x1, y1)) => Some((x0.min(x), y0.min(y), x1.max(x), y1.max(y))),
        })
}

/// Sorted names of the `.png` files in `dir` (empty if it doesn't exist).
pub fn png_files(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|n| n.ends_with(".png"))
        .collect();
    names.sort();
    names
}
