//! Font discovery, selection, and the [`Face`] measurement/drawing seam.
//!
//! The [`Face`] trait is everything the fitter and renderer need from a font:
//! measure a line, report a line height, draw a line. The production
//! implementation is [`FontHandle`] (rusttype); tests use a fixed-advance
//! mock so layouts are exact without shipping font files.
//!
//! ## Discovery order
//!
//! 1. Every `.ttf`/`.otf` in `fonts.dir` (filtered by `fonts.families` when set)
//! 2. `fonts.fallback_names` looked up in `fonts.system_dirs`
//! 3. Nothing usable → [`FontError::NoFontAvailable`], fatal for the run
//!
//! One face is picked uniformly at random per quote with a caller-supplied
//! [`Rng`], so seeded runs are reproducible.

use crate::config::FontsConfig;
use image::{Rgb, RgbImage};
use rand::Rng;
use rusttype::{Font, Scale, point};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum FontError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Not a usable font file: {0}")]
    Unloadable(PathBuf),
    #[error("No font available: nothing usable in {dir} and no fallback font found")]
    NoFontAvailable { dir: PathBuf },
    #[error("Font catalog needs at least one face")]
    EmptyCatalog,
}

/// A typeface usable at any pixel size.
pub trait Face: Send + Sync {
    /// Identifier of the face (file stem for loaded fonts).
    fn name(&self) -> &str;

    /// Advance width of `text` at `size` pixels.
    fn text_width(&self, text: &str, size: f32) -> f32;

    /// Ascent-to-descent height at `size` pixels.
    fn line_height(&self, size: f32) -> f32;

    /// Draw `text` with its top-left corner at `origin`.
    fn draw(&self, canvas: &mut RgbImage, text: &str, size: f32, origin: (i32, i32), color: Rgb<u8>);
}

/// A font file loaded with rusttype.
pub struct FontHandle {
    name: String,
    font: Font<'static>,
}

impl FontHandle {
    /// Load a TrueType/OpenType font from disk.
    pub fn load(path: &Path) -> Result<Self, FontError> {
        let bytes = std::fs::read(path)?;
        let font =
            Font::try_from_vec(bytes).ok_or_else(|| FontError::Unloadable(path.to_path_buf()))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self { name, font })
    }
}

impl Face for FontHandle {
    fn name(&self) -> &str {
        &self.name
    }

    fn text_width(&self, text: &str, size: f32) -> f32 {
        let scale = Scale::uniform(size);
        self.font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }

    fn line_height(&self, size: f32) -> f32 {
        let v = self.font.v_metrics(Scale::uniform(size));
        v.ascent - v.descent
    }

    fn draw(&self, canvas: &mut RgbImage, text: &str, size: f32, origin: (i32, i32), color: Rgb<u8>) {
        let scale = Scale::uniform(size);
        let ascent = self.font.v_metrics(scale).ascent;
        let start = point(origin.0 as f32, origin.1 as f32 + ascent);

        for glyph in self.font.layout(text, scale, start) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = gx as i32 + bb.min.x;
                let py = gy as i32 + bb.min.y;
                if px < 0 || py < 0 || px as u32 >= canvas.width() || py as u32 >= canvas.height()
                {
                    return;
                }
                let dst = canvas.get_pixel_mut(px as u32, py as u32);
                *dst = blend(*dst, color, coverage);
            });
        }
    }
}

/// Alpha-blend `color` over `dst` with the given coverage (0.0–1.0).
pub(crate) fn blend(dst: Rgb<u8>, color: Rgb<u8>, coverage: f32) -> Rgb<u8> {
    let a = coverage.clamp(0.0, 1.0);
    let mix = |s: u8, d: u8| (s as f32 * a + d as f32 * (1.0 - a)).round() as u8;
    Rgb([
        mix(color.0[0], dst.0[0]),
        mix(color.0[1], dst.0[1]),
        mix(color.0[2], dst.0[2]),
    ])
}

/// The set of faces available for a run, plus the speaker face.
pub struct FontCatalog {
    /// Sorted by name, never empty.
    faces: Vec<Arc<dyn Face>>,
    speaker: Option<Arc<dyn Face>>,
}

impl std::fmt::Debug for FontCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontCatalog")
            .field("faces", &self.names())
            .field("speaker", &self.speaker.as_ref().map(|s| s.name().to_string()))
            .finish()
    }
}

impl FontCatalog {
    /// Build a catalog from already-loaded faces.
    ///
    /// Fails with [`FontError::EmptyCatalog`] when `faces` is empty.
    pub fn from_faces(
        faces: Vec<Arc<dyn Face>>,
        speaker: Option<Arc<dyn Face>>,
    ) -> Result<Self, FontError> {
        if faces.is_empty() {
            return Err(FontError::EmptyCatalog);
        }
        let by_name: BTreeMap<String, Arc<dyn Face>> = faces
            .into_iter()
            .map(|f| (f.name().to_string(), f))
            .collect();
        Ok(Self {
            faces: by_name.into_values().collect(),
            speaker,
        })
    }

    /// Discover faces per `config`, resolving `config.dir` against `root`.
    pub fn discover(config: &FontsConfig, root: &Path) -> Result<Self, FontError> {
        let dir = root.join(&config.dir);
        let mut faces: BTreeMap<String, Arc<dyn Face>> = BTreeMap::new();

        for path in font_files(&dir) {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            if !config.families.is_empty() && !config.families.contains(&stem) {
                continue;
            }
            match FontHandle::load(&path) {
                Ok(handle) => {
                    faces
                        .entry(stem)
                        .or_insert_with(|| Arc::new(handle) as Arc<dyn Face>);
                }
                Err(e) => log::warn!("skipping font {}: {e}", path.display()),
            }
        }

        if faces.is_empty() {
            log::warn!(
                "no usable fonts in {}, falling back to system fonts",
                dir.display()
            );
            for name in &config.fallback_names {
                if let Some(handle) = find_named(name, &config.system_dirs) {
                    faces.insert(name.clone(), Arc::new(handle));
                }
            }
        }

        if faces.is_empty() {
            return Err(FontError::NoFontAvailable { dir });
        }
        log::info!("loaded {} font(s)", faces.len());

        let mut search = vec![dir];
        search.extend(config.system_dirs.iter().cloned());
        let speaker = find_named(&config.speaker_font, &search).map(|h| Arc::new(h) as Arc<dyn Face>);
        if speaker.is_none() {
            log::warn!(
                "speaker font {} not found, using the quote face",
                config.speaker_font
            );
        }

        Ok(Self {
            faces: faces.into_values().collect(),
            speaker,
        })
    }

    /// Pick one face uniformly at random.
    pub fn pick(&self, rng: &mut impl Rng) -> Arc<dyn Face> {
        let index = rng.gen_range(0..self.faces.len());
        Arc::clone(&self.faces[index])
    }

    /// Face for the speaker line, falling back to `quote_face`.
    pub fn speaker_face(&self, quote_face: &Arc<dyn Face>) -> Arc<dyn Face> {
        self.speaker.clone().unwrap_or_else(|| Arc::clone(quote_face))
    }

    /// Identifiers of every face in the catalog, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.faces.iter().map(|f| f.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"))
}

/// Font files under `dir`, sorted by path. A missing directory yields nothing.
fn font_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(2)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && is_font_file(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Find `<name>.ttf` / `.TTF` / `.otf` in the first directory that has a loadable one.
fn find_named(name: &str, dirs: &[PathBuf]) -> Option<FontHandle> {
    dirs.iter()
        .flat_map(|dir| {
            ["ttf", "TTF", "otf"]
                .into_iter()
                .map(move |ext| dir.join(format!("{name}.{ext}")))
        })
        .filter(|p| p.is_file())
        .find_map(|p| match FontHandle::load(&p) {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("skipping font {}: {e}", p.display());
                None
            }
        })
}
