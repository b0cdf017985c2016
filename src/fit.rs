//! Text fitting: the largest font size whose greedy wrap fits the canvas.
//!
//! Glyph metrics depend on the face, so sizes are tried empirically from
//! `fit.max_size` down to `fit.min_size` in `fit.step` decrements. At each size
//! the quote is wrapped greedily and the block is measured:
//!
//! ```text
//! height = lines × line_height × line_spacing
//!        + 2 × speaker_line_height            (only with a speaker)
//! fits   = height ≤ content_height  &&  widest line ≤ content_width
//! ```
//!
//! The first size that fits wins, so the result always carries the largest
//! fitting size. A word wider than the content box sits alone on its line and
//! forces a smaller size; if even `min_size` overflows, the quote is rejected
//! with [`FitError::TextDoesNotFit`].

use crate::canvas::CanvasSpec;
use crate::config::FitConfig;
use crate::fonts::Face;
use crate::record::Quote;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FitError {
    #[error("Text does not fit the canvas even at {min_size}px")]
    TextDoesNotFit { min_size: u32 },
}

/// Layout chosen for one quote.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    /// Quote font size in pixels.
    pub font_size: u32,
    /// Wrapped quote lines, top to bottom.
    pub lines: Vec<String>,
    /// Attribution line (`— Speaker`), if any.
    pub speaker_line: Option<String>,
    /// Speaker font size in pixels.
    pub speaker_size: u32,
    /// Distance between quote baselines (spacing included).
    pub line_height: f32,
    /// Face height of the speaker line.
    pub speaker_line_height: f32,
    /// Height of the whole block, rounded up.
    pub total_height: u32,
    /// Width of the widest line (speaker line included), rounded up.
    pub max_line_width: u32,
}

/// Speaker size for a given quote size: `max(speaker_min_size, size × ratio)`,
/// never larger than the quote itself.
pub fn speaker_size(size: u32, settings: &FitConfig) -> u32 {
    let scaled = (size as f32 * settings.speaker_ratio).round() as u32;
    scaled.max(settings.speaker_min_size).min(size)
}

/// Greedily wrap `text` so each line measures at most `max_width`.
///
/// Paragraphs (split on `\n`) always start a new line; a blank paragraph gives
/// an empty line. A single word wider than `max_width` is kept whole on its own
/// line.
pub fn wrap_text(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if measure(&candidate) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            }
        }
        lines.push(current);
    }

    lines
}

/// Find the largest font size at which `quote` fits `canvas`.
pub fn fit(
    quote: &Quote,
    canvas: &CanvasSpec,
    face: &dyn Face,
    speaker_face: &dyn Face,
    settings: &FitConfig,
) -> Result<FitResult, FitError> {
    let text = quote.display_text();
    let speaker_line = quote.speaker.as_ref().map(|s| format!("— {s}"));
    let max_width = canvas.content_width() as f32;
    let max_height = canvas.content_height() as f32;

    let mut size = settings.max_size;
    while size >= settings.min_size && size > 0 {
        let px = size as f32;
        let lines = wrap_text(&text, max_width, |s| face.text_width(s, px));
        let line_height = face.line_height(px) * settings.line_spacing;

        let mut height = lines.len() as f32 * line_height;
        let mut widest = lines
            .iter()
            .map(|l| face.text_width(l, px))
            .fold(0.0_f32, f32::max);

        let s_size = speaker_size(size, settings);
        let speaker_line_height = speaker_face.line_height(s_size as f32);
        if let Some(line) = &speaker_line {
            height += speaker_line_height * 2.0;
            widest = widest.max(speaker_face.text_width(line, s_size as f32));
        }

        if height <= max_height && widest <= max_width {
            log::debug!("fit {} line(s) at {size}px", lines.len());
            return Ok(FitResult {
                font_size: size,
                lines,
                speaker_line,
                speaker_size: s_size,
                line_height,
                speaker_line_height,
                total_height: height.ceil() as u32,
                max_line_width: widest.ceil() as u32,
            });
        }

        match size.checked_sub(settings.step) {
            Some(next) if settings.step > 0 => size = next,
            _ => break,
        }
    }

    Err(FitError::TextDoesNotFit {
        min_size: settings.min_size,
    })
}
