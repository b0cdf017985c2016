//! # quote-paper
//!
//! Renders quotes into fixed-size images for e-reader lock screens. Quotes come
//! from CSV files (`"Quote text", Speaker`) or are typed in ad hoc; every quote
//! becomes one PNG with the text wrapped and sized to fill the canvas.
//!
//! # Pipeline
//!
//! ```text
//! CSV row ─→ record ─→ Quote
//!                        │
//!   fonts (random face) ─┤
//!                        ▼
//!                       fit  ─→ FitResult (size + wrapped lines)
//!                        │
//!                        ▼
//!                     render ─→ PNG, atomic write
//!
//! rotate: output/*.png ─→ 180° in place (independent pass)
//! ```
//!
//! Everything is single-threaded and synchronous. The only state shared across
//! quotes is the read-only font catalog.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`record`] | CSV row splitting and parsing into [`record::Quote`] |
//! | [`fonts`] | Font discovery, random selection, the [`fonts::Face`] seam |
//! | [`fit`] | Greedy wrap + shrink-until-it-fits font sizing |
//! | [`render`] | Rasterization, PNG encoding, atomic file writes |
//! | [`rotate`] | In-place 180° rotation of a directory of images |
//! | [`generate`] | Batch and ad-hoc drivers wiring the pipeline together |
//! | [`canvas`] | Output dimensions, margins and colors |
//! | [`config`] | `quote-paper.toml` loading, merging, validation |
//! | [`naming`] | Output filename conventions |
//! | [`output`] | CLI report formatting |
//!
//! # Failure Policy
//!
//! A bad item never stops a batch: malformed rows, quotes that can't fit, and
//! images that fail to write or decode are logged, counted as skipped, and the
//! run continues. Only setup failures are fatal: an invalid config, no usable
//! font at all, or a missing data directory.

pub mod canvas;
pub mod config;
pub mod fit;
pub mod fonts;
pub mod generate;
pub mod naming;
pub mod output;
pub mod record;
pub mod render;
pub mod rotate;

#[cfg(test)]
pub(crate) mod test_helpers;
