//! Output filename conventions.
//!
//! Batch output is numbered per CSV file; ad-hoc output is named after the
//! quote itself:
//!
//! - `data/stoics.csv`, 3rd image → `stoics_quote_003.png`
//! - ad-hoc `"Know thyself."` → `adhoc_Know_thyself.png`
//!
//! Ad-hoc names never overwrite: an existing file gets a `_2`, `_3`, …
//! suffix via [`unique_path`].

use std::path::{Path, PathBuf};

/// Number of quote characters that go into an ad-hoc slug.
const SLUG_CHARS: usize = 20;

/// Filename for the `index`-th (1-based) image generated from a CSV file.
pub fn batch_filename(csv_stem: &str, index: usize) -> String {
    format!("{csv_stem}_quote_{index:03}.png")
}

/// Slug from the start of a quote: non-alphanumerics become `_`, edge
/// underscores are trimmed, and an empty result becomes `quote`.
pub fn slug(text: &str) -> String {
    let raw: String = text
        .chars()
        .take(SLUG_CHARS)
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    let trimmed = raw.trim_matches('_');
    if trimmed.is_empty() {
        "quote".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Filename for an ad-hoc quote image.
pub fn adhoc_filename(text: &str) -> String {
    format!("adhoc_{}.png", slug(text))
}

/// `dir/name`, or `dir/{stem}_{n}.{ext}` with the first free `n ≥ 2` if taken.
pub fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (name, None),
    };
    (2..)
        .map(|n| match ext {
            Some(ext) => dir.join(format!("{stem}_{n}.{ext}")),
            None => dir.join(format!("{stem}_{n}")),
        })
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}
