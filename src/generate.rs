//! Quote image generation: CSV folders, single CSV files, and ad-hoc quotes.
//!
//! [`QuoteGenerator`] wires the pipeline for one quote:
//!
//! ```text
//! Quote → pick face (rng) → fit → render → PNG → atomic write
//! ```
//!
//! Batch entry points never abort on a bad item. Malformed rows, quotes that
//! don't fit, and failed writes are logged and recorded as skips; only a
//! missing data directory (or an unreadable config/font setup, earlier) stops
//! the run. Of several CSV files sharing a stem (`quotes.csv`, `quotes.CSV`)
//! only the first is processed, so no run overwrites its own images.
//!
//! ## Output Structure
//!
//! ```text
//! output/
//! ├── stoics_quote_001.png     # 1st generated image of data/stoics.csv
//! ├── stoics_quote_002.png
//! ├── poets_quote_001.png
//! └── adhoc_Carpe_diem.png     # ad-hoc quote
//! ```

use crate::canvas::CanvasSpec;
use crate::config::{ConfigError, FitConfig, QuoteConfig};
use crate::fit::{FitError, FitResult, fit};
use crate::fonts::{FontCatalog, FontError};
use crate::naming::{adhoc_filename, batch_filename, unique_path};
use crate::record::{Quote, RecordError, parse_csv};
use crate::render::{RenderError, encode_png, render, write_atomic};
use rand::Rng;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Font(#[from] FontError),
    #[error("{0}")]
    Record(#[from] RecordError),
    #[error("{0}")]
    Fit(#[from] FitError),
    #[error("{0}")]
    Render(#[from] RenderError),
    #[error("Data directory not found: {0}")]
    MissingDataDir(PathBuf),
    #[error("Skipping {path}: another CSV file already writes {stem}_quote_*.png")]
    DuplicateStem { path: PathBuf, stem: String },
    #[error("Could not read {path}: {source}")]
    UnreadableCsv {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One successfully written image.
#[derive(Debug, Clone)]
pub struct Generated {
    pub path: PathBuf,
    /// Identifier of the face the quote was set in.
    pub font: String,
    pub layout: FitResult,
}

/// What happened to one CSV row.
#[derive(Debug)]
pub enum ItemOutcome {
    Generated { line: usize, generated: Generated },
    Skipped { line: usize, error: GenerateError },
}

/// Per-file result of a batch.
#[derive(Debug)]
pub struct CsvReport {
    pub source: PathBuf,
    pub items: Vec<ItemOutcome>,
}

impl CsvReport {
    pub fn generated(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i, ItemOutcome::Generated { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.items.len() - self.generated()
    }
}

/// Result of a whole folder run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub output_dir: PathBuf,
    pub reports: Vec<CsvReport>,
    /// CSV files that could not be read at all.
    pub failed_files: Vec<GenerateError>,
}

impl BatchSummary {
    pub fn generated(&self) -> usize {
        self.reports.iter().map(CsvReport::generated).sum()
    }

    pub fn skipped(&self) -> usize {
        self.reports.iter().map(CsvReport::skipped).sum()
    }
}

/// Renders quotes to image files with a fixed canvas and font catalog.
pub struct QuoteGenerator<R: Rng> {
    canvas: CanvasSpec,
    fit_config: FitConfig,
    fonts: FontCatalog,
    rng: R,
}

impl<R: Rng> QuoteGenerator<R> {
    pub fn new(canvas: CanvasSpec, fit_config: FitConfig, fonts: FontCatalog, rng: R) -> Self {
        Self {
            canvas,
            fit_config,
            fonts,
            rng,
        }
    }

    /// Build from config, discovering fonts relative to `root`.
    ///
    /// Fails with [`FontError::NoFontAvailable`] when no face can be loaded.
    pub fn from_config(config: &QuoteConfig, root: &Path, rng: R) -> Result<Self, GenerateError> {
        let canvas = CanvasSpec::from_config(&config.canvas)?;
        let fonts = FontCatalog::discover(&config.fonts, root)?;
        Ok(Self::new(canvas, config.fit.clone(), fonts, rng))
    }

    pub fn fonts(&self) -> &FontCatalog {
        &self.fonts
    }

    /// Fit, render and write one quote to `path`.
    pub fn generate(&mut self, quote: &Quote, path: &Path) -> Result<Generated, GenerateError> {
        let face = self.fonts.pick(&mut self.rng);
        let speaker_face = self.fonts.speaker_face(&face);

        let layout = fit(
            quote,
            &self.canvas,
            face.as_ref(),
            speaker_face.as_ref(),
            &self.fit_config,
        )?;
        let img = render(&layout, &self.canvas, face.as_ref(), speaker_face.as_ref());
        let bytes = encode_png(&img)?;
        write_atomic(path, &bytes)?;

        log::info!(
            "wrote {} ({}, {}px)",
            path.display(),
            face.name(),
            layout.font_size
        );
        Ok(Generated {
            path: path.to_path_buf(),
            font: face.name().to_string(),
            layout,
        })
    }

    /// Generate one image per valid row of a CSV file.
    ///
    /// Images are named `{stem}_quote_{NNN}.png`, numbered by generated image.
    pub fn process_csv(
        &mut self,
        csv_path: &Path,
        output_dir: &Path,
        has_header: bool,
    ) -> Result<CsvReport, GenerateError> {
        let content =
            std::fs::read_to_string(csv_path).map_err(|source| GenerateError::UnreadableCsv {
                path: csv_path.to_path_buf(),
                source,
            })?;
        let stem = csv_stem(csv_path);

        let mut items = Vec::new();
        let mut count = 0;
        for row in parse_csv(&content, has_header) {
            let line = row.line;
            let outcome = row
                .result
                .map_err(GenerateError::from)
                .and_then(|quote| {
                    let path = output_dir.join(batch_filename(&stem, count + 1));
                    self.generate(&quote, &path)
                });
            match outcome {
                Ok(generated) => {
                    count += 1;
                    items.push(ItemOutcome::Generated { line, generated });
                }
                Err(error) => {
                    log::warn!("{}:{line}: skipped: {error}", csv_path.display());
                    items.push(ItemOutcome::Skipped { line, error });
                }
            }
        }

        Ok(CsvReport {
            source: csv_path.to_path_buf(),
            items,
        })
    }

    /// Process every `*.csv` directly inside `data_dir`, in name order.
    pub fn generate_from_folder(
        &mut self,
        data_dir: &Path,
        output_dir: &Path,
        has_header: bool,
    ) -> Result<BatchSummary, GenerateError> {
        if !data_dir.is_dir() {
            return Err(GenerateError::MissingDataDir(data_dir.to_path_buf()));
        }
        std::fs::create_dir_all(output_dir)?;

        let mut summary = BatchSummary {
            output_dir: output_dir.to_path_buf(),
            ..BatchSummary::default()
        };
        let mut stems = HashSet::new();
        for csv in csv_files(data_dir)? {
            let stem = csv_stem(&csv);
            if !stems.insert(stem.to_lowercase()) {
                let e = GenerateError::DuplicateStem { path: csv, stem };
                log::warn!("{e}");
                summary.failed_files.push(e);
                continue;
            }
            match self.process_csv(&csv, output_dir, has_header) {
                Ok(report) => summary.reports.push(report),
                Err(e) => {
                    log::warn!("{e}");
                    summary.failed_files.push(e);
                }
            }
        }
        Ok(summary)
    }

    /// Generate a single ad-hoc quote into `output_dir` without overwriting.
    pub fn generate_adhoc(
        &mut self,
        quote: &Quote,
        output_dir: &Path,
    ) -> Result<Generated, GenerateError> {
        std::fs::create_dir_all(output_dir)?;
        let path = unique_path(output_dir, &adhoc_filename(&quote.text));
        self.generate(quote, &path)
    }
}

/// Prefix of the images generated from `csv_path`.
fn csv_stem(csv_path: &Path) -> String {
    csv_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "quotes".to_string())
}

/// `*.csv` files directly inside `dir`, sorted.
pub fn csv_files(dir: &Path) -> Result<Vec<PathBuf>, GenerateError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if path.is_file() && is_csv {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
