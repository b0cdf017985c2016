//! Run configuration.
//!
//! Handles loading, validating, and merging `quote-paper.toml`. Stock defaults
//! are serialized to a TOML table and the user's file is merged on top of it,
//! so a config file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [canvas]
//! width = 800
//! height = 600
//! margin_x = 16             # Left/right margin in pixels
//! margin_y = 30             # Top/bottom margin in pixels
//! background = "#ffffff"
//! foreground = "#000000"
//!
//! [fit]
//! max_size = 120            # Largest quote size tried (px)
//! min_size = 20             # Smallest quote size before giving up (px)
//! step = 2                  # Shrink step between attempts (px)
//! line_spacing = 1.3        # Line height multiplier
//! speaker_ratio = 0.4       # Speaker size relative to the quote size
//! speaker_min_size = 14     # Speaker size floor (px)
//!
//! [fonts]
//! dir = "fonts/ttf"
//! families = []             # Restrict to these file stems (empty = all)
//! fallback_names = ["DejaVuSans", "LiberationSans-Regular", "Ubuntu-R"]
//! system_dirs = ["/usr/share/fonts/truetype/dejavu", ...]
//! speaker_font = "DejaVuSans"
//!
//! [paths]
//! data_dir = "data"
//! output_dir = "output"
//!
//! [csv]
//! has_header = true
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use image::Rgb;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the project config, also used as the project root marker.
pub const CONFIG_FILE: &str = "quote-paper.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `quote-paper.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuoteConfig {
    /// Output raster size, margins and colors.
    pub canvas: CanvasConfig,
    /// Font size search settings.
    pub fit: FitConfig,
    /// Font discovery settings.
    pub fonts: FontsConfig,
    /// Input and output directories.
    pub paths: PathsConfig,
    /// CSV dialect settings.
    pub csv: CsvConfig,
}

impl QuoteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.canvas;
        if c.width == 0 || c.height == 0 {
            return Err(ConfigError::Validation(
                "canvas.width and canvas.height must be non-zero".into(),
            ));
        }
        if 2 * c.margin_x >= c.width || 2 * c.margin_y >= c.height {
            return Err(ConfigError::Validation(
                "canvas margins leave no room for text".into(),
            ));
        }
        parse_color(&c.background)?;
        parse_color(&c.foreground)?;

        let f = &self.fit;
        if f.min_size == 0 || f.min_size > f.max_size {
            return Err(ConfigError::Validation(
                "fit.min_size must be between 1 and fit.max_size".into(),
            ));
        }
        if f.step == 0 {
            return Err(ConfigError::Validation("fit.step must be non-zero".into()));
        }
        if !(f.line_spacing > 0.0) {
            return Err(ConfigError::Validation(
                "fit.line_spacing must be positive".into(),
            ));
        }
        if !(f.speaker_ratio > 0.0) {
            return Err(ConfigError::Validation(
                "fit.speaker_ratio must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Canvas dimensions and colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    /// Horizontal margin on each side, in pixels.
    pub margin_x: u32,
    /// Vertical margin on each side, in pixels.
    pub margin_y: u32,
    /// Background color as `#rrggbb`.
    pub background: String,
    /// Text color as `#rrggbb`.
    pub foreground: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            margin_x: 16,
            margin_y: 30,
            background: "#ffffff".to_string(),
            foreground: "#000000".to_string(),
        }
    }
}

/// Font size search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FitConfig {
    pub max_size: u32,
    pub min_size: u32,
    pub step: u32,
    /// Multiplier applied to the face's ascent-to-descent height.
    pub line_spacing: f32,
    pub speaker_ratio: f32,
    pub speaker_min_size: u32,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_size: 120,
            min_size: 20,
            step: 2,
            line_spacing: 1.3,
            speaker_ratio: 0.4,
            speaker_min_size: 14,
        }
    }
}

/// Font discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontsConfig {
    /// Directory scanned for quote faces, relative to the project root.
    pub dir: PathBuf,
    /// When non-empty, only font files whose stem is listed are used.
    pub families: Vec<String>,
    /// Faces looked up in `system_dirs` when `dir` yields nothing.
    pub fallback_names: Vec<String>,
    pub system_dirs: Vec<PathBuf>,
    /// Face used for the speaker line.
    pub speaker_font: String,
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("fonts/ttf"),
            families: Vec::new(),
            fallback_names: vec![
                "DejaVuSans".to_string(),
                "LiberationSans-Regular".to_string(),
                "Ubuntu-R".to_string(),
            ],
            system_dirs: vec![
                PathBuf::from("/usr/share/fonts/truetype/dejavu"),
                PathBuf::from("/usr/share/fonts/truetype/liberation"),
                PathBuf::from("/usr/share/fonts/truetype/ubuntu"),
            ],
            speaker_font: "DejaVuSans".to_string(),
        }
    }
}

/// Input and output directories, relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CsvConfig {
    /// Skip the first row of every CSV file.
    pub has_header: bool,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self { has_header: true }
    }
}

/// Parse a `#rrggbb` color.
pub fn parse_color(value: &str) -> Result<Rgb<u8>, ConfigError> {
    let hex = value.trim().trim_start_matches('#');
    let invalid = || ConfigError::Validation(format!("invalid color: {value}"));
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(QuoteConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `quote-paper.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load the config for a project root: stock defaults, user overrides, validation.
pub fn load_config(root: &Path) -> Result<QuoteConfig, ConfigError> {
    let merged = match load_raw_config(root)? {
        Some(overlay) => merge_toml(stock_defaults_value()?, overlay),
        None => stock_defaults_value()?,
    };
    let config: QuoteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Walk up from `start` looking for a directory containing `quote-paper.toml`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_FILE).is_file())
        .map(Path::to_path_buf)
}

/// Returns a fully-commented stock `quote-paper.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# quote-paper configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Canvas
# ---------------------------------------------------------------------------
[canvas]
width = 800
height = 600
# Margins on each side, in pixels. Text never enters the margins.
margin_x = 16
margin_y = 30
background = "#ffffff"
foreground = "#000000"

# ---------------------------------------------------------------------------
# Fitting: the largest size whose wrapped text fits the canvas wins.
# ---------------------------------------------------------------------------
[fit]
max_size = 120
min_size = 20
step = 2
line_spacing = 1.3
# Speaker line size = max(speaker_min_size, quote size * speaker_ratio)
speaker_ratio = 0.4
speaker_min_size = 14

# ---------------------------------------------------------------------------
# Fonts: one face is picked at random per quote.
# ---------------------------------------------------------------------------
[fonts]
dir = "fonts/ttf"
# Only use these file stems from `dir` (empty = every .ttf/.otf found).
families = []
# Used when `dir` has no usable font.
fallback_names = ["DejaVuSans", "LiberationSans-Regular", "Ubuntu-R"]
system_dirs = [
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/truetype/ubuntu",
]
speaker_font = "DejaVuSans"

# ---------------------------------------------------------------------------
# Paths (relative to the project root)
# ---------------------------------------------------------------------------
[paths]
data_dir = "data"
output_dir = "output"

[csv]
# Skip the first row of every CSV file.
has_header = true
"##
}
