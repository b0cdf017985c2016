//! Fixed output canvas: dimensions, margins, colors.

use crate::config::{CanvasConfig, ConfigError, parse_color};
use image::Rgb;

/// Output raster and styling constants, fixed for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSpec {
    pub width: u32,
    pub height: u32,
    pub margin_x: u32,
    pub margin_y: u32,
    pub background: Rgb<u8>,
    pub foreground: Rgb<u8>,
}

impl CanvasSpec {
    /// Build from config values, parsing the colors.
    pub fn from_config(config: &CanvasConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            width: config.width,
            height: config.height,
            margin_x: config.margin_x,
            margin_y: config.margin_y,
            background: parse_color(&config.background)?,
            foreground: parse_color(&config.foreground)?,
        })
    }

    /// Width available to text: `width − 2·margin_x`.
    pub fn content_width(&self) -> u32 {
        self.width.saturating_sub(2 * self.margin_x)
    }

    /// Height available to text: `height − 2·margin_y`.
    pub fn content_height(&self) -> u32 {
        self.height.saturating_sub(2 * self.margin_y)
    }
}

impl Default for CanvasSpec {
    /// 800×600, black on white, 2 % / 5 % margins.
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            margin_x: 16,
            margin_y: 30,
            background: Rgb([255, 255, 255]),
            foreground: Rgb([0, 0, 0]),
        }
    }
}
