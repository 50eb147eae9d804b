use serde::{Deserialize, Serialize};

use crate::error::{Result, TilesetError};
use crate::symmetry::Symmetry;

/// Largest value accepted for any pixel measurement (tile size, margin, spacing, thickness).
pub const MAX_PIXEL_VALUE: u32 = 65535;

/// Checks that `value` lies in `0..=65535`.
pub fn validate_pixel_value(name: &str, value: u32) -> Result<()> {
    if value > MAX_PIXEL_VALUE {
        return Err(TilesetError::InvalidConfig(format!(
            "{name} ({value}) must be in range [0, {MAX_PIXEL_VALUE}]"
        )));
    }
    Ok(())
}

/// Checks that `value` lies in `1..=65535`.
pub fn validate_positive_pixel_value(name: &str, value: u32) -> Result<()> {
    if value == 0 || value > MAX_PIXEL_VALUE {
        return Err(TilesetError::InvalidConfig(format!(
            "{name} ({value}) must be in range [1, {MAX_PIXEL_VALUE}]"
        )));
    }
    Ok(())
}

/// Geometry of a packed tileset.
/// Key notes:
///   - `margin` surrounds the whole canvas, `spacing` separates adjacent tiles
///   - `columns` is the packing width in tiles when writing; reading infers it
///   - `background` fills every canvas pixel not covered by a tile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TilingConfig {
    /// Tile width in pixels.
    pub tile_width: u32,
    /// Tile height in pixels.
    pub tile_height: u32,
    /// Pixels around the entire canvas.
    #[serde(default)]
    pub margin: u32,
    /// Pixels between adjacent tiles.
    #[serde(default)]
    pub spacing: u32,
    /// Tiles per row when packing.
    #[serde(default = "default_columns")]
    pub columns: u32,
    /// RGBA fill for uncovered canvas pixels.
    #[serde(default = "default_background")]
    pub background: [u8; 4],
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            tile_width: 16,
            tile_height: 16,
            margin: 0,
            spacing: 0,
            columns: default_columns(),
            background: default_background(),
        }
    }
}

impl TilingConfig {
    /// Square tiles of `tile_size` with the given margin and spacing.
    pub fn square(tile_size: u32, margin: u32, spacing: u32) -> Self {
        Self {
            tile_width: tile_size,
            tile_height: tile_size,
            margin,
            spacing,
            ..Default::default()
        }
    }

    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - a tile dimension is outside `[1, 65535]`
    /// - margin or spacing is outside `[0, 65535]`
    /// - `columns` is zero
    pub fn validate(&self) -> Result<()> {
        validate_positive_pixel_value("tile_width", self.tile_width)?;
        validate_positive_pixel_value("tile_height", self.tile_height)?;
        validate_pixel_value("margin", self.margin)?;
        validate_pixel_value("spacing", self.spacing)?;
        if self.columns == 0 {
            return Err(TilesetError::InvalidConfig(
                "columns must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn default_columns() -> u32 {
    10
}
fn default_background() -> [u8; 4] {
    [0, 0, 0, 0]
}

/// Builder for `TilingConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct TilingConfigBuilder {
    cfg: TilingConfig,
}

impl TilingConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: TilingConfig::default(),
        }
    }
    pub fn tile_size(mut self, w: u32, h: u32) -> Self {
        self.cfg.tile_width = w;
        self.cfg.tile_height = h;
        self
    }
    pub fn margin(mut self, v: u32) -> Self {
        self.cfg.margin = v;
        self
    }
    pub fn spacing(mut self, v: u32) -> Self {
        self.cfg.spacing = v;
        self
    }
    pub fn columns(mut self, v: u32) -> Self {
        self.cfg.columns = v;
        self
    }
    pub fn background(mut self, rgba: [u8; 4]) -> Self {
        self.cfg.background = rgba;
        self
    }
    pub fn build(self) -> TilingConfig {
        self.cfg
    }
}

impl TilingConfig {
    /// Create a fluent builder for `TilingConfig`.
    pub fn builder() -> TilingConfigBuilder {
        TilingConfigBuilder::new()
    }
}

/// Cropping geometry for scanning an arbitrary image for tiles.
///
/// Unlike [`TilingConfig`], a scan never requires the image to divide evenly:
/// whole tiles are taken starting at the offset and any remainder is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanConfig {
    pub tile_width: u32,
    pub tile_height: u32,
    #[serde(default)]
    pub x_offset: u32,
    #[serde(default)]
    pub y_offset: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            tile_width: 16,
            tile_height: 16,
            x_offset: 0,
            y_offset: 0,
        }
    }
}

impl ScanConfig {
    pub fn square(tile_size: u32) -> Self {
        Self {
            tile_width: tile_size,
            tile_height: tile_size,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_positive_pixel_value("tile_width", self.tile_width)?;
        validate_positive_pixel_value("tile_height", self.tile_height)?;
        validate_pixel_value("x_offset", self.x_offset)?;
        validate_pixel_value("y_offset", self.y_offset)?;
        Ok(())
    }
}

/// Deduplication switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupOptions {
    /// Match tiles that are equal after a flip and/or rotation.
    pub transform_search: bool,
    /// Transforms tried, in order, when `transform_search` is on.
    /// Identity entries are ignored.
    pub transforms: Vec<Symmetry>,
}

impl Default for DedupOptions {
    fn default() -> Self {
        Self {
            transform_search: false,
            transforms: Symmetry::SEARCH_ORDER.to_vec(),
        }
    }
}

impl DedupOptions {
    /// Exact matching only.
    pub fn exact() -> Self {
        Self::default()
    }

    /// Full search over every non-identity transform in the fixed order.
    pub fn with_transforms() -> Self {
        Self {
            transform_search: true,
            ..Default::default()
        }
    }

    /// Search restricted to `transforms`, tried in the given order.
    pub fn restricted(transforms: Vec<Symmetry>) -> Self {
        Self {
            transform_search: true,
            transforms,
        }
    }
}
