//! Grid geometry: tile origins, canvas sizes and grid inference.
//!
//! A packed canvas of `rows x columns` tiles measures
//! `columns*(tile_width+spacing) - spacing + 2*margin` pixels across, and the
//! same with rows/tile_height vertically. Everything here is derived from that
//! one relation; no pixel data is touched.

use crate::config::TilingConfig;
use crate::error::{Axis, Result, TilesetError};
use crate::model::Rect;

/// Pure geometry derived from a [`TilingConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub tile_width: u32,
    pub tile_height: u32,
    pub margin: u32,
    pub spacing: u32,
}

impl GridLayout {
    pub fn new(cfg: &TilingConfig) -> Self {
        Self {
            tile_width: cfg.tile_width,
            tile_height: cfg.tile_height,
            margin: cfg.margin,
            spacing: cfg.spacing,
        }
    }

    /// Top-left pixel of the tile at (`row`, `column`).
    pub fn tile_position(&self, row: u32, column: u32) -> (u32, u32) {
        let x = column * (self.tile_width + self.spacing) + self.margin;
        let y = row * (self.tile_height + self.spacing) + self.margin;
        (x, y)
    }

    /// Pixel rectangle covered by the tile at (`row`, `column`).
    pub fn tile_rect(&self, row: u32, column: u32) -> Rect {
        let (x, y) = self.tile_position(row, column);
        Rect::new(x, y, self.tile_width, self.tile_height)
    }

    /// Rows needed to hold `tile_count` tiles at `columns` per row.
    pub fn rows_for(tile_count: usize, columns: u32) -> u32 {
        if columns == 0 {
            return 0;
        }
        tile_count.div_ceil(columns as usize) as u32
    }

    /// Canvas size for `tile_count` tiles packed `columns` wide.
    ///
    /// Zero tiles has no meaningful canvas (the formula would give
    /// `2*margin - spacing`), so it is reported as [`TilesetError::EmptyTileSet`].
    pub fn canvas_dimensions(&self, tile_count: usize, columns: u32) -> Result<(u32, u32)> {
        if columns == 0 {
            return Err(TilesetError::InvalidConfig(
                "columns must be at least 1".into(),
            ));
        }
        if tile_count == 0 {
            return Err(TilesetError::EmptyTileSet);
        }
        let rows = Self::rows_for(tile_count, columns);
        let width = span(columns, self.tile_width, self.spacing, self.margin);
        let height = span(rows, self.tile_height, self.spacing, self.margin);
        match (u32::try_from(width), u32::try_from(height)) {
            (Ok(w), Ok(h)) => Ok((w, h)),
            _ => Err(TilesetError::InvalidConfig(format!(
                "canvas of {columns}x{rows} tiles is too large ({width}x{height} pixels)"
            ))),
        }
    }

    /// Solves the canvas relation for `(rows, columns)` given an image size.
    ///
    /// Only exact solutions are accepted: any remainder means the margin,
    /// spacing or tile size does not describe this image.
    pub fn infer_grid(&self, image_width: u32, image_height: u32) -> Result<(u32, u32)> {
        let columns = self.infer_count(Axis::Width, image_width, self.tile_width)?;
        let rows = self.infer_count(Axis::Height, image_height, self.tile_height)?;
        Ok((rows, columns))
    }

    fn infer_count(&self, axis: Axis, dimension: u32, tile_size: u32) -> Result<u32> {
        let tileable = dimension as i64 + self.spacing as i64 - 2 * self.margin as i64;
        let unit = tile_size as i64 + self.spacing as i64;
        if unit == 0 || tileable < 0 || tileable % unit != 0 {
            return Err(TilesetError::GeometryMismatch {
                axis,
                dimension,
                tile_size,
                margin: self.margin,
                spacing: self.spacing,
                divisor: unit as u32,
            });
        }
        Ok((tileable / unit) as u32)
    }
}

fn span(count: u32, tile: u32, spacing: u32, margin: u32) -> i64 {
    count as i64 * (tile as i64 + spacing as i64) - spacing as i64 + 2 * margin as i64
}
