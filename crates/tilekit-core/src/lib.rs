//! Core library for working with grid tilesets.
//!
//! - Layout: tile positions, canvas sizes and grid inference from margin/spacing (`GridLayout`)
//! - Dedup: symmetry-aware unique-tile detection with frequency ranking (`TileDeduplicator`)
//! - Extrusion: edge/corner pixel replication around tiles (`extrude_tile`)
//! - Pipelines: `read_tileset`, `respace`, `extrude_tileset`, `parse_tiles`
//!
//! Quick example:
//! ```ignore
//! use std::path::Path;
//! use tilekit_core::prelude::*;
//! # fn main() -> anyhow::Result<()> {
//! let img = open_raster(Path::new("level.png"))?;
//! let out = parse_tiles(
//!     &img,
//!     &ScanConfig::square(16),
//!     &DedupOptions::with_transforms(),
//!     &TilingConfig::default(),
//! )?;
//! println!("{} unique tiles", out.records.len());
//! save_raster(&out.image, Path::new("tileset.png"))?;
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod dedup;
pub mod error;
pub mod export;
pub mod extrude;
pub mod io;
pub mod layout;
pub mod model;
pub mod pipeline;
pub mod symmetry;

pub use config::*;
pub use dedup::*;
pub use error::*;
pub use export::*;
pub use extrude::*;
pub use io::*;
pub use layout::*;
pub use model::*;
pub use pipeline::*;
pub use symmetry::*;

/// Convenience prelude for common types and functions.
/// Importing `tilekit_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::compositing::BlitMode;
    pub use crate::config::{DedupOptions, ScanConfig, TilingConfig, TilingConfigBuilder};
    pub use crate::dedup::{
        DedupOutput, TileDeduplicator, content_hash, crop_grid, crop_tiles, pack_records,
    };
    pub use crate::error::{Result, TilesetError};
    pub use crate::layout::GridLayout;
    pub use crate::model::{ContentHash, CroppedTile, DedupStats, Rect, TileLocation, TileRecord};
    pub use crate::symmetry::{Flip, Rotation, Symmetry};
    pub use crate::{
        ExtrudeOutput, ParseOutput, Tileset, extrude_tile, extrude_tileset, open_raster,
        parse_tiles, read_tileset, respace, save_raster,
    };
}
