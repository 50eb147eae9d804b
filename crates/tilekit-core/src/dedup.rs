//! Tile deduplication.
//!
//! Tiles are visited column by column (outer loop over columns, inner loop
//! over rows). That order decides which occurrence becomes a record's
//! representative and how records with equal counts are ordered, so every
//! cropping helper here produces tiles in that order.

use std::collections::HashMap;

use image::{RgbaImage, imageops};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::compositing::BlitMode;
use crate::config::{DedupOptions, ScanConfig, TilingConfig};
use crate::error::Result;
use crate::layout::GridLayout;
use crate::model::{ContentHash, CroppedTile, DedupStats, TileLocation, TileRecord};
use crate::symmetry::Symmetry;

/// Digest of the tile's pixels as contiguous row-major RGBA bytes.
pub fn content_hash(tile: &RgbaImage) -> ContentHash {
    let digest = Sha256::digest(tile.as_raw().as_slice());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    ContentHash(bytes)
}

/// Cut whole tiles out of `img` starting at the scan offset.
///
/// Partial tiles at the right and bottom edges are ignored.
pub fn crop_tiles(img: &RgbaImage, scan: &ScanConfig) -> Vec<CroppedTile> {
    let (w, h) = img.dimensions();
    let columns = w.saturating_sub(scan.x_offset) / scan.tile_width.max(1);
    let rows = h.saturating_sub(scan.y_offset) / scan.tile_height.max(1);

    let mut crops = Vec::with_capacity((columns * rows) as usize);
    for column in 0..columns {
        for row in 0..rows {
            let x = column * scan.tile_width + scan.x_offset;
            let y = row * scan.tile_height + scan.y_offset;
            let image = imageops::crop_imm(img, x, y, scan.tile_width, scan.tile_height).to_image();
            crops.push(CroppedTile {
                location: TileLocation { row, column, x, y },
                image,
            });
        }
    }
    crops
}

/// Cut the tiles of a packed tileset, inferring its grid from the image size.
pub fn crop_grid(img: &RgbaImage, cfg: &TilingConfig) -> Result<Vec<CroppedTile>> {
    let layout = GridLayout::new(cfg);
    let (rows, columns) = layout.infer_grid(img.width(), img.height())?;
    Ok(crop_cells(img, &layout, rows, columns, CellOrder::ColumnMajor))
}

/// Visiting order of grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CellOrder {
    ColumnMajor,
    RowMajor,
}

/// Crop every cell of a `rows x columns` grid laid out by `layout`.
pub(crate) fn crop_cells(
    img: &RgbaImage,
    layout: &GridLayout,
    rows: u32,
    columns: u32,
    order: CellOrder,
) -> Vec<CroppedTile> {
    let cells: Vec<(u32, u32)> = match order {
        CellOrder::ColumnMajor => (0..columns)
            .flat_map(|column| (0..rows).map(move |row| (row, column)))
            .collect(),
        CellOrder::RowMajor => (0..rows)
            .flat_map(|row| (0..columns).map(move |column| (row, column)))
            .collect(),
    };
    cells
        .into_iter()
        .map(|(row, column)| {
            let r = layout.tile_rect(row, column);
            CroppedTile {
                location: TileLocation {
                    row,
                    column,
                    x: r.x,
                    y: r.y,
                },
                image: imageops::crop_imm(img, r.x, r.y, r.w, r.h).to_image(),
            }
        })
        .collect()
}

/// Result of a deduplication pass: records by descending count, plus counters.
#[derive(Debug, Clone, Default)]
pub struct DedupOutput {
    pub records: Vec<TileRecord>,
    pub stats: DedupStats,
}

/// Digests of one tile: its own, and those of its transformed variants that differ from it.
struct TileHashes {
    base: ContentHash,
    variants: Vec<(Symmetry, ContentHash)>,
}

/// Groups tiles that are identical, optionally up to flips and rotations.
#[derive(Debug, Clone, Default)]
pub struct TileDeduplicator {
    options: DedupOptions,
}

impl TileDeduplicator {
    pub fn new(options: DedupOptions) -> Self {
        Self { options }
    }

    fn hash_tile(&self, tile: &RgbaImage) -> TileHashes {
        let base = content_hash(tile);
        let mut variants = Vec::new();
        if self.options.transform_search {
            let square = tile.width() == tile.height();
            for &sym in self.options.transforms.iter().filter(|s| !s.is_identity()) {
                // a quarter turn of a non-square tile cannot match a tile of the same shape
                if sym.swaps_axes() && !square {
                    continue;
                }
                let hash = content_hash(&sym.apply(tile));
                // A tile symmetric under `sym` is already covered by its base hash.
                if hash != base {
                    variants.push((sym, hash));
                }
            }
        }
        TileHashes { base, variants }
    }

    #[instrument(skip_all, fields(tiles = tiles.len(), transforms = self.options.transform_search))]
    /// Collapses `tiles` (in scan order) into unique records.
    ///
    /// Notes:
    /// - A transformed match takes precedence over an exact one; the first
    ///   transform in the configured order that hits a record wins.
    /// - The representative of a record is always the base orientation of
    ///   its first occurrence.
    /// - Records are sorted by count, descending; the sort is stable, so ties
    ///   keep first-seen order.
    pub fn deduplicate(&self, tiles: &[CroppedTile]) -> DedupOutput {
        #[cfg(feature = "parallel")]
        let hashed: Vec<TileHashes> = tiles.par_iter().map(|t| self.hash_tile(&t.image)).collect();
        #[cfg(not(feature = "parallel"))]
        let hashed: Vec<TileHashes> = tiles.iter().map(|t| self.hash_tile(&t.image)).collect();

        let mut records: Vec<TileRecord> = Vec::new();
        let mut lookup: HashMap<ContentHash, usize> = HashMap::new();
        let mut stats = DedupStats {
            total_tiles: tiles.len(),
            ..Default::default()
        };

        for (tile, hashes) in tiles.iter().zip(hashed) {
            let transformed_hit = hashes
                .variants
                .iter()
                .find_map(|(sym, hash)| lookup.get(hash).map(|&idx| (*sym, idx)));
            if let Some((sym, idx)) = transformed_hit {
                trace!(location = %tile.location, transform = %sym, record = idx, "transformed match");
                let rec = &mut records[idx];
                rec.count += 1;
                rec.transformed = true;
                stats.transformed_matches += 1;
                continue;
            }

            match lookup.get(&hashes.base) {
                Some(&idx) => {
                    records[idx].count += 1;
                    stats.exact_matches += 1;
                }
                None => {
                    debug!(location = %tile.location, hash = %hashes.base, "new unique tile");
                    lookup.insert(hashes.base, records.len());
                    records.push(TileRecord {
                        content_hash: hashes.base,
                        image: tile.image.clone(),
                        count: 1,
                        first_location: tile.location,
                        transformed: false,
                    });
                }
            }
        }

        // stable: equal counts keep registration order
        records.sort_by(|a, b| b.count.cmp(&a.count));
        stats.unique_tiles = records.len();
        DedupOutput { records, stats }
    }
}

/// Pack one representative per record, in record order, row-major on a canvas
/// described by `cfg`.
pub fn pack_records(records: &[TileRecord], cfg: &TilingConfig) -> Result<RgbaImage> {
    crate::pipeline::pack_tiles(records.iter().map(|r| &r.image), cfg, BlitMode::Replace)
}
