use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
}

/// Where a tile sits in its source image: grid cell and pixel origin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TileLocation {
    pub row: u32,
    pub column: u32,
    pub x: u32,
    pub y: u32,
}

impl fmt::Display for TileLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// SHA-256 digest of a tile's packed RGBA bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash(pub [u8; 32]);

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl Serialize for ContentHash {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

/// A tile cut out of a source image, owning its pixels.
#[derive(Debug, Clone)]
pub struct CroppedTile {
    pub location: TileLocation,
    pub image: RgbaImage,
}

/// One unique tile found by deduplication.
#[derive(Debug, Clone)]
pub struct TileRecord {
    /// Digest of the representative at its base orientation.
    pub content_hash: ContentHash,
    /// Pixels of the first occurrence, never a transformed variant.
    pub image: RgbaImage,
    /// Number of source tiles that collapsed into this record.
    pub count: usize,
    /// Origin of the first occurrence in scan order.
    pub first_location: TileLocation,
    /// True if some occurrence only matched after a flip or rotation.
    pub transformed: bool,
}

/// Counters gathered during one deduplication pass.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DedupStats {
    /// Tiles scanned.
    pub total_tiles: usize,
    /// Records produced.
    pub unique_tiles: usize,
    /// Tiles that matched a record byte-for-byte.
    pub exact_matches: usize,
    /// Tiles that matched a record through a transform.
    pub transformed_matches: usize,
}

impl DedupStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Parsed {} total tiles, {} unique ({} exact duplicates, {} transformed duplicates, {:.2}% reduction)",
            self.total_tiles,
            self.unique_tiles,
            self.exact_matches,
            self.transformed_matches,
            self.duplicate_ratio() * 100.0,
        )
    }

    /// Fraction of scanned tiles that were duplicates (0.0 to 1.0).
    pub fn duplicate_ratio(&self) -> f64 {
        if self.total_tiles > 0 {
            (self.exact_matches + self.transformed_matches) as f64 / self.total_tiles as f64
        } else {
            0.0
        }
    }
}
