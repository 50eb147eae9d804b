//! Flip/rotation transforms used to match tiles up to reflection and rotation.

use image::RgbaImage;
use image::imageops;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mirror applied before any rotation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Flip {
    None,
    /// Mirror left/right.
    Horizontal,
    /// Mirror top/bottom.
    Vertical,
}

/// Counter-clockwise rotation in quarter turns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    None,
    Quarter,
    Half,
    ThreeQuarter,
}

/// A flip followed by a rotation.
///
/// Several combinations describe the same element of the dihedral group
/// (flipH-rotate180 equals flipV-none, for instance). The search order keeps
/// them all because the first matching entry decides which record a tile
/// joins, and that order is part of the observable output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Symmetry {
    pub flip: Flip,
    pub rotation: Rotation,
}

impl Symmetry {
    pub const IDENTITY: Self = Self::new(Flip::None, Rotation::None);

    /// Every non-identity combination, in the order transforms are tried.
    pub const SEARCH_ORDER: [Self; 11] = [
        Self::new(Flip::Horizontal, Rotation::Quarter),
        Self::new(Flip::Horizontal, Rotation::Half),
        Self::new(Flip::Horizontal, Rotation::ThreeQuarter),
        Self::new(Flip::Vertical, Rotation::Quarter),
        Self::new(Flip::Vertical, Rotation::Half),
        Self::new(Flip::Vertical, Rotation::ThreeQuarter),
        Self::new(Flip::None, Rotation::Quarter),
        Self::new(Flip::None, Rotation::Half),
        Self::new(Flip::None, Rotation::ThreeQuarter),
        Self::new(Flip::Horizontal, Rotation::None),
        Self::new(Flip::Vertical, Rotation::None),
    ];

    pub const fn new(flip: Flip, rotation: Rotation) -> Self {
        Self { flip, rotation }
    }

    pub fn is_identity(self) -> bool {
        self == Self::IDENTITY
    }

    /// Whether the result has width and height swapped.
    pub fn swaps_axes(self) -> bool {
        matches!(self.rotation, Rotation::Quarter | Rotation::ThreeQuarter)
    }

    /// Returns a new raster with the flip then the rotation applied.
    pub fn apply(self, tile: &RgbaImage) -> RgbaImage {
        let flipped = match self.flip {
            Flip::None => tile.clone(),
            Flip::Horizontal => imageops::flip_horizontal(tile),
            Flip::Vertical => imageops::flip_vertical(tile),
        };
        match self.rotation {
            Rotation::None => flipped,
            // imageops turns clockwise
            Rotation::Quarter => imageops::rotate270(&flipped),
            Rotation::Half => imageops::rotate180(&flipped),
            Rotation::ThreeQuarter => imageops::rotate90(&flipped),
        }
    }
}

impl fmt::Display for Symmetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flip = match self.flip {
            Flip::None => "none",
            Flip::Horizontal => "flipH",
            Flip::Vertical => "flipV",
        };
        let rotation = match self.rotation {
            Rotation::None => "none",
            Rotation::Quarter => "rotate90",
            Rotation::Half => "rotate180",
            Rotation::ThreeQuarter => "rotate270",
        };
        write!(f, "{flip}-{rotation}")
    }
}

impl FromStr for Symmetry {
    type Err = ();
    /// Parses `"<flip>-<rotation>"`, e.g. `flipH-rotate90` or `none-rotate180`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let (flip, rotation) = lower.split_once('-').ok_or(())?;
        let flip = match flip {
            "none" => Flip::None,
            "fliph" | "h" => Flip::Horizontal,
            "flipv" | "v" => Flip::Vertical,
            _ => return Err(()),
        };
        let rotation = match rotation {
            "none" | "rotate0" => Rotation::None,
            "rotate90" | "90" => Rotation::Quarter,
            "rotate180" | "180" => Rotation::Half,
            "rotate270" | "270" => Rotation::ThreeQuarter,
            _ => return Err(()),
        };
        Ok(Self::new(flip, rotation))
    }
}
