use thiserror::Error;

/// Image axis a geometry check failed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Width,
    Height,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Width => f.write_str("width"),
            Axis::Height => f.write_str("height"),
        }
    }
}

#[derive(Debug, Error)]
pub enum TilesetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error(
        "bad margin, spacing, or tile size for image {axis}: margin: {margin}, spacing: {spacing}, tile size: {tile_size}, image {axis}: {dimension} (tileable span is not a multiple of {divisor})"
    )]
    GeometryMismatch {
        axis: Axis,
        dimension: u32,
        tile_size: u32,
        margin: u32,
        spacing: u32,
        divisor: u32,
    },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("No tiles to pack")]
    EmptyTileSet,
    #[error(
        "unsupported output format {0:?}; valid extensions are: jpg (or jpeg), png, gif, tif (or tiff) and bmp"
    )]
    UnsupportedOutputFormat(String),
}

pub type Result<T> = std::result::Result<T, TilesetError>;
