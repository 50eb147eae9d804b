//! Decoding and encoding rasters on disk.

use std::path::Path;

use image::{DynamicImage, ImageDecoder, ImageError, ImageReader, RgbaImage};
use tracing::debug;

use crate::error::{Result, TilesetError};

/// Output extensions the encoder accepts.
pub const OUTPUT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "tif", "tiff", "bmp"];

/// Decode an image file to RGBA, applying its EXIF orientation.
pub fn open_raster(path: &Path) -> Result<RgbaImage> {
    debug!(?path, "opening image");
    let mut decoder = ImageReader::open(path)?
        .with_guessed_format()?
        .into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut img = DynamicImage::from_decoder(decoder)?;
    img.apply_orientation(orientation);
    Ok(img.to_rgba8())
}

/// Encode `img` to `path`, choosing the format from the extension.
///
/// An unknown or unsupported extension is reported as
/// [`TilesetError::UnsupportedOutputFormat`] rather than a generic image error.
pub fn save_raster(img: &RgbaImage, path: &Path) -> Result<()> {
    debug!(?path, "saving image");
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();
    if !OUTPUT_EXTENSIONS.contains(&ext.as_str()) {
        return Err(TilesetError::UnsupportedOutputFormat(ext));
    }
    // JPEG has no alpha channel
    let result = if matches!(ext.as_str(), "jpg" | "jpeg") {
        DynamicImage::ImageRgba8(img.clone()).to_rgb8().save(path)
    } else {
        img.save(path)
    };
    match result {
        Ok(()) => Ok(()),
        Err(ImageError::Unsupported(_)) => Err(TilesetError::UnsupportedOutputFormat(ext)),
        Err(ImageError::IoError(e)) => Err(TilesetError::Io(e)),
        Err(e) => Err(TilesetError::Image(e)),
    }
}
