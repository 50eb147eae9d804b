use image::RgbaImage;
use tracing::{debug, info, instrument};

use crate::compositing::{BlitMode, blit_rgba, new_canvas};
use crate::config::{
    DedupOptions, ScanConfig, TilingConfig, validate_pixel_value, validate_positive_pixel_value,
};
use crate::dedup::{CellOrder, TileDeduplicator, crop_cells, crop_tiles, pack_records};
use crate::error::{Result, TilesetError};
use crate::extrude::extrude_tile;
use crate::layout::GridLayout;
use crate::model::{DedupStats, TileRecord};

/// Tiles of a packed tileset together with the geometry they were read with.
#[derive(Debug, Clone)]
pub struct Tileset {
    pub config: TilingConfig,
    /// Tiles in row-major order.
    pub tiles: Vec<RgbaImage>,
}

impl Tileset {
    /// Render the tiles row-major onto a canvas described by `config`.
    pub fn to_image(&self, mode: BlitMode) -> Result<RgbaImage> {
        pack_tiles(self.tiles.iter(), &self.config, mode)
    }
}

/// Lays `tiles` out row-major, `cfg.columns` per row, on a canvas filled with
/// `cfg.background`. Every tile is expected to be `tile_width x tile_height`.
pub fn pack_tiles<'a, I>(tiles: I, cfg: &TilingConfig, mode: BlitMode) -> Result<RgbaImage>
where
    I: IntoIterator<Item = &'a RgbaImage>,
{
    cfg.validate()?;
    let tiles: Vec<&RgbaImage> = tiles.into_iter().collect();
    let layout = GridLayout::new(cfg);
    let (width, height) = layout.canvas_dimensions(tiles.len(), cfg.columns)?;
    let mut canvas = new_canvas(width, height, cfg.background);
    for (i, tile) in tiles.iter().enumerate() {
        let column = i as u32 % cfg.columns;
        let row = i as u32 / cfg.columns;
        let (x, y) = layout.tile_position(row, column);
        blit_rgba(tile, &mut canvas, x, y, mode);
    }
    debug!(tiles = tiles.len(), width, height, "packed tileset");
    Ok(canvas)
}

#[instrument(skip_all)]
/// Reads a packed tileset: infers its grid from the image size and crops every
/// tile in row-major order. The returned config carries the inferred column count.
pub fn read_tileset(img: &RgbaImage, cfg: &TilingConfig) -> Result<Tileset> {
    cfg.validate()?;
    let layout = GridLayout::new(cfg);
    let (rows, columns) = layout.infer_grid(img.width(), img.height())?;
    info!(rows, columns, "read tileset grid");

    let tiles = crop_cells(img, &layout, rows, columns, CellOrder::RowMajor)
        .into_iter()
        .map(|c| c.image)
        .collect();
    let mut config = cfg.clone();
    // a grid with zero columns keeps the configured packing width
    if columns > 0 {
        config.columns = columns;
    }
    Ok(Tileset { config, tiles })
}

#[instrument(skip_all, fields(margin = margin, spacing = spacing))]
/// Rewrites a tileset with a new margin, spacing and background colour.
///
/// Tiles are composited over the background, so transparent tile pixels take
/// on the new background colour.
pub fn respace(
    img: &RgbaImage,
    read: &TilingConfig,
    margin: u32,
    spacing: u32,
    background: [u8; 4],
) -> Result<RgbaImage> {
    validate_pixel_value("margin", margin)?;
    validate_pixel_value("spacing", spacing)?;
    let mut tileset = read_tileset(img, read)?;
    info!(
        read_margin = read.margin,
        read_spacing = read.spacing,
        margin,
        spacing,
        "respacing tileset"
    );
    tileset.config.margin = margin;
    tileset.config.spacing = spacing;
    tileset.config.background = background;
    tileset.to_image(BlitMode::Over)
}

/// Output of [`extrude_tileset`].
#[derive(Debug, Clone)]
pub struct ExtrudeOutput {
    pub image: RgbaImage,
    /// Geometry the extruded tiles were written with (tile size grown by `2*thickness`).
    pub config: TilingConfig,
    /// Margin of the original tile content in the output.
    pub effective_margin: u32,
    /// Spacing between original tile contents in the output.
    pub effective_spacing: u32,
}

#[instrument(skip_all, fields(thickness = thickness))]
/// Extrudes every tile of a packed tileset by `thickness` pixels.
///
/// The output keeps the input margin, spacing and column count; measured
/// around the original tile content it has margin `margin + thickness` and
/// spacing `spacing + 2*thickness`.
pub fn extrude_tileset(img: &RgbaImage, cfg: &TilingConfig, thickness: u32) -> Result<ExtrudeOutput> {
    validate_pixel_value("thickness", thickness)?;
    cfg.validate()?;
    // grown tiles must still be valid before anything is cropped or extruded
    validate_positive_pixel_value("extruded tile_width", cfg.tile_width + 2 * thickness)?;
    validate_positive_pixel_value("extruded tile_height", cfg.tile_height + 2 * thickness)?;
    let tileset = read_tileset(img, cfg)?;
    let tiles: Vec<RgbaImage> = tileset
        .tiles
        .iter()
        .map(|t| extrude_tile(t, thickness))
        .collect();

    let mut config = tileset.config.clone();
    config.tile_width += 2 * thickness;
    config.tile_height += 2 * thickness;
    let image = pack_tiles(tiles.iter(), &config, BlitMode::Replace)?;
    let effective_margin = config.margin + thickness;
    let effective_spacing = config.spacing + 2 * thickness;
    info!(
        tiles = tiles.len(),
        effective_margin, effective_spacing, "extruded tileset"
    );
    Ok(ExtrudeOutput {
        image,
        config,
        effective_margin,
        effective_spacing,
    })
}

/// Output of [`parse_tiles`].
#[derive(Debug, Clone)]
pub struct ParseOutput {
    /// Tiles scanned in the source image.
    pub total_tiles: usize,
    /// Unique tiles by descending count.
    pub records: Vec<TileRecord>,
    pub stats: DedupStats,
    /// Unique tiles packed into a new tileset.
    pub image: RgbaImage,
}

#[instrument(skip_all)]
/// Finds the unique tiles of an arbitrary image and packs them into a tileset.
///
/// `scan` decides where tiles are cut; `out` decides how the result is laid
/// out (its tile size is replaced by the scan tile size).
pub fn parse_tiles(
    img: &RgbaImage,
    scan: &ScanConfig,
    options: &DedupOptions,
    out: &TilingConfig,
) -> Result<ParseOutput> {
    scan.validate()?;
    let (w, h) = img.dimensions();
    info!(
        image = %format!("{w}x{h}"),
        tile = %format!("{}x{}", scan.tile_width, scan.tile_height),
        offset = %format!("{}x{}", scan.x_offset, scan.y_offset),
        remainder = %format!(
            "{}x{}",
            w.saturating_sub(scan.x_offset) % scan.tile_width,
            h.saturating_sub(scan.y_offset) % scan.tile_height
        ),
        "parsing image"
    );
    let tiles = crop_tiles(img, scan);
    let output = TileDeduplicator::new(options.clone()).deduplicate(&tiles);
    info!("{}", output.stats.summary());
    if output.records.is_empty() {
        return Err(TilesetError::EmptyTileSet);
    }

    let mut out_cfg = out.clone();
    out_cfg.tile_width = scan.tile_width;
    out_cfg.tile_height = scan.tile_height;
    let image = pack_records(&output.records, &out_cfg)?;
    Ok(ParseOutput {
        total_tiles: tiles.len(),
        records: output.records,
        stats: output.stats,
        image,
    })
}
