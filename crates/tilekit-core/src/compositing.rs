use image::{Pixel, Rgba, RgbaImage};

/// How tile pixels combine with the canvas underneath.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlitMode {
    /// Tile pixels replace canvas pixels, alpha included.
    #[default]
    Replace,
    /// Tile pixels are alpha-composited over the canvas (source-over).
    Over,
}

/// Canvas of `width x height` filled with `background`.
pub fn new_canvas(width: u32, height: u32, background: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(background))
}

/// Copy all of `src` into `canvas` with its top-left at (dx, dy).
///
/// Pixels falling outside the canvas are dropped.
pub fn blit_rgba(src: &RgbaImage, canvas: &mut RgbaImage, dx: u32, dy: u32, mode: BlitMode) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    for yy in 0..sh {
        if dy + yy >= ch {
            break;
        }
        for xx in 0..sw {
            if dx + xx >= cw {
                break;
            }
            let px = *src.get_pixel(xx, yy);
            match mode {
                BlitMode::Replace => canvas.put_pixel(dx + xx, dy + yy, px),
                BlitMode::Over => canvas.get_pixel_mut(dx + xx, dy + yy).blend(&px),
            }
        }
    }
}
