use image::RgbaImage;

/// Grow `tile` by `thickness` pixels on every side, replicating its border.
///
/// - content is copied to (thickness, thickness)
/// - top/bottom rows are repeated outward across the tile's width
/// - left/right columns are repeated outward across the tile's height
/// - each `thickness x thickness` corner block is flat-filled with the
///   matching corner pixel of the tile
///
/// Thickness 0 returns an identical copy. The caller is responsible for
/// range-checking `thickness`.
pub fn extrude_tile(tile: &RgbaImage, thickness: u32) -> RgbaImage {
    let (w, h) = tile.dimensions();
    let t = thickness;
    let mut out = RgbaImage::new(w + 2 * t, h + 2 * t);
    if w == 0 || h == 0 {
        return out;
    }

    // content
    for y in 0..h {
        for x in 0..w {
            out.put_pixel(t + x, t + y, *tile.get_pixel(x, y));
        }
    }
    if t == 0 {
        return out;
    }

    // edges
    for x in 0..w {
        let top = *tile.get_pixel(x, 0);
        let bottom = *tile.get_pixel(x, h - 1);
        for e in 0..t {
            out.put_pixel(t + x, e, top);
            out.put_pixel(t + x, t + h + e, bottom);
        }
    }
    for y in 0..h {
        let left = *tile.get_pixel(0, y);
        let right = *tile.get_pixel(w - 1, y);
        for e in 0..t {
            out.put_pixel(e, t + y, left);
            out.put_pixel(t + w + e, t + y, right);
        }
    }

    // corners (flat fill with the corner pixel)
    let c00 = *tile.get_pixel(0, 0);
    let c10 = *tile.get_pixel(w - 1, 0);
    let c01 = *tile.get_pixel(0, h - 1);
    let c11 = *tile.get_pixel(w - 1, h - 1);
    for ey in 0..t {
        for ex in 0..t {
            out.put_pixel(ex, ey, c00);
            out.put_pixel(t + w + ex, ey, c10);
            out.put_pixel(ex, t + h + ey, c01);
            out.put_pixel(t + w + ex, t + h + ey, c11);
        }
    }
    out
}
