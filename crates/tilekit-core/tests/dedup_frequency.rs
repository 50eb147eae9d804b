use image::{Rgba, RgbaImage, imageops};
use tilekit_core::config::{DedupOptions, ScanConfig, TilingConfig};
use tilekit_core::dedup::{TileDeduplicator, content_hash, crop_grid, crop_tiles, pack_records};
use tilekit_core::error::TilesetError;
use tilekit_core::symmetry::{Flip, Rotation, Symmetry};

const TILE: u32 = 8;

/// Tile with no flip/rotation symmetry; `seed` keeps tiles apart.
fn gradient_tile(seed: u8) -> RgbaImage {
    RgbaImage::from_fn(TILE, TILE, |x, y| {
        Rgba([seed, (x * 30) as u8, (y * 30) as u8, 255])
    })
}

/// Tile equal to its own horizontal mirror.
fn mirrored_tile(seed: u8) -> RgbaImage {
    RgbaImage::from_fn(TILE, TILE, |x, y| {
        let mx = x.min(TILE - 1 - x);
        Rgba([seed, (mx * 40) as u8, (y * 30) as u8, 255])
    })
}

/// Lay tiles out in a single row.
fn strip(tiles: &[RgbaImage]) -> RgbaImage {
    let mut img = RgbaImage::new(TILE * tiles.len() as u32, TILE);
    for (i, t) in tiles.iter().enumerate() {
        imageops::replace(&mut img, t, (i as u32 * TILE) as i64, 0);
    }
    img
}

fn scan() -> ScanConfig {
    ScanConfig::square(TILE)
}

#[test]
fn unique_tiles_stay_separate_without_transforms() {
    let tiles: Vec<RgbaImage> = (1..=5).map(gradient_tile).collect();
    let crops = crop_tiles(&strip(&tiles), &scan());
    let out = TileDeduplicator::new(DedupOptions::exact()).deduplicate(&crops);
    assert_eq!(out.records.len(), 5);
    assert!(out.records.iter().all(|r| r.count == 1 && !r.transformed));
    assert_eq!(out.stats.total_tiles, 5);
    assert_eq!(out.stats.unique_tiles, 5);
}

#[test]
fn rotated_tile_collapses_with_transform_search() {
    let a = gradient_tile(9);
    let b = imageops::rotate90(&a);
    let crops = crop_tiles(&strip(&[a.clone(), b]), &scan());

    let out = TileDeduplicator::new(DedupOptions::with_transforms()).deduplicate(&crops);
    assert_eq!(out.records.len(), 1);
    let rec = &out.records[0];
    assert_eq!(rec.count, 2);
    assert!(rec.transformed);
    // representative is the first occurrence, untouched
    assert_eq!(rec.image, a);
    assert_eq!(rec.content_hash, content_hash(&a));
    assert_eq!(out.stats.transformed_matches, 1);
}

#[test]
fn rotated_tile_stays_separate_without_transform_search() {
    let a = gradient_tile(9);
    let b = imageops::rotate90(&a);
    let crops = crop_tiles(&strip(&[a, b]), &scan());
    let out = TileDeduplicator::new(DedupOptions::exact()).deduplicate(&crops);
    assert_eq!(out.records.len(), 2);
    assert!(out.records.iter().all(|r| r.count == 1 && !r.transformed));
}

#[test]
fn self_symmetric_tile_is_not_matched_against_itself() {
    let m = mirrored_tile(3);
    assert_eq!(imageops::flip_horizontal(&m), m);
    let n = 6;
    let tiles: Vec<RgbaImage> = (0..n).map(|_| m.clone()).collect();
    let crops = crop_tiles(&strip(&tiles), &scan());

    let out = TileDeduplicator::new(DedupOptions::with_transforms()).deduplicate(&crops);
    assert_eq!(out.records.len(), 1);
    assert_eq!(out.records[0].count, n);
    assert!(!out.records[0].transformed);
    assert_eq!(out.stats.exact_matches, n - 1);
}

#[test]
fn ties_keep_first_seen_order() {
    let t1 = gradient_tile(1);
    let t2 = gradient_tile(2);
    let t3 = gradient_tile(3);
    let crops = crop_tiles(&strip(&[t1.clone(), t2.clone(), t3.clone(), t3.clone()]), &scan());

    let out = TileDeduplicator::new(DedupOptions::exact()).deduplicate(&crops);
    let images: Vec<&RgbaImage> = out.records.iter().map(|r| &r.image).collect();
    assert_eq!(images, vec![&t3, &t1, &t2]);
    let counts: Vec<usize> = out.records.iter().map(|r| r.count).collect();
    assert_eq!(counts, vec![2, 1, 1]);
    assert_eq!(out.records[0].first_location.x, 2 * TILE);
    assert_eq!(out.records[1].first_location.x, 0);
    assert_eq!(out.records[2].first_location.x, TILE);
}

#[test]
fn crop_tiles_scans_column_major() {
    let mut img = RgbaImage::new(3 * TILE, 2 * TILE);
    for row in 0..2u32 {
        for col in 0..3u32 {
            let t = gradient_tile((row * 3 + col + 1) as u8);
            imageops::replace(&mut img, &t, (col * TILE) as i64, (row * TILE) as i64);
        }
    }
    let crops = crop_tiles(&img, &scan());
    let cells: Vec<(u32, u32)> = crops
        .iter()
        .map(|c| (c.location.column, c.location.row))
        .collect();
    assert_eq!(cells, vec![(0, 0), (0, 1), (1, 0), (1, 1), (2, 0), (2, 1)]);
    assert_eq!(crops[3].image, gradient_tile(5));
    assert_eq!((crops[3].location.x, crops[3].location.y), (TILE, TILE));
}

#[test]
fn crop_tiles_applies_offset_and_drops_partial_tiles() {
    let img = RgbaImage::new(3 * TILE + 5, TILE + 7);
    let cfg = ScanConfig {
        tile_width: TILE,
        tile_height: TILE,
        x_offset: 5,
        y_offset: 3,
    };
    let crops = crop_tiles(&img, &cfg);
    // (29 - 5) / 8 = 3 columns, (15 - 3) / 8 = 1 row
    assert_eq!(crops.len(), 3);
    assert_eq!((crops[1].location.x, crops[1].location.y), (5 + TILE, 3));
}

#[test]
fn crop_grid_respects_margin_and_spacing() {
    let cfg = TilingConfig::square(TILE, 1, 2);
    // 2 columns, 1 row
    let mut img = RgbaImage::from_pixel(2 * 10 - 2 + 2, 10 - 2 + 2, Rgba([0, 0, 0, 255]));
    imageops::replace(&mut img, &gradient_tile(4), 11, 1);
    let crops = crop_grid(&img, &cfg).unwrap();
    assert_eq!(crops.len(), 2);
    assert_eq!(crops[1].image, gradient_tile(4));
    assert_eq!(crops[1].location.column, 1);
}

#[test]
fn end_to_end_32px_image() {
    let mut img = RgbaImage::new(32, 32);
    let mut seed = 1u8;
    for row in 0..4u32 {
        for col in 0..4u32 {
            let t = gradient_tile(seed);
            seed += 1;
            imageops::replace(&mut img, &t, (col * TILE) as i64, (row * TILE) as i64);
        }
    }
    let tile_at = |img: &RgbaImage, row: u32, col: u32| {
        imageops::crop_imm(img, col * TILE, row * TILE, TILE, TILE).to_image()
    };
    // (row1, col3) duplicates (row0, col0)
    let dup = tile_at(&img, 0, 0);
    imageops::replace(&mut img, &dup, (3 * TILE) as i64, TILE as i64);
    // (row2, col1) is (row0, col1) turned 180 degrees
    let rot = imageops::rotate180(&tile_at(&img, 0, 1));
    imageops::replace(&mut img, &rot, TILE as i64, (2 * TILE) as i64);

    let crops = crop_tiles(&img, &scan());
    assert_eq!(crops.len(), 16);
    let out = TileDeduplicator::new(DedupOptions::with_transforms()).deduplicate(&crops);
    assert_eq!(out.records.len(), 14);

    let exact = &out.records[0];
    assert_eq!(exact.count, 2);
    assert!(!exact.transformed);
    assert_eq!((exact.first_location.row, exact.first_location.column), (0, 0));

    let turned = &out.records[1];
    assert_eq!(turned.count, 2);
    assert!(turned.transformed);
    assert_eq!((turned.first_location.row, turned.first_location.column), (0, 1));

    assert!(out.records[2..].iter().all(|r| r.count == 1 && !r.transformed));
    assert_eq!(out.stats.exact_matches, 1);
    assert_eq!(out.stats.transformed_matches, 1);
}

#[test]
fn restricted_search_only_tries_listed_transforms() {
    let a = gradient_tile(5);
    let b = imageops::rotate180(&a);
    let crops = crop_tiles(&strip(&[a, b]), &scan());

    let flips_only = DedupOptions::restricted(vec![
        Symmetry::new(Flip::Horizontal, Rotation::None),
        Symmetry::new(Flip::Vertical, Rotation::None),
    ]);
    let out = TileDeduplicator::new(flips_only).deduplicate(&crops);
    assert_eq!(out.records.len(), 2);

    let half_turn = DedupOptions::restricted(vec![Symmetry::new(Flip::None, Rotation::Half)]);
    let out = TileDeduplicator::new(half_turn).deduplicate(&crops);
    assert_eq!(out.records.len(), 1);
    assert!(out.records[0].transformed);
}

#[test]
fn restricted_quarter_turn_matches_counter_clockwise_only() {
    let a = gradient_tile(6);
    let only_quarter = DedupOptions::restricted(vec![Symmetry::new(Flip::None, Rotation::Quarter)]);

    // b is a turned clockwise; turning it back counter-clockwise gives a
    let cw = crop_tiles(&strip(&[a.clone(), imageops::rotate90(&a)]), &scan());
    let out = TileDeduplicator::new(only_quarter.clone()).deduplicate(&cw);
    assert_eq!(out.records.len(), 1);
    assert!(out.records[0].transformed);

    let ccw = crop_tiles(&strip(&[a.clone(), imageops::rotate270(&a)]), &scan());
    let out = TileDeduplicator::new(only_quarter).deduplicate(&ccw);
    assert_eq!(out.records.len(), 2);
}

#[test]
fn quarter_turns_are_skipped_for_non_square_tiles() {
    let a = RgbaImage::from_fn(4, 2, |x, y| Rgba([7, (x * 50) as u8, (y * 90) as u8, 255]));
    // same bytes as a turned a, reinterpreted at the scan shape
    let turned = Symmetry::new(Flip::None, Rotation::Quarter).apply(&a);
    let b = RgbaImage::from_raw(4, 2, turned.into_raw()).unwrap();

    let mut img = RgbaImage::new(8, 2);
    imageops::replace(&mut img, &b, 0, 0);
    imageops::replace(&mut img, &a, 4, 0);
    let cfg = ScanConfig {
        tile_width: 4,
        tile_height: 2,
        x_offset: 0,
        y_offset: 0,
    };
    let crops = crop_tiles(&img, &cfg);
    let out = TileDeduplicator::new(DedupOptions::with_transforms()).deduplicate(&crops);
    assert_eq!(out.records.len(), 2);
    assert!(out.records.iter().all(|r| r.count == 1 && !r.transformed));
}

#[test]
fn crop_grid_visits_columns_first() {
    let cfg = TilingConfig::square(TILE, 0, 0);
    let mut img = RgbaImage::new(2 * TILE, 2 * TILE);
    imageops::replace(&mut img, &gradient_tile(2), 0, TILE as i64);
    let crops = crop_grid(&img, &cfg).unwrap();
    let cells: Vec<(u32, u32)> = crops
        .iter()
        .map(|c| (c.location.column, c.location.row))
        .collect();
    assert_eq!(cells, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    assert_eq!(crops[1].image, gradient_tile(2));
}

#[test]
fn empty_input_yields_no_records() {
    let out = TileDeduplicator::new(DedupOptions::with_transforms()).deduplicate(&[]);
    assert!(out.records.is_empty());
    assert_eq!(out.stats.total_tiles, 0);
    assert_eq!(out.stats.duplicate_ratio(), 0.0);
}

#[test]
fn pack_records_lays_out_row_major() {
    let tiles: Vec<RgbaImage> = (1..=3).map(gradient_tile).collect();
    let crops = crop_tiles(&strip(&tiles), &scan());
    let out = TileDeduplicator::new(DedupOptions::exact()).deduplicate(&crops);

    let cfg = TilingConfig::builder()
        .tile_size(TILE, TILE)
        .columns(2)
        .background([9, 9, 9, 255])
        .build();
    let packed = pack_records(&out.records, &cfg).unwrap();
    assert_eq!(packed.dimensions(), (2 * TILE, 2 * TILE));
    let third = imageops::crop_imm(&packed, 0, TILE, TILE, TILE).to_image();
    assert_eq!(third, tiles[2]);
    // the unused cell keeps the background
    assert_eq!(packed.get_pixel(TILE + 1, TILE + 1), &Rgba([9, 9, 9, 255]));
}

#[test]
fn pack_records_rejects_empty_set() {
    let result = pack_records(&[], &TilingConfig::default());
    assert!(matches!(result, Err(TilesetError::EmptyTileSet)));
}
