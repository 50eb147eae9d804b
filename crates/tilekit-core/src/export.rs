use crate::model::TileRecord;
use serde_json::{Value, json};

/// Serialize deduplication records as `{ tiles: [...], unique }`, in output order.
/// Each entry carries its output index, occurrence count, content hash, first
/// location and whether a flip/rotation was needed to match.
pub fn to_json_report(records: &[TileRecord]) -> Value {
    let tiles = records
        .iter()
        .enumerate()
        .map(|(index, r)| {
            let loc = &r.first_location;
            json!({
                "index": index,
                "count": r.count,
                "hash": r.content_hash,
                "firstLocation": {"row": loc.row, "column": loc.column, "x": loc.x, "y": loc.y},
                "transformed": r.transformed,
                "size": {"w": r.image.width(), "h": r.image.height()},
            })
        })
        .collect::<Vec<_>>();
    json!({ "tiles": tiles, "unique": records.len() })
}
