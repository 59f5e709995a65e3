//! Local SQLite cell index.
//!
//! Writes `map.db` with one `cell` row per non-blank terrain cell, holding
//! the cell's pixel rectangle and terrain name. Each layer is inserted in its
//! own transaction; the composite index is built once after the last layer.

use std::path::Path;

use log::info;
use rusqlite::{params, Connection};

use super::LayerSelection;
use crate::assemble::World;
use crate::config::CellMetrics;
use crate::error::Result;
use crate::grid::Drawable;

/// File name of the index inside the output directory
pub const SQLITE_FILE: &str = "map.db";

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS cell (
    id INTEGER PRIMARY KEY,
    layer INTEGER NOT NULL,
    x1 REAL NOT NULL,
    y1 REAL NOT NULL,
    x2 REAL NOT NULL,
    y2 REAL NOT NULL,
    name TEXT NOT NULL
)";

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_cell_all ON cell (layer, x1, x2, y1, y2, name)";

const INSERT_CELL: &str =
    "INSERT INTO cell (layer, x1, y1, x2, y2, name) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

/// Write the selected terrain layers of `world` to `<out_dir>/map.db`.
///
/// Rows from an earlier run in the same directory are replaced. Returns the
/// number of cell rows written.
pub fn export_sqlite(
    world: &World,
    selection: &LayerSelection,
    metrics: &CellMetrics,
    out_dir: &Path,
) -> Result<u64> {
    selection.validate()?;
    let path = out_dir.join(SQLITE_FILE);
    let mut conn = Connection::open(&path)?;
    conn.execute_batch(CREATE_TABLE)?;
    conn.execute("DELETE FROM cell", [])?;

    let mut total = 0;
    for &z in &selection.layers {
        let layer = world.terrain_layer(z)?;
        if !selection.wants(&layer) {
            continue;
        }

        let tx = conn.transaction()?;
        let mut count = 0u64;
        {
            let mut insert = tx.prepare(INSERT_CELL)?;
            for row in 0..layer.rows() {
                for (column, cell) in layer.row_cells(row).enumerate() {
                    if cell.is_blank() {
                        continue;
                    }
                    let (x1, y1, x2, y2) = metrics.cell_rect(column, row);
                    insert.execute(params![z as i64, x1, y1, x2, y2, &cell.name])?;
                    count += 1;
                }
            }
        }
        tx.commit()?;

        info!("Layer {}: {} cells indexed in {}", z, count, path.display());
        total += count;
    }

    conn.execute_batch(CREATE_INDEX)?;
    Ok(total)
}
