//! Spatial database export.
//!
//! Every non-blank terrain cell becomes a row with a rectangular polygon in
//! canvas pixel coordinates. Rows go through a [`GeometrySink`]; the PostGIS
//! sink streams them with `COPY`, one transaction per layer. The `world`,
//! `layer` and `cell` tables are expected to exist.

use std::io::Write;

use log::info;
use postgres::{Client, NoTls};

use super::LayerSelection;
use crate::assemble::World;
use crate::config::CellMetrics;
use crate::error::{MapError, Result};
use crate::grid::Drawable;

/// One `cell` row
#[derive(Clone, Debug, PartialEq)]
pub struct CellRecord<'a> {
    pub id: &'a str,
    pub name: &'a str,
    /// WKT polygon
    pub geometry: String,
}

/// Destination for world, layer and cell rows.
pub trait GeometrySink {
    /// Insert the world row and return its key.
    fn insert_world(&mut self, name: &str) -> Result<i32>;

    /// Insert the row for vertical layer `z` and return its key.
    fn insert_layer(&mut self, world_id: i32, z: usize) -> Result<i32>;

    /// Bulk-load the cells of one layer; returns the number of rows.
    fn copy_cells<'a>(
        &mut self,
        layer_id: i32,
        cells: &mut dyn Iterator<Item = CellRecord<'a>>,
    ) -> Result<u64>;
}

/// WKT polygon of cell (column, row).
pub fn cell_polygon(metrics: &CellMetrics, column: usize, row: usize) -> String {
    let (x, y, x2, y2) = metrics.cell_rect(column, row);
    format!(
        "POLYGON(({x:.6} {y:.6}, {x2:.6} {y:.6}, {x2:.6} {y2:.6}, {x:.6} {y2:.6}, {x:.6} {y:.6}))",
    )
}

/// Write the selected terrain layers of `world` to `sink`.
///
/// Returns the number of cell rows written.
pub fn export_geometry<S: GeometrySink>(
    world: &World,
    selection: &LayerSelection,
    metrics: &CellMetrics,
    sink: &mut S,
) -> Result<u64> {
    selection.validate()?;
    let world_id = sink.insert_world(&world.name)?;
    let mut total = 0;

    for &z in &selection.layers {
        let layer = world.terrain_layer(z)?;
        if !selection.wants(&layer) {
            continue;
        }
        let layer_id = sink.insert_layer(world_id, z)?;

        let mut cells = (0..layer.rows()).flat_map(|row| {
            layer
                .row_cells(row)
                .enumerate()
                .filter(|(_, cell)| !cell.is_blank())
                .map(move |(column, cell)| CellRecord {
                    id: &cell.id,
                    name: &cell.name,
                    geometry: cell_polygon(metrics, column, row),
                })
        });
        let count = sink.copy_cells(layer_id, &mut cells)?;
        info!("Layer {}: {} cells exported", z, count);
        total += count;
    }

    Ok(total)
}

/// Escape a value for the `COPY` text format.
fn copy_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

/// PostGIS-backed sink.
pub struct PostgisSink {
    client: Client,
}

impl PostgisSink {
    pub fn connect(connection: &str) -> Result<Self> {
        let client = Client::connect(connection, NoTls)?;
        Ok(Self { client })
    }
}

impl GeometrySink for PostgisSink {
    fn insert_world(&mut self, name: &str) -> Result<i32> {
        let row = self
            .client
            .query_one("INSERT INTO world (name) VALUES ($1) RETURNING world_id", &[&name])?;
        Ok(row.try_get(0)?)
    }

    fn insert_layer(&mut self, world_id: i32, z: usize) -> Result<i32> {
        let z = z as i32;
        let row = self.client.query_one(
            "INSERT INTO layer (world_id, z) VALUES ($1, $2) RETURNING layer_id",
            &[&world_id, &z],
        )?;
        Ok(row.try_get(0)?)
    }

    fn copy_cells<'a>(
        &mut self,
        layer_id: i32,
        cells: &mut dyn Iterator<Item = CellRecord<'a>>,
    ) -> Result<u64> {
        let mut transaction = self.client.transaction()?;
        let mut writer =
            transaction.copy_in("COPY cell (layer_id, id, name, the_geom) FROM STDIN")?;

        let mut line = String::new();
        for cell in cells {
            line.clear();
            line.push_str(&format!(
                "{}\t{}\t{}\t{}\n",
                layer_id,
                copy_escape(cell.id),
                copy_escape(cell.name),
                cell.geometry
            ));
            writer
                .write_all(line.as_bytes())
                .map_err(|e| MapError::io("COPY cell", e))?;
        }

        let rows = writer.finish()?;
        transaction.commit()?;
        Ok(rows)
    }
}
