//! Run manifest: a JSON summary of what one run produced.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::ImageExport;
use crate::assemble::World;
use crate::coords::ChunkBounds;
use crate::error::{MapError, Result};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub world: String,
    /// RFC 3339, UTC
    pub generated_at: String,
    pub bounds: ChunkBounds,
    pub columns: usize,
    pub rows: usize,
    pub characters: Vec<String>,
    pub layers: Vec<usize>,
    pub text_files: usize,
    pub images: usize,
    pub tile_sets: usize,
    pub tiles_written: usize,
    pub tiles_skipped: usize,
    pub geometry_cells: u64,
    pub sqlite_cells: u64,
    pub missing_terrain: BTreeMap<String, u64>,
}

impl RunManifest {
    /// Manifest for `world`, with no artifacts recorded yet.
    pub fn new(world: &World, layers: &[usize]) -> Self {
        Self {
            world: world.name.clone(),
            generated_at: Utc::now().to_rfc3339(),
            bounds: world.bounds,
            columns: world.columns(),
            rows: world.rows(),
            characters: world.seen.keys().cloned().collect(),
            layers: layers.to_vec(),
            missing_terrain: world.report.missing_terrain.clone(),
            ..Default::default()
        }
    }

    pub fn record_images(&mut self, export: &ImageExport) {
        self.images += export.images;
        self.tile_sets += export.tile_sets;
        self.tiles_written += export.tiles.written;
        self.tiles_skipped += export.tiles.skipped;
    }
}

/// Write `manifest.json` into `out_dir`.
pub fn write_manifest(out_dir: &Path, manifest: &RunManifest) -> Result<()> {
    let path = out_dir.join("manifest.json");
    let file = File::create(&path).map_err(|e| MapError::io(&path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, manifest).map_err(|e| MapError::json(&path, e))?;
    writer.flush().map_err(|e| MapError::io(&path, e))
}
