//! Exporters for assembled worlds: text grids, PNG images, tile pyramids,
//! spatial database rows, a local SQLite index and the run manifest.

pub mod gis;
pub mod manifest;
pub mod raster;
pub mod sqlite;
pub mod text;

use crate::coords::LAYER_COUNT;
use crate::error::{MapError, Result};
use crate::grid::{Drawable, LayerView};

pub use self::gis::{export_geometry, CellRecord, GeometrySink, PostgisSink};
pub use self::manifest::{write_manifest, RunManifest};
pub use self::raster::{export_images, ImageExport};
pub use self::sqlite::export_sqlite;
pub use self::text::export_text;

/// Which layers and grid kinds to export
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerSelection {
    /// Vertical layers, in export order
    pub layers: Vec<usize>,
    pub terrain: bool,
    /// Per-character visibility with glyph cells
    pub seen: bool,
    /// Per-character visibility as a solid overlay
    pub seen_solid: bool,
    /// Leave out layers with nothing but blank cells
    pub skip_empty: bool,
}

impl Default for LayerSelection {
    fn default() -> Self {
        Self {
            layers: (0..LAYER_COUNT).collect(),
            terrain: true,
            seen: false,
            seen_solid: false,
            skip_empty: false,
        }
    }
}

impl LayerSelection {
    /// Reject layer numbers the world cannot have.
    pub fn validate(&self) -> Result<()> {
        match self.layers.iter().find(|&&z| z >= LAYER_COUNT) {
            Some(&z) => Err(MapError::LayerOutOfRange(z)),
            None => Ok(()),
        }
    }

    /// Whether `layer` should be exported at all.
    pub fn wants<C: Drawable>(&self, layer: &LayerView<'_, C>) -> bool {
        !(self.skip_empty && layer.is_empty())
    }
}

/// Make a character name safe to use in a file name.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c => c,
        })
        .collect()
}

/// Base name of terrain layer `z`'s artifacts
pub fn terrain_name(z: usize) -> String {
    format!("o_{}", z)
}

/// Base name of a character's visibility layer `z`
pub fn visible_name(character: &str, z: usize) -> String {
    format!("{}_visible_{}", sanitize_name(character), z)
}

/// Base name of a character's solid visibility overlay for layer `z`
pub fn visible_solid_name(character: &str, z: usize) -> String {
    format!("{}_visible_solid_{}", sanitize_name(character), z)
}

/// Directory holding the tile pyramid of an artifact
pub fn tiles_dir_name(base: &str) -> String {
    format!("{}_tiles", base)
}
