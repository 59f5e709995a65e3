//! Plain-text export: one character per cell, one line per row.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;

use super::{terrain_name, visible_name, LayerSelection};
use crate::assemble::World;
use crate::error::{MapError, Result};
use crate::grid::{Drawable, LayerView};

/// Write one layer as text.
pub fn write_layer_text<C: Drawable>(layer: &LayerView<'_, C>, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| MapError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    let mut line = String::with_capacity(layer.columns() * 3 + 1);

    for row in 0..layer.rows() {
        line.clear();
        line.extend(layer.row_cells(row).map(Drawable::text_symbol));
        line.push('\n');
        writer
            .write_all(line.as_bytes())
            .map_err(|e| MapError::io(path, e))?;
    }
    writer.flush().map_err(|e| MapError::io(path, e))
}

/// Write the selected layers of `world` as text files under `out_dir`.
///
/// Returns the number of files written.
pub fn export_text(world: &World, selection: &LayerSelection, out_dir: &Path) -> Result<usize> {
    selection.validate()?;
    fs::create_dir_all(out_dir).map_err(|e| MapError::io(out_dir, e))?;

    let mut written = 0;
    for &z in &selection.layers {
        if selection.terrain {
            let layer = world.terrain_layer(z)?;
            if selection.wants(&layer) {
                write_layer_text(&layer, &out_dir.join(terrain_name(z)))?;
                written += 1;
            }
        }
        if selection.seen {
            for (name, layer) in world.seen_layers(z)? {
                if selection.wants(&layer) {
                    write_layer_text(&layer, &out_dir.join(visible_name(name, z)))?;
                    written += 1;
                }
            }
        }
    }

    info!("Wrote {} text layers to {}", written, out_dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::build_world;
    use crate::coords::{CELLS_PER_LAYER, LAYER_COUNT};
    use crate::save::{OvermapChunk, SaveData, SeenRun, TerrainRun, VisibilityChunk};
    use crate::templates::{TemplateSource, TemplateStore};
    use tempfile::tempdir;

    fn forest_world() -> World {
        let source: TemplateSource = [r#"{ "type": "overmap_terrain", "id": "forest", "sym": "F", "color": "green" }"#]
            .iter()
            .map(|r| serde_json::from_str(r).unwrap())
            .collect();
        let (store, _) = TemplateStore::resolve(&source);

        let chunk = |x| {
            let mut layers = vec![vec![TerrainRun::new("empty_rock", CELLS_PER_LAYER as u32)]; LAYER_COUNT];
            layers[10] = vec![TerrainRun::new("forest", CELLS_PER_LAYER as u32)];
            OvermapChunk { x, y: 0, layers }
        };
        let mut save = SaveData {
            name: "woods".into(),
            chunks: vec![chunk(0), chunk(1)],
            ..Default::default()
        };
        save.seen.insert(
            "Bob/2".into(),
            vec![VisibilityChunk {
                x: 0,
                y: 0,
                layers: vec![vec![SeenRun { seen: true, count: CELLS_PER_LAYER as u32 }]; LAYER_COUNT],
            }],
        );
        build_world(&save, &store).unwrap()
    }

    #[test]
    fn test_forest_text_export() {
        let dir = tempdir().unwrap();
        let world = forest_world();
        let selection = LayerSelection {
            layers: vec![10],
            ..Default::default()
        };
        assert_eq!(export_text(&world, &selection, dir.path()).unwrap(), 1);

        let text = fs::read_to_string(dir.path().join("o_10")).unwrap();
        let expected = format!("{}\n", "F".repeat(360)).repeat(180);
        assert_eq!(text, expected);
    }

    #[test]
    fn test_skip_empty_and_visibility() {
        let dir = tempdir().unwrap();
        let world = forest_world();
        let selection = LayerSelection {
            layers: vec![0, 10],
            seen: true,
            skip_empty: true,
            ..Default::default()
        };
        // o_10 plus both visibility layers; o_0 is all empty_rock
        assert_eq!(export_text(&world, &selection, dir.path()).unwrap(), 3);
        assert!(!dir.path().join("o_0").exists());

        let seen = fs::read_to_string(dir.path().join("Bob_2_visible_0")).unwrap();
        let first = seen.lines().next().unwrap();
        assert_eq!(first, format!("{}{}", ".".repeat(180), "#".repeat(180)));
    }
}
