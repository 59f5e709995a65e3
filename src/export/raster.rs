//! PNG and tile pyramid export.

use std::fs;
use std::path::Path;

use image::{ImageFormat, RgbaImage};
use log::info;

use super::{terrain_name, tiles_dir_name, visible_name, visible_solid_name, LayerSelection};
use crate::assemble::World;
use crate::config::RenderConfig;
use crate::error::{MapError, Result};
use crate::painter::{PaintStyle, Painter};
use crate::pyramid::{cut_pyramid, PyramidStats};

/// What the image export produced
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImageExport {
    pub images: usize,
    pub tile_sets: usize,
    pub tiles: PyramidStats,
}

/// Where one painted canvas goes
struct Outputs<'a> {
    dir: &'a Path,
    images: bool,
    tiles: bool,
    config: &'a RenderConfig,
}

impl Outputs<'_> {
    fn emit(&self, canvas: &RgbaImage, base: &str, summary: &mut ImageExport) -> Result<()> {
        if self.images {
            let path = self.dir.join(format!("{}.png", base));
            canvas
                .save_with_format(&path, ImageFormat::Png)
                .map_err(|e| MapError::image(&path, e))?;
            summary.images += 1;
        }
        if self.tiles {
            let dir = self.dir.join(tiles_dir_name(base));
            summary.tiles += cut_pyramid(canvas, &dir, &self.config.pyramid)?;
            summary.tile_sets += 1;
        }
        Ok(())
    }
}

/// Paint the selected layers of `world` and write them as flat PNGs
/// (`images`) and/or tile pyramids (`tiles`) under `out_dir`.
///
/// One canvas is reused for every layer.
pub fn export_images(
    world: &World,
    selection: &LayerSelection,
    out_dir: &Path,
    config: &RenderConfig,
    images: bool,
    tiles: bool,
) -> Result<ImageExport> {
    selection.validate()?;
    fs::create_dir_all(out_dir).map_err(|e| MapError::io(out_dir, e))?;

    let outputs = Outputs {
        dir: out_dir,
        images,
        tiles,
        config,
    };
    let mut painter = Painter::new(config.metrics);
    let mut summary = ImageExport::default();

    for &z in &selection.layers {
        if selection.terrain {
            let layer = world.terrain_layer(z)?;
            if selection.wants(&layer) {
                let canvas = painter.paint(&layer, PaintStyle::Glyphs);
                outputs.emit(canvas, &terrain_name(z), &mut summary)?;
            }
        }

        if selection.seen || selection.seen_solid {
            for (name, layer) in world.seen_layers(z)? {
                if !selection.wants(&layer) {
                    continue;
                }
                if selection.seen {
                    let canvas = painter.paint(&layer, PaintStyle::Glyphs);
                    outputs.emit(canvas, &visible_name(name, z), &mut summary)?;
                }
                if selection.seen_solid {
                    let canvas = painter.paint(&layer, PaintStyle::Solid);
                    outputs.emit(canvas, &visible_solid_name(name, z), &mut summary)?;
                }
            }
        }
        info!("Rendered layer {}", z);
    }

    info!(
        "Image export: {} images, {} tile sets ({} tiles written, {} skipped)",
        summary.images, summary.tile_sets, summary.tiles.written, summary.tiles.skipped
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::build_world;
    use crate::config::PyramidConfig;
    use crate::coords::{CELLS_PER_LAYER, LAYER_COUNT};
    use crate::pyramid::tile_path;
    use crate::save::{OvermapChunk, SaveData, SeenRun, TerrainRun, VisibilityChunk};
    use crate::templates::{TemplateSource, TemplateStore};
    use tempfile::tempdir;

    fn world() -> World {
        let source: TemplateSource = [r#"{ "type": "overmap_terrain", "id": "field", "sym": ".", "color": "brown" }"#]
            .iter()
            .map(|r| serde_json::from_str(r).unwrap())
            .collect();
        let (store, _) = TemplateStore::resolve(&source);
        let mut save = SaveData {
            name: "plains".into(),
            chunks: vec![OvermapChunk {
                x: 0,
                y: 0,
                layers: vec![vec![TerrainRun::new("field", CELLS_PER_LAYER as u32)]; LAYER_COUNT],
            }],
            ..Default::default()
        };
        save.seen.insert(
            "Eve".into(),
            vec![VisibilityChunk {
                x: 0,
                y: 0,
                layers: vec![
                    vec![
                        SeenRun { seen: true, count: 90 },
                        SeenRun { seen: false, count: CELLS_PER_LAYER as u32 - 90 },
                    ];
                    LAYER_COUNT
                ],
            }],
        );
        build_world(&save, &store).unwrap()
    }

    #[test]
    fn test_images_and_tiles() {
        let dir = tempdir().unwrap();
        let world = world();
        let selection = LayerSelection {
            layers: vec![10],
            seen: true,
            seen_solid: true,
            ..Default::default()
        };
        let config = RenderConfig {
            pyramid: PyramidConfig {
                tile_size: 1024,
                ..Default::default()
            },
            ..Default::default()
        };
        let summary = export_images(&world, &selection, dir.path(), &config, true, true).unwrap();
        assert_eq!(summary.images, 3);
        assert_eq!(summary.tile_sets, 3);

        let terrain = image::open(dir.path().join("o_10.png")).unwrap();
        // 180 * 21.3594 = 3844.692
        assert_eq!((terrain.width(), terrain.height()), (3845, 4320));
        assert!(dir.path().join("Eve_visible_10.png").exists());

        // 4x5 tiles at 1024 px, native zoom 3
        let solid_tiles = dir.path().join("Eve_visible_solid_10_tiles");
        assert!(tile_path(&solid_tiles, 3, 3, 4).exists());
        assert!(tile_path(&solid_tiles, 0, 0, 0).exists());

        let solid = image::open(dir.path().join("Eve_visible_solid_10.png"))
            .unwrap()
            .to_rgba8();
        // First 90 cells of row 0 are seen
        assert_eq!(solid.get_pixel(5, 5)[3], 0);
        assert_eq!(solid.get_pixel(3000, 5)[3], 255);
    }

    #[test]
    fn test_tiles_only() {
        let dir = tempdir().unwrap();
        let world = world();
        let selection = LayerSelection {
            layers: vec![0],
            ..Default::default()
        };
        let config = RenderConfig {
            pyramid: PyramidConfig {
                tile_size: 2048,
                ..Default::default()
            },
            ..Default::default()
        };
        let summary = export_images(&world, &selection, dir.path(), &config, false, true).unwrap();
        assert_eq!(summary.images, 0);
        assert_eq!(summary.tile_sets, 1);
        assert!(!dir.path().join("o_0.png").exists());
        assert!(tile_path(&dir.path().join("o_0_tiles"), 0, 0, 0).exists());
    }
}
