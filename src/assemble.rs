//! World assembly: expands sparse run-length chunks into dense per-layer
//! grids for the terrain and for every character's visibility.

use std::collections::{BTreeMap, HashMap};

use log::{info, warn};

use crate::coords::{ChunkBounds, CELLS_PER_LAYER, CHUNK_SIZE, LAYER_COUNT};
use crate::error::{MapError, Result};
use crate::grid::{DenseGrid, LayerView, SeenCell, TerrainCell, SEEN_PALETTE};
use crate::save::{Run, SaveData, TerrainRun};
use crate::templates::TemplateStore;

/// Template whose colours fill chunks the save does not contain
const FILLER_TEMPLATE: &str = "default";

/// Non-fatal findings from one assembly
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssemblyReport {
    /// Unknown terrain ID -> number of run entries referring to it
    pub missing_terrain: BTreeMap<String, u64>,
    /// Chunks present in the save
    pub chunks: usize,
    /// Visibility chunks outside the terrain bounds
    pub ignored_seen_chunks: usize,
}

/// The fully assembled world.
#[derive(Clone, Debug)]
pub struct World {
    pub name: String,
    pub bounds: ChunkBounds,
    /// Distinct terrain looks; key 0 is the filler
    pub palette: Vec<TerrainCell>,
    /// One grid per vertical layer
    pub terrain: Vec<DenseGrid>,
    /// Character name -> one grid per vertical layer
    pub seen: BTreeMap<String, Vec<DenseGrid>>,
    pub report: AssemblyReport,
}

impl World {
    pub fn columns(&self) -> usize {
        self.bounds.columns()
    }

    pub fn rows(&self) -> usize {
        self.bounds.rows()
    }

    pub fn terrain_layer(&self, z: usize) -> Result<LayerView<'_, TerrainCell>> {
        let grid = self.terrain.get(z).ok_or(MapError::LayerOutOfRange(z))?;
        Ok(LayerView::new(grid, &self.palette))
    }

    /// Visibility grids of layer `z` for every character, by name.
    pub fn seen_layers(&self, z: usize) -> Result<Vec<(&str, LayerView<'_, SeenCell>)>> {
        if z >= LAYER_COUNT {
            return Err(MapError::LayerOutOfRange(z));
        }
        Ok(self
            .seen
            .iter()
            .map(|(name, grids)| (name.as_str(), LayerView::new(&grids[z], &SEEN_PALETTE)))
            .collect())
    }
}

/// Interns terrain IDs into palette keys.
struct TerrainPalette<'s> {
    store: &'s TemplateStore,
    cells: Vec<TerrainCell>,
    keys: HashMap<String, u32>,
}

impl<'s> TerrainPalette<'s> {
    fn new(store: &'s TemplateStore) -> Self {
        Self {
            store,
            cells: vec![TerrainCell::filler(store.color(FILLER_TEMPLATE))],
            keys: HashMap::new(),
        }
    }

    fn key(&mut self, id: &str) -> u32 {
        if let Some(&key) = self.keys.get(id) {
            return key;
        }
        let key = self.cells.len() as u32;
        self.cells.push(TerrainCell {
            id: id.to_string(),
            name: self.store.name(id).to_string(),
            symbol: self.store.symbol(id),
            colors: self.store.color(id),
        });
        self.keys.insert(id.to_string(), key);
        key
    }
}

/// Reject a chunk whose layers do not each cover exactly one chunk layer.
fn check_runs<R: Run>(x: i32, y: i32, layers: &[Vec<R>]) -> Result<()> {
    if layers.len() != LAYER_COUNT {
        return Err(MapError::LayerCount {
            x,
            y,
            found: layers.len(),
            expected: LAYER_COUNT,
        });
    }
    for (layer, runs) in layers.iter().enumerate() {
        let total: u64 = runs.iter().map(|r| u64::from(r.count())).sum();
        if total != CELLS_PER_LAYER as u64 {
            return Err(MapError::MalformedRuns {
                x,
                y,
                layer,
                total,
                expected: CELLS_PER_LAYER,
            });
        }
    }
    Ok(())
}

/// Write one layer's runs into the chunk's block of `grid`, row-major.
///
/// Runs must already be checked to sum to one chunk layer.
fn place_runs<R, F>(grid: &mut DenseGrid, bounds: &ChunkBounds, chunk_index: usize, runs: &[R], mut key: F)
where
    R: Run,
    F: FnMut(&R) -> u32,
{
    let mut offset = 0;
    for run in runs {
        let k = key(run);
        let mut remaining = run.count() as usize;
        while remaining > 0 {
            let (column, row) = bounds.cell_position(chunk_index, offset);
            let len = remaining.min(CHUNK_SIZE - offset % CHUNK_SIZE);
            grid.fill_row(column, row, len, k);
            offset += len;
            remaining -= len;
        }
    }
}

fn new_layers(bounds: &ChunkBounds) -> Vec<DenseGrid> {
    (0..LAYER_COUNT)
        .map(|_| DenseGrid::new(bounds.columns(), bounds.rows()))
        .collect()
}

/// Assemble every terrain and visibility layer of a save.
///
/// Unknown terrain IDs fall back through the template store and are
/// tallied; malformed run-length data aborts the whole assembly.
pub fn build_world(save: &SaveData, store: &TemplateStore) -> Result<World> {
    let bounds = ChunkBounds::from_coords(save.chunks.iter().map(|c| (c.x, c.y)));
    info!(
        "Assembling {} chunks into {}x{} cells ({}x{} chunks, x {}..={}, y {}..={})",
        save.chunks.len(),
        bounds.columns(),
        bounds.rows(),
        bounds.chunks_x(),
        bounds.chunks_y(),
        bounds.min_x,
        bounds.max_x,
        bounds.min_y,
        bounds.max_y
    );

    let mut report = AssemblyReport {
        chunks: save.chunks.len(),
        ..Default::default()
    };
    let mut palette = TerrainPalette::new(store);
    let mut terrain = new_layers(&bounds);

    for chunk in &save.chunks {
        check_runs(chunk.x, chunk.y, &chunk.layers)?;
        let Some(index) = bounds.chunk_index(chunk.x, chunk.y) else {
            continue;
        };
        for (grid, runs) in terrain.iter_mut().zip(&chunk.layers) {
            place_runs(grid, &bounds, index, runs, |run: &TerrainRun| {
                if !store.exists(&run.id) {
                    *report.missing_terrain.entry(run.id.clone()).or_insert(0) += 1;
                }
                palette.key(&run.id)
            });
        }
    }

    let mut seen = BTreeMap::new();
    for (name, chunks) in &save.seen {
        let mut layers = new_layers(&bounds);
        for chunk in chunks {
            check_runs(chunk.x, chunk.y, &chunk.layers)?;
            let Some(index) = bounds.chunk_index(chunk.x, chunk.y) else {
                warn!(
                    "Ignoring visibility chunk ({}, {}) of '{}': outside the world",
                    chunk.x, chunk.y, name
                );
                report.ignored_seen_chunks += 1;
                continue;
            };
            for (grid, runs) in layers.iter_mut().zip(&chunk.layers) {
                place_runs(grid, &bounds, index, runs, |run| SeenCell::key(run.seen));
            }
        }
        seen.insert(name.clone(), layers);
    }

    for (id, count) in &report.missing_terrain {
        warn!("Missing terrain: {} x {}", id, count);
    }
    info!(
        "Assembled {} terrain looks, {} characters",
        palette.cells.len(),
        seen.len()
    );

    Ok(World {
        name: save.name.clone(),
        bounds,
        palette: palette.cells,
        terrain,
        seen,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Drawable, UNSEEN_FG};
    use crate::save::{OvermapChunk, SeenRun, VisibilityChunk};
    use crate::templates::tables::TRANSPARENT;
    use crate::templates::TemplateSource;

    fn store() -> TemplateStore {
        let records = [
            r#"{ "type": "overmap_terrain", "id": "forest", "name": "forest", "sym": "F", "color": "green", "flags": ["NO_ROTATE"] }"#,
            r#"{ "type": "overmap_terrain", "id": "field", "name": "field", "sym": ".", "color": "brown", "flags": ["NO_ROTATE"] }"#,
            r#"{ "type": "overmap_terrain", "id": "default", "sym": " ", "color": "i_brown" }"#,
        ];
        let source: TemplateSource = records
            .iter()
            .map(|r| serde_json::from_str(r).unwrap())
            .collect();
        TemplateStore::resolve(&source).0
    }

    fn uniform_chunk(x: i32, y: i32, id: &str) -> OvermapChunk {
        OvermapChunk {
            x,
            y,
            layers: vec![vec![TerrainRun::new(id, CELLS_PER_LAYER as u32)]; LAYER_COUNT],
        }
    }

    fn layer_text(world: &World, z: usize) -> Vec<String> {
        let view = world.terrain_layer(z).unwrap();
        (0..view.rows())
            .map(|r| view.row_cells(r).map(|c| c.symbol()).collect())
            .collect()
    }

    #[test]
    fn test_two_forest_chunks() {
        let save = SaveData {
            name: "test".into(),
            chunks: vec![uniform_chunk(0, 0, "forest"), uniform_chunk(1, 0, "forest")],
            ..Default::default()
        };
        let world = build_world(&save, &store()).unwrap();

        assert_eq!((world.columns(), world.rows()), (360, 180));
        let lines = layer_text(&world, 0);
        assert_eq!(lines.len(), 180);
        assert!(lines.iter().all(|l| l.len() == 360 && l.chars().all(|c| c == 'F')));
        assert!(world.report.missing_terrain.is_empty());
    }

    #[test]
    fn test_runs_cross_rows_in_place() {
        // 200 field cells: all of row 0 and 20 cells of row 1
        let mut chunk = uniform_chunk(-1, 0, "forest");
        chunk.layers[10] = vec![
            TerrainRun::new("field", 200),
            TerrainRun::new("forest", CELLS_PER_LAYER as u32 - 200),
        ];
        let save = SaveData {
            chunks: vec![chunk],
            ..Default::default()
        };
        let world = build_world(&save, &store()).unwrap();
        assert_eq!(world.bounds.min_x, -1);
        assert_eq!((world.columns(), world.rows()), (360, 180));

        let view = world.terrain_layer(10).unwrap();
        assert_eq!(view.cell(179, 0).symbol(), '.');
        assert_eq!(view.cell(19, 1).symbol(), '.');
        assert_eq!(view.cell(20, 1).symbol(), 'F');
        // Origin chunk (0, 0) is absent and filled
        assert_eq!(view.cell(180, 0).symbol(), ' ');
        assert!(view.cell(180, 0).is_blank());
        assert_eq!(view.cell(180, 0).colors(), store().color("default"));
    }

    #[test]
    fn test_malformed_runs_abort() {
        let mut chunk = uniform_chunk(0, 0, "forest");
        chunk.layers[3] = vec![TerrainRun::new("forest", 100)];
        let save = SaveData {
            chunks: vec![chunk],
            ..Default::default()
        };
        match build_world(&save, &store()) {
            Err(MapError::MalformedRuns { layer, total, .. }) => {
                assert_eq!(layer, 3);
                assert_eq!(total, 100);
            }
            other => panic!("expected MalformedRuns, got {:?}", other.map(|w| w.name)),
        }

        let mut chunk = uniform_chunk(0, 0, "forest");
        chunk.layers.pop();
        let save = SaveData {
            chunks: vec![chunk],
            ..Default::default()
        };
        assert!(matches!(
            build_world(&save, &store()),
            Err(MapError::LayerCount { found: 20, .. })
        ));
    }

    #[test]
    fn test_missing_terrain_tally() {
        let mut chunk = uniform_chunk(0, 0, "forest");
        chunk.layers[0] = vec![
            TerrainRun::new("mystery", 10),
            TerrainRun::new("forest", 10),
            TerrainRun::new("mystery", CELLS_PER_LAYER as u32 - 20),
        ];
        let save = SaveData {
            chunks: vec![chunk],
            ..Default::default()
        };
        let world = build_world(&save, &store()).unwrap();
        assert_eq!(world.report.missing_terrain.get("mystery"), Some(&2));
        let view = world.terrain_layer(0).unwrap();
        assert_eq!(view.cell(0, 0).symbol(), '?');
        assert_eq!(view.cell(0, 0).name, "?");
        assert!(world.terrain_layer(21).is_err());
    }

    #[test]
    fn test_visibility_layers() {
        let mut visible = vec![vec![SeenRun { seen: false, count: CELLS_PER_LAYER as u32 }]; LAYER_COUNT];
        visible[0] = vec![
            SeenRun { seen: true, count: 180 },
            SeenRun { seen: false, count: CELLS_PER_LAYER as u32 - 180 },
        ];
        let mut save = SaveData {
            chunks: vec![uniform_chunk(0, 0, "forest"), uniform_chunk(0, 1, "forest")],
            ..Default::default()
        };
        save.seen.insert(
            "Alice".into(),
            vec![
                VisibilityChunk { x: 0, y: 1, layers: visible.clone() },
                VisibilityChunk { x: 5, y: 5, layers: visible },
            ],
        );

        let world = build_world(&save, &store()).unwrap();
        assert_eq!(world.report.ignored_seen_chunks, 1);

        let layers = world.seen_layers(0).unwrap();
        assert_eq!(layers.len(), 1);
        let (name, view) = layers[0];
        assert_eq!(name, "Alice");
        assert_eq!((view.columns(), view.rows()), (180, 360));
        assert_eq!(view.cell(0, 0).colors().fg, UNSEEN_FG);
        assert_eq!(view.cell(0, 180).colors().fg, TRANSPARENT);
        assert_eq!(view.cell(179, 180).colors().bg, TRANSPARENT);
        assert_eq!(view.cell(0, 181).colors().fg, UNSEEN_FG);
    }
}
