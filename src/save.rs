//! Save data: overmap chunks of run-length encoded terrain and per-character
//! visibility, plus a thin reader for a save directory.
//!
//! Layout read from disk:
//! - `o.<x>.<y>`: terrain chunk, `{ "layers": [[[id, count], ...], ...] }`
//! - `#<base64 name>.seen.<x>.<y>`: visibility chunk, `{ "visible": [[[bool, count], ...], ...] }`
//! - `mods.json`: list of active mod idents
//!
//! Chunk files may start with a `# version N` comment line.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use base64::Engine;
use log::{info, warn};
use serde::Deserialize;

use crate::error::{MapError, Result};

/// `count` consecutive cells of one terrain
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "(String, u32)")]
pub struct TerrainRun {
    pub id: String,
    pub count: u32,
}

impl From<(String, u32)> for TerrainRun {
    fn from((id, count): (String, u32)) -> Self {
        Self { id, count }
    }
}

impl TerrainRun {
    pub fn new(id: impl Into<String>, count: u32) -> Self {
        Self { id: id.into(), count }
    }
}

/// `count` consecutive cells that were seen (or not)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "(bool, u32)")]
pub struct SeenRun {
    pub seen: bool,
    pub count: u32,
}

impl From<(bool, u32)> for SeenRun {
    fn from((seen, count): (bool, u32)) -> Self {
        Self { seen, count }
    }
}

/// Something with a run length
pub trait Run {
    fn count(&self) -> u32;
}

impl Run for TerrainRun {
    fn count(&self) -> u32 {
        self.count
    }
}

impl Run for SeenRun {
    fn count(&self) -> u32 {
        self.count
    }
}

/// Terrain for one chunk, one run list per vertical layer
#[derive(Clone, Debug, PartialEq)]
pub struct OvermapChunk {
    pub x: i32,
    pub y: i32,
    pub layers: Vec<Vec<TerrainRun>>,
}

/// What one character has seen of one chunk
#[derive(Clone, Debug, PartialEq)]
pub struct VisibilityChunk {
    pub x: i32,
    pub y: i32,
    pub layers: Vec<Vec<SeenRun>>,
}

/// Everything the world assembler needs from a save
#[derive(Clone, Debug, Default)]
pub struct SaveData {
    pub name: String,
    pub mods: Vec<String>,
    pub chunks: Vec<OvermapChunk>,
    /// Character name -> visibility chunks
    pub seen: BTreeMap<String, Vec<VisibilityChunk>>,
}

#[derive(Deserialize)]
struct TerrainFile {
    layers: Vec<Vec<TerrainRun>>,
}

#[derive(Deserialize)]
struct SeenFile {
    visible: Vec<Vec<SeenRun>>,
}

/// Strip a leading `# version` comment line.
fn json_body(text: &str) -> &str {
    if text.starts_with('#') {
        text.split_once('\n').map(|(_, rest)| rest).unwrap_or("")
    } else {
        text
    }
}

/// Parse the trailing `.<x>.<y>` of a chunk file name.
fn chunk_coords(rest: &str) -> Option<(i32, i32)> {
    let (x, y) = rest.split_once('.')?;
    Some((x.parse().ok()?, y.parse().ok()?))
}

/// Character name encoded in a seen-file prefix (`#<base64>`).
fn character_name(prefix: &str) -> Option<String> {
    let encoded = prefix.strip_prefix('#')?;
    let bytes = base64::engine::general_purpose::STANDARD.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}

enum ChunkFile {
    Terrain(i32, i32),
    Seen(String, i32, i32),
}

fn classify(file_name: &str) -> Option<ChunkFile> {
    if let Some(rest) = file_name.strip_prefix("o.") {
        let (x, y) = chunk_coords(rest)?;
        return Some(ChunkFile::Terrain(x, y));
    }
    let (prefix, rest) = file_name.split_once(".seen.")?;
    let (x, y) = chunk_coords(rest)?;
    Some(ChunkFile::Seen(character_name(prefix)?, x, y))
}

impl SaveData {
    /// Read every chunk of a save directory.
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(MapError::MissingDirectory(dir.to_path_buf()));
        }

        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mods_path = dir.join("mods.json");
        let mods = if mods_path.is_file() {
            let text = fs::read_to_string(&mods_path).map_err(|e| MapError::io(&mods_path, e))?;
            serde_json::from_str(json_body(&text)).map_err(|e| MapError::json(&mods_path, e))?
        } else {
            Vec::new()
        };

        let mut save = SaveData {
            name,
            mods,
            ..Default::default()
        };

        let entries = fs::read_dir(dir).map_err(|e| MapError::io(dir, e))?;
        for entry in entries {
            let path = entry.map_err(|e| MapError::io(dir, e))?.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(kind) = classify(file_name) else {
                continue;
            };

            let text = fs::read_to_string(&path).map_err(|e| MapError::io(&path, e))?;
            let body = json_body(&text);
            match kind {
                ChunkFile::Terrain(x, y) => {
                    let file: TerrainFile =
                        serde_json::from_str(body).map_err(|e| MapError::json(&path, e))?;
                    save.chunks.push(OvermapChunk { x, y, layers: file.layers });
                }
                ChunkFile::Seen(character, x, y) => {
                    let file: SeenFile =
                        serde_json::from_str(body).map_err(|e| MapError::json(&path, e))?;
                    save.seen
                        .entry(character)
                        .or_default()
                        .push(VisibilityChunk { x, y, layers: file.visible });
                }
            }
        }

        if save.chunks.is_empty() {
            warn!("Save {} contains no overmap chunks", dir.display());
        }

        // Directory order is arbitrary; keep assembly deterministic
        save.chunks.sort_by_key(|c| (c.y, c.x));
        for chunks in save.seen.values_mut() {
            chunks.sort_by_key(|c| (c.y, c.x));
        }

        info!(
            "Loaded save '{}': {} chunks, {} characters, {} mods",
            save.name,
            save.chunks.len(),
            save.seen.len(),
            save.mods.len()
        );
        Ok(save)
    }
}
