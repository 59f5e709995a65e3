//! Game-data loading: finds the terrain definition files of the base game and
//! the save's active mods, orders them, and decodes only the records the
//! template store needs.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde_json::Value;
use walkdir::WalkDir;

use crate::error::{MapError, Result};
use crate::templates::{RawTerrain, ResolveReport, TemplateSource, TemplateStore, OVERMAP_TERRAIN};

/// Collect every JSON file under `dir`, recursively.
fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
            MapError::io(path, e.into())
        })?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|e| e.to_str()) == Some("json")
        {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Ident of a mod directory, read from its `modinfo.json`.
fn mod_ident(mod_dir: &Path) -> Option<String> {
    let path = mod_dir.join("modinfo.json");
    let text = fs::read_to_string(&path).ok()?;
    let value: Value = match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => {
            warn!("Skipping mod {}: {}", mod_dir.display(), e);
            return None;
        }
    };
    let first = match &value {
        Value::Array(items) => items.first()?,
        other => other,
    };
    first
        .get("ident")
        .or_else(|| first.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Compare two paths by load order: shallower files first, then by path.
pub fn load_order(a: &Path, b: &Path) -> Ordering {
    let depth_a = a.components().count();
    let depth_b = b.components().count();
    depth_a.cmp(&depth_b).then_with(|| a.cmp(b))
}

/// All game-data files to load, in load order.
///
/// Base game files come from `<root>/data/json`; a mod under
/// `<root>/data/mods` contributes its files only when its ident is active.
pub fn source_files(game_root: &Path, active_mods: &[String]) -> Result<Vec<PathBuf>> {
    let json_root = game_root.join("data").join("json");
    if !json_root.is_dir() {
        return Err(MapError::MissingDirectory(json_root));
    }
    let mut files = json_files(&json_root)?;

    let mods_root = game_root.join("data").join("mods");
    if mods_root.is_dir() {
        let entries = fs::read_dir(&mods_root).map_err(|e| MapError::io(&mods_root, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| MapError::io(&mods_root, e))?;
            let mod_dir = entry.path();
            if !mod_dir.is_dir() {
                continue;
            }
            match mod_ident(&mod_dir) {
                Some(ident) if active_mods.contains(&ident) => {
                    debug!("Including mod '{}'", ident);
                    files.extend(json_files(&mod_dir)?);
                }
                Some(_) => {}
                None => warn!("No usable modinfo.json in {}", mod_dir.display()),
            }
        }
    }

    files.sort_by(|a, b| load_order(a, b));
    Ok(files)
}

/// Decode the terrain records of one JSON document.
///
/// Records of other types are dropped before strict decoding, so unrelated
/// game data with shapes this crate does not model never has to parse.
/// A terrain record that fails to decode is skipped.
pub fn parse_terrain_records(text: &str) -> std::result::Result<Vec<RawTerrain>, serde_json::Error> {
    if !text.contains(OVERMAP_TERRAIN) {
        return Ok(Vec::new());
    }

    let values = match serde_json::from_str::<Value>(text)? {
        Value::Array(items) => items,
        object @ Value::Object(_) => vec![object],
        _ => return Ok(Vec::new()),
    };

    let records = values
        .into_iter()
        .filter(|v| v.get("type").and_then(Value::as_str) == Some(OVERMAP_TERRAIN))
        .filter_map(|v| match serde_json::from_value::<RawTerrain>(v) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping malformed terrain record: {}", e);
                None
            }
        })
        .collect();

    Ok(records)
}

/// Read terrain records from `files`, in the given order.
///
/// Files that cannot be read as UTF-8 text or parsed as JSON are skipped.
pub fn load_terrain_records(files: &[PathBuf]) -> Result<TemplateSource> {
    let mut source = TemplateSource::new();
    for path in files {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Skipping unreadable {}: {}", path.display(), e);
                continue;
            }
        };
        match parse_terrain_records(&text) {
            Ok(records) => records.into_iter().for_each(|r| source.push(r)),
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
    }
    Ok(source)
}

/// Load and resolve the template store for a game install and mod list.
pub fn load_template_store(
    game_root: &Path,
    active_mods: &[String],
) -> Result<(TemplateStore, ResolveReport)> {
    let files = source_files(game_root, active_mods)?;
    info!("Loading terrain definitions from {} files", files.len());
    let source = load_terrain_records(&files)?;
    Ok(TemplateStore::resolve(&source))
}
