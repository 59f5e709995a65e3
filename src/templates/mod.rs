//! Terrain template store.
//!
//! Turns the raw, inheritance-chained terrain records of the game data into a
//! flat table of concrete templates, including the generated rotation and
//! connector variants the save files refer to.

pub mod raw;
pub mod tables;

use std::collections::{BTreeMap, HashMap, HashSet};

use log::{info, warn};

pub use raw::{RawTerrain, OVERMAP_TERRAIN};
pub use tables::ColorPair;

/// Keep the base glyph for every rotation variant
pub const FLAG_NO_ROTATE: &str = "NO_ROTATE";
/// Generate the sixteen connector variants instead of rotations
pub const FLAG_LINEAR: &str = "LINEAR";

/// Glyph and name returned for IDs the store does not know
pub const UNKNOWN_SYMBOL: char = '?';
pub const UNKNOWN_NAME: &str = "?";

/// A resolved, placeable terrain kind
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainTemplate {
    pub id: String,
    pub name: String,
    pub symbol: Option<char>,
    pub color: String,
    pub flags: Vec<String>,
}

impl TerrainTemplate {
    fn from_raw(id: &str, raw: &RawTerrain) -> Self {
        Self {
            id: id.to_string(),
            name: raw.name.as_ref().map(|n| n.as_str().to_string()).unwrap_or_default(),
            symbol: raw.sym.as_ref().and_then(|s| s.glyph()),
            color: raw.color.clone().unwrap_or_default(),
            flags: raw.flags.clone().unwrap_or_default(),
        }
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    fn variant(&self, suffix: &str, symbol: Option<char>) -> Self {
        Self {
            id: format!("{}{}", self.id, suffix),
            symbol,
            ..self.clone()
        }
    }
}

/// Counts from one resolution pass
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolveReport {
    /// Concrete templates taken from the data
    pub templates: usize,
    /// Generated rotation/connector variants
    pub variants: usize,
    /// Unknown colour name -> number of templates using it
    pub unknown_colors: BTreeMap<String, usize>,
}

/// Raw records keyed by ID (or abstract name), in load order.
///
/// A later record with the same key replaces the earlier one, which is how
/// mods override the base game.
#[derive(Clone, Debug, Default)]
pub struct TemplateSource {
    records: BTreeMap<String, RawTerrain>,
}

impl TemplateSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: RawTerrain) {
        if record.kind != OVERMAP_TERRAIN {
            return;
        }
        for key in record.keys() {
            self.records.insert(key, record.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Collect `key` and its ancestors, leaf first.
    fn chain<'a>(&'a self, key: &str, leaf: &'a RawTerrain) -> Vec<&'a RawTerrain> {
        let mut chain = vec![leaf];
        let mut seen = HashSet::from([key.to_string()]);
        let mut current = leaf;

        while let Some(parent) = &current.copy_from {
            if !seen.insert(parent.clone()) {
                warn!("Inheritance cycle at '{}' while resolving '{}'", parent, key);
                break;
            }
            match self.records.get(parent) {
                Some(record) => {
                    chain.push(record);
                    current = record;
                }
                None => {
                    warn!("'{}' copies from unknown '{}'", key, parent);
                    break;
                }
            }
        }

        chain
    }

    /// Fold the inheritance chain of `key` root-first.
    fn flatten(&self, key: &str, leaf: &RawTerrain) -> RawTerrain {
        let mut folded = RawTerrain::default();
        for ancestor in self.chain(key, leaf).into_iter().rev() {
            folded.overlay(ancestor);
        }
        folded
    }
}

impl FromIterator<RawTerrain> for TemplateSource {
    fn from_iter<I: IntoIterator<Item = RawTerrain>>(iter: I) -> Self {
        let mut source = TemplateSource::new();
        for record in iter {
            source.push(record);
        }
        source
    }
}

/// Flat lookup table of concrete terrain templates.
///
/// Lookups never fail: unknown IDs are expected (terrain from disabled mods)
/// and answer with fallbacks.
#[derive(Clone, Debug, Default)]
pub struct TemplateStore {
    built: HashMap<String, TerrainTemplate>,
}

impl TemplateStore {
    /// Resolve every record of `source` into concrete templates.
    pub fn resolve(source: &TemplateSource) -> (Self, ResolveReport) {
        let mut built = HashMap::new();
        let mut report = ResolveReport::default();
        let mut bases = Vec::new();

        for (key, record) in &source.records {
            if record.is_abstract() {
                continue;
            }
            let folded = source.flatten(key, record);
            let template = TerrainTemplate::from_raw(key, &folded);

            if !template.color.is_empty() && tables::named_color(&template.color).is_none() {
                *report.unknown_colors.entry(template.color.clone()).or_insert(0) += 1;
            }

            bases.push(template.clone());
            built.insert(key.clone(), template);
            report.templates += 1;
        }

        // Explicit records win over generated variants of the same ID
        for base in &bases {
            for variant in generate_variants(base) {
                if !built.contains_key(&variant.id) {
                    built.insert(variant.id.clone(), variant);
                    report.variants += 1;
                }
            }
        }

        info!(
            "Resolved {} terrain templates ({} generated variants)",
            report.templates, report.variants
        );
        for (color, count) in &report.unknown_colors {
            warn!("Unknown color '{}' used by {} templates", color, count);
        }

        (Self { built }, report)
    }

    pub fn get(&self, id: &str) -> Option<&TerrainTemplate> {
        self.built.get(id)
    }

    pub fn exists(&self, id: &str) -> bool {
        self.built.contains_key(id)
    }

    pub fn symbol(&self, id: &str) -> char {
        self.get(id).and_then(|t| t.symbol).unwrap_or(UNKNOWN_SYMBOL)
    }

    pub fn color(&self, id: &str) -> ColorPair {
        self.get(id)
            .and_then(|t| tables::named_color(&t.color))
            .unwrap_or_else(tables::unset_color)
    }

    pub fn name(&self, id: &str) -> &str {
        self.get(id).map(|t| t.name.as_str()).unwrap_or(UNKNOWN_NAME)
    }

    pub fn len(&self) -> usize {
        self.built.len()
    }

    pub fn is_empty(&self) -> bool {
        self.built.is_empty()
    }
}

/// Variants generated for one concrete template.
fn generate_variants(base: &TerrainTemplate) -> Vec<TerrainTemplate> {
    if base.has_flag(FLAG_LINEAR) {
        return tables::LINEAR_SUFFIXES
            .iter()
            .map(|(suffix, glyph)| base.variant(suffix, Some(*glyph)))
            .collect();
    }
    if base.has_flag(FLAG_NO_ROTATE) {
        return Vec::new();
    }
    tables::ROTATION_SUFFIXES
        .iter()
        .enumerate()
        .map(|(step, suffix)| {
            let symbol = base.symbol.map(|s| tables::rotated_glyph(s, step));
            base.variant(suffix, symbol)
        })
        .collect()
}
