//! Terrain-type records as they appear in game data JSON.

use serde::Deserialize;

use super::tables;

/// Type tag of the records the template store cares about
pub const OVERMAP_TERRAIN: &str = "overmap_terrain";

/// A field that may be written as one value or a list of values.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

/// Display name, either plain or in the translatable `{ "str": ... }` form.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawName {
    Plain(String),
    Translatable { str: String },
}

impl RawName {
    pub fn as_str(&self) -> &str {
        match self {
            RawName::Plain(s) => s,
            RawName::Translatable { str } => str,
        }
    }
}

/// Drawing symbol, either a numeric code or a one-character string.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawSymbol {
    Code(u32),
    Text(String),
}

impl RawSymbol {
    pub fn glyph(&self) -> Option<char> {
        match self {
            RawSymbol::Code(code) => tables::glyph_for_code(*code),
            RawSymbol::Text(text) => text.chars().next(),
        }
    }
}

/// One terrain-type record, possibly partial.
///
/// Every field is optional so that inheritance can tell "not set here" from
/// "set to an empty value".
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct RawTerrain {
    #[serde(default)]
    pub id: Option<OneOrMany>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(rename = "abstract", default)]
    pub abstract_id: Option<String>,
    #[serde(default)]
    pub name: Option<RawName>,
    #[serde(default)]
    pub sym: Option<RawSymbol>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(rename = "copy-from", default)]
    pub copy_from: Option<String>,
    #[serde(default)]
    pub flags: Option<Vec<String>>,
}

impl RawTerrain {
    /// Keys this record is stored under: its abstract name, or each of its ids.
    pub fn keys(&self) -> Vec<String> {
        if let Some(name) = &self.abstract_id {
            return vec![name.clone()];
        }
        self.id.clone().map(OneOrMany::into_vec).unwrap_or_default()
    }

    pub fn is_abstract(&self) -> bool {
        self.abstract_id.is_some()
    }

    /// Apply every field this record sets on top of `self`.
    pub fn overlay(&mut self, child: &RawTerrain) {
        if child.name.is_some() {
            self.name = child.name.clone();
        }
        if child.sym.is_some() {
            self.sym = child.sym.clone();
        }
        if child.color.is_some() {
            self.color = child.color.clone();
        }
        if child.flags.is_some() {
            self.flags = child.flags.clone();
        }
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags
            .as_ref()
            .is_some_and(|flags| flags.iter().any(|f| f == flag))
    }
}
