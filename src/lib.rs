//! Overmap atlas library
//!
//! Turns a chunked, run-length encoded overmap save into dense layers and
//! renders them as text, PNG images, tile pyramids and PostGIS rows.

pub mod assemble;
pub mod config;
pub mod coords;
pub mod error;
pub mod export;
pub mod font;
pub mod gamedata;
pub mod grid;
pub mod painter;
pub mod pyramid;
pub mod save;
pub mod templates;

pub use assemble::{build_world, AssemblyReport, World};
pub use config::{CellMetrics, PyramidConfig, RenderConfig};
pub use error::{MapError, Result};
pub use save::SaveData;
pub use templates::{TemplateSource, TemplateStore};
