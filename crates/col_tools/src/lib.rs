//! # Colonia Development Tools
//!
//! Command-line helpers for working with maps:
//! - Map generation to ASCII files
//! - Ocean partitioning with a region table or RON export
//! - Region invariant validation

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod validate;

use std::fmt::Write as _;
use std::path::Path;

use col_core::error::{GameError, Result};
use col_core::map::Map;

/// Read an ASCII map file.
pub fn read_ascii_map(path: &Path) -> Result<Map> {
    let text = std::fs::read_to_string(path).map_err(|e| GameError::Persistence {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Map::from_ascii(&text)
}

/// Write text to a file.
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).map_err(|e| GameError::Persistence {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// One line per region: id, type, parent, size and bounds.
#[must_use]
pub fn region_table(map: &Map) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<28} {:<8} {:<22} {:>6}  bounds",
        "region", "type", "parent", "tiles"
    );
    for region in map.regions().iter() {
        let parent = region
            .parent
            .as_ref()
            .map_or_else(|| "-".to_owned(), ToString::to_string);
        let bounds = validate::BoundsText(region.bounds());
        let _ = writeln!(
            out,
            "{:<28} {:<8} {:<22} {:>6}  {bounds}",
            region.id().to_string(),
            region.region_type.to_string(),
            parent,
            region.size()
        );
    }
    out
}
