//! Lookup table from CRS identifier to PROJ.4 definition string.

use std::path::Path;
use std::sync::LazyLock;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use common::SerdeFormat;

use crate::error::{Error, Result};

/// One `(identifier, definition)` entry of an external definition list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrsDefinition {
    pub id: String,
    pub definition: String,
}

impl CrsDefinition {
    pub fn new(id: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            definition: definition.into(),
        }
    }
}

/// CRS identifiers are matched case-insensitively (`epsg:3857` == `EPSG:3857`).
#[derive(Debug, Clone, Default)]
pub struct CrsTable {
    entries: HashMap<String, String>,
}

static BUILTIN: LazyLock<CrsTable> = LazyLock::new(|| CrsTable::from_entries(builtin_entries()));

impl CrsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Geographic, Web Mercator, UTM and Japanese plane-rectangular systems.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = CrsDefinition>) -> Self {
        let mut table = Self::new();
        table.extend(entries);
        table
    }

    /// Read a YAML or JSON list of [`CrsDefinition`] entries; the format
    /// follows the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        let mut table = Self::new();
        table.extend_from_file(path)?;
        Ok(table)
    }

    pub fn extend_from_file(&mut self, path: &Path) -> Result<()> {
        let format = SerdeFormat::from_path(path)?;
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: Vec<CrsDefinition> = format.deserialize(&text)?;
        tracing::debug!(path = %path.display(), count = entries.len(), "loaded CRS definitions");
        self.extend(entries);
        Ok(())
    }

    /// Later entries replace earlier ones with the same identifier.
    pub fn insert(&mut self, id: &str, definition: impl Into<String>) {
        self.entries.insert(normalize_id(id), definition.into());
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(&normalize_id(id)).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(&normalize_id(id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Extend<CrsDefinition> for CrsTable {
    fn extend<I: IntoIterator<Item = CrsDefinition>>(&mut self, iter: I) {
        for entry in iter {
            self.insert(&entry.id, entry.definition);
        }
    }
}

fn normalize_id(id: &str) -> String {
    id.trim().to_ascii_uppercase()
}

// =============================================================================
// Built-in definitions
// =============================================================================

const GRS80_JGD: &str = "+ellps=GRS80 +towgs84=0,0,0,0,0,0,0";
const BESSEL_TOKYO: &str = "+ellps=bessel +towgs84=-146.414,507.337,680.507,0,0,0,0";

/// Origins (lat, lon) of Japan Plane Rectangular CS zones I–XIX.
const JAPAN_PLANE_ORIGINS: [(f64, f64); 19] = [
    (33.0, 129.5),
    (33.0, 131.0),
    (36.0, 132.0 + 10.0 / 60.0),
    (33.0, 133.5),
    (36.0, 134.0 + 20.0 / 60.0),
    (36.0, 136.0),
    (36.0, 137.0 + 10.0 / 60.0),
    (36.0, 138.5),
    (36.0, 139.0 + 50.0 / 60.0),
    (40.0, 140.0 + 50.0 / 60.0),
    (44.0, 140.25),
    (44.0, 142.25),
    (44.0, 144.25),
    (26.0, 142.0),
    (26.0, 127.5),
    (26.0, 124.0),
    (26.0, 131.0),
    (20.0, 136.0),
    (26.0, 154.0),
];

fn epsg(code: u32) -> String {
    format!("EPSG:{code}")
}

fn builtin_entries() -> Vec<CrsDefinition> {
    let mut entries = vec![
        CrsDefinition::new(epsg(4326), "+proj=longlat +datum=WGS84 +no_defs"),
        CrsDefinition::new(epsg(4612), format!("+proj=longlat {GRS80_JGD} +no_defs")),
        CrsDefinition::new(epsg(6668), format!("+proj=longlat {GRS80_JGD} +no_defs")),
        CrsDefinition::new(epsg(4301), format!("+proj=longlat {BESSEL_TOKYO} +no_defs")),
        CrsDefinition::new(
            epsg(3857),
            "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs",
        ),
    ];

    for zone in 1..=60u32 {
        entries.push(CrsDefinition::new(
            epsg(32600 + zone),
            format!("+proj=utm +zone={zone} +datum=WGS84 +units=m +no_defs"),
        ));
        entries.push(CrsDefinition::new(
            epsg(32700 + zone),
            format!("+proj=utm +zone={zone} +south +datum=WGS84 +units=m +no_defs"),
        ));
    }

    // UTM 51N-55N on Tokyo, JGD2000 and JGD2011.
    for (i, zone) in (51..=55u32).enumerate() {
        let i = i as u32;
        entries.push(CrsDefinition::new(
            epsg(3092 + i),
            format!("+proj=utm +zone={zone} {BESSEL_TOKYO} +units=m +no_defs"),
        ));
        entries.push(CrsDefinition::new(
            epsg(3097 + i),
            format!("+proj=utm +zone={zone} {GRS80_JGD} +units=m +no_defs"),
        ));
        entries.push(CrsDefinition::new(
            epsg(6688 + i),
            format!("+proj=utm +zone={zone} {GRS80_JGD} +units=m +no_defs"),
        ));
    }

    for (i, (lat_0, lon_0)) in JAPAN_PLANE_ORIGINS.iter().enumerate() {
        let i = i as u32;
        let plane = |datum: &str| {
            format!(
                "+proj=tmerc +lat_0={lat_0} +lon_0={lon_0} +k=0.9999 +x_0=0 +y_0=0 {datum} +units=m +no_defs"
            )
        };
        entries.push(CrsDefinition::new(epsg(30161 + i), plane(BESSEL_TOKYO)));
        entries.push(CrsDefinition::new(epsg(2443 + i), plane(GRS80_JGD)));
        entries.push(CrsDefinition::new(epsg(6669 + i), plane(GRS80_JGD)));
    }

    entries
}
