//! Projection engine seam.
//!
//! The scorer talks to projections only through [`Projector`], so tests can
//! substitute a fake and production code can use [`Proj4Projector`].

use glam::DVec2;
use hashbrown::HashMap;
use parking_lot::RwLock;
use proj4rs::proj::Proj;
use proj4rs::transform::transform;

use crate::error::{Error, Result};

/// Named coordinate systems with forward projection between them.
///
/// Registration is a process-wide, write-once-per-identifier cache: defining
/// an identifier again with identical content must be a no-op, which keeps
/// concurrent lazy registration benign.
pub trait Projector: Sync {
    fn is_defined(&self, crs: &str) -> bool;

    fn define(&self, crs: &str, definition: &str) -> Result<()>;

    fn project(&self, from: &str, to: &str, point: DVec2) -> Result<DVec2>;

    fn project_all(&self, from: &str, to: &str, points: &[DVec2]) -> Result<Vec<DVec2>> {
        points.iter().map(|p| self.project(from, to, *p)).collect()
    }
}

#[derive(Debug, Clone)]
struct Definition {
    proj_string: String,
    /// Longitude/latitude systems take and return degrees at this boundary.
    geographic: bool,
}

/// [`Projector`] backed by the pure-Rust PROJ.4 port `proj4rs`.
///
/// Geographic coordinates are exchanged in degrees as `(lon, lat)`.
#[derive(Debug, Default)]
pub struct Proj4Projector {
    definitions: RwLock<HashMap<String, Definition>>,
}

impl Proj4Projector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defined_count(&self) -> usize {
        self.definitions.read().len()
    }

    fn definition(&self, crs: &str) -> Result<Definition> {
        self.definitions
            .read()
            .get(crs)
            .cloned()
            .ok_or_else(|| Error::UnknownCrs(crs.to_string()))
    }

    fn transformer(&self, from: &str, to: &str) -> Result<Transformer> {
        let source = self.definition(from)?;
        let target = self.definition(to)?;
        Ok(Transformer {
            source_proj: parse(from, &source.proj_string)?,
            target_proj: parse(to, &target.proj_string)?,
            source_is_geographic: source.geographic,
            target_is_geographic: target.geographic,
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

impl Projector for Proj4Projector {
    fn is_defined(&self, crs: &str) -> bool {
        self.definitions.read().contains_key(crs)
    }

    fn define(&self, crs: &str, definition: &str) -> Result<()> {
        let mut definitions = self.definitions.write();
        if let Some(existing) = definitions.get(crs) {
            if existing.proj_string == definition {
                return Ok(());
            }
            return Err(Error::ConflictingDefinition(crs.to_string()));
        }

        parse(crs, definition)?;
        definitions.insert(
            crs.to_string(),
            Definition {
                proj_string: definition.to_string(),
                geographic: is_geographic(definition),
            },
        );
        tracing::trace!(crs, definition, "registered projection");
        Ok(())
    }

    fn project(&self, from: &str, to: &str, point: DVec2) -> Result<DVec2> {
        self.transformer(from, to)?.transform(point)
    }

    fn project_all(&self, from: &str, to: &str, points: &[DVec2]) -> Result<Vec<DVec2>> {
        let transformer = self.transformer(from, to)?;
        points.iter().map(|p| transformer.transform(*p)).collect()
    }
}

struct Transformer {
    source_proj: Proj,
    target_proj: Proj,
    source_is_geographic: bool,
    target_is_geographic: bool,
    from: String,
    to: String,
}

impl Transformer {
    fn transform(&self, p: DVec2) -> Result<DVec2> {
        let (in_x, in_y) = if self.source_is_geographic {
            (p.x.to_radians(), p.y.to_radians())
        } else {
            (p.x, p.y)
        };

        let mut point = (in_x, in_y, 0.0);
        transform(&self.source_proj, &self.target_proj, &mut point).map_err(|e| {
            Error::Projection {
                from: self.from.clone(),
                to: self.to.clone(),
                reason: format!("{e:?}"),
            }
        })?;

        if self.target_is_geographic {
            Ok(DVec2::new(point.0.to_degrees(), point.1.to_degrees()))
        } else {
            Ok(DVec2::new(point.0, point.1))
        }
    }
}

fn parse(crs: &str, definition: &str) -> Result<Proj> {
    Proj::from_proj_string(definition).map_err(|e| Error::InvalidDefinition {
        crs: crs.to_string(),
        reason: format!("{e:?}"),
    })
}

fn is_geographic(definition: &str) -> bool {
    definition.split_whitespace().any(|token| {
        matches!(
            token,
            "+proj=longlat" | "+proj=latlong" | "+proj=lonlat" | "+proj=latlon"
        )
    })
}
