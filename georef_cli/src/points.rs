//! Control-point files.
//!
//! ```yaml
//! points:
//!   - image: [1024.0, 768.0]
//!     geo: [135.51, 34.69]
//!   - image: [3100.5, 412.0]
//!     map: [512340.2, 3841205.7]
//! ```

use std::path::Path;

use anyhow::{bail, Context, Result};
use glam::DVec2;
use serde::{Deserialize, Serialize};

use common::SerdeFormat;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    /// Pixel position in the scanned image.
    pub image: DVec2,
    /// WGS84 `(lon, lat)` in degrees.
    #[serde(default)]
    pub geo: Option<DVec2>,
    /// Position already expressed in the map's projected CRS.
    #[serde(default)]
    pub map: Option<DVec2>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlPoints {
    pub points: Vec<ControlPoint>,
}

impl ControlPoints {
    pub fn load(path: &Path) -> Result<Self> {
        let format = SerdeFormat::from_path(path)?;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read control points: {:?}", path))?;
        let points: Self = format
            .deserialize(&text)
            .with_context(|| format!("Failed to parse control points: {:?}", path))?;
        tracing::debug!(count = points.points.len(), "loaded control points");
        Ok(points)
    }

    pub fn image(&self) -> Vec<DVec2> {
        self.points.iter().map(|p| p.image).collect()
    }

    pub fn geo(&self) -> Result<Vec<DVec2>> {
        self.collect("geo", |p| p.geo)
    }

    pub fn map(&self) -> Result<Vec<DVec2>> {
        self.collect("map", |p| p.map)
    }

    fn collect(&self, field: &str, get: impl Fn(&ControlPoint) -> Option<DVec2>) -> Result<Vec<DVec2>> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| match get(p) {
                Some(v) => Ok(v),
                None => bail!("Control point {} has no `{}` coordinate", i, field),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml() {
        let yaml = "points:\n  - image: [1.0, 2.0]\n    geo: [135.0, 35.0]\n  - image: [3.0, 4.0]\n    geo: [136.0, 34.5]\n    map: [10.0, 20.0]\n";
        let points: ControlPoints = SerdeFormat::Yaml.deserialize(yaml).unwrap();

        assert_eq!(points.image(), vec![DVec2::new(1.0, 2.0), DVec2::new(3.0, 4.0)]);
        assert_eq!(points.geo().unwrap()[1], DVec2::new(136.0, 34.5));

        let err = points.map().unwrap_err();
        assert!(err.to_string().contains("Control point 0 has no `map`"));
    }
}
