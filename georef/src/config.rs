//! Configuration types for fitting and CRS scoring.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::error::Error;

// =============================================================================
// Transform model selection
// =============================================================================

/// Family of transforms fitted between image and map points.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransformMode {
    /// Unconstrained 6 DOF fit (scale, rotation, shear, translation)
    #[default]
    Affine,
    /// Uniform scale + rotation + translation (4 DOF)
    Similar,
    /// Uniform scale + translation, no rotation (3 DOF)
    NoShear,
}

impl FromStr for TransformMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransformMode::iter()
            .find(|m| m.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownMode(s.to_string()))
    }
}

/// How the image Y axis is oriented relative to the map Y axis.
///
/// Only consulted by the constrained modes; a full affine fit absorbs any
/// axis flip on its own.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum YAxisMode {
    /// Image and map Y axes point the same way.
    Same,
    /// Image Y is mirrored relative to map Y.
    Opposite,
    /// Fit both hypotheses and keep the one with the smaller residual.
    #[default]
    Auto,
}

impl FromStr for YAxisMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        YAxisMode::iter()
            .find(|m| m.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownYAxisMode(s.to_string()))
    }
}

/// Options for a single transform fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    pub mode: TransformMode,
    pub y_axis_mode: YAxisMode,
}

impl FitOptions {
    pub fn new(mode: TransformMode, y_axis_mode: YAxisMode) -> Self {
        Self { mode, y_axis_mode }
    }
}

// =============================================================================
// CRS scoring configuration
// =============================================================================

/// CRS of the geographic control points: WGS84 longitude/latitude.
pub const DEFAULT_SOURCE_CRS: &str = "EPSG:4326";

/// Configuration for [`CrsScorer`](crate::crs::CrsScorer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// CRS the geographic points are expressed in.
    pub source_crs: String,
    /// Transform fitted from image points to each candidate's projected points.
    pub fit: FitOptions,
    /// Score candidates on the rayon pool. Selection is identical either way.
    pub parallel: bool,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            source_crs: DEFAULT_SOURCE_CRS.to_string(),
            fit: FitOptions::default(),
            parallel: true,
        }
    }
}

impl ScorerConfig {
    /// Check configuration built from user input.
    pub fn try_validate(&self) -> Result<(), Error> {
        if self.source_crs.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "ScorerConfig source_crs must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Validate configuration parameters.
    pub fn validate(&self) {
        if let Err(e) = self.try_validate() {
            panic!("{e}");
        }
    }

    pub fn with_fit(mut self, fit: FitOptions) -> Self {
        self.fit = fit;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}
