//! Georef - control-point georeferencing for raster maps.
//!
//! This library provides:
//! - Affine, similarity and no-shear least-squares fits between image and map points
//! - Automatic resolution of the image Y-axis orientation
//! - Fit quality metrics (RMSE, normalized RMSE)
//! - Selection of the projected CRS that best explains a set of control points
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use georef::{find_best_crs, CrsTable, Proj4Projector, TransformMode, YAxisMode};
//!
//! let projector = Proj4Projector::new();
//! let table = CrsTable::builtin();
//! let best = find_best_crs(
//!     &projector,
//!     &table,
//!     &geo_points,
//!     &image_points,
//!     &["EPSG:2448", "EPSG:3099", "EPSG:3857"],
//!     TransformMode::Affine,
//!     YAxisMode::Auto,
//! )?;
//! ```

pub mod affine;
pub mod config;
pub mod crs;
pub mod error;
pub(crate) mod estimate;
pub(crate) mod quality;

#[cfg(test)]
pub mod testing;

// ============================================================================
// Transforms
// ============================================================================

pub use affine::{forward_affine, forward_all, inverse_affine, inverse_all, AffineParams};

// ============================================================================
// Fitting
// ============================================================================

pub use estimate::{
    compute_transform_params, compute_transform_params_named, fit_with_options,
    resolve_orientation, MIN_POINTS,
};
pub use quality::{compute_rmse, point_spread, residual_sum_of_squares, rmse_ratio, FitQuality};

// ============================================================================
// Configuration
// ============================================================================

pub use config::{FitOptions, ScorerConfig, TransformMode, YAxisMode, DEFAULT_SOURCE_CRS};

// ============================================================================
// CRS selection
// ============================================================================

pub use crs::{
    best_score, find_best_crs, CrsDefinition, CrsScore, CrsScorer, CrsTable, Proj4Projector, Projector,
};

pub use error::{Error, Result};
