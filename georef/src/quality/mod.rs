//! Residual metrics for paired point sequences.
//!
//! The primary score for CRS selection is the plain RMSE; the spread-normalized
//! ratio and the other [`FitQuality`] fields are diagnostics.

use glam::DVec2;
use serde::Serialize;

use crate::affine::AffineParams;
use crate::error::{ensure_paired, Result};


/// Point clouds whose spread falls below this are considered degenerate.
const DEGENERATE_SPREAD: f64 = 1e-15;

/// Root-mean-square Euclidean distance between paired points.
pub fn compute_rmse(observed: &[DVec2], predicted: &[DVec2]) -> Result<f64> {
    let n = ensure_paired(observed, predicted)?;
    let sum_sq: f64 = observed
        .iter()
        .zip(predicted.iter())
        .map(|(o, p)| o.distance_squared(*p))
        .sum();
    Ok((sum_sq / n as f64).sqrt())
}

/// Population standard deviation of a point cloud about its centroid,
/// `sqrt(mean(|p - centroid|²))`.
pub fn point_spread(points: &[DVec2]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let c = centroid(points);
    let sum_sq: f64 = points.iter().map(|p| p.distance_squared(c)).sum();
    (sum_sq / points.len() as f64).sqrt()
}

/// RMSE divided by the spread of the observed points; `0.0` when the
/// observed cloud is degenerate.
pub fn rmse_ratio(observed: &[DVec2], predicted: &[DVec2]) -> Result<f64> {
    let rmse = compute_rmse(observed, predicted)?;
    let spread = point_spread(observed);
    if spread < DEGENERATE_SPREAD {
        return Ok(0.0);
    }
    Ok(rmse / spread)
}

/// `Σ |map - params(image)|²` over paired points. Callers guarantee pairing.
pub fn residual_sum_of_squares(params: &AffineParams, images: &[DVec2], maps: &[DVec2]) -> f64 {
    images
        .iter()
        .zip(maps.iter())
        .map(|(i, m)| params.apply(*i).distance_squared(*m))
        .sum()
}

pub(crate) fn centroid(points: &[DVec2]) -> DVec2 {
    if points.is_empty() {
        return DVec2::ZERO;
    }
    let sum: DVec2 = points.iter().copied().sum();
    sum / points.len() as f64
}

/// Summary of how well predicted points match observed ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitQuality {
    /// Root mean square positional error.
    pub rmse: f64,
    /// Largest single-point error.
    pub max_error: f64,
    /// Median single-point error.
    pub median_error: f64,
    /// RMSE relative to the observed point spread.
    pub ratio: f64,
}

impl FitQuality {
    pub fn compute(observed: &[DVec2], predicted: &[DVec2]) -> Result<Self> {
        let rmse = compute_rmse(observed, predicted)?;
        let ratio = rmse_ratio(observed, predicted)?;

        let mut errors: Vec<f64> = observed
            .iter()
            .zip(predicted.iter())
            .map(|(o, p)| o.distance(*p))
            .collect();
        errors.sort_by(f64::total_cmp);

        let max_error = errors.last().copied().unwrap_or(0.0);
        let mid = errors.len() / 2;
        let median_error = if errors.len() % 2 == 0 {
            (errors[mid - 1] + errors[mid]) / 2.0
        } else {
            errors[mid]
        };

        Ok(Self {
            rmse,
            max_error,
            median_error,
            ratio,
        })
    }

    /// Quality of `params` at reproducing `maps` from `images`.
    pub fn of_fit(params: &AffineParams, images: &[DVec2], maps: &[DVec2]) -> Result<Self> {
        ensure_paired(images, maps)?;
        let predicted = crate::affine::forward_all(params, images);
        Self::compute(maps, &predicted)
    }
}

impl std::fmt::Display for FitQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rmse={:.4}, max={:.4}, median={:.4}, ratio={:.6}",
            self.rmse, self.max_error, self.median_error, self.ratio
        )
    }
}
