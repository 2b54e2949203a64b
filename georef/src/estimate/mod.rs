//! Least-squares estimation of image → map transforms from control points.
//!
//! Three model families are supported:
//!
//! | Mode | DOF | Method |
//! |------|-----|--------|
//! | `affine` | 6 | Normal equations on a `2n×6` design matrix |
//! | `similar` | 4 | Closed-form 2D Procrustes |
//! | `noshear` | 3 | Normal equations on a `2n×3` design matrix |
//!
//! The constrained families cannot represent a mirrored Y axis, so they are
//! wrapped in an orientation resolver that optionally fits against y-negated
//! image points (see [`YAxisMode`]).

mod fit;
mod orientation;

#[cfg(test)]
mod tests;

use glam::DVec2;

use crate::affine::AffineParams;
use crate::config::{FitOptions, TransformMode, YAxisMode};
use crate::error::{Error, Result};

pub use orientation::resolve_orientation;

/// Fewest paired points accepted by any mode.
pub const MIN_POINTS: usize = 2;

/// Fit transform parameters mapping `image_points` onto `map_points`.
///
/// Fewer points than a mode's degrees of freedom are accepted as long as the
/// system is not numerically singular; the result is then best-effort.
/// Two points never determine an affine fit: its normal matrix is exactly
/// rank-deficient and the call fails with [`Error::SingularFit`]. The
/// similarity and no-shear modes accept two distinct points.
pub fn compute_transform_params(
    image_points: &[DVec2],
    map_points: &[DVec2],
    mode: TransformMode,
    y_axis_mode: YAxisMode,
) -> Result<AffineParams> {
    if image_points.len() != map_points.len() {
        return Err(Error::LengthMismatch {
            left: image_points.len(),
            right: map_points.len(),
        });
    }
    if image_points.len() < MIN_POINTS {
        return Err(Error::InsufficientPoints {
            found: image_points.len(),
            required: MIN_POINTS,
        });
    }

    let params = match mode {
        TransformMode::Affine => fit::fit_affine(image_points, map_points)?,
        TransformMode::Similar => {
            resolve_orientation(fit::fit_similar, image_points, map_points, y_axis_mode)?
        }
        TransformMode::NoShear => {
            resolve_orientation(fit::fit_noshear, image_points, map_points, y_axis_mode)?
        }
    };

    tracing::trace!(%mode, %y_axis_mode, n = image_points.len(), %params, "fitted transform");
    Ok(params)
}

/// [`compute_transform_params`] driven by a [`FitOptions`] value.
pub fn fit_with_options(
    image_points: &[DVec2],
    map_points: &[DVec2],
    options: &FitOptions,
) -> Result<AffineParams> {
    compute_transform_params(image_points, map_points, options.mode, options.y_axis_mode)
}

/// [`compute_transform_params`] with modes given by name, as they arrive from
/// configuration files or the command line.
pub fn compute_transform_params_named(
    image_points: &[DVec2],
    map_points: &[DVec2],
    mode: &str,
    y_axis_mode: &str,
) -> Result<AffineParams> {
    compute_transform_params(
        image_points,
        map_points,
        mode.parse()?,
        y_axis_mode.parse()?,
    )
}
