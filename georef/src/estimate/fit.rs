//! Core fits for each transform family, without orientation handling.

use glam::DVec2;
use nalgebra::{DMatrix, DVector};

use crate::affine::AffineParams;
use crate::error::{Error, Result};
use crate::quality::centroid;

/// Image point sets with a centered second moment below this are coincident.
const DEGENERATE_MOMENT: f64 = 1e-15;

/// Unconstrained affine fit.
///
/// Each correspondence contributes two rows to the `2n×6` design matrix:
/// ```text
/// [x y 1 0 0 0] · p = X
/// [0 0 0 x y 1] · p = Y
/// ```
/// with `p = (A, B, C, D, E, F)`. Both point sets are centered first; the
/// translation is restored afterwards.
pub(crate) fn fit_affine(images: &[DVec2], maps: &[DVec2]) -> Result<AffineParams> {
    let n = images.len();
    let (images, image_centroid) = centered(images);
    let (maps, map_centroid) = centered(maps);

    let mut design = Vec::with_capacity(2 * n * 6);
    let mut observations = Vec::with_capacity(2 * n);
    for (i, m) in images.iter().zip(maps.iter()) {
        design.extend_from_slice(&[i.x, i.y, 1.0, 0.0, 0.0, 0.0]);
        design.extend_from_slice(&[0.0, 0.0, 0.0, i.x, i.y, 1.0]);
        observations.push(m.x);
        observations.push(m.y);
    }

    let p = solve_normal_equations(
        DMatrix::from_row_slice(2 * n, 6, &design),
        DVector::from_vec(observations),
    )?;
    let centered_fit = AffineParams::from_array([p[0], p[1], p[2], p[3], p[4], p[5]]);
    Ok(restore_translation(centered_fit, image_centroid, map_centroid))
}

/// Uniform scale + translation fit (`B = D = 0`, `E = A`).
///
/// Rows of the reduced `2n×3` system over `(A, C, F)`:
/// ```text
/// [x 1 0] · p = X
/// [y 0 1] · p = Y
/// ```
pub(crate) fn fit_noshear(images: &[DVec2], maps: &[DVec2]) -> Result<AffineParams> {
    let n = images.len();
    let (images, image_centroid) = centered(images);
    let (maps, map_centroid) = centered(maps);

    let mut design = Vec::with_capacity(2 * n * 3);
    let mut observations = Vec::with_capacity(2 * n);
    for (i, m) in images.iter().zip(maps.iter()) {
        design.extend_from_slice(&[i.x, 1.0, 0.0]);
        design.extend_from_slice(&[i.y, 0.0, 1.0]);
        observations.push(m.x);
        observations.push(m.y);
    }

    let p = solve_normal_equations(
        DMatrix::from_row_slice(2 * n, 3, &design),
        DVector::from_vec(observations),
    )?;
    let centered_fit = AffineParams::from_array([p[0], 0.0, p[1], 0.0, p[0], p[2]]);
    Ok(restore_translation(centered_fit, image_centroid, map_centroid))
}

/// Similarity fit by closed-form Procrustes analysis on centered points.
///
/// The recovered scale is never negative: mirrored solutions are only
/// reachable through the y-flip hypothesis of the orientation resolver.
pub(crate) fn fit_similar(images: &[DVec2], maps: &[DVec2]) -> Result<AffineParams> {
    let image_centroid = centroid(images);
    let map_centroid = centroid(maps);

    let mut big_a = 0.0;
    let mut big_b = 0.0;
    let mut big_c = 0.0;
    for (i, m) in images.iter().zip(maps.iter()) {
        let ic = *i - image_centroid;
        let mc = *m - map_centroid;
        big_a += ic.x * mc.x + ic.y * mc.y;
        big_b += ic.x * mc.y - ic.y * mc.x;
        big_c += ic.length_squared();
    }

    if big_c < DEGENERATE_MOMENT {
        return Err(Error::DegenerateGeometry);
    }

    let angle = big_b.atan2(big_a);
    let scale = big_a.hypot(big_b) / big_c;

    let (sin_a, cos_a) = angle.sin_cos();
    let a = scale * cos_a;
    let b = -scale * sin_a;
    let d = scale * sin_a;
    let e = scale * cos_a;

    let c = map_centroid.x - (a * image_centroid.x + b * image_centroid.y);
    let f = map_centroid.y - (d * image_centroid.x + e * image_centroid.y);

    Ok(AffineParams::from_array([a, b, c, d, e, f]))
}

fn centered(points: &[DVec2]) -> (Vec<DVec2>, DVec2) {
    let c = centroid(points);
    (points.iter().map(|p| *p - c).collect(), c)
}

/// Convert a fit between centered point sets back to the original frames.
fn restore_translation(fit: AffineParams, image_centroid: DVec2, map_centroid: DVec2) -> AffineParams {
    let linear = AffineParams { c: 0.0, f: 0.0, ..fit };
    let shift = map_centroid + fit.translation() - linear.apply(image_centroid);
    AffineParams {
        c: shift.x,
        f: shift.y,
        ..fit
    }
}

/// Solve `p = (MᵗM)⁻¹ Mᵗv`.
fn solve_normal_equations(design: DMatrix<f64>, observations: DVector<f64>) -> Result<DVector<f64>> {
    let design_t = design.transpose();
    let normal = &design_t * &design;
    let normal_inv = normal.try_inverse().ok_or(Error::SingularFit)?;
    let p = normal_inv * (design_t * observations);

    if p.iter().any(|v| !v.is_finite()) {
        return Err(Error::SingularFit);
    }
    Ok(p)
}
