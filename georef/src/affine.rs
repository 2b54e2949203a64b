//! Six-parameter affine transform between image and map planes.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Determinants below this magnitude are treated as non-invertible.
pub const SINGULAR_DETERMINANT: f64 = 1e-15;

/// Affine parameters mapping `(x, y)` to `(X, Y)`:
///
/// ```text
/// X = a·x + b·y + c
/// Y = d·x + e·y + f
/// ```
///
/// Serialized as the ordered array `[a, b, c, d, e, f]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 6]", into = "[f64; 6]")]
pub struct AffineParams {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for AffineParams {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<[f64; 6]> for AffineParams {
    fn from(p: [f64; 6]) -> Self {
        Self::from_array(p)
    }
}

impl From<AffineParams> for [f64; 6] {
    fn from(p: AffineParams) -> Self {
        p.to_array()
    }
}

impl std::fmt::Display for AffineParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Affine(X = {:.6}x {:+.6}y {:+.3}, Y = {:.6}x {:+.6}y {:+.3})",
            self.a, self.b, self.c, self.d, self.e, self.f
        )
    }
}

impl AffineParams {
    pub fn identity() -> Self {
        Self::from_array([1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
    }

    /// Create from the ordered tuple `[A, B, C, D, E, F]`.
    pub fn from_array(p: [f64; 6]) -> Self {
        Self {
            a: p[0],
            b: p[1],
            c: p[2],
            d: p[3],
            e: p[4],
            f: p[5],
        }
    }

    pub fn to_array(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }

    /// Rotation by `angle` and uniform `scale`, followed by translation `t`.
    pub fn similarity(t: DVec2, angle: f64, scale: f64) -> Self {
        let (sin_a, cos_a) = angle.sin_cos();
        Self::from_array([
            scale * cos_a,
            -scale * sin_a,
            t.x,
            scale * sin_a,
            scale * cos_a,
            t.y,
        ])
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.e - self.b * self.d
    }

    /// Rotation angle in radians (meaningful for similarity transforms).
    pub fn rotation_angle(&self) -> f64 {
        self.d.atan2(self.a)
    }

    /// Uniform scale (meaningful for similarity transforms).
    pub fn scale_factor(&self) -> f64 {
        (self.a * self.a + self.d * self.d).sqrt()
    }

    pub fn translation(&self) -> DVec2 {
        DVec2::new(self.c, self.f)
    }

    /// Map an image-plane point into the map plane.
    #[inline]
    pub fn apply(&self, p: DVec2) -> DVec2 {
        DVec2::new(
            self.a * p.x + self.b * p.y + self.c,
            self.d * p.x + self.e * p.y + self.f,
        )
    }

    /// Map a map-plane point back into the image plane.
    pub fn apply_inverse(&self, p: DVec2) -> Result<DVec2> {
        let det = self.checked_determinant()?;
        let dx = p.x - self.c;
        let dy = p.y - self.f;
        Ok(DVec2::new(
            (self.e * dx - self.b * dy) / det,
            (-self.d * dx + self.a * dy) / det,
        ))
    }

    /// The inverse transform as its own parameter set.
    pub fn inverted(&self) -> Result<Self> {
        let det = self.checked_determinant()?;
        let a = self.e / det;
        let b = -self.b / det;
        let d = -self.d / det;
        let e = self.a / det;
        Ok(Self::from_array([
            a,
            b,
            -(a * self.c + b * self.f),
            d,
            e,
            -(d * self.c + e * self.f),
        ]))
    }

    /// Re-express parameters fitted against y-negated image points in the
    /// original image axis convention.
    pub(crate) fn unflip_y(&self) -> Self {
        Self {
            b: -self.b,
            e: -self.e,
            ..*self
        }
    }

    fn checked_determinant(&self) -> Result<f64> {
        let determinant = self.determinant();
        if determinant.abs() < SINGULAR_DETERMINANT || !determinant.is_finite() {
            return Err(Error::SingularTransform { determinant });
        }
        Ok(determinant)
    }
}

/// Forward affine application. Total over all finite inputs.
pub fn forward_affine(params: &AffineParams, point: DVec2) -> DVec2 {
    params.apply(point)
}

/// Inverse affine application; fails with [`Error::SingularTransform`] when
/// `|det| < 1e-15`.
pub fn inverse_affine(params: &AffineParams, point: DVec2) -> Result<DVec2> {
    params.apply_inverse(point)
}

pub fn forward_all(params: &AffineParams, points: &[DVec2]) -> Vec<DVec2> {
    points.iter().map(|p| params.apply(*p)).collect()
}

pub fn inverse_all(params: &AffineParams, points: &[DVec2]) -> Result<Vec<DVec2>> {
    let inv = params.inverted()?;
    Ok(points.iter().map(|p| inv.apply(*p)).collect())
}
