//! Resolution of the image/map Y-axis orientation ambiguity.
//!
//! Image rows usually grow downward while northings grow upward. Transform
//! families without a reflection degree of freedom need the image Y axis
//! negated before their rotation and scale are meaningful. Two hypotheses are
//! available: fit the points as given, or fit against y-negated image points
//! and convert the result back by negating `B` and `E`.

use glam::DVec2;

use crate::affine::AffineParams;
use crate::config::YAxisMode;
use crate::error::Result;
use crate::quality::residual_sum_of_squares;

/// Run `fit_core` under the orientation hypothesis selected by `mode`.
///
/// With [`YAxisMode::Auto`] both hypotheses are fitted and scored by residual
/// sum of squares against the original points; the unflipped one wins ties.
pub fn resolve_orientation<F>(
    fit_core: F,
    images: &[DVec2],
    maps: &[DVec2],
    mode: YAxisMode,
) -> Result<AffineParams>
where
    F: Fn(&[DVec2], &[DVec2]) -> Result<AffineParams>,
{
    match mode {
        YAxisMode::Same => fit_core(images, maps),
        YAxisMode::Opposite => fit_flipped(&fit_core, images, maps),
        YAxisMode::Auto => {
            let same = fit_core(images, maps)?;
            let opposite = fit_flipped(&fit_core, images, maps)?;

            let rss_same = residual_sum_of_squares(&same, images, maps);
            let rss_opposite = residual_sum_of_squares(&opposite, images, maps);
            tracing::debug!(rss_same, rss_opposite, "orientation hypotheses");

            if rss_same <= rss_opposite {
                Ok(same)
            } else {
                Ok(opposite)
            }
        }
    }
}

fn fit_flipped<F>(fit_core: &F, images: &[DVec2], maps: &[DVec2]) -> Result<AffineParams>
where
    F: Fn(&[DVec2], &[DVec2]) -> Result<AffineParams>,
{
    let flipped: Vec<DVec2> = images.iter().map(|p| DVec2::new(p.x, -p.y)).collect();
    Ok(fit_core(&flipped, maps)?.unflip_y())
}
