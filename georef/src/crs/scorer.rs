//! Per-candidate scoring and best-CRS selection.

use glam::DVec2;
use rayon::prelude::*;
use serde::Serialize;

use crate::affine::{forward_all, AffineParams};
use crate::config::{FitOptions, ScorerConfig, TransformMode, YAxisMode};
use crate::crs::projector::Projector;
use crate::crs::table::CrsTable;
use crate::error::{ensure_paired, Error, Result};
use crate::estimate::fit_with_options;
use crate::quality::{compute_rmse, rmse_ratio};

/// Outcome of fitting the control points in one candidate CRS.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrsScore {
    pub crs: String,
    /// Fitted image → CRS transform.
    pub params: AffineParams,
    /// RMSE in the candidate's units; the selection criterion.
    pub rmse: f64,
    /// RMSE relative to the spread of the projected points.
    pub ratio: f64,
}

/// Scores candidate CRSs against paired geographic/image control points.
///
/// Definitions missing from the projector are registered lazily from the
/// table. Any projection or fitting failure for a candidate aborts the whole
/// call; failing candidates are never skipped.
pub struct CrsScorer<'a, P: Projector + ?Sized> {
    projector: &'a P,
    table: &'a CrsTable,
    config: ScorerConfig,
}

impl<'a, P: Projector + ?Sized> CrsScorer<'a, P> {
    pub fn new(projector: &'a P, table: &'a CrsTable, config: ScorerConfig) -> Self {
        config.validate();
        Self {
            projector,
            table,
            config,
        }
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Register `crs` with the projector unless it is already defined.
    pub fn ensure_defined(&self, crs: &str) -> Result<()> {
        if self.projector.is_defined(crs) {
            return Ok(());
        }
        let definition = self
            .table
            .get(crs)
            .ok_or_else(|| Error::UnknownCrs(crs.to_string()))?;
        tracing::trace!(crs, "lazily registering CRS definition");
        self.projector.define(crs, definition)
    }

    /// Fit and score the control points in a single candidate CRS.
    pub fn score_candidate(
        &self,
        geo_points: &[DVec2],
        local_points: &[DVec2],
        crs: &str,
    ) -> Result<CrsScore> {
        self.ensure_defined(&self.config.source_crs)?;
        self.ensure_defined(crs)?;

        let map_points = self
            .projector
            .project_all(&self.config.source_crs, crs, geo_points)?;
        let params = fit_with_options(local_points, &map_points, &self.config.fit)?;
        let predicted = forward_all(&params, local_points);

        let rmse = compute_rmse(&map_points, &predicted)?;
        let ratio = rmse_ratio(&map_points, &predicted)?;
        tracing::debug!(crs, rmse, ratio, "scored candidate");

        Ok(CrsScore {
            crs: crs.to_string(),
            params,
            rmse,
            ratio,
        })
    }

    /// Scores for every candidate, in candidate order.
    pub fn score_candidates<S>(
        &self,
        geo_points: &[DVec2],
        local_points: &[DVec2],
        candidates: &[S],
    ) -> Result<Vec<CrsScore>>
    where
        S: AsRef<str> + Sync,
    {
        ensure_paired(geo_points, local_points)?;
        if candidates.is_empty() {
            return Err(Error::NoCandidates);
        }

        self.ensure_defined(&self.config.source_crs)?;

        let score = |crs: &S| self.score_candidate(geo_points, local_points, crs.as_ref());
        let results: Vec<Result<CrsScore>> = if self.config.parallel {
            candidates.par_iter().map(score).collect()
        } else {
            candidates.iter().map(score).collect()
        };

        // Report the first failure in candidate order.
        results.into_iter().collect()
    }

    /// The candidate with the minimum RMSE; the earliest wins exact ties.
    pub fn find_best<S>(
        &self,
        geo_points: &[DVec2],
        local_points: &[DVec2],
        candidates: &[S],
    ) -> Result<CrsScore>
    where
        S: AsRef<str> + Sync,
    {
        let scores = self.score_candidates(geo_points, local_points, candidates)?;
        let best = best_score(&scores).cloned().ok_or(Error::NoCandidates)?;
        tracing::info!(crs = %best.crs, rmse = best.rmse, "selected CRS");
        Ok(best)
    }

    pub fn find_best_crs<S>(
        &self,
        geo_points: &[DVec2],
        local_points: &[DVec2],
        candidates: &[S],
    ) -> Result<String>
    where
        S: AsRef<str> + Sync,
    {
        Ok(self.find_best(geo_points, local_points, candidates)?.crs)
    }
}

/// The lowest-RMSE score; the earliest wins exact ties and NaN never wins
/// over a finite RMSE.
pub fn best_score(scores: &[CrsScore]) -> Option<&CrsScore> {
    let mut best: Option<&CrsScore> = None;
    for score in scores {
        let better = match best {
            None => true,
            Some(current) => {
                score.rmse < current.rmse || (current.rmse.is_nan() && !score.rmse.is_nan())
            }
        };
        if better {
            best = Some(score);
        }
    }
    best
}

/// Pick the candidate CRS that best explains the control points.
///
/// `geo_points` are WGS84 `(lon, lat)` degrees paired by index with
/// `local_points` in image coordinates.
pub fn find_best_crs<P, S>(
    projector: &P,
    table: &CrsTable,
    geo_points: &[DVec2],
    local_points: &[DVec2],
    candidates: &[S],
    mode: TransformMode,
    y_axis_mode: YAxisMode,
) -> Result<String>
where
    P: Projector + ?Sized,
    S: AsRef<str> + Sync,
{
    let config = ScorerConfig::default().with_fit(FitOptions::new(mode, y_axis_mode));
    CrsScorer::new(projector, table, config).find_best_crs(geo_points, local_points, candidates)
}
