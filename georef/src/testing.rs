//! Testing utilities for georef.

use glam::DVec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::affine::AffineParams;

/// Initialize tracing subscriber for tests.
/// Safe to call multiple times - will only initialize once.
/// Respects RUST_LOG env var, defaults to "info".
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Uniformly scattered points inside `[0, width) × [0, height)`.
pub fn random_points(count: usize, width: f64, height: f64, seed: u64) -> Vec<DVec2> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| DVec2::new(rng.random_range(0.0..width), rng.random_range(0.0..height)))
        .collect()
}

pub fn apply_all(params: &AffineParams, points: &[DVec2]) -> Vec<DVec2> {
    crate::affine::forward_all(params, points)
}

pub fn assert_params_close(actual: &AffineParams, expected: &AffineParams, tolerance: f64) {
    for (i, (a, e)) in actual
        .to_array()
        .iter()
        .zip(expected.to_array().iter())
        .enumerate()
    {
        assert!(
            (a - e).abs() < tolerance,
            "parameter {} differs: expected {}, got {} (expected {}, got {})",
            i,
            e,
            a,
            expected,
            actual
        );
    }
}
