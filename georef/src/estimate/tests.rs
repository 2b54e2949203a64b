use super::*;
use crate::quality::compute_rmse;
use crate::testing::{apply_all, assert_params_close, random_points};

fn mirrored_similarity(t: DVec2, angle: f64, scale: f64) -> AffineParams {
    // Map = s·R·(x, -y) + t
    let (sin_a, cos_a) = angle.sin_cos();
    AffineParams::from_array([
        scale * cos_a,
        scale * sin_a,
        t.x,
        scale * sin_a,
        -scale * cos_a,
        t.y,
    ])
}

// ============================================================================
// Preconditions
// ============================================================================

#[test]
fn test_length_mismatch() {
    let images = random_points(5, 100.0, 100.0, 1);
    let maps = random_points(4, 100.0, 100.0, 2);
    assert!(matches!(
        compute_transform_params(&images, &maps, TransformMode::Affine, YAxisMode::Auto),
        Err(Error::LengthMismatch { left: 5, right: 4 })
    ));
}

#[test]
fn test_insufficient_points() {
    let one = vec![DVec2::new(1.0, 2.0)];
    for mode in [TransformMode::Affine, TransformMode::Similar, TransformMode::NoShear] {
        assert!(matches!(
            compute_transform_params(&one, &one, mode, YAxisMode::Auto),
            Err(Error::InsufficientPoints { found: 1, required: 2 })
        ));
    }
    assert!(matches!(
        compute_transform_params(&[], &[], TransformMode::Similar, YAxisMode::Same),
        Err(Error::InsufficientPoints { found: 0, .. })
    ));
}

#[test]
fn test_unknown_mode_by_name() {
    let pts = random_points(4, 10.0, 10.0, 3);
    assert!(matches!(
        compute_transform_params_named(&pts, &pts, "thin-plate", "auto"),
        Err(Error::UnknownMode(_))
    ));
    assert!(matches!(
        compute_transform_params_named(&pts, &pts, "affine", "upside-down"),
        Err(Error::UnknownYAxisMode(_))
    ));
    assert!(compute_transform_params_named(&pts, &pts, "noshear", "same").is_ok());
}

// ============================================================================
// Affine
// ============================================================================

#[test]
fn test_affine_recovers_known_params() {
    let truth = AffineParams::from_array([0.52, -0.11, 135_400.0, 0.07, -0.49, 3_830_000.0]);
    let images = random_points(12, 4000.0, 3000.0, 42);
    let maps = apply_all(&truth, &images);

    for y_mode in [YAxisMode::Same, YAxisMode::Opposite, YAxisMode::Auto] {
        let fitted =
            compute_transform_params(&images, &maps, TransformMode::Affine, y_mode).unwrap();
        assert_params_close(&fitted, &truth, 1e-4);

        let predicted = apply_all(&fitted, &images);
        assert!(compute_rmse(&maps, &predicted).unwrap() < 1e-4);
    }
}

#[test]
fn test_affine_with_three_points_is_exact() {
    let truth = AffineParams::from_array([2.0, 0.5, -3.0, -1.0, 1.5, 7.0]);
    let images = vec![
        DVec2::new(0.0, 0.0),
        DVec2::new(10.0, 0.0),
        DVec2::new(0.0, 10.0),
    ];
    let maps = apply_all(&truth, &images);
    let fitted =
        compute_transform_params(&images, &maps, TransformMode::Affine, YAxisMode::Auto).unwrap();
    assert_params_close(&fitted, &truth, 1e-8);
}

#[test]
fn test_affine_two_points_are_singular() {
    let images = [DVec2::new(0.0, 0.0), DVec2::new(4.0, 3.0)];
    let maps = [DVec2::new(10.0, 20.0), DVec2::new(18.0, 26.0)];
    assert!(matches!(
        compute_transform_params(&images, &maps, TransformMode::Affine, YAxisMode::Auto),
        Err(Error::SingularFit)
    ));
    assert!(
        compute_transform_params(&images, &maps, TransformMode::Similar, YAxisMode::Same).is_ok()
    );
}

#[test]
fn test_affine_coincident_points_are_singular() {
    let images = vec![DVec2::new(1.0, 1.0); 3];
    let maps = vec![
        DVec2::new(0.0, 0.0),
        DVec2::new(1.0, 0.0),
        DVec2::new(0.0, 1.0),
    ];
    assert!(matches!(
        compute_transform_params(&images, &maps, TransformMode::Affine, YAxisMode::Auto),
        Err(Error::SingularFit)
    ));
}

// ============================================================================
// Similarity
// ============================================================================

#[test]
fn test_similar_recovers_unflipped_params() {
    let truth = AffineParams::similarity(DVec2::new(500.0, -250.0), 0.35, 2.5);
    let images = random_points(10, 800.0, 600.0, 7);
    let maps = apply_all(&truth, &images);

    for y_mode in [YAxisMode::Same, YAxisMode::Auto] {
        let fitted =
            compute_transform_params(&images, &maps, TransformMode::Similar, y_mode).unwrap();
        assert_params_close(&fitted, &truth, 1e-8);
        assert!(fitted.determinant() > 0.0);
    }
}

#[test]
fn test_similar_auto_selects_flipped_branch() {
    let truth = mirrored_similarity(DVec2::new(135_000.0, 3_900_000.0), -0.2, 12.0);
    let images = random_points(9, 5000.0, 4000.0, 11);
    let maps = apply_all(&truth, &images);

    let fitted =
        compute_transform_params(&images, &maps, TransformMode::Similar, YAxisMode::Auto).unwrap();
    assert_params_close(&fitted, &truth, 1e-6);

    // Mirrored orientation shows up as a negative determinant with B == D.
    assert!(fitted.determinant() < 0.0);
    assert!((fitted.b - fitted.d).abs() < 1e-9);
    assert!((fitted.a + fitted.e).abs() < 1e-9);

    let forced =
        compute_transform_params(&images, &maps, TransformMode::Similar, YAxisMode::Opposite)
            .unwrap();
    assert_params_close(&forced, &fitted, 1e-9);
}

#[test]
fn test_similar_wrong_orientation_leaves_residual() {
    let truth = mirrored_similarity(DVec2::new(10.0, 20.0), 0.4, 3.0);
    let images = random_points(8, 100.0, 100.0, 5);
    let maps = apply_all(&truth, &images);

    let same =
        compute_transform_params(&images, &maps, TransformMode::Similar, YAxisMode::Same).unwrap();
    let rmse_same = compute_rmse(&maps, &apply_all(&same, &images)).unwrap();
    assert!(rmse_same > 1.0, "unflipped fit should not explain mirrored data");
    // Procrustes scale is never negative in the unflipped branch.
    assert!(same.determinant() >= 0.0);
}

#[test]
fn test_similar_two_points() {
    let truth = AffineParams::similarity(DVec2::new(1.0, 2.0), 1.0, 0.5);
    let images = vec![DVec2::new(0.0, 0.0), DVec2::new(4.0, 3.0)];
    let maps = apply_all(&truth, &images);
    let fitted =
        compute_transform_params(&images, &maps, TransformMode::Similar, YAxisMode::Same).unwrap();
    assert_params_close(&fitted, &truth, 1e-10);
}

#[test]
fn test_similar_coincident_images_are_degenerate() {
    let images = vec![DVec2::new(3.0, 3.0); 4];
    let maps = random_points(4, 10.0, 10.0, 9);
    for y_mode in [YAxisMode::Same, YAxisMode::Opposite, YAxisMode::Auto] {
        assert!(matches!(
            compute_transform_params(&images, &maps, TransformMode::Similar, y_mode),
            Err(Error::DegenerateGeometry)
        ));
    }
}

#[test]
fn test_auto_tie_prefers_unflipped() {
    // Points on the x axis look identical under a y flip, so both hypotheses
    // produce the same residual.
    let images = vec![
        DVec2::new(0.0, 0.0),
        DVec2::new(1.0, 0.0),
        DVec2::new(2.0, 0.0),
    ];
    let maps = images.clone();
    let fitted =
        compute_transform_params(&images, &maps, TransformMode::Similar, YAxisMode::Auto).unwrap();
    assert!((fitted.e - 1.0).abs() < 1e-12);
    assert!((fitted.a - 1.0).abs() < 1e-12);
}

// ============================================================================
// No-shear
// ============================================================================

#[test]
fn test_noshear_recovers_scale_and_translation() {
    let truth = AffineParams::from_array([0.25, 0.0, 100.0, 0.0, 0.25, -40.0]);
    let images = random_points(6, 1000.0, 1000.0, 21);
    let maps = apply_all(&truth, &images);

    let fitted =
        compute_transform_params(&images, &maps, TransformMode::NoShear, YAxisMode::Auto).unwrap();
    assert_params_close(&fitted, &truth, 1e-8);
}

#[test]
fn test_noshear_auto_selects_flipped_branch() {
    let truth = AffineParams::from_array([0.25, 0.0, 100.0, 0.0, -0.25, 900.0]);
    let images = random_points(6, 1000.0, 1000.0, 22);
    let maps = apply_all(&truth, &images);

    let fitted =
        compute_transform_params(&images, &maps, TransformMode::NoShear, YAxisMode::Auto).unwrap();
    assert_params_close(&fitted, &truth, 1e-8);
    assert_eq!(fitted.b, 0.0);
    assert_eq!(fitted.d, 0.0);
    assert!((fitted.e + fitted.a).abs() < 1e-12);
}

#[test]
fn test_noshear_ignores_rotation() {
    let truth = AffineParams::similarity(DVec2::ZERO, 0.3, 2.0);
    let images = random_points(10, 50.0, 50.0, 23);
    let maps = apply_all(&truth, &images);

    let fitted =
        compute_transform_params(&images, &maps, TransformMode::NoShear, YAxisMode::Same).unwrap();
    assert_eq!(fitted.b, 0.0);
    assert_eq!(fitted.d, 0.0);
    assert_eq!(fitted.a, fitted.e);
}

// ============================================================================
// Orientation resolver
// ============================================================================

#[test]
fn test_resolve_orientation_with_custom_core() {
    // A core that only ever returns the identity.
    let identity_core =
        |_: &[DVec2], _: &[DVec2]| -> crate::error::Result<AffineParams> { Ok(AffineParams::identity()) };
    let images = vec![DVec2::new(0.0, 1.0), DVec2::new(2.0, 3.0)];
    let flipped_maps: Vec<DVec2> = images.iter().map(|p| DVec2::new(p.x, -p.y)).collect();

    let same = resolve_orientation(identity_core, &images, &flipped_maps, YAxisMode::Same).unwrap();
    assert_eq!(same, AffineParams::identity());

    let opposite =
        resolve_orientation(identity_core, &images, &flipped_maps, YAxisMode::Opposite).unwrap();
    assert_eq!(opposite.to_array(), [1.0, -0.0, 0.0, 0.0, -1.0, 0.0]);

    let auto = resolve_orientation(identity_core, &images, &flipped_maps, YAxisMode::Auto).unwrap();
    assert_eq!(auto, opposite);
}

#[test]
fn test_resolve_orientation_propagates_core_errors() {
    let failing = |_: &[DVec2], _: &[DVec2]| -> crate::error::Result<AffineParams> {
        Err(Error::SingularFit)
    };
    let pts = vec![DVec2::ZERO, DVec2::ONE];
    assert!(matches!(
        resolve_orientation(failing, &pts, &pts, YAxisMode::Auto),
        Err(Error::SingularFit)
    ));
}

#[test]
fn test_fit_with_options() {
    let truth = AffineParams::similarity(DVec2::new(3.0, 4.0), 0.1, 1.2);
    let images = random_points(5, 10.0, 10.0, 31);
    let maps = apply_all(&truth, &images);
    let options = FitOptions::new(TransformMode::Similar, YAxisMode::Auto);
    let fitted = fit_with_options(&images, &maps, &options).unwrap();
    assert_params_close(&fitted, &truth, 1e-9);
}
