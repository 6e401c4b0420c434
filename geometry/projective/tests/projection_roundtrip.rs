//! Sphere projection followed by cone back-projection and estimation.

use approx::assert_relative_eq;
use projective_geometry::{
    estimate_ball_location, estimate_ball_location_exact, obtain_ball_conic,
    projection_cone_from_ellipse, BallProjector, Camera, Vector3,
};
use proptest::prelude::*;

fn ball_radius() -> f64 {
    29.5 / 36.0 / (2.0 * std::f64::consts::PI)
}

#[test]
fn broadcast_camera_recovers_ball_above_court_center() {
    let camera = Camera::new(
        1100.0,
        Vector3::new(0.0, -20.0, 25.0),
        Vector3::new(-142.0, 0.0, 0.0),
    );
    let radius = ball_radius();
    let truth = Vector3::new(0.0, 0.0, 5.0);

    let h = camera.homography().unwrap();
    let conic = obtain_ball_conic(&truth, radius, &h).unwrap();
    let centered = camera.centered().homography().unwrap();
    let cone = projection_cone_from_ellipse(&conic, &centered);

    let rounded = estimate_ball_location(&cone, radius, &camera.center()).unwrap();
    assert!((rounded - truth).amax() <= 0.1 + 1e-12, "estimate {rounded:?}");

    let exact = estimate_ball_location_exact(&cone, radius, &camera.center()).unwrap();
    assert_relative_eq!(exact, truth, epsilon = 1e-4);
}

#[test]
fn every_preset_recovers_a_ball_on_the_ground() {
    let radius = ball_radius();
    let truth = Vector3::new(4.0, 3.0, radius);
    for camera in [
        Camera::basketball_broadcast(),
        Camera::basketball_bird_eye(),
        Camera::soccer_broadcast(),
        Camera::soccer_bird_eye(),
        Camera::pitch_reference(),
    ] {
        let projector = BallProjector::new(camera, radius).unwrap();
        let conic = projector.conic(&truth).unwrap();
        let est = projector.estimate_exact(&conic).unwrap();
        assert_relative_eq!(est, truth, epsilon = 1e-3);
    }
}

#[test]
fn silhouette_is_centered_near_projected_center() {
    let projector = BallProjector::new(Camera::basketball_broadcast(), ball_radius()).unwrap();
    let ball = Vector3::new(-3.0, 2.0, 4.0);
    let ellipse = projector.ellipse(&ball).unwrap();
    let center = projector.homography().project(&ball).unwrap();
    // Perspective shifts the ellipse center slightly off the projected
    // sphere center; both lie well inside the silhouette.
    assert!(ellipse.contains(center.x, center.y));
    assert!((ellipse.x0 - center.x).abs() < ellipse.a);
    assert!((ellipse.y0 - center.y).abs() < ellipse.a);
}

proptest! {
    /// Balls anywhere over a basketball court are recovered by the broadcast camera.
    #[test]
    fn court_positions_roundtrip(
        x in -20.0..20.0f64,
        y in -10.0..10.0f64,
        z in 0.2..8.0f64,
    ) {
        let projector = BallProjector::new(Camera::basketball_broadcast(), ball_radius()).unwrap();
        let truth = Vector3::new(x, y, z);
        let conic = projector.conic(&truth).unwrap();
        let est = projector.estimate_exact(&conic).unwrap();
        prop_assert!((est - truth).norm() < 1e-3, "estimate {:?} vs {:?}", est, truth);
    }
}
