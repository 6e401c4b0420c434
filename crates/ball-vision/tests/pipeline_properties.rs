//! Property-based tests for the projection pipeline.
//!
//! Run with: cargo test -p ball-vision --test pipeline_properties

use ball_vision::{
    estimate_position, project_position, Scenario, ScenarioPreset, ViewMode, VisionError,
};
use nalgebra::Vector3;
use projective_geometry::{BallProjector, Camera};
use proptest::prelude::*;
use sim_trajectory::PhysicsConstants;

fn projector(camera: Camera) -> BallProjector {
    BallProjector::new(camera, PhysicsConstants::default().ball_radius).expect("valid projector")
}

/// Positions over a basketball court, in front of the broadcast camera.
fn arb_court_position() -> impl Strategy<Value = Vector3<f64>> {
    (-20.0..20.0f64, -10.0..15.0f64, 0.2..10.0f64).prop_map(|(x, y, z)| Vector3::new(x, y, z))
}

proptest! {
    /// A ball recovered from its own silhouette lands where it started.
    #[test]
    fn estimate_recovers_position(position in arb_court_position()) {
        let projector = projector(Camera::basketball_broadcast());
        let estimate = estimate_position(&projector, &position).unwrap();
        let error = (estimate - position).norm();
        prop_assert!(error < 1e-3, "error {} at {:?}", error, position);
    }

    /// The silhouette contains the projected ball center.
    #[test]
    fn silhouette_contains_projected_center(position in arb_court_position()) {
        let projector = projector(Camera::basketball_broadcast());
        let ellipse = project_position(&projector, &position, ViewMode::Perspective).unwrap();
        let center = projector.homography().project(&position).unwrap();
        prop_assert!(ellipse.contains(center.x, center.y));
    }

    /// Seen from straight above, the shadow does not depend on height.
    #[test]
    fn ground_shadow_ignores_height(position in arb_court_position(), lift in 0.0..5.0f64) {
        let projector = projector(Camera::basketball_bird_eye());
        let low = project_position(&projector, &position, ViewMode::GroundShadow).unwrap();
        let raised = position + Vector3::new(0.0, 0.0, lift);
        let high = project_position(&projector, &raised, ViewMode::GroundShadow).unwrap();
        prop_assert_eq!(low, high);
    }
}

#[test]
fn every_preset_runs_without_frame_failures() {
    for preset in ScenarioPreset::ALL {
        let report = Scenario::preset(preset).run().unwrap();
        assert_eq!(report.name, preset.name());
        assert!(
            report.perspective.iter().all(|f| f.error.is_none()),
            "{preset}: {:?}",
            report.perspective.iter().find_map(|f| f.error.clone())
        );
        assert_eq!(report.validation.failures, 0, "{preset}");
        assert!(report.ground_shadow.is_some());
        assert_eq!(report.observations.is_some(), preset == ScenarioPreset::Noise);
    }
}

#[test]
fn ball_behind_camera_has_no_silhouette() {
    let projector = projector(Camera::soccer_broadcast());
    let err = project_position(&projector, &Vector3::new(0.0, -60.0, 60.0), ViewMode::Perspective)
        .unwrap_err();
    assert!(matches!(err, VisionError::BehindCamera { .. }));
}

#[test]
fn camera_inside_ball_is_a_frame_error() {
    let camera = Camera::basketball_broadcast();
    let projector = projector(camera);
    let just_ahead = camera.translation + camera.rotation() * Vector3::z() * 0.05;
    let err = project_position(&projector, &just_ahead, ViewMode::Perspective).unwrap_err();
    assert!(matches!(err, VisionError::Geometry(_)));
    assert!(err.is_frame_error());
}
