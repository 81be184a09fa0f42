//! Whole-pipeline properties of the stereo rig

use approx::assert_relative_eq;
use ftvr_core::{
    compute_stereo_frustum, Eye, FrameInput, FrustumError, Handedness, PointerPose, StereoConfig,
    StereoRig, ViewerPose,
};
use nalgebra::{Matrix4, Point3, Vector3};

fn rig(pupil_distance: f32, handedness: Handedness) -> StereoRig {
    let config = StereoConfig::new(10.0, 3.0)
        .with_pupil_distance(pupil_distance)
        .with_handedness(handedness)
        .with_clip_planes(0.05, 500.0);
    StereoRig::new(config).expect("valid configuration")
}

fn viewer_grid() -> Vec<ViewerPose> {
    let mut poses = Vec::new();
    for x in [-1.5f32, -0.2, 0.0, 0.4, 2.0] {
        for y in [-0.8f32, 0.0, 0.3] {
            for z in [-3.0f32, -0.4, 0.0, 5.0] {
                poses.push(ViewerPose::new(x, y, z));
            }
        }
    }
    poses
}

fn pointer() -> PointerPose {
    PointerPose::new(Point3::new(0.1, 0.1, -0.1), Vector3::new(0.2, -0.1, 1.0))
}

#[test]
fn zero_pupil_distance_collapses_eyes_everywhere() {
    let rig = rig(0.0, Handedness::Right);
    for viewer in viewer_grid() {
        let result = rig.compute(&FrameInput::new(viewer, pointer())).unwrap();
        assert_eq!(result.left, result.right);
    }
}

#[test]
fn flipping_handedness_negates_only_depth_convention() {
    let input = FrameInput::new(ViewerPose::new(0.3, -0.2, -0.4), pointer());
    let rh = rig(0.066, Handedness::Right).compute(&input).unwrap();
    let lh = rig(0.066, Handedness::Left).compute(&input).unwrap();

    for eye in Eye::BOTH {
        let (r, l) = (rh.eye(eye), lh.eye(eye));
        for row in 0..4 {
            for col in 0..4 {
                let view_sign = if row == 2 { -1.0 } else { 1.0 };
                assert_eq!(l.view[(row, col)], view_sign * r.view[(row, col)]);

                let projection_sign = if col == 2 { -1.0 } else { 1.0 };
                assert_eq!(l.projection[(row, col)], projection_sign * r.projection[(row, col)]);
            }
        }
        // Clip-space output is identical
        assert_relative_eq!(l.view_projection(), r.view_projection(), epsilon = 1e-6);
    }
}

#[test]
fn centered_eye_reduces_to_symmetric_perspective() {
    let input = FrameInput::new(ViewerPose::new(0.0, 0.0, -0.4), pointer());
    let result = rig(0.0, Handedness::Right).compute(&input).unwrap();

    let distance = 10.4f32;
    let fovy = 2.0 * (1.5 / distance).atan();
    let expected = Matrix4::new_perspective(16.0 / 9.0, fovy, 0.05, 500.0);
    assert_relative_eq!(result.left.projection, expected, epsilon = 1e-4);
    assert_eq!(result.left.projection[(0, 2)], 0.0);
    assert_eq!(result.left.projection[(1, 2)], 0.0);
}

#[test]
fn centered_eye_reduces_to_mirrored_perspective_left_handed() {
    let input = FrameInput::new(ViewerPose::new(0.0, 0.0, -0.4), pointer());
    let result = rig(0.0, Handedness::Left).compute(&input).unwrap();

    let fovy = 2.0 * (1.5f32 / 10.4).atan();
    let mut expected = Matrix4::new_perspective(16.0 / 9.0, fovy, 0.05, 500.0);
    expected.column_mut(2).neg_mut();

    assert_relative_eq!(result.left.projection, expected, epsilon = 1e-4);
    assert_eq!(result.left.projection[(3, 2)], 1.0);
    assert_eq!(result.left.projection[(0, 2)], 0.0);
    assert_eq!(result.left.projection[(1, 2)], 0.0);
}

#[test]
fn valid_inputs_produce_finite_output() {
    for handedness in [Handedness::Right, Handedness::Left] {
        let rig = rig(0.066, handedness);
        for viewer in viewer_grid() {
            let result = rig.compute(&FrameInput::new(viewer, pointer())).unwrap();
            assert!(result.is_finite(), "non-finite output for {:?}", viewer);
        }
    }
}

#[test]
fn degenerate_inputs_report_errors() {
    let rig = rig(0.066, Handedness::Right);

    let on_screen = FrameInput::new(ViewerPose::new(0.0, 0.0, 10.0), pointer());
    assert!(matches!(
        rig.compute(&on_screen),
        Err(FrustumError::DegenerateEyeDistance(_))
    ));

    let nan_viewer = FrameInput::new(ViewerPose::new(0.0, f32::NAN, 0.0), pointer());
    assert_eq!(rig.compute(&nan_viewer), Err(FrustumError::NonFinite("viewer pose")));

    let inf_pointer = FrameInput::new(
        ViewerPose::default(),
        PointerPose::new(Point3::new(f32::INFINITY, 0.0, 0.0), Vector3::z()),
    );
    assert_eq!(rig.compute(&inf_pointer), Err(FrustumError::NonFinite("pointer pose")));

    let bad_hint = FrameInput::new(ViewerPose::default(), pointer())
        .with_projection_hint(Matrix4::new_orthographic(-1.0, 1.0, -1.0, 1.0, 0.1, 10.0));
    assert_eq!(rig.compute(&bad_hint), Err(FrustumError::InvalidProjectionHint));
}

#[test]
fn degenerate_configuration_fails_one_shot_call() {
    let viewer = ViewerPose::new(0.0, 0.0, -0.4);
    let p = pointer();
    let call = |distance: f32, height: f32, ipd: f32| {
        compute_stereo_frustum(&viewer, None, None, distance, height, ipd, false, &p.position, &p.direction)
    };

    assert_eq!(call(0.0, 3.0, 0.066).unwrap_err().code(), 1);
    assert_eq!(call(-10.0, 3.0, 0.066).unwrap_err().code(), 1);
    assert_eq!(call(10.0, 0.0, 0.066).unwrap_err().code(), 1);
    assert_eq!(call(10.0, 3.0, -0.066).unwrap_err().code(), 4);
    assert!(call(10.0, 3.0, 0.066).is_ok());
}

#[test]
fn pointer_at_eye_lands_on_camera_origin() {
    let rig = rig(0.066, Handedness::Right);
    let viewer = ViewerPose::new(0.2, 0.1, -0.5);
    let probe = rig.compute(&FrameInput::new(viewer, pointer())).unwrap();

    for eye in Eye::BOTH {
        let at_eye = PointerPose::new(probe.eye(eye).position, Vector3::z());
        let result = rig.compute(&FrameInput::new(viewer, at_eye)).unwrap();
        assert_relative_eq!(result.eye(eye).pointer.position, Point3::origin(), epsilon = 1e-6);
        assert_relative_eq!(result.eye(eye).pointer.direction.norm(), 1.0, epsilon = 1e-6);
    }
}

#[test]
fn reference_scenario() {
    let viewer = ViewerPose::new(0.0, 0.0, -0.4);
    let p = pointer();
    let result =
        compute_stereo_frustum(&viewer, None, None, 10.0, 3.0, 0.066, false, &p.position, &p.direction)
            .unwrap();

    assert_ne!(result.left.view, result.right.view);
    assert!(result.left.view.try_inverse().is_some());
    assert!(result.right.view.try_inverse().is_some());

    let separation = result.right.position - result.left.position;
    assert_relative_eq!(separation, Vector3::new(0.066, 0.0, 0.0), epsilon = 1e-6);

    // The two frusta lean towards each other
    assert!(result.left.projection[(0, 2)] > 0.0);
    assert!(result.right.projection[(0, 2)] < 0.0);
}

#[test]
fn hinted_camera_keeps_pointer_on_stylus() {
    let hint = Matrix4::look_at_rh(
        &Point3::new(4.0, 2.0, 6.0),
        &Point3::new(0.0, 0.5, 0.0),
        &Vector3::y(),
    );
    let input = FrameInput::new(ViewerPose::new(0.05, 0.02, -0.3), pointer()).with_view_hint(hint);
    let result = rig(0.066, Handedness::Right).compute(&input).unwrap();

    for eye in Eye::BOTH {
        let frame = result.eye(eye);
        let drawn = frame.view.transform_point(&result.pointer_world.position);
        assert_relative_eq!(drawn, frame.pointer.position, epsilon = 1e-4);

        let drawn_direction = frame.view.transform_vector(&result.pointer_world.direction);
        assert_relative_eq!(drawn_direction, frame.pointer.direction, epsilon = 1e-4);
    }
}
