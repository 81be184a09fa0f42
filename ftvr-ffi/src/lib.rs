/// FTVR C ABI - stereo frustums for C and C++ renderers
///
/// Matrices cross the boundary as 16 column-major floats, the layout
/// `glLoadMatrixf` takes. Every entry point returns a status code: `0` on
/// success, otherwise the pipeline's error code, and leaves its outputs
/// untouched on failure.
use std::ffi::c_int;

use ftvr_core::transform::{from_column_major, to_column_major};
use ftvr_core::{compute_stereo_frustum, FrustumError, FrustumResult, StereoConfig, StereoRig, ViewerPose};
use nalgebra::{Matrix4, Point3, Vector3};

pub const FTVR_STATUS_OK: c_int = 0;
/// A required pointer argument was null
pub const FTVR_STATUS_NULL_POINTER: c_int = 10;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FtvrVector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<FtvrVector3> for Vector3<f32> {
    fn from(v: FtvrVector3) -> Self {
        Vector3::new(v.x, v.y, v.z)
    }
}

impl From<Vector3<f32>> for FtvrVector3 {
    fn from(v: Vector3<f32>) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FtvrMatrix4 {
    pub m: [f32; 16],
}

impl From<&FtvrMatrix4> for Matrix4<f32> {
    fn from(m: &FtvrMatrix4) -> Self {
        from_column_major(&m.m)
    }
}

impl From<&Matrix4<f32>> for FtvrMatrix4 {
    fn from(m: &Matrix4<f32>) -> Self {
        Self { m: to_column_major(m) }
    }
}

/// Per-frame output of [`ftvr_modify_frustum`]
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FtvrFrustumData {
    pub mat_view_l: FtvrMatrix4,
    pub mat_view_r: FtvrMatrix4,
    pub mat_projection_l: FtvrMatrix4,
    pub mat_projection_r: FtvrMatrix4,
    /// Stylus tip in the host's world space. Drawn after loading either
    /// eye's view as the model-view matrix it lands on the physical pen.
    pub pen_position: FtvrVector3,
    pub pen_direction: FtvrVector3,
}

impl From<&FrustumResult> for FtvrFrustumData {
    fn from(result: &FrustumResult) -> Self {
        Self {
            mat_view_l: (&result.left.view).into(),
            mat_view_r: (&result.right.view).into(),
            mat_projection_l: (&result.left.projection).into(),
            mat_projection_r: (&result.right.projection).into(),
            pen_position: result.pointer_world.position.coords.into(),
            pen_direction: result.pointer_world.direction.into(),
        }
    }
}

fn status(error: FrustumError) -> c_int {
    tracing::debug!(error = %error, code = error.code(), "frustum request rejected");
    error.code()
}

/// Recompute both eye cameras around the host's own camera.
///
/// `view_hint` and `projection_hint` may be null, meaning the host has no
/// camera to anchor to; tracking space is then the world and the clip
/// planes fall back to their defaults.
///
/// # Safety
///
/// Every non-null pointer must point to a valid, properly aligned value.
/// `out`, `glass`, `pen_position` and `pen_direction` must not be null.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn ftvr_modify_frustum(
    out: *mut FtvrFrustumData,
    view_hint: *const FtvrMatrix4,
    projection_hint: *const FtvrMatrix4,
    screen_distance: f32,
    screen_height: f32,
    pupil_distance: f32,
    is_left_handed: bool,
    glass: *const FtvrVector3,
    pen_position: *const FtvrVector3,
    pen_direction: *const FtvrVector3,
) -> c_int {
    let (Some(out), Some(glass), Some(pen_position), Some(pen_direction)) =
        (out.as_mut(), glass.as_ref(), pen_position.as_ref(), pen_direction.as_ref())
    else {
        return FTVR_STATUS_NULL_POINTER;
    };
    let view_hint = view_hint.as_ref().map(Matrix4::<f32>::from);
    let projection_hint = projection_hint.as_ref().map(Matrix4::<f32>::from);

    let result = compute_stereo_frustum(
        &ViewerPose::new(glass.x, glass.y, glass.z),
        view_hint.as_ref(),
        projection_hint.as_ref(),
        screen_distance,
        screen_height,
        pupil_distance,
        is_left_handed,
        &Point3::from(Vector3::from(*pen_position)),
        &Vector3::from(*pen_direction),
    );

    match result {
        Ok(result) => {
            *out = FtvrFrustumData::from(&result);
            FTVR_STATUS_OK
        }
        Err(e) => status(e),
    }
}

/// Left and right projection matrices for the default display with the
/// given clip planes, interpupillary distance and aspect ratio.
///
/// # Safety
///
/// `out_left`, `out_right` and `glass` must be valid, non-null pointers.
#[no_mangle]
pub unsafe extern "C" fn ftvr_frustum_lr(
    out_left: *mut FtvrMatrix4,
    out_right: *mut FtvrMatrix4,
    glass: *const FtvrVector3,
    near: f32,
    far: f32,
    pupil_distance: f32,
    aspect: f32,
) -> c_int {
    let (Some(out_left), Some(out_right), Some(glass)) = (out_left.as_mut(), out_right.as_mut(), glass.as_ref())
    else {
        return FTVR_STATUS_NULL_POINTER;
    };

    let mut config = StereoConfig::default()
        .with_clip_planes(near, far)
        .with_pupil_distance(pupil_distance);
    config.screen = config.screen.with_aspect(aspect);

    let pair = StereoRig::new(config).and_then(|rig| rig.projection_pair(&ViewerPose::new(glass.x, glass.y, glass.z)));
    match pair {
        Ok([left, right]) => {
            *out_left = (&left).into();
            *out_right = (&right).into();
            FTVR_STATUS_OK
        }
        Err(e) => status(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::ptr;

    fn vec3(x: f32, y: f32, z: f32) -> FtvrVector3 {
        FtvrVector3 { x, y, z }
    }

    fn modify(
        out: &mut FtvrFrustumData,
        view_hint: Option<&FtvrMatrix4>,
        screen_distance: f32,
        glass: FtvrVector3,
    ) -> c_int {
        let view_hint = view_hint.map_or(ptr::null(), |m| m as *const _);
        let pen = vec3(0.1, 0.1, -0.1);
        let dir = vec3(0.0, 0.0, -1.0);
        unsafe {
            ftvr_modify_frustum(out, view_hint, ptr::null(), screen_distance, 3.0, 0.066, false, &glass, &pen, &dir)
        }
    }

    #[test]
    fn test_modify_frustum_fills_output() {
        let mut out = FtvrFrustumData::default();
        let status = modify(&mut out, None, 10.0, vec3(0.0, 0.0, -0.4));
        assert_eq!(status, FTVR_STATUS_OK);

        // Column-major: translation in elements 12..15
        assert_relative_eq!(out.mat_view_l.m[12], 0.033, epsilon = 1e-5);
        assert_relative_eq!(out.mat_view_r.m[12], -0.033, epsilon = 1e-5);
        assert_eq!(out.mat_projection_l.m[11], -1.0);
        assert_eq!(out.pen_position, vec3(0.1, 0.1, -0.1));
        assert_eq!(out.pen_direction, vec3(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_error_leaves_output_untouched() {
        let mut out = FtvrFrustumData::default();
        let status = modify(&mut out, None, 0.0, vec3(0.0, 0.0, -0.4));
        assert_eq!(status, 1);
        assert_eq!(out, FtvrFrustumData::default());

        let skewed = FtvrMatrix4 {
            m: [2.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0],
        };
        assert_eq!(modify(&mut out, Some(&skewed), 10.0, vec3(0.0, 0.0, -0.4)), 8);
        assert_eq!(out, FtvrFrustumData::default());
    }

    #[test]
    fn test_null_pointers_are_rejected() {
        let glass = vec3(0.0, 0.0, 0.0);
        let status = unsafe {
            ftvr_modify_frustum(
                ptr::null_mut(),
                ptr::null(),
                ptr::null(),
                10.0,
                3.0,
                0.066,
                false,
                &glass,
                &glass,
                &glass,
            )
        };
        assert_eq!(status, FTVR_STATUS_NULL_POINTER);

        let mut left = FtvrMatrix4::default();
        let status = unsafe { ftvr_frustum_lr(&mut left, ptr::null_mut(), &glass, 0.01, 100.0, 0.066, 16.0 / 9.0) };
        assert_eq!(status, FTVR_STATUS_NULL_POINTER);
        assert_eq!(left, FtvrMatrix4::default());
    }

    #[test]
    fn test_frustum_lr_is_mirrored_for_centered_viewer() {
        let mut left = FtvrMatrix4::default();
        let mut right = FtvrMatrix4::default();
        let glass = vec3(0.0, 0.0, 0.0);
        let status = unsafe { ftvr_frustum_lr(&mut left, &mut right, &glass, 0.01, 100.0, 0.066, 16.0 / 9.0) };
        assert_eq!(status, FTVR_STATUS_OK);

        // Horizontal skew (element 8) flips sign between eyes
        assert!(left.m[8].abs() > 1e-4);
        assert_relative_eq!(left.m[8], -right.m[8], epsilon = 1e-5);
        assert_relative_eq!(left.m[5], right.m[5], epsilon = 1e-6);
    }

    #[test]
    fn test_frustum_lr_reports_bad_clip_planes() {
        let mut left = FtvrMatrix4::default();
        let mut right = FtvrMatrix4::default();
        let glass = vec3(0.0, 0.0, 0.0);
        let status = unsafe { ftvr_frustum_lr(&mut left, &mut right, &glass, 1.0, 0.5, 0.066, 16.0 / 9.0) };
        assert_eq!(status, 2);
    }
}
