/// Rigid view transforms for the tracked eyes
use nalgebra::{Matrix3, Matrix4, Point3};

use crate::error::{FrustumError, Result};
use crate::geometry::{Handedness, ScreenBasis};

const RIGID_TOLERANCE: f32 = 1e-3;

/// Builder for eye view matrices looking perpendicular into the screen
pub struct ViewBuilder;

impl ViewBuilder {
    /// Rotation taking tracking-space vectors into eye camera space.
    ///
    /// Rows are right, up and the forward axis scaled by the handedness depth
    /// sign, so a right-handed camera sees the screen along -Z.
    pub fn camera_rotation(basis: &ScreenBasis, handedness: Handedness) -> Matrix3<f32> {
        let depth = basis.forward * handedness.depth_sign();
        Matrix3::from_rows(&[
            basis.right.transpose(),
            basis.up.transpose(),
            depth.transpose(),
        ])
    }

    /// World (tracking space) to eye camera transform for an eye at `eye`.
    pub fn eye_view(eye: &Point3<f32>, basis: &ScreenBasis, handedness: Handedness) -> Matrix4<f32> {
        let r = Self::camera_rotation(basis, handedness);
        let t = -(r * eye.coords);
        Matrix4::new(
            r[(0, 0)], r[(0, 1)], r[(0, 2)], t.x, //
            r[(1, 0)], r[(1, 1)], r[(1, 2)], t.y, //
            r[(2, 0)], r[(2, 1)], r[(2, 2)], t.z, //
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Anchor tracking space to an existing host camera.
    ///
    /// `view_hint` is the host camera's world to camera matrix in the same
    /// handedness. The result maps world points into tracking space so that
    /// `eye_view * tracking_from_world` reproduces the hint for an eye sitting
    /// at the tracking origin.
    pub fn tracking_from_world(
        view_hint: &Matrix4<f32>,
        basis: &ScreenBasis,
        handedness: Handedness,
    ) -> Result<Matrix4<f32>> {
        if !is_rigid(view_hint) {
            return Err(FrustumError::InvalidViewHint);
        }
        let camera_to_tracking = Self::camera_rotation(basis, handedness).transpose();
        Ok(camera_to_tracking.to_homogeneous() * view_hint)
    }
}

/// Rotation (or reflection) plus translation, with a finite affine last row.
pub fn is_rigid(m: &Matrix4<f32>) -> bool {
    if m.iter().any(|c| !c.is_finite()) {
        return false;
    }
    let affine = m[(3, 0)] == 0.0 && m[(3, 1)] == 0.0 && m[(3, 2)] == 0.0 && m[(3, 3)] == 1.0;
    let linear = linear_part(m);
    let orthonormal = (linear.transpose() * linear - Matrix3::identity()).norm() < RIGID_TOLERANCE;
    affine && orthonormal
}

/// Inverse of a rigid transform without a general 4x4 inversion
pub fn rigid_inverse(m: &Matrix4<f32>) -> Matrix4<f32> {
    let r = linear_part(m).transpose();
    let t = -(r * m.fixed_view::<3, 1>(0, 3));
    Matrix4::new(
        r[(0, 0)], r[(0, 1)], r[(0, 2)], t.x, //
        r[(1, 0)], r[(1, 1)], r[(1, 2)], t.y, //
        r[(2, 0)], r[(2, 1)], r[(2, 2)], t.z, //
        0.0, 0.0, 0.0, 1.0,
    )
}

fn linear_part(m: &Matrix4<f32>) -> Matrix3<f32> {
    m.fixed_view::<3, 3>(0, 0).into_owned()
}

/// Column-major copy of a matrix, the memory order OpenGL expects
pub fn to_column_major(m: &Matrix4<f32>) -> [f32; 16] {
    let mut out = [0.0; 16];
    out.copy_from_slice(m.as_slice());
    out
}

/// Rebuild a matrix from column-major storage
pub fn from_column_major(values: &[f32; 16]) -> Matrix4<f32> {
    Matrix4::from_column_slice(values)
}
