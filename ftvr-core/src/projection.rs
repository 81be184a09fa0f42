/// Off-axis (asymmetric) perspective projection for a tracked eye
use nalgebra::{Matrix4, Point3};

use crate::error::{FrustumError, Result};
use crate::geometry::{Handedness, ScreenBasis, ScreenGeometry};

/// Closest an eye may come to the screen plane before the frustum degenerates
pub const MIN_EYE_DISTANCE: f32 = 1e-4;

const HINT_TOLERANCE: f32 = 1e-4;

/// Frustum side planes measured on the near plane, in eye camera units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrustumExtents {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl FrustumExtents {
    /// Extents for an eye at `eye` (tracking space) looking through the
    /// screen rectangle.
    ///
    /// The screen center lies on the forward axis at `screen.distance`; the
    /// eye's offset from that axis shifts the window the opposite way, which
    /// keeps the image registered to the physical screen.
    pub fn off_axis(
        eye: &Point3<f32>,
        screen: &ScreenGeometry,
        basis: &ScreenBasis,
        near: f32,
        far: f32,
    ) -> Result<Self> {
        validate_clip_planes(near, far)?;

        let local = basis.components(eye);
        let (eye_x, eye_y) = (local.x, local.y);
        let dist = screen.distance - local.z;

        if !(eye_x.is_finite() && eye_y.is_finite() && dist.is_finite()) {
            return Err(FrustumError::NonFinite("eye position"));
        }
        if dist <= MIN_EYE_DISTANCE {
            return Err(FrustumError::DegenerateEyeDistance(dist));
        }

        let (half_w, half_h) = screen.half_extents();
        let scale = near / dist;
        Ok(Self {
            left: -(half_w + eye_x) * scale,
            right: (half_w - eye_x) * scale,
            bottom: -(half_h + eye_y) * scale,
            top: (half_h - eye_y) * scale,
            near,
            far,
        })
    }

    /// Whether the frustum is symmetric about the view axis
    pub fn is_symmetric(&self) -> bool {
        self.left == -self.right && self.bottom == -self.top
    }

    /// Perspective matrix for these extents, OpenGL clip depth [-1, 1].
    ///
    /// The left-handed variant negates the depth column so that it pairs with
    /// a view matrix whose depth row was negated.
    pub fn projection(&self, handedness: Handedness) -> Matrix4<f32> {
        let (l, r, b, t, n, f) = (self.left, self.right, self.bottom, self.top, self.near, self.far);
        let d = handedness.depth_sign();

        Matrix4::new(
            2.0 * n / (r - l), 0.0, -d * (r + l) / (r - l), 0.0, //
            0.0, 2.0 * n / (t - b), -d * (t + b) / (t - b), 0.0, //
            0.0, 0.0, d * (f + n) / (f - n), -2.0 * f * n / (f - n), //
            0.0, 0.0, d, 0.0,
        )
    }
}

/// Near/far and aspect recovered from a host projection matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionHint {
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
}

impl ProjectionHint {
    /// Decode a perspective matrix built with OpenGL clip depth conventions.
    pub fn decode(m: &Matrix4<f32>, handedness: Handedness) -> Result<Self> {
        if m.iter().any(|c| !c.is_finite()) {
            return Err(FrustumError::InvalidProjectionHint);
        }

        let d = handedness.depth_sign();
        let perspective = (m[(3, 2)] - d).abs() < HINT_TOLERANCE
            && m[(3, 3)].abs() < HINT_TOLERANCE
            && m[(3, 0)].abs() < HINT_TOLERANCE
            && m[(3, 1)].abs() < HINT_TOLERANCE;
        if !perspective {
            return Err(FrustumError::InvalidProjectionHint);
        }

        // Normalise to the right-handed layout
        let m22 = -d * m[(2, 2)];
        let m23 = m[(2, 3)];
        let near = m23 / (m22 - 1.0);
        let far = m23 / (m22 + 1.0);
        let aspect = m[(1, 1)] / m[(0, 0)];

        let valid = near.is_finite()
            && far.is_finite()
            && aspect.is_finite()
            && near > 0.0
            && far > near
            && aspect > 0.0;
        if valid {
            Ok(Self { near, far, aspect })
        } else {
            Err(FrustumError::InvalidProjectionHint)
        }
    }
}

/// Near must be positive and strictly in front of far.
pub fn validate_clip_planes(near: f32, far: f32) -> Result<()> {
    if near.is_finite() && far.is_finite() && near > 0.0 && near < far {
        Ok(())
    } else {
        Err(FrustumError::InvalidClipPlanes { near, far })
    }
}
