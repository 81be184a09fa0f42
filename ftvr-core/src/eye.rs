/// Eye position resolution from the tracked glasses
use nalgebra::{Point3, Vector3};

use crate::error::{FrustumError, Result};
use crate::geometry::{ScreenBasis, ViewerPose};

/// Which of the two stereo views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    pub const BOTH: [Eye; 2] = [Eye::Left, Eye::Right];

    /// Direction of this eye's offset along the interocular axis
    pub fn lateral_sign(self) -> f32 {
        match self {
            Eye::Left => -1.0,
            Eye::Right => 1.0,
        }
    }
}

/// Left and right eye positions in tracking space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyePositions {
    pub left: Point3<f32>,
    pub right: Point3<f32>,
}

impl EyePositions {
    pub fn get(&self, eye: Eye) -> Point3<f32> {
        match eye {
            Eye::Left => self.left,
            Eye::Right => self.right,
        }
    }

    pub fn separation(&self) -> f32 {
        (self.right - self.left).norm()
    }
}

/// Axis joining the two eyes, pointing from the left eye to the right eye.
pub fn interocular_axis(viewer: &ViewerPose, basis: &ScreenBasis) -> Vector3<f32> {
    match viewer.orientation {
        Some(orientation) => orientation * basis.right,
        None => basis.right,
    }
}

/// Split the viewer reference point into two eyes `pupil_distance` apart.
pub fn resolve_eyes(
    viewer: &ViewerPose,
    basis: &ScreenBasis,
    pupil_distance: f32,
) -> Result<EyePositions> {
    if !pupil_distance.is_finite() || pupil_distance < 0.0 {
        return Err(FrustumError::InvalidPupilDistance(pupil_distance));
    }
    if !viewer.is_finite() {
        return Err(FrustumError::NonFinite("viewer pose"));
    }

    let half = interocular_axis(viewer, basis) * (pupil_distance * 0.5);
    Ok(EyePositions {
        left: viewer.position + half * Eye::Left.lateral_sign(),
        right: viewer.position + half * Eye::Right.lateral_sign(),
    })
}
