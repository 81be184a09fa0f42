/// Tracked poses and the physical screen the viewer looks into
use nalgebra::{Point3, UnitQuaternion, Vector3};

use crate::error::{FrustumError, Result};

/// Screen aspect ratio assumed when the host does not provide one
pub const DEFAULT_ASPECT_RATIO: f32 = 16.0 / 9.0;

const BASIS_TOLERANCE: f32 = 1e-4;

/// Coordinate-system convention of the host renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Handedness {
    /// Camera looks down -Z (OpenGL style)
    #[default]
    Right,
    /// Camera looks down +Z
    Left,
}

impl Handedness {
    pub fn from_left_handed(is_left_handed: bool) -> Self {
        if is_left_handed {
            Handedness::Left
        } else {
            Handedness::Right
        }
    }

    /// Sign of the camera-space Z axis along the viewing direction.
    pub fn depth_sign(self) -> f32 {
        match self {
            Handedness::Right => -1.0,
            Handedness::Left => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Handedness::Right => Handedness::Left,
            Handedness::Left => Handedness::Right,
        }
    }
}

/// Midpoint between the viewer's eyes (the tracked glasses)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewerPose {
    pub position: Point3<f32>,
    /// Head orientation in tracking space. `None` means the interocular axis
    /// is the screen's right axis.
    pub orientation: Option<UnitQuaternion<f32>>,
}

impl ViewerPose {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            orientation: None,
        }
    }

    pub fn with_orientation(mut self, orientation: UnitQuaternion<f32>) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|c| c.is_finite())
            && self
                .orientation
                .map_or(true, |q| q.coords.iter().all(|c| c.is_finite()))
    }
}

impl Default for ViewerPose {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

/// Tracked stylus: nib position and pointing direction
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointerPose {
    pub position: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl PointerPose {
    pub fn new(position: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            position,
            direction,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|c| c.is_finite()) && self.direction.iter().all(|c| c.is_finite())
    }
}

impl Default for PointerPose {
    fn default() -> Self {
        Self::new(Point3::origin(), Vector3::z())
    }
}

/// Physical screen rectangle, centered on the forward axis
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScreenGeometry {
    /// Perpendicular distance from the tracking origin to the screen plane
    pub distance: f32,
    pub height: f32,
    /// Width over height
    pub aspect: f32,
}

impl ScreenGeometry {
    pub fn new(distance: f32, height: f32) -> Self {
        Self {
            distance,
            height,
            aspect: DEFAULT_ASPECT_RATIO,
        }
    }

    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }

    pub fn width(&self) -> f32 {
        self.height * self.aspect
    }

    /// Half width and half height of the rectangle
    pub fn half_extents(&self) -> (f32, f32) {
        (self.width() * 0.5, self.height * 0.5)
    }

    pub fn validate(&self) -> Result<()> {
        let valid = [self.distance, self.height, self.aspect]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0);
        if valid {
            Ok(())
        } else {
            Err(FrustumError::InvalidScreenGeometry {
                distance: self.distance,
                height: self.height,
                aspect: self.aspect,
            })
        }
    }
}

/// Orientation of the screen in tracking space.
///
/// `forward` points from the viewer into the screen. The default is x to the
/// right, y up and z into the screen, in meters, with the origin at the
/// nominal viewpoint `ScreenGeometry::distance` in front of the screen
/// center. Trackers that report positions relative to the screen center
/// need their samples shifted by that distance along `forward` first.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScreenBasis {
    pub right: Vector3<f32>,
    pub up: Vector3<f32>,
    pub forward: Vector3<f32>,
}

impl ScreenBasis {
    pub fn new(right: Vector3<f32>, up: Vector3<f32>, forward: Vector3<f32>) -> Result<Self> {
        let basis = Self { right, up, forward };
        basis.validate()?;
        Ok(basis)
    }

    /// Check that the three axes are unit length and mutually orthogonal.
    pub fn validate(&self) -> Result<()> {
        let axes = [self.right, self.up, self.forward];
        if axes.iter().any(|a| a.iter().any(|c| !c.is_finite())) {
            return Err(FrustumError::NonFinite("screen basis"));
        }

        let unit = axes.iter().all(|a| (a.norm() - 1.0).abs() < BASIS_TOLERANCE);
        let orthogonal = self.right.dot(&self.up).abs() < BASIS_TOLERANCE
            && self.right.dot(&self.forward).abs() < BASIS_TOLERANCE
            && self.up.dot(&self.forward).abs() < BASIS_TOLERANCE;

        if unit && orthogonal {
            Ok(())
        } else {
            Err(FrustumError::MalformedBasis)
        }
    }

    /// Components of a tracking-space point along right, up and forward
    pub fn components(&self, point: &Point3<f32>) -> Vector3<f32> {
        Vector3::new(
            self.right.dot(&point.coords),
            self.up.dot(&point.coords),
            self.forward.dot(&point.coords),
        )
    }
}

impl Default for ScreenBasis {
    fn default() -> Self {
        Self {
            right: Vector3::x(),
            up: Vector3::y(),
            forward: Vector3::z(),
        }
    }
}
