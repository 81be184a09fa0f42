/// Stylus re-projection into eye camera space
use nalgebra::{Matrix4, Unit, UnitQuaternion};

use crate::error::{FrustumError, Result};
use crate::geometry::{PointerPose, ScreenBasis};

/// Express `pointer` in the space `view` maps into.
///
/// The position goes through the full rigid transform, the direction through
/// its linear part only, and is re-normalised afterwards.
pub fn reproject(pointer: &PointerPose, view: &Matrix4<f32>) -> Result<PointerPose> {
    if !pointer.is_finite() {
        return Err(FrustumError::NonFinite("pointer pose"));
    }

    let position = view.transform_point(&pointer.position);
    let direction = view
        .transform_vector(&pointer.direction)
        .try_normalize(f32::EPSILON)
        .ok_or(FrustumError::DegeneratePointerDirection)?;

    if position.iter().any(|c| !c.is_finite()) {
        return Err(FrustumError::NonFinite("re-projected pointer"));
    }
    Ok(PointerPose::new(position, direction))
}

/// Full stylus orientation from its direction and roll angle.
///
/// The tracker only sees two points on the stylus, so it reports a direction
/// and a separate roll. The returned rotation maps the basis forward axis onto
/// `pointer.direction` and then spins it by `roll` radians about that
/// direction (clockwise when looking along it). Returns `None` for a
/// zero-length direction.
pub fn pointer_orientation(
    pointer: &PointerPose,
    basis: &ScreenBasis,
    roll: f32,
) -> Option<UnitQuaternion<f32>> {
    let direction = Unit::try_new(pointer.direction, f32::EPSILON)?;
    let aim = UnitQuaternion::rotation_between(&basis.forward, &*direction).unwrap_or_else(|| {
        // Pointing straight back at the viewer
        UnitQuaternion::from_axis_angle(&Unit::new_normalize(basis.up), std::f32::consts::PI)
    });
    let spin = UnitQuaternion::from_axis_angle(&direction, roll);
    Some(spin * aim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Handedness;
    use crate::transform::ViewBuilder;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};

    #[test]
    fn test_pointer_at_eye_maps_to_origin() {
        let eye = Point3::new(0.033, 0.0, -0.4);
        let view = ViewBuilder::eye_view(&eye, &ScreenBasis::default(), Handedness::Right);
        let pointer = PointerPose::new(eye, Vector3::new(0.0, 0.0, 1.0));

        let local = reproject(&pointer, &view).unwrap();
        assert_relative_eq!(local.position, Point3::origin(), epsilon = 1e-6);
        // Pointing into the screen means pointing down -Z for a right-handed camera
        assert_relative_eq!(local.direction, Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_direction_ignores_translation_and_is_normalised() {
        let view = Matrix4::new_translation(&Vector3::new(5.0, -3.0, 2.0));
        let pointer = PointerPose::new(Point3::new(0.1, 0.1, -0.1), Vector3::new(0.0, 3.0, 4.0));

        let local = reproject(&pointer, &view).unwrap();
        assert_relative_eq!(local.position, Point3::new(5.1, -2.9, 1.9), epsilon = 1e-6);
        assert_relative_eq!(local.direction, Vector3::new(0.0, 0.6, 0.8), epsilon = 1e-6);
    }

    #[test]
    fn test_zero_direction_is_rejected() {
        let pointer = PointerPose::new(Point3::origin(), Vector3::zeros());
        assert_eq!(
            reproject(&pointer, &Matrix4::identity()),
            Err(FrustumError::DegeneratePointerDirection)
        );
    }

    #[test]
    fn test_non_finite_pointer_is_rejected() {
        let pointer = PointerPose::new(Point3::new(f32::NAN, 0.0, 0.0), Vector3::z());
        assert_eq!(
            reproject(&pointer, &Matrix4::identity()),
            Err(FrustumError::NonFinite("pointer pose"))
        );
    }

    #[test]
    fn test_orientation_aims_forward_axis() {
        let basis = ScreenBasis::default();
        let pointer = PointerPose::new(Point3::origin(), Vector3::new(1.0, 0.0, 1.0));
        let rotation = pointer_orientation(&pointer, &basis, 0.0).unwrap();
        assert_relative_eq!(
            rotation * basis.forward,
            Vector3::new(1.0, 0.0, 1.0).normalize(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_roll_keeps_direction() {
        let basis = ScreenBasis::default();
        let pointer = PointerPose::new(Point3::origin(), Vector3::new(0.0, 1.0, 1.0));
        let rolled = pointer_orientation(&pointer, &basis, 0.8).unwrap();
        let unrolled = pointer_orientation(&pointer, &basis, 0.0).unwrap();

        let direction = pointer.direction.normalize();
        assert_relative_eq!(rolled * basis.forward, direction, epsilon = 1e-6);
        assert_relative_eq!(rolled.angle_to(&unrolled), 0.8, epsilon = 1e-5);
    }

    #[test]
    fn test_backward_pointer_orientation() {
        let basis = ScreenBasis::default();
        let pointer = PointerPose::new(Point3::origin(), -Vector3::z());
        let rotation = pointer_orientation(&pointer, &basis, 0.0).unwrap();
        assert_relative_eq!(rotation * basis.forward, -Vector3::z(), epsilon = 1e-6);
    }
}
