/// FTVR Web - WASM bindings for the stereo frustum pipeline
///
/// Hosts rendering with WebGL hand over flat `Float32Array`s and get the
/// matrices back column-major, ready for `uniformMatrix4fv`.
use ftvr_core::transform::{from_column_major, to_column_major};
use ftvr_core::{
    FrameInput, FrustumError, FrustumResult, Handedness, PointerPose, StereoConfig, StereoRig, ViewerPose,
};
use nalgebra::{Matrix4, Point3, Quaternion, UnitQuaternion, Vector3};
use thiserror::Error;
use wasm_bindgen::prelude::*;

/// Floats in a packed result: four matrices plus the world-space pointer
pub const PACKED_LEN: usize = 4 * 16 + 6;

#[derive(Debug, Error, PartialEq)]
pub enum BindingError {
    #[error("{name} expects {expected} values, got {got}")]
    Length {
        name: &'static str,
        expected: &'static str,
        got: usize,
    },

    #[error("glasses rotation has zero length")]
    ZeroRotation,

    #[error("status {}: {0}", .0.code())]
    Frustum(#[from] FrustumError),
}

impl From<BindingError> for JsValue {
    fn from(e: BindingError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

/// `[x, y, z]` or `[x, y, z, qx, qy, qz, qw]`
fn viewer_from_slice(values: &[f32]) -> Result<ViewerPose, BindingError> {
    match *values {
        [x, y, z] => Ok(ViewerPose::new(x, y, z)),
        [x, y, z, qx, qy, qz, qw] => {
            let rotation = UnitQuaternion::try_new(Quaternion::new(qw, qx, qy, qz), f32::EPSILON)
                .ok_or(BindingError::ZeroRotation)?;
            Ok(ViewerPose::new(x, y, z).with_orientation(rotation))
        }
        _ => Err(BindingError::Length {
            name: "glass",
            expected: "3 or 7",
            got: values.len(),
        }),
    }
}

fn vector_from_slice(name: &'static str, values: &[f32]) -> Result<Vector3<f32>, BindingError> {
    match *values {
        [x, y, z] => Ok(Vector3::new(x, y, z)),
        _ => Err(BindingError::Length {
            name,
            expected: "3",
            got: values.len(),
        }),
    }
}

fn matrix_from_slice(name: &'static str, values: &[f32]) -> Result<Matrix4<f32>, BindingError> {
    let values: &[f32; 16] = values.try_into().map_err(|_| BindingError::Length {
        name,
        expected: "16",
        got: values.len(),
    })?;
    Ok(from_column_major(values))
}

/// Flatten a result: view L, projection L, view R, projection R, pointer
/// position, pointer direction.
pub fn pack(result: &FrustumResult) -> Vec<f32> {
    let mut out = Vec::with_capacity(PACKED_LEN);
    for frame in [&result.left, &result.right] {
        out.extend_from_slice(&to_column_major(&frame.view));
        out.extend_from_slice(&to_column_major(&frame.projection));
    }
    out.extend_from_slice(result.pointer_world.position.coords.as_slice());
    out.extend_from_slice(result.pointer_world.direction.as_slice());
    out
}

/// Stereo rig handle exported to JavaScript
#[wasm_bindgen]
pub struct WebStereoRig {
    rig: StereoRig,
}

impl WebStereoRig {
    pub fn try_new(
        screen_distance: f32,
        screen_height: f32,
        pupil_distance: f32,
        left_handed: bool,
    ) -> Result<WebStereoRig, BindingError> {
        let config = StereoConfig::new(screen_distance, screen_height)
            .with_pupil_distance(pupil_distance)
            .with_handedness(Handedness::from_left_handed(left_handed));
        Ok(Self {
            rig: StereoRig::new(config)?,
        })
    }

    pub fn try_compute(
        &self,
        glass: &[f32],
        pen: &[f32],
        dir: &[f32],
        view_hint: Option<&[f32]>,
        projection_hint: Option<&[f32]>,
    ) -> Result<Vec<f32>, BindingError> {
        let pointer = PointerPose::new(Point3::from(vector_from_slice("pen", pen)?), vector_from_slice("dir", dir)?);
        let mut input = FrameInput::new(viewer_from_slice(glass)?, pointer);
        if let Some(hint) = view_hint {
            input = input.with_view_hint(matrix_from_slice("view_hint", hint)?);
        }
        if let Some(hint) = projection_hint {
            input = input.with_projection_hint(matrix_from_slice("projection_hint", hint)?);
        }
        Ok(pack(&self.rig.compute(&input)?))
    }
}

#[wasm_bindgen]
impl WebStereoRig {
    #[wasm_bindgen(constructor)]
    pub fn new(
        screen_distance: f32,
        screen_height: f32,
        pupil_distance: f32,
        left_handed: bool,
    ) -> Result<WebStereoRig, JsValue> {
        Ok(Self::try_new(screen_distance, screen_height, pupil_distance, left_handed)?)
    }

    /// Compute both eyes. Hints are column-major 4x4 matrices from the
    /// host camera; pass `undefined` to use the rig configuration.
    pub fn compute(
        &self,
        glass: &[f32],
        pen: &[f32],
        dir: &[f32],
        view_hint: Option<Vec<f32>>,
        projection_hint: Option<Vec<f32>>,
    ) -> Result<Vec<f32>, JsValue> {
        Ok(self.try_compute(glass, pen, dir, view_hint.as_deref(), projection_hint.as_deref())?)
    }

    #[wasm_bindgen(getter)]
    pub fn pupil_distance(&self) -> f32 {
        self.rig.config().pupil_distance
    }
}
