/// Per-frame stereo frustum pipeline
///
/// Eye resolution, view matrices, off-axis projections and pointer
/// re-projection, evaluated in that order on every call.
use nalgebra::{Matrix4, Point3, Vector3};

use crate::error::{FrustumError, Result};
use crate::eye::{resolve_eyes, Eye};
use crate::geometry::{Handedness, PointerPose, ScreenBasis, ScreenGeometry, ViewerPose};
use crate::pointer::reproject;
use crate::projection::{validate_clip_planes, FrustumExtents, ProjectionHint};
use crate::transform::{rigid_inverse, to_column_major, ViewBuilder};

/// Average adult interpupillary distance in meters
pub const DEFAULT_PUPIL_DISTANCE: f32 = 0.066;
pub const DEFAULT_NEAR: f32 = 0.01;
pub const DEFAULT_FAR: f32 = 1000.0;

/// Static description of the display and viewer, validated once
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StereoConfig {
    pub screen: ScreenGeometry,
    pub basis: ScreenBasis,
    pub pupil_distance: f32,
    pub handedness: Handedness,
    pub near: f32,
    pub far: f32,
}

impl StereoConfig {
    pub fn new(screen_distance: f32, screen_height: f32) -> Self {
        Self {
            screen: ScreenGeometry::new(screen_distance, screen_height),
            ..Self::default()
        }
    }

    pub fn with_pupil_distance(mut self, pupil_distance: f32) -> Self {
        self.pupil_distance = pupil_distance;
        self
    }

    pub fn with_handedness(mut self, handedness: Handedness) -> Self {
        self.handedness = handedness;
        self
    }

    pub fn with_clip_planes(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    pub fn with_basis(mut self, basis: ScreenBasis) -> Self {
        self.basis = basis;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.screen.validate()?;
        self.basis.validate()?;
        validate_clip_planes(self.near, self.far)?;
        if !self.pupil_distance.is_finite() || self.pupil_distance < 0.0 {
            return Err(FrustumError::InvalidPupilDistance(self.pupil_distance));
        }
        Ok(())
    }
}

impl Default for StereoConfig {
    /// A 16:9 desktop monitor 0.3 m tall, 0.6 m in front of the viewer
    fn default() -> Self {
        Self {
            screen: ScreenGeometry::new(0.6, 0.3),
            basis: ScreenBasis::default(),
            pupil_distance: DEFAULT_PUPIL_DISTANCE,
            handedness: Handedness::Right,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        }
    }
}

/// Everything the tracker and host camera provide for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    pub viewer: ViewerPose,
    pub pointer: PointerPose,
    /// Host camera world to camera matrix that anchors tracking space
    pub view_hint: Option<Matrix4<f32>>,
    /// Host perspective matrix supplying near, far and aspect
    pub projection_hint: Option<Matrix4<f32>>,
}

impl FrameInput {
    pub fn new(viewer: ViewerPose, pointer: PointerPose) -> Self {
        Self {
            viewer,
            pointer,
            view_hint: None,
            projection_hint: None,
        }
    }

    pub fn with_view_hint(mut self, view_hint: Matrix4<f32>) -> Self {
        self.view_hint = Some(view_hint);
        self
    }

    pub fn with_projection_hint(mut self, projection_hint: Matrix4<f32>) -> Self {
        self.projection_hint = Some(projection_hint);
        self
    }
}

/// One eye's camera for the current frame. Carries no eye tag; use
/// [`FrustumResult::eye`] to pick one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeFrame {
    /// Eye position in tracking space
    pub position: Point3<f32>,
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    /// Pointer in this eye's camera space
    pub pointer: PointerPose,
}

impl EyeFrame {
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection * self.view
    }

    pub fn view_column_major(&self) -> [f32; 16] {
        to_column_major(&self.view)
    }

    pub fn projection_column_major(&self) -> [f32; 16] {
        to_column_major(&self.projection)
    }
}

/// Complete output of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrustumResult {
    pub left: EyeFrame,
    pub right: EyeFrame,
    /// Pointer in the host world space. Drawing it with an eye's `view`
    /// loaded as the model-view matrix places it on the physical stylus.
    pub pointer_world: PointerPose,
}

impl FrustumResult {
    pub fn eye(&self, eye: Eye) -> &EyeFrame {
        match eye {
            Eye::Left => &self.left,
            Eye::Right => &self.right,
        }
    }

    pub fn is_finite(&self) -> bool {
        [&self.left, &self.right].iter().all(|frame| {
            frame.view.iter().all(|c| c.is_finite())
                && frame.projection.iter().all(|c| c.is_finite())
                && frame.pointer.is_finite()
        }) && self.pointer_world.is_finite()
    }
}

/// Validated stereo setup. Immutable, so one rig can serve any number of
/// threads.
#[derive(Debug, Clone)]
pub struct StereoRig {
    config: StereoConfig,
}

impl StereoRig {
    /// Validate `config` once; a rig that exists is always runnable.
    pub fn new(config: StereoConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &StereoConfig {
        &self.config
    }

    /// Run the full pipeline for one frame.
    ///
    /// Either every field of the result is populated or an error describes
    /// which input was rejected.
    pub fn compute(&self, input: &FrameInput) -> Result<FrustumResult> {
        let config = &self.config;

        let (near, far, screen) = match &input.projection_hint {
            Some(hint) => {
                let hint = ProjectionHint::decode(hint, config.handedness)?;
                (hint.near, hint.far, config.screen.with_aspect(hint.aspect))
            }
            None => (config.near, config.far, config.screen),
        };

        let tracking_from_world = match &input.view_hint {
            Some(hint) => ViewBuilder::tracking_from_world(hint, &config.basis, config.handedness)?,
            None => Matrix4::identity(),
        };

        let eyes = resolve_eyes(&input.viewer, &config.basis, config.pupil_distance)?;
        if !input.pointer.is_finite() {
            return Err(FrustumError::NonFinite("pointer pose"));
        }

        let build = |eye: Eye| -> Result<EyeFrame> {
            let position = eyes.get(eye);
            let extents = FrustumExtents::off_axis(&position, &screen, &config.basis, near, far)?;
            let eye_view = ViewBuilder::eye_view(&position, &config.basis, config.handedness);
            Ok(EyeFrame {
                position,
                view: eye_view * tracking_from_world,
                projection: extents.projection(config.handedness),
                pointer: reproject(&input.pointer, &eye_view)?,
            })
        };

        let left = build(Eye::Left)?;
        let right = build(Eye::Right)?;
        let pointer_world = reproject(&input.pointer, &rigid_inverse(&tracking_from_world))?;

        let result = FrustumResult {
            left,
            right,
            pointer_world,
        };
        if result.is_finite() {
            Ok(result)
        } else {
            Err(FrustumError::NonFinite("frustum output"))
        }
    }

    /// Left and right projection matrices only, for hosts that manage their
    /// own view matrices.
    pub fn projection_pair(&self, viewer: &ViewerPose) -> Result<[Matrix4<f32>; 2]> {
        let config = &self.config;
        let eyes = resolve_eyes(viewer, &config.basis, config.pupil_distance)?;

        let mut out = [Matrix4::identity(); 2];
        for (slot, eye) in out.iter_mut().zip(Eye::BOTH) {
            let extents =
                FrustumExtents::off_axis(&eyes.get(eye), &config.screen, &config.basis, config.near, config.far)?;
            *slot = extents.projection(config.handedness);
        }
        Ok(out)
    }
}

/// One-shot form of the pipeline taking the raw tracker values.
///
/// Near/far and aspect come from `projection_hint` when given, otherwise
/// from [`DEFAULT_NEAR`], [`DEFAULT_FAR`] and a 16:9 screen.
#[allow(clippy::too_many_arguments)]
pub fn compute_stereo_frustum(
    viewer: &ViewerPose,
    view_hint: Option<&Matrix4<f32>>,
    projection_hint: Option<&Matrix4<f32>>,
    screen_distance: f32,
    screen_height: f32,
    pupil_distance: f32,
    is_left_handed: bool,
    pointer_position: &Point3<f32>,
    pointer_direction: &Vector3<f32>,
) -> Result<FrustumResult> {
    let config = StereoConfig::new(screen_distance, screen_height)
        .with_pupil_distance(pupil_distance)
        .with_handedness(Handedness::from_left_handed(is_left_handed));
    let rig = StereoRig::new(config)?;

    let input = FrameInput {
        viewer: *viewer,
        pointer: PointerPose::new(*pointer_position, *pointer_direction),
        view_hint: view_hint.copied(),
        projection_hint: projection_hint.copied(),
    };
    rig.compute(&input)
}
