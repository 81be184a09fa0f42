/// FTVR Core Library - Stereo frustums for fish-tank VR displays
///
/// Turns a tracked viewer position and stylus pose into per-eye view and
/// off-axis projection matrices for a fixed physical screen. Everything here
/// is a pure function of one frame's input plus a validated configuration.

pub mod error;
pub mod eye;
pub mod geometry;
pub mod pointer;
pub mod projection;
pub mod rig;
pub mod trace;
pub mod transform;

// Re-export commonly used types
pub use error::{FrustumError, Result};
pub use eye::{resolve_eyes, Eye, EyePositions};
pub use geometry::{Handedness, PointerPose, ScreenBasis, ScreenGeometry, ViewerPose};
pub use pointer::{pointer_orientation, reproject};
pub use projection::{FrustumExtents, ProjectionHint};
pub use rig::{
    compute_stereo_frustum, EyeFrame, FrameInput, FrustumResult, StereoConfig, StereoRig, DEFAULT_FAR, DEFAULT_NEAR,
    DEFAULT_PUPIL_DISTANCE,
};
pub use trace::{TraceError, TraceReplay, TrackingSample, TrackingSource};
pub use transform::ViewBuilder;
