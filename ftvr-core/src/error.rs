/// Errors reported by the stereo frustum pipeline
use thiserror::Error;

/// Result alias used throughout the core
pub type Result<T> = std::result::Result<T, FrustumError>;

/// Validation failures of a rig configuration or of a single frame's input.
///
/// Every variant maps to a stable nonzero status code (see [`FrustumError::code`])
/// so that foreign callers can branch on it without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum FrustumError {
    #[error("invalid screen geometry: distance {distance}, height {height}, aspect {aspect}")]
    InvalidScreenGeometry { distance: f32, height: f32, aspect: f32 },

    #[error("invalid clip planes: near {near}, far {far}")]
    InvalidClipPlanes { near: f32, far: f32 },

    #[error("non-finite {0}")]
    NonFinite(&'static str),

    #[error("interpupillary distance {0} is negative or not finite")]
    InvalidPupilDistance(f32),

    #[error("screen basis is not orthonormal")]
    MalformedBasis,

    #[error("eye is {0} from the screen plane")]
    DegenerateEyeDistance(f32),

    #[error("pointer direction has zero length")]
    DegeneratePointerDirection,

    #[error("view hint is not a rigid transform")]
    InvalidViewHint,

    #[error("projection hint is not a perspective projection")]
    InvalidProjectionHint,
}

impl FrustumError {
    /// Status code for foreign callers. Zero is reserved for success.
    pub fn code(&self) -> i32 {
        match self {
            FrustumError::InvalidScreenGeometry { .. } => 1,
            FrustumError::InvalidClipPlanes { .. } => 2,
            FrustumError::NonFinite(_) => 3,
            FrustumError::InvalidPupilDistance(_) => 4,
            FrustumError::MalformedBasis => 5,
            FrustumError::DegenerateEyeDistance(_) => 6,
            FrustumError::DegeneratePointerDirection => 7,
            FrustumError::InvalidViewHint => 8,
            FrustumError::InvalidProjectionHint => 9,
        }
    }

    /// Whether the error stems from static setup rather than one frame's input.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            FrustumError::InvalidScreenGeometry { .. }
                | FrustumError::InvalidClipPlanes { .. }
                | FrustumError::InvalidPupilDistance(_)
                | FrustumError::MalformedBasis
        )
    }
}
