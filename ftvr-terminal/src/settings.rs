/// Rig configuration from a TOML file and command-line overrides
use std::path::{Path, PathBuf};

use clap::Args;
use ftvr_core::{FrustumError, Handedness, ScreenBasis, StereoConfig, StereoRig};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read rig file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse rig file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid rig configuration: {0}")]
    Rig(#[from] FrustumError),
}

/// Rig file contents. Every key is optional; missing keys keep defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RigFile {
    pub screen_distance: Option<f32>,
    pub screen_height: Option<f32>,
    pub aspect: Option<f32>,
    pub pupil_distance: Option<f32>,
    pub left_handed: Option<bool>,
    pub near: Option<f32>,
    pub far: Option<f32>,
    pub basis: Option<ScreenBasis>,
}

impl RigFile {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file = toml::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "loaded rig file");
        Ok(file)
    }

    fn apply(&self, config: &mut StereoConfig) {
        if let Some(distance) = self.screen_distance {
            config.screen.distance = distance;
        }
        if let Some(height) = self.screen_height {
            config.screen.height = height;
        }
        if let Some(aspect) = self.aspect {
            config.screen.aspect = aspect;
        }
        if let Some(ipd) = self.pupil_distance {
            config.pupil_distance = ipd;
        }
        if let Some(left_handed) = self.left_handed {
            config.handedness = Handedness::from_left_handed(left_handed);
        }
        if let Some(near) = self.near {
            config.near = near;
        }
        if let Some(far) = self.far {
            config.far = far;
        }
        if let Some(basis) = self.basis {
            config.basis = basis;
        }
    }
}

/// Command-line rig overrides; these win over the rig file
#[derive(Debug, Clone, Default, Args)]
pub struct RigArgs {
    /// Distance from the nominal viewpoint to the screen plane (meters)
    #[arg(long)]
    pub screen_distance: Option<f32>,

    /// Physical screen height (meters)
    #[arg(long)]
    pub screen_height: Option<f32>,

    /// Screen width over height
    #[arg(long)]
    pub aspect: Option<f32>,

    /// Interpupillary distance (meters)
    #[arg(long)]
    pub ipd: Option<f32>,

    /// Produce left-handed matrices (camera looks down +Z)
    #[arg(long)]
    pub left_handed: bool,

    /// Near clip distance
    #[arg(long)]
    pub near: Option<f32>,

    /// Far clip distance
    #[arg(long)]
    pub far: Option<f32>,
}

impl RigArgs {
    fn apply(&self, config: &mut StereoConfig) {
        if let Some(distance) = self.screen_distance {
            config.screen.distance = distance;
        }
        if let Some(height) = self.screen_height {
            config.screen.height = height;
        }
        if let Some(aspect) = self.aspect {
            config.screen.aspect = aspect;
        }
        if let Some(ipd) = self.ipd {
            config.pupil_distance = ipd;
        }
        if self.left_handed {
            config.handedness = Handedness::Left;
        }
        if let Some(near) = self.near {
            config.near = near;
        }
        if let Some(far) = self.far {
            config.far = far;
        }
    }
}

/// Layer defaults, the rig file and the command line, then validate.
pub fn build_rig(args: &RigArgs, file: Option<&RigFile>) -> Result<StereoRig, SettingsError> {
    let mut config = StereoConfig::default();
    if let Some(file) = file {
        file.apply(&mut config);
    }
    args.apply(&mut config);

    let rig = StereoRig::new(config)?;
    tracing::debug!(?config, "stereo rig configured");
    Ok(rig)
}
