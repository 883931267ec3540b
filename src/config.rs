//! Router configuration
//!
//! Supports multiple profiles (debug, release) with different settings.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RouterError};

/// Environment variable prefix for overrides (e.g. SCENE_INPUT_HIT_TEST__BACKGROUND_DISTANCE=12)
const ENV_PREFIX: &str = "SCENE_INPUT";

/// Hit testing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitTestConfig {
    /// Distance along the ray at which background hits are placed
    pub background_distance: f32,
    /// Test bounding boxes only instead of exact shapes
    pub bounds_only: bool,
}

impl Default for HitTestConfig {
    fn default() -> Self {
        Self {
            background_distance: 8.0,
            bounds_only: true,
        }
    }
}

/// Per-device tracking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Minimum position/orientation change that counts as movement
    pub move_epsilon: f32,
    /// Whether hover transitions are derived from movement
    pub hover_events: bool,
    /// Number of device slots in the tracker table
    pub max_devices: usize,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            move_epsilon: 1e-4,
            hover_events: true,
            max_devices: 8,
        }
    }
}

/// Reticle sizing used by the presenter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenterConfig {
    /// Reticle radius as a multiple of one screen pixel in world units
    pub reticle_size_multiple: f32,
    /// Smallest reticle radius in world units
    pub min_reticle_radius: f32,
    /// Largest reticle radius in world units
    pub max_reticle_radius: f32,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            reticle_size_multiple: 4.0,
            min_reticle_radius: 0.005,
            max_reticle_radius: 0.05,
        }
    }
}

/// Input router configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// The active profile (debug, release, etc.)
    pub profile: String,
    /// Hit testing configuration
    #[serde(default)]
    pub hit_test: HitTestConfig,
    /// Device tracking configuration
    #[serde(default)]
    pub tracking: TrackingConfig,
    /// Presenter configuration
    #[serde(default)]
    pub presenter: PresenterConfig,
}

impl RouterConfig {
    /// Loads configuration based on the specified profile
    ///
    /// Sources are applied in the following order:
    /// 1. config/{profile}.toml (profile-specific configuration)
    /// 2. Environment variables with prefix SCENE_INPUT_ (e.g. SCENE_INPUT_TRACKING__MAX_DEVICES=4)
    ///
    /// Config files are searched for in:
    /// 1. Next to the executable (target/debug/config or target/release/config)
    /// 2. In the current directory (./config)
    pub fn load(profile: &str) -> std::result::Result<Self, ConfigError> {
        let config_dir = Self::find_config_dir();

        let mut builder = Config::builder();

        if let Some(ref dir) = config_dir {
            let profile_path = dir.join(profile);
            builder = builder.add_source(File::from(profile_path.as_path()).required(false));
        } else {
            builder =
                builder.add_source(File::with_name(&format!("config/{}", profile)).required(false));
        }

        // Use __ as separator for nested fields (e.g. SCENE_INPUT_PRESENTER__MAX_RETICLE_RADIUS)
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.set_override("profile", profile)?.build()?;

        config.try_deserialize()
    }

    /// Loads and validates a profile in one step
    pub fn load_validated(profile: &str) -> Result<Self> {
        let config = Self::load(profile)?;
        config.validate()?;
        Ok(config)
    }

    /// Finds the config directory by searching in multiple locations
    fn find_config_dir() -> Option<std::path::PathBuf> {
        if let Ok(exe_path) = std::env::current_exe()
            && let Some(exe_dir) = exe_path.parent()
        {
            let config_dir = exe_dir.join("config");
            if config_dir.exists() {
                return Some(config_dir);
            }
        }

        let cwd_config = std::path::PathBuf::from("config");
        if cwd_config.exists() {
            return Some(cwd_config);
        }

        None
    }

    /// Loads configuration using the SCENE_INPUT_PROFILE environment variable,
    /// defaulting to "release"
    pub fn load_from_env() -> std::result::Result<Self, ConfigError> {
        let profile =
            std::env::var(format!("{ENV_PREFIX}_PROFILE")).unwrap_or_else(|_| "release".to_string());
        Self::load(&profile)
    }

    /// Checks that every value is inside its accepted range
    pub fn validate(&self) -> Result<()> {
        let hit = &self.hit_test;
        if !(hit.background_distance.is_finite() && hit.background_distance > 0.0) {
            return Err(RouterError::InvalidConfig(format!(
                "hit_test.background_distance must be positive, got {}",
                hit.background_distance
            )));
        }

        let tracking = &self.tracking;
        if !(tracking.move_epsilon.is_finite() && tracking.move_epsilon >= 0.0) {
            return Err(RouterError::InvalidConfig(format!(
                "tracking.move_epsilon must be non-negative, got {}",
                tracking.move_epsilon
            )));
        }
        if tracking.max_devices == 0 {
            return Err(RouterError::InvalidConfig(
                "tracking.max_devices must be at least 1".to_string(),
            ));
        }

        let presenter = &self.presenter;
        if presenter.min_reticle_radius > presenter.max_reticle_radius {
            return Err(RouterError::InvalidConfig(format!(
                "presenter.min_reticle_radius ({}) exceeds max_reticle_radius ({})",
                presenter.min_reticle_radius, presenter.max_reticle_radius
            )));
        }

        Ok(())
    }

    /// Built-in configuration used when no profile can be loaded
    pub fn builtin(profile: &str) -> Self {
        Self {
            profile: profile.to_string(),
            hit_test: HitTestConfig::default(),
            tracking: TrackingConfig::default(),
            presenter: PresenterConfig::default(),
        }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::load("release").unwrap_or_else(|_| Self::builtin("release"))
    }
}
