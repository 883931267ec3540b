//! Configuration health check

use crate::config::RouterConfig;
use crate::health::check::{CheckResult, Findings, HealthCheck};

/// Checks that every profile loads and passes validation
pub struct ConfigCheck {
    profiles: Vec<String>,
}

impl ConfigCheck {
    /// Checks the debug and release profiles
    pub fn new() -> Self {
        Self::with_profiles(["debug", "release"])
    }

    pub fn with_profiles<S: Into<String>>(profiles: impl IntoIterator<Item = S>) -> Self {
        Self {
            profiles: profiles.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for ConfigCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthCheck for ConfigCheck {
    fn name(&self) -> &str {
        "Configuration"
    }

    fn description(&self) -> Option<&str> {
        Some("Loads each profile from files and environment and validates it")
    }

    fn check(&self) -> CheckResult {
        let mut findings = Findings::new();

        for profile in &self.profiles {
            match RouterConfig::load(profile) {
                Ok(config) => match config.validate() {
                    Ok(()) => findings.ok(format!(
                        "Profile '{profile}': background {} m, {} device slots",
                        config.hit_test.background_distance, config.tracking.max_devices
                    )),
                    Err(e) => findings.fail(format!("Profile '{profile}': {e}")),
                },
                Err(e) => findings.fail(format!("Profile '{profile}': failed to load - {e}")),
            }
        }

        match RouterConfig::load_from_env() {
            Ok(config) => findings.ok(format!("Environment selects profile '{}'", config.profile)),
            Err(e) => findings.warn(format!("Environment config: {e}")),
        }

        let count = self.profiles.len();
        findings.finish(
            format!("{count} profiles validated"),
            "Config loaded with warnings",
            "One or more profiles are unusable",
        )
    }
}
