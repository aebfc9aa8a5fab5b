//! # Klocka Configuration
//!
//! Layered configuration for clocks built from files and the environment.
//!
//! ## Hierarchy
//! 1. Default values
//! 2. `config/klocka.yaml`
//! 3. `config/<KLOCKA_ENV>.yaml` (`KLOCKA_ENV` defaults to `test`)
//! 4. `KLOCKA_*` environment variables, `__` separating nested keys
//!    (`KLOCKA_CLOCK__FROZEN=true`)

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod clock;
mod error;
mod scenario;
mod telemetry;
mod validation;

pub use clock::ClockConfig;
pub use error::ConfigError;
pub use scenario::ScenarioConfig;
pub use telemetry::TelemetryConfig;

const ENV_PREFIX: &str = "KLOCKA_";

/// Top-level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone, PartialEq)]
pub struct KlockaConfig {
    /// Initial state of mock clocks.
    #[serde(default)]
    #[validate(nested)]
    pub clock: ClockConfig,

    /// Logging and metrics.
    #[serde(default)]
    #[validate(nested)]
    pub telemetry: TelemetryConfig,

    /// Scenario driver defaults.
    #[serde(default)]
    #[validate(nested)]
    pub scenario: ScenarioConfig,
}

impl KlockaConfig {
    /// Load configuration from the default files and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_dir("config")
    }

    /// Same layering as [`KlockaConfig::load`], with files looked up in `dir`.
    /// Missing files are skipped.
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let mut figment = Figment::from(Serialized::defaults(KlockaConfig::default()));

        let base = dir.join("klocka.yaml");
        if base.exists() {
            figment = figment.merge(Yaml::file(base));
        }

        let env = std::env::var("KLOCKA_ENV").unwrap_or_else(|_| "test".into());
        let env_file = dir.join(format!("{env}.yaml"));
        if env_file.exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load configuration from one specific file, then the environment.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        Self::extract(
            Figment::from(Serialized::defaults(KlockaConfig::default()))
                .merge(Yaml::file(path))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }
}
