//! Layered configuration for the rustwalk binary.
//!
//! Sources, lowest priority first:
//!
//! 1. built-in defaults
//! 2. a TOML or JSON file: the `--config` path, else `rustwalk.toml` in the
//!    platform config directory
//! 3. environment variables prefixed `RUSTWALK_` (`__` separates nested
//!    keys, e.g. `RUSTWALK_BEHAVIOURS__SORT__CASE_SENSITIVE=true`)
//!
//! CLI flags are applied on top by the caller.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Json, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::nav::OptionsStore;

/// Name of the configuration file looked up in the platform config dir.
pub const CONFIG_FILE_NAME: &str = "rustwalk.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "RUSTWALK_";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    /// Options applied to every walk
    #[serde(flatten)]
    pub store: OptionsStore,
    /// State file written when a walk is interrupted and `--save` is absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,
}

impl WalkConfig {
    /// Load the configuration, using `path` instead of the default file
    /// when given. An explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::layered(path, true)
    }

    fn layered(path: Option<&Path>, with_env: bool) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        match path {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::File(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                figment = merge_file(figment, path);
            }
            None => {
                if let Some(path) = Self::default_path().filter(|p| p.is_file()) {
                    log::debug!("using config file {}", path.display());
                    figment = merge_file(figment, &path);
                }
            }
        }

        if with_env {
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }
        Ok(figment.extract()?)
    }

    /// Platform-specific location of the configuration file.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "rustwalk", "rustwalk")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

fn merge_file(figment: Figment, path: &Path) -> Figment {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        figment.merge(Json::file(path))
    } else {
        figment.merge(Toml::file(path))
    }
}
