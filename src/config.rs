//! Application configuration.
//!
//! Settings load from an optional `studyforge.toml` next to the working
//! directory, with serde defaults filling everything omitted and a small
//! set of environment overrides applied last. The tool runs with zero
//! configuration against a local inference service.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::llm::InferenceConfig;
use crate::synthesis::SynthesisConfig;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "studyforge.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Inference gateway settings.
    #[serde(default)]
    pub inference: InferenceConfig,
    /// Synthesis orchestrator settings.
    #[serde(default)]
    pub synthesis: SynthesisConfig,
}

impl Config {
    /// Load configuration from an explicit path, or from `studyforge.toml`
    /// in the working directory when present, falling back to defaults.
    /// Environment overrides are applied on top.
    pub fn load(path: Option<&Path>) -> Self {
        let chosen = match path {
            Some(p) => Some(p.to_path_buf()),
            None => {
                let default = Path::new(CONFIG_FILE);
                default.exists().then(|| default.to_path_buf())
            }
        };

        let mut config = match chosen {
            Some(p) => match std::fs::read_to_string(&p) {
                Ok(raw) => match toml::from_str(&raw) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        warn!("Invalid config file {}: {}", p.display(), e);
                        Self::default()
                    }
                },
                Err(e) => {
                    warn!("Cannot read config file {}: {}", p.display(), e);
                    Self::default()
                }
            },
            None => Self::default(),
        };

        config.inference = config.inference.with_env_overrides();
        config
    }
}
