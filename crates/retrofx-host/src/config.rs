//! Session configuration.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use retrofx_core::{PresetParser, DEFAULT_MAX_PARAMETERS, DEFAULT_MAX_PASSES};
use retrofx_glsl::{FloatPrecision, GlslVersion, ShaderPreprocessor};
use serde::{Deserialize, Serialize};

/// Seven days.
pub const DEFAULT_CACHE_MAX_AGE_SECS: u64 = 7 * 24 * 60 * 60;

pub const DEFAULT_MEMORY_CACHE_CAPACITY: usize = 50;

/// Everything a [`crate::Session`] needs to build its engines.
///
/// Missing JSON fields take their defaults, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub max_parameters: usize,
    pub max_passes: usize,
    pub glsl_version: GlslVersion,
    pub precision: FloatPrecision,
    /// Directory for the on-disk compiled shader cache. `None` keeps the
    /// cache in memory only.
    pub cache_dir: Option<PathBuf>,
    pub cache_max_age_secs: u64,
    pub memory_cache_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_parameters: DEFAULT_MAX_PARAMETERS,
            max_passes: DEFAULT_MAX_PASSES,
            glsl_version: GlslVersion::default(),
            precision: FloatPrecision::default(),
            cache_dir: None,
            cache_max_age_secs: DEFAULT_CACHE_MAX_AGE_SECS,
            memory_cache_capacity: DEFAULT_MEMORY_CACHE_CAPACITY,
        }
    }
}

impl SessionConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid session config")
    }

    pub fn cache_max_age(&self) -> Duration {
        Duration::from_secs(self.cache_max_age_secs)
    }

    pub(crate) fn preset_parser(&self) -> PresetParser {
        PresetParser::new()
            .with_max_parameters(self.max_parameters)
            .with_max_passes(self.max_passes)
    }

    pub(crate) fn preprocessor(&self) -> ShaderPreprocessor {
        ShaderPreprocessor::new()
            .with_version(self.glsl_version)
            .with_precision(self.precision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_default() {
        assert_eq!(SessionConfig::from_json_str("{}").unwrap(), SessionConfig::default());
    }

    #[test]
    fn partial_json() {
        let config = SessionConfig::from_json_str(
            r#"{ "max_parameters": 8, "glsl_version": "Es300", "cache_dir": "/tmp/fx" }"#,
        )
        .unwrap();
        assert_eq!(config.max_parameters, 8);
        assert_eq!(config.max_passes, DEFAULT_MAX_PASSES);
        assert_eq!(config.glsl_version, GlslVersion::Es300);
        assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/fx")));
        assert_eq!(config.cache_max_age(), Duration::from_secs(604_800));
        assert_eq!(config.preset_parser().max_parameters(), 8);
        assert_eq!(config.preprocessor().version(), GlslVersion::Es300);
    }

    #[test]
    fn rejects_bad_json() {
        let err = SessionConfig::from_json_str(r#"{ "max_passes": "many" }"#).unwrap_err();
        assert!(err.to_string().contains("invalid session config"));
    }
}
