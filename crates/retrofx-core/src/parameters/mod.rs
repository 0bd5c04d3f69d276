//! Tunable shader parameters.
//!
//! Parameters are declared by a preset's `parameters` key and described by
//! `#pragma parameter` lines in pass sources. See [`parse_parameter_pragma`].

use serde::{Deserialize, Serialize};

mod pragma;
pub use pragma::*;

/// A named tunable exposed by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// Human readable label, from the source pragma. May be empty.
    #[serde(default)]
    pub description: String,
    pub default_value: f32,
    pub minimum: f32,
    pub maximum: f32,
    pub step: f32,
    /// Set when the preset assigned `default_value` explicitly.
    #[serde(default)]
    pub overridden: bool,
}

impl Parameter {
    /// A parameter with the stock range `[0, 1]`, default 0 and step 0.01.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            default_value: 0.0,
            minimum: 0.0,
            maximum: 1.0,
            step: 0.01,
            overridden: false,
        }
    }
}
