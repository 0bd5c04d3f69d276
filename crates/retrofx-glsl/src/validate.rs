//! Lightweight source checks run before a shader is handed to the driver.
//!
//! These are marker checks, not a GLSL parser. They catch the common
//! mistakes (empty source, missing entry point, fragment shader that never
//! writes its output) without needing a GL context.

use retrofx_core::ShaderStage;
use thiserror::Error;

/// Marker every stage must contain.
pub const MAIN_MARKER: &str = "void main";

/// Fixed-function output every fragment source must assign.
pub const FRAGMENT_OUTPUT_MARKER: &str = "gl_FragColor";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("shader source is empty")]
    EmptySource,
    #[error("shader missing main function")]
    MissingMain,
    #[error("fragment shader missing gl_FragColor assignment")]
    MissingFragmentOutput,
}

/// Check `source` for the markers `stage` requires.
pub fn validate_shader(source: &str, stage: ShaderStage) -> Result<(), ValidationError> {
    if source.is_empty() {
        return Err(ValidationError::EmptySource);
    }
    if !source.contains(MAIN_MARKER) {
        return Err(ValidationError::MissingMain);
    }
    if stage == ShaderStage::Fragment && !source.contains(FRAGMENT_OUTPUT_MARKER) {
        return Err(ValidationError::MissingFragmentOutput);
    }
    Ok(())
}

pub fn is_valid_shader(source: &str, stage: ShaderStage) -> bool {
    validate_shader(source, stage).is_ok()
}
