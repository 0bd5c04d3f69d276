//! GLSL version and precision header utilities.

use serde::{Deserialize, Serialize};

/// Substring that marks a source as already carrying a version directive.
pub const VERSION_MARKER: &str = "#version";

/// Version directives the preprocessor can prepend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GlslVersion {
    /// GLSL ES 1.00, accepted by every mobile driver.
    #[default]
    Es100,
    /// GLSL ES 3.00.
    Es300,
    Glsl120,
    Glsl140,
}

impl GlslVersion {
    /// The full directive line, without a trailing newline.
    pub fn directive(self) -> &'static str {
        match self {
            GlslVersion::Es100 => "#version 100",
            GlslVersion::Es300 => "#version 300 es",
            GlslVersion::Glsl120 => "#version 120",
            GlslVersion::Glsl140 => "#version 140",
        }
    }

    /// Whether the target honours `precision` statements.
    pub fn is_es(self) -> bool {
        matches!(self, GlslVersion::Es100 | GlslVersion::Es300)
    }
}

/// Default float precision declared for fragment sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FloatPrecision {
    Low,
    #[default]
    Medium,
    High,
}

impl FloatPrecision {
    pub fn declaration(self) -> &'static str {
        match self {
            FloatPrecision::Low => "precision lowp float;",
            FloatPrecision::Medium => "precision mediump float;",
            FloatPrecision::High => "precision highp float;",
        }
    }
}

/// Whether any line of `source` contains a version directive.
///
/// This is a plain substring test: a directive inside a comment counts.
pub fn has_version_directive(source: &str) -> bool {
    source.lines().any(|line| line.contains(VERSION_MARKER))
}
