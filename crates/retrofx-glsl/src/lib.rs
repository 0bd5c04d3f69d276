//! Turns HLSL-flavoured retro shader sources into GLSL a mobile driver
//! accepts.
//!
//! Use [`ShaderPreprocessor::preprocess`] to rewrite a source, or
//! [`ShaderPreprocessor::compile`] to validate it first.
//!
//! The preprocessor is configuration only. Calls share no mutable state and
//! may run concurrently from any number of threads.

use retrofx_core::ShaderStage;
use tracing::trace;

pub mod glsl;
pub mod preprocess;
pub mod validate;

pub use glsl::{has_version_directive, FloatPrecision, GlslVersion};
pub use preprocess::rewrite_line;
pub use validate::{is_valid_shader, validate_shader, ValidationError};

/// Rewrites dialect sources into portable GLSL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShaderPreprocessor {
    version: GlslVersion,
    precision: FloatPrecision,
}

impl ShaderPreprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directive prepended to sources that carry none.
    pub fn with_version(mut self, version: GlslVersion) -> Self {
        self.version = version;
        self
    }

    /// Float precision declared for fragment sources that carry no version.
    /// Only ES targets get a precision line.
    pub fn with_precision(mut self, precision: FloatPrecision) -> Self {
        self.precision = precision;
        self
    }

    pub fn version(&self) -> GlslVersion {
        self.version
    }

    pub fn precision(&self) -> FloatPrecision {
        self.precision
    }

    /// Identifies the configured target. Two preprocessors with the same
    /// fingerprint produce the same output for every source.
    pub fn fingerprint(&self) -> String {
        format!("{}\n{}", self.version.directive(), self.precision.declaration())
    }

    /// Rewrite `source` for `stage`.
    ///
    /// If no line contains `#version`, the configured directive is
    /// prepended. For fragment sources on an ES target
    /// ([`GlslVersion::is_es`]) it is followed by the precision
    /// declaration. Desktop targets (`#version 120`, `#version 140`) get no
    /// precision line, because their compilers reject one. Every source
    /// line is then rewritten with [`rewrite_line`] and terminated by a
    /// single `\n`. Lines are never dropped or reordered. Never fails.
    pub fn preprocess(&self, source: &str, stage: ShaderStage) -> String {
        let has_version = has_version_directive(source);
        trace!(?stage, has_version, bytes = source.len(), "preprocessing shader");

        let mut out = String::with_capacity(source.len() + 64);
        if !has_version {
            out.push_str(self.version.directive());
            out.push('\n');
            if stage == ShaderStage::Fragment && self.version.is_es() {
                out.push_str(self.precision.declaration());
                out.push('\n');
            }
        }

        for line in source.lines() {
            out.push_str(&rewrite_line(line));
            out.push('\n');
        }
        out
    }

    /// Validate `source` for `stage`, then [`preprocess`](Self::preprocess)
    /// it.
    pub fn compile(&self, source: &str, stage: ShaderStage) -> Result<String, ValidationError> {
        validate_shader(source, stage)?;
        Ok(self.preprocess(source, stage))
    }
}

/// [`ShaderPreprocessor::preprocess`] with the default configuration.
pub fn preprocess(source: &str, stage: ShaderStage) -> String {
    ShaderPreprocessor::default().preprocess(source, stage)
}
