//! Error and diagnostic types for preset parsing.

use thiserror::Error;

use crate::pipeline::Pipeline;

/// A preset parse that produced no usable pipeline.
#[derive(Debug, Clone, Error)]
pub enum PresetError {
    /// No shader pass was populated. The partially built pipeline is kept
    /// so the caller can still inspect `shader_count` or parameters.
    #[error("preset defines no shader passes")]
    NoShaders { partial: Box<Pipeline> },
}

impl PresetError {
    pub fn partial_pipeline(&self) -> &Pipeline {
        match self {
            PresetError::NoShaders { partial } => partial,
        }
    }

    pub fn into_partial_pipeline(self) -> Pipeline {
        match self {
            PresetError::NoShaders { partial } => *partial,
        }
    }
}

/// Non-fatal issue found on one preset line.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}: `{key}`: {kind}")]
pub struct Diagnostic {
    /// 1-based line number.
    pub line: usize,
    pub key: String,
    pub kind: DiagnosticKind,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiagnosticKind {
    #[error("invalid shader count {0:?}, using 0")]
    InvalidShaderCount(String),
    #[error("pass index {index} is beyond the limit of {limit} passes")]
    PassIndexOutOfRange { index: usize, limit: usize },
    #[error("parameter limit of {limit} reached")]
    ParameterLimit { limit: usize },
}
