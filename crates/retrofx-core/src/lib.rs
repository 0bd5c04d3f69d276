//! Core types and the preset parser for retro shader pipelines.
//!
//! - [`PresetParser`] turns preset text into a [`Pipeline`].
//! - [`ShaderPass`] / [`ScaleType`] / [`Parameter`] make up the pipeline.
//! - [`ShaderStage`] identifies vertex and fragment sources.
//! - [`value`] holds the trimming and number parsing shared with hosts.
//!
//! Everything here is synchronous and keeps no state between calls.

pub mod error;
pub mod log;
pub mod parameters;
pub mod pipeline;
pub mod preset;
pub mod stage;
pub mod value;

pub use error::{Diagnostic, DiagnosticKind, PresetError};
pub use parameters::{collect_parameter_pragmas, parse_parameter_pragma, Parameter};
pub use pipeline::{Pipeline, ScaleType, ShaderPass};
pub use preset::{ParseReport, PresetParser, DEFAULT_MAX_PARAMETERS, DEFAULT_MAX_PASSES};
pub use stage::ShaderStage;
