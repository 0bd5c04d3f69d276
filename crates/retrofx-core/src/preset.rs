//! Preset text parser.
//!
//! A preset is a flat list of `key = value` lines. Per-pass settings use
//! indexed keys (`shader0`, `scale_type2`, ...). Referencing pass `N` grows
//! the pass list so that every index up to `N` exists, which keeps
//! [`Pipeline::shaders`] dense.
//!
//! Parsing is best effort. Lines without `=`, unknown keys and keys with a
//! non-numeric suffix are skipped silently. Malformed numbers reset the
//! field to its default. Only an input without any pass is reported as a
//! failure, see [`PresetError::NoShaders`].

use tracing::{debug, warn};

use crate::error::{Diagnostic, DiagnosticKind, PresetError};
use crate::parameters::Parameter;
use crate::pipeline::{Pipeline, ScaleType, ShaderPass};
use crate::value::{indexed_suffix, parse_float, parse_flag, parse_int, strip_quotes, trim};

/// Default cap on [`Pipeline::parameters`].
pub const DEFAULT_MAX_PARAMETERS: usize = 32;

/// Default cap on the number of passes a preset may address.
pub const DEFAULT_MAX_PASSES: usize = 1024;

/// A per-pass field addressed by an indexed key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassKey {
    Shader,
    FilterLinear,
    ScaleType,
    Scale,
    FrameCountMod,
    FloatFramebuffer,
    SrgbFramebuffer,
}

/// Indexed key prefixes, longer prefixes before the shorter ones they
/// begin with (`scale_type` before `scale`).
const PASS_KEYS: [(&str, PassKey); 7] = [
    ("float_framebuffer", PassKey::FloatFramebuffer),
    ("srgb_framebuffer", PassKey::SrgbFramebuffer),
    ("frame_count_mod", PassKey::FrameCountMod),
    ("filter_linear", PassKey::FilterLinear),
    ("scale_type", PassKey::ScaleType),
    ("shader", PassKey::Shader),
    ("scale", PassKey::Scale),
];

impl PassKey {
    fn match_key(key: &str) -> Option<(PassKey, usize)> {
        PASS_KEYS
            .iter()
            .find_map(|&(prefix, field)| indexed_suffix(key, prefix).map(|index| (field, index)))
    }

    fn apply(self, index: usize, pass: &mut ShaderPass, value: &str) {
        match self {
            PassKey::Shader => {
                debug!(index, path = value, "shader pass");
                pass.path = value.to_string();
            }
            PassKey::FilterLinear => pass.filter_linear = parse_flag(value),
            PassKey::ScaleType => {
                if let Some(scale_type) = ScaleType::from_preset_value(value) {
                    pass.scale_type = scale_type;
                }
            }
            PassKey::Scale => {
                pass.scale = parse_float(value).unwrap_or_else(|| {
                    debug!(index, value, "malformed scale, using default");
                    ShaderPass::default().scale
                });
            }
            PassKey::FrameCountMod => {
                pass.frame_count_mod = parse_int(value).unwrap_or_else(|| {
                    debug!(index, value, "malformed frame_count_mod, using default");
                    ShaderPass::default().frame_count_mod
                });
            }
            PassKey::FloatFramebuffer => pass.float_framebuffer = parse_flag(value),
            PassKey::SrgbFramebuffer => pass.srgb_framebuffer = parse_flag(value),
        }
    }
}

/// Result of a preset parse together with the non-fatal diagnostics it
/// raised.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseReport {
    pub pipeline: Pipeline,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseReport {
    /// A parse succeeds when at least one pass was populated.
    pub fn is_success(&self) -> bool {
        !self.pipeline.shaders.is_empty()
    }

    pub fn into_result(self) -> Result<Pipeline, PresetError> {
        if self.is_success() {
            Ok(self.pipeline)
        } else {
            Err(PresetError::NoShaders {
                partial: Box::new(self.pipeline),
            })
        }
    }
}

/// Parses preset text into a [`Pipeline`].
///
/// The parser holds only limits; every call starts from an empty pipeline,
/// so one parser can be shared freely between threads.
#[derive(Debug, Clone)]
pub struct PresetParser {
    max_parameters: usize,
    max_passes: usize,
}

impl Default for PresetParser {
    fn default() -> Self {
        Self {
            max_parameters: DEFAULT_MAX_PARAMETERS,
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

impl PresetParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_parameters(mut self, max_parameters: usize) -> Self {
        self.max_parameters = max_parameters;
        self
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    pub fn max_parameters(&self) -> usize {
        self.max_parameters
    }

    pub fn max_passes(&self) -> usize {
        self.max_passes
    }

    /// Parse `text`, failing with [`PresetError::NoShaders`] if no pass was
    /// populated.
    pub fn parse(&self, text: &str) -> Result<Pipeline, PresetError> {
        self.parse_report(text).into_result()
    }

    /// Parse `text`, never failing. Check [`ParseReport::is_success`].
    pub fn parse_report(&self, text: &str) -> ParseReport {
        debug!(bytes = text.len(), "parsing preset");

        let mut state = ParseState {
            parser: self,
            report: ParseReport::default(),
            overrides: Vec::new(),
        };

        for (line_no, raw) in text.split('\n').enumerate() {
            let line = trim(raw);
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            state.line(line_no + 1, line);
        }
        state.resolve_overrides();

        let report = state.report;
        debug!(
            passes = report.pipeline.shaders.len(),
            parameters = report.pipeline.parameters.len(),
            diagnostics = report.diagnostics.len(),
            "parsed preset"
        );
        report
    }
}

/// Working state for one parse call.
struct ParseState<'p> {
    parser: &'p PresetParser,
    report: ParseReport,
    /// Non-indexed `key = value` lines that may assign a parameter.
    overrides: Vec<(String, String)>,
}

impl ParseState<'_> {
    fn line(&mut self, line_no: usize, line: &str) {
        let Some((key, value)) = line.split_once('=') else {
            return;
        };
        let key = trim(key);
        let value = strip_quotes(trim(value));

        if key == "shaders" {
            let count = match parse_int(value) {
                Some(count) => count,
                None => {
                    warn!(line = line_no, value, "invalid shader count");
                    self.diagnose(line_no, key, DiagnosticKind::InvalidShaderCount(value.to_string()));
                    0
                }
            };
            self.report.pipeline.shader_count = count;
            return;
        }

        if key == "parameters" {
            self.declare_parameters(line_no, key, value);
            return;
        }

        match PassKey::match_key(key) {
            Some((_, index)) if index >= self.parser.max_passes => {
                warn!(line = line_no, key, "pass index out of range");
                self.diagnose(
                    line_no,
                    key,
                    DiagnosticKind::PassIndexOutOfRange {
                        index,
                        limit: self.parser.max_passes,
                    },
                );
            }
            Some((field, index)) => {
                field.apply(index, self.report.pipeline.pass_mut(index), value);
            }
            None => self.overrides.push((key.to_string(), value.to_string())),
        }
    }

    fn declare_parameters(&mut self, line_no: usize, key: &str, value: &str) {
        let limit = self.parser.max_parameters;
        for name in value.split(';').map(trim).filter(|name| !name.is_empty()) {
            let parameters = &mut self.report.pipeline.parameters;
            if parameters.iter().any(|p| p.name == name) {
                continue;
            }
            if parameters.len() >= limit {
                warn!(line = line_no, name, "parameter limit reached");
                self.diagnose(line_no, key, DiagnosticKind::ParameterLimit { limit });
                return;
            }
            parameters.push(Parameter::named(name));
        }
    }

    fn resolve_overrides(&mut self) {
        for (key, value) in self.overrides.drain(..) {
            let Some(param) = self.report.pipeline.parameter_mut(&key) else {
                continue;
            };
            match parse_float(&value) {
                Some(default_value) => {
                    param.default_value = default_value;
                    param.overridden = true;
                }
                None => debug!(name = %key, value = %value, "malformed parameter value ignored"),
            }
        }
    }

    fn diagnose(&mut self, line: usize, key: &str, kind: DiagnosticKind) {
        self.report.diagnostics.push(Diagnostic {
            line,
            key: key.to_string(),
            kind,
        });
    }
}
