//! The structured pipeline a preset describes.

use serde::{Deserialize, Serialize};

use crate::parameters::Parameter;

/// How a pass sizes its output framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScaleType {
    /// Relative to the previous pass output.
    #[default]
    Source,
    /// Relative to the final viewport.
    Viewport,
    /// Fixed pixel size.
    Absolute,
}

impl ScaleType {
    /// Map preset text onto a scale type. Matching is exact and
    /// case-sensitive; anything else yields `None`.
    pub fn from_preset_value(value: &str) -> Option<Self> {
        match value {
            "source" => Some(ScaleType::Source),
            "viewport" => Some(ScaleType::Viewport),
            "absolute" => Some(ScaleType::Absolute),
            _ => None,
        }
    }
}

/// One stage of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaderPass {
    /// Shader source reference, relative to the preset. Empty if never set.
    pub path: String,
    pub filter_linear: bool,
    pub scale_type: ScaleType,
    pub scale: f32,
    pub frame_count_mod: i32,
    pub float_framebuffer: bool,
    pub srgb_framebuffer: bool,
}

impl Default for ShaderPass {
    fn default() -> Self {
        Self {
            path: String::new(),
            filter_linear: true,
            scale_type: ScaleType::Source,
            scale: 1.0,
            frame_count_mod: 0,
            float_framebuffer: false,
            srgb_framebuffer: false,
        }
    }
}

/// Root record produced by [`crate::PresetParser`].
///
/// `shaders` is always dense: position `i` is pass `i`, and a pass that was
/// never mentioned by the preset but lies below a mentioned one holds
/// [`ShaderPass::default`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    /// Count declared by the `shaders` key. Advisory only.
    pub shader_count: i32,
    pub shaders: Vec<ShaderPass>,
    pub parameters: Vec<Parameter>,
}

impl Pipeline {
    /// Mutable access to pass `index`, growing `shaders` with default
    /// passes until the index exists.
    pub fn pass_mut(&mut self, index: usize) -> &mut ShaderPass {
        if self.shaders.len() <= index {
            self.shaders.resize_with(index + 1, ShaderPass::default);
        }
        &mut self.shaders[index]
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn parameter_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.parameters.iter_mut().find(|p| p.name == name)
    }

    /// Fold `#pragma parameter` metadata gathered from pass sources into
    /// the declared parameters.
    ///
    /// Declared parameters take range and step from the pragma. Their
    /// default is taken from the pragma only if the preset did not
    /// override it. Undeclared parameters are appended while fewer than
    /// `max_parameters` are held.
    pub fn merge_parameter_pragmas(
        &mut self,
        pragmas: impl IntoIterator<Item = Parameter>,
        max_parameters: usize,
    ) {
        for pragma in pragmas {
            match self.parameters.iter().position(|p| p.name == pragma.name) {
                Some(index) => {
                    let existing = &mut self.parameters[index];
                    if !existing.overridden {
                        existing.default_value = pragma.default_value;
                    }
                    existing.minimum = pragma.minimum;
                    existing.maximum = pragma.maximum;
                    existing.step = pragma.step;
                    if existing.description.is_empty() {
                        existing.description = pragma.description;
                    }
                }
                None if self.parameters.len() < max_parameters => {
                    self.parameters.push(pragma);
                }
                None => {
                    tracing::debug!(name = %pragma.name, "parameter cap reached, pragma dropped");
                }
            }
        }
    }
}
