//! The host-facing session: construct once, initialize, call many times,
//! clean up.
//!
//! Every operation degrades to a sentinel value instead of failing: `false`
//! for the boolean calls, an empty string for the text calls. Calls made
//! before [`Session::initialize`] or after [`Session::cleanup`] are
//! rejected the same way and logged.

use anyhow::{anyhow, bail, Result};
use retrofx_core::{collect_parameter_pragmas, ParseReport, Pipeline, PresetParser, ShaderStage};
use retrofx_glsl::{validate_shader, ShaderPreprocessor};
use tracing::{debug, error, info, warn};

use crate::cache::ShaderCache;
use crate::config::SessionConfig;
use crate::external::{looks_like_shader_file, ExternalKind, ExternalShader};
use crate::library::FALLBACK_FRAGMENT;
use crate::source::{DirectorySource, PlaceholderSource, ShaderSource};

/// Engines held between `initialize` and `cleanup`.
struct Engines {
    parser: PresetParser,
    preprocessor: ShaderPreprocessor,
    cache: ShaderCache,
}

/// One compiled pass of a [`CompiledPipeline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPass {
    pub index: usize,
    pub path: String,
    pub fragment: String,
}

/// The last parsed pipeline with every pass loaded and compiled.
///
/// `pipeline.parameters` includes the `#pragma parameter` metadata found
/// in the pass sources.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPipeline {
    pub pipeline: Pipeline,
    pub passes: Vec<CompiledPass>,
}

pub struct Session<S: ShaderSource = PlaceholderSource> {
    config: SessionConfig,
    source: S,
    engines: Option<Engines>,
    last: Option<ParseReport>,
}

impl Session<PlaceholderSource> {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_source(config, PlaceholderSource)
    }
}

impl Default for Session<PlaceholderSource> {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl<S: ShaderSource> Session<S> {
    pub fn with_source(config: SessionConfig, source: S) -> Self {
        Self {
            config,
            source,
            engines: None,
            last: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.engines.is_some()
    }

    /// Build the parser, preprocessor and cache. Returns whether the
    /// session is ready to accept calls; calling it again is a no-op.
    ///
    /// A disk cache that cannot be opened is replaced by a memory-only one.
    pub fn initialize(&mut self) -> bool {
        if self.engines.is_some() {
            return true;
        }

        let max_age = self.config.cache_max_age();
        let capacity = self.config.memory_cache_capacity;
        let preprocessor = self.config.preprocessor();
        let cache = match &self.config.cache_dir {
            Some(dir) => ShaderCache::with_disk(dir, max_age, capacity).unwrap_or_else(|e| {
                warn!(dir = %dir.display(), "disk shader cache unavailable, using memory only: {e}");
                ShaderCache::in_memory(max_age, capacity)
            }),
            None => ShaderCache::in_memory(max_age, capacity),
        }
        .with_target(preprocessor.fingerprint());

        self.engines = Some(Engines {
            parser: self.config.preset_parser(),
            preprocessor,
            cache,
        });
        info!("shader session initialized");
        true
    }

    /// Parse `text` and record the result as the session's pipeline.
    ///
    /// Returns `true` when at least one pass was found. The pipeline is
    /// recorded either way and is available from [`Session::pipeline`].
    pub fn parse_preset(&mut self, text: &str) -> bool {
        let Some(engines) = &self.engines else {
            error!("parse_preset called on an uninitialized session");
            return false;
        };

        let report = engines.parser.parse_report(text);
        for diagnostic in &report.diagnostics {
            warn!("preset: {diagnostic}");
        }
        let success = report.is_success();
        if success {
            debug!(passes = report.pipeline.shaders.len(), "preset parsed");
        } else {
            warn!("preset declares no shader passes");
        }
        self.last = Some(report);
        success
    }

    /// A copy of the last parsed pipeline, or an empty one.
    pub fn pipeline(&self) -> Pipeline {
        self.last
            .as_ref()
            .map(|report| report.pipeline.clone())
            .unwrap_or_default()
    }

    pub fn last_report(&self) -> Option<&ParseReport> {
        self.last.as_ref()
    }

    /// Raw source for a pass path, or an empty string on failure.
    pub fn load_shader_source(&self, path: &str) -> String {
        if self.engines.is_none() {
            error!("load_shader_source called on an uninitialized session");
            return String::new();
        }
        match self.source.load(path) {
            Ok(text) => {
                if text.is_empty() {
                    warn!(path, "shader source is empty");
                }
                text
            }
            Err(e) => {
                error!(path, "failed to load shader source: {e:#}");
                String::new()
            }
        }
    }

    /// Validate then preprocess `source`. Returns an empty string if the
    /// source is rejected.
    ///
    /// Successful compilations are cached by stage, compile target and
    /// source hash.
    pub fn compile_shader(&self, source: &str, stage: ShaderStage) -> String {
        let Some(engines) = &self.engines else {
            error!("compile_shader called on an uninitialized session");
            return String::new();
        };

        if let Some(compiled) = engines.cache.get(source, stage) {
            return compiled;
        }

        match engines.preprocessor.compile(source, stage) {
            Ok(compiled) => {
                engines.cache.put(source, stage, &compiled);
                compiled
            }
            Err(e) => {
                error!(?stage, "shader validation failed: {e}");
                String::new()
            }
        }
    }

    /// [`Session::compile_shader`] with the stage given as its integer
    /// code. Unknown codes yield an empty string.
    pub fn compile_shader_code(&self, source: &str, stage_code: i32) -> String {
        match ShaderStage::from_code(stage_code) {
            Some(stage) => self.compile_shader(source, stage),
            None => {
                error!(stage_code, "unknown shader stage");
                String::new()
            }
        }
    }

    pub fn validate_shader(&self, source: &str, stage: ShaderStage) -> bool {
        if self.engines.is_none() {
            error!("validate_shader called on an uninitialized session");
            return false;
        }
        match validate_shader(source, stage) {
            Ok(()) => true,
            Err(e) => {
                debug!(?stage, "shader rejected: {e}");
                false
            }
        }
    }

    /// Load and compile the fragment source of every pass in the last
    /// parsed pipeline, folding their parameter pragmas into the pipeline.
    ///
    /// Returns `None` if there is no successfully parsed pipeline or any
    /// pass fails to load or compile.
    pub fn compile_pipeline(&self) -> Option<CompiledPipeline> {
        let Some(engines) = &self.engines else {
            error!("compile_pipeline called on an uninitialized session");
            return None;
        };
        let report = self.last.as_ref().filter(|report| report.is_success())?;

        let mut pipeline = report.pipeline.clone();
        let mut passes = Vec::with_capacity(pipeline.shaders.len());
        for (index, pass) in report.pipeline.shaders.iter().enumerate() {
            let source = self.load_shader_source(&pass.path);
            if source.is_empty() {
                error!(index, path = %pass.path, "pass has no source");
                return None;
            }
            let fragment = self.compile_shader(&source, ShaderStage::Fragment);
            if fragment.is_empty() {
                error!(index, path = %pass.path, "pass failed to compile");
                return None;
            }
            pipeline.merge_parameter_pragmas(
                collect_parameter_pragmas(&source),
                engines.parser.max_parameters(),
            );
            passes.push(CompiledPass {
                index,
                path: pass.path.clone(),
                fragment,
            });
        }

        debug!(passes = passes.len(), parameters = pipeline.parameters.len(), "pipeline compiled");
        Some(CompiledPipeline { pipeline, passes })
    }

    /// Fragment source for an imported file, or [`FALLBACK_FRAGMENT`] if
    /// it cannot be resolved.
    ///
    /// A preset resolves to the source of its first pass, read relative to
    /// the preset's directory. A shader file must pass
    /// [`looks_like_shader_file`].
    pub fn load_external_fragment(&self, shader: &ExternalShader) -> String {
        match self.resolve_external(shader) {
            Ok(text) => text,
            Err(e) => {
                warn!(name = %shader.name, "using fallback shader: {e:#}");
                FALLBACK_FRAGMENT.to_string()
            }
        }
    }

    fn resolve_external(&self, shader: &ExternalShader) -> Result<String> {
        let engines = self
            .engines
            .as_ref()
            .ok_or_else(|| anyhow!("session is not initialized"))?;

        let text = match shader.kind {
            ExternalKind::Shader => {
                if !looks_like_shader_file(&shader.content) {
                    bail!("{} is not a shader source", shader.path.display());
                }
                shader.content.clone()
            }
            ExternalKind::Preset => {
                let pipeline = engines.parser.parse(&shader.content)?;
                let first = &pipeline.shaders[0];
                DirectorySource::for_preset(&shader.path).load(&first.path)?
            }
        };
        if text.trim().is_empty() {
            bail!("{} resolved to an empty source", shader.path.display());
        }
        Ok(text)
    }

    /// Drop the engines and the last pipeline. Idempotent.
    pub fn cleanup(&mut self) {
        if self.engines.take().is_some() {
            info!("shader session cleaned up");
        }
        self.last = None;
    }
}
