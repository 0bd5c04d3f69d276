//! Shader files imported from outside the built-in library.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::debug;

pub const PRESET_EXTENSION: &str = "slangp";
pub const SHADER_EXTENSION: &str = "slang";

/// What an imported file contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalKind {
    /// A preset describing a pass list.
    Preset,
    /// A single dialect shader source.
    Shader,
}

impl ExternalKind {
    /// Classify by extension. Other extensions are unsupported.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            PRESET_EXTENSION => Some(ExternalKind::Preset),
            SHADER_EXTENSION => Some(ExternalKind::Shader),
            _ => None,
        }
    }
}

/// An imported preset or shader file, read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalShader {
    /// File name without extension.
    pub name: String,
    pub path: PathBuf,
    pub kind: ExternalKind,
    pub content: String,
}

impl ExternalShader {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let kind = ExternalKind::from_path(path)
            .ok_or_else(|| anyhow!("unsupported shader file type: {}", path.display()))?;
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| anyhow!("shader file has no usable name: {}", path.display()))?
            .to_string();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        debug!(name = %name, ?kind, "loaded external shader");
        Ok(Self {
            name,
            path: path.to_path_buf(),
            kind,
            content,
        })
    }
}

/// Cheap plausibility check for a standalone shader file: a version
/// directive plus an entry point.
pub fn looks_like_shader_file(text: &str) -> bool {
    text.contains("#version") && (text.contains("void main") || text.contains("main()"))
}
