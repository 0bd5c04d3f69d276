//! The [`ShaderSource`] trait: how a session turns a pass path into shader
//! text.
//!
//! Hosts with their own asset store implement [`ShaderSource`]. Two
//! implementations ship with the crate:
//!
//! - [`PlaceholderSource`] returns a built-in shader chosen from the file
//!   name, so a pipeline can be exercised without any assets.
//! - [`DirectorySource`] reads files relative to a root directory, usually
//!   the directory holding the preset.

use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::debug;

use crate::library::placeholder_fragment;

/// Resolves a [`retrofx_core::ShaderPass::path`] to shader source text.
///
/// # Example
///
/// ```rust,ignore
/// struct Assets { /* ... */ }
///
/// impl ShaderSource for Assets {
///     fn load(&self, path: &str) -> anyhow::Result<String> {
///         self.read_text(path)
///     }
/// }
/// ```
pub trait ShaderSource: Send + Sync {
    /// Load the raw source for `path`.
    fn load(&self, path: &str) -> Result<String>;
}

/// Deterministic stand-in for an asset store.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderSource;

impl ShaderSource for PlaceholderSource {
    fn load(&self, path: &str) -> Result<String> {
        debug!(path, "placeholder shader source");
        Ok(placeholder_fragment(path).to_string())
    }
}

/// Reads pass sources from files below `root`.
///
/// Paths must be relative and may not climb out of `root`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// A source rooted at the directory containing `preset_path`.
    pub fn for_preset(preset_path: &Path) -> Self {
        let root = preset_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        if path.is_empty() {
            bail!("empty shader path");
        }
        let relative = Path::new(path);
        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => bail!("shader path {path:?} escapes the preset directory"),
            }
        }
        Ok(self.root.join(relative))
    }
}

impl ShaderSource for DirectorySource {
    fn load(&self, path: &str) -> Result<String> {
        let full = self.resolve(path)?;
        debug!(path = %full.display(), "reading shader source");
        std::fs::read_to_string(&full)
            .with_context(|| format!("failed to read shader source {}", full.display()))
    }
}
