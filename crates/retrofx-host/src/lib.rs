//! Host session around the preset parser and the shader preprocessor.
//!
//! A [`Session`] owns the engines between `initialize` and `cleanup`,
//! resolves pass paths through a [`ShaderSource`], and caches compiled
//! sources in a [`ShaderCache`]. Every call returns a sentinel on failure
//! rather than an error, so a foreign-language host only has to check for
//! `false` or an empty string.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut session = Session::new(SessionConfig::default());
//! session.initialize();
//! if session.parse_preset(&preset_text) {
//!     for pass in session.pipeline().shaders {
//!         let source = session.load_shader_source(&pass.path);
//!         let glsl = session.compile_shader(&source, ShaderStage::Fragment);
//!     }
//! }
//! session.cleanup();
//! ```

pub mod cache;
pub mod config;
pub mod external;
pub mod library;
pub mod session;
pub mod source;

pub use cache::{CacheError, CacheStats, CachedShader, ShaderCache, CACHE_FORMAT_VERSION};
pub use config::SessionConfig;
pub use external::{looks_like_shader_file, ExternalKind, ExternalShader};
pub use library::{builtin, builtin_names, find_builtin, BuiltinShader};
pub use session::{CompiledPass, CompiledPipeline, Session};
pub use source::{DirectorySource, PlaceholderSource, ShaderSource};

pub use retrofx_core::log::init_tracing;
pub use retrofx_core::{Parameter, Pipeline, ShaderPass, ShaderStage};
