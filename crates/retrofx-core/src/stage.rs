//! Shader stage kinds.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};

/// Pipeline stage a shader source targets.
///
/// The discriminants are the integer codes hosts pass across the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, Serialize, Deserialize)]
#[repr(i32)]
pub enum ShaderStage {
    Vertex = 0,
    Fragment = 1,
}

impl ShaderStage {
    /// Decode a host stage code.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::from_i32(code)
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}
