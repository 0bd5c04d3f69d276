//! Built-in overlay shaders.
//!
//! Each built-in is a vertex/fragment pair written in plain GLSL ES 1.00.
//! They double as the placeholder sources [`crate::PlaceholderSource`]
//! hands out when no asset store is wired in.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use tracing::warn;

/// Name of the built-in used when a lookup misses.
pub const DEFAULT_BUILTIN: &str = "none";

pub const DEFAULT_VERTEX: &str = r#"attribute vec4 a_Position;
attribute vec2 a_TexCoord;

uniform mat4 u_MVPMatrix;

varying vec2 v_TexCoord;

void main() {
    gl_Position = u_MVPMatrix * a_Position;
    v_TexCoord = a_TexCoord;
}
"#;

pub const PASSTHROUGH_FRAGMENT: &str = r#"#version 100
precision mediump float;

uniform float u_Time;
uniform vec2 u_Resolution;
uniform float u_Opacity;

varying vec2 v_TexCoord;

void main() {
    gl_FragColor = vec4(0.0, 0.0, 0.0, 0.0);
}
"#;

pub const CRT_FRAGMENT: &str = r#"#version 100
precision mediump float;

uniform float u_Time;
uniform vec2 u_Resolution;
uniform float u_Opacity;

varying vec2 v_TexCoord;

void main() {
    vec2 uv = v_TexCoord;
    vec2 edge = abs(0.5 - uv);
    edge *= edge;

    // barrel curvature
    uv -= 0.5;
    uv.x *= 1.0 + edge.y * 0.15;
    uv.y *= 1.0 + edge.x * 0.2;
    uv += 0.5;

    float vignette = pow(1.0 - dot(edge, edge), 0.5);
    float scan = sin(uv.y * u_Resolution.y * 3.14159) * 0.04;

    vec3 phosphor = vec3(0.2, 0.8, 0.3) + scan;
    gl_FragColor = vec4(phosphor * vignette, u_Opacity * 0.3);
}
"#;

pub const SCANLINE_FRAGMENT: &str = r#"#version 100
precision mediump float;

uniform float u_Time;
uniform vec2 u_Resolution;
uniform float u_Opacity;

varying vec2 v_TexCoord;

void main() {
    vec2 uv = v_TexCoord;

    float line = sin(uv.y * u_Resolution.y * 3.14159 * 2.0) * 0.5 + 0.5;
    line *= line;
    float column = sin(uv.x * u_Resolution.x * 3.14159 * 0.5) * 0.1 + 0.9;

    gl_FragColor = vec4(vec3(0.0), line * column * u_Opacity * 0.4);
}
"#;

pub const LCD_FRAGMENT: &str = r#"#version 100
precision mediump float;

uniform float u_Time;
uniform vec2 u_Resolution;
uniform float u_Opacity;

varying vec2 v_TexCoord;

void main() {
    vec2 uv = v_TexCoord;

    vec2 cell = abs(fract(uv * u_Resolution / 3.0) - 0.5);
    float grid = min(cell.x, cell.y) * 2.0;

    vec3 subpixel;
    float column = mod(uv.x * u_Resolution.x, 3.0);
    if (column < 1.0) subpixel = vec3(1.0, 0.3, 0.3);
    else if (column < 2.0) subpixel = vec3(0.3, 1.0, 0.3);
    else subpixel = vec3(0.3, 0.3, 1.0);

    vec3 color = mix(vec3(0.0), subpixel * 0.2, 1.0 - min(grid, 1.0));
    gl_FragColor = vec4(color, u_Opacity * 0.2);
}
"#;

/// Used when an external shader cannot be loaded.
pub const FALLBACK_FRAGMENT: &str = r#"#version 100
precision mediump float;

uniform float u_Time;
uniform vec2 u_Resolution;
uniform float u_Opacity;

varying vec2 v_TexCoord;

void main() {
    vec2 uv = v_TexCoord;
    vec3 color = vec3(0.5 + 0.3 * sin(u_Time + uv.x * 10.0));
    gl_FragColor = vec4(color, u_Opacity * 0.5);
}
"#;

/// A named vertex/fragment pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinShader {
    pub name: &'static str,
    pub vertex: &'static str,
    pub fragment: &'static str,
}

static BUILTINS: Lazy<BTreeMap<&'static str, BuiltinShader>> = Lazy::new(|| {
    [
        ("none", PASSTHROUGH_FRAGMENT),
        ("crt", CRT_FRAGMENT),
        ("scanlines", SCANLINE_FRAGMENT),
        ("lcd", LCD_FRAGMENT),
    ]
    .into_iter()
    .map(|(name, fragment)| {
        (
            name,
            BuiltinShader {
                name,
                vertex: DEFAULT_VERTEX,
                fragment,
            },
        )
    })
    .collect()
});

/// Names of every built-in, sorted.
pub fn builtin_names() -> Vec<&'static str> {
    BUILTINS.keys().copied().collect()
}

/// Look up a built-in by exact name.
pub fn find_builtin(name: &str) -> Option<&'static BuiltinShader> {
    BUILTINS.get(name)
}

/// Look up a built-in, falling back to [`DEFAULT_BUILTIN`] for unknown
/// names.
pub fn builtin(name: &str) -> &'static BuiltinShader {
    find_builtin(name).unwrap_or_else(|| {
        warn!(name, "unknown built-in shader, using default");
        &BUILTINS[DEFAULT_BUILTIN]
    })
}

/// Pick a placeholder fragment source from a shader path.
///
/// Only the file name without its extension is inspected: `crt` wins over
/// `scanline`, which wins over `lcd`. Anything else is a passthrough.
pub fn placeholder_fragment(path: &str) -> &'static str {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let stem = match file_name.rfind('.') {
        Some(dot) => &file_name[..dot],
        None => file_name,
    };

    if stem.contains("crt") {
        CRT_FRAGMENT
    } else if stem.contains("scanline") {
        SCANLINE_FRAGMENT
    } else if stem.contains("lcd") {
        LCD_FRAGMENT
    } else {
        PASSTHROUGH_FRAGMENT
    }
}
