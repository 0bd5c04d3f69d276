//! End-to-end session use the way a host drives it.

use std::sync::Arc;
use std::thread;

use retrofx_glsl::ShaderPreprocessor;
use retrofx_host::{
    CacheStats, DirectorySource, ExternalShader, Session, SessionConfig, ShaderStage,
};

const CRT_PRESET: &str = r#"
shaders = 2

shader0 = "shaders/crt.slang"
filter_linear0 = true
scale_type0 = source
scale0 = 2.0

shader1 = shaders/blur.slang
scale_type1 = viewport
srgb_framebuffer1 = true

parameters = "CURVATURE;SCANLINE_WEIGHT"
CURVATURE = 0.25
"#;

const CRT_SOURCE: &str = r#"#pragma parameter CURVATURE "Screen curvature" 0.1 0.0 0.5 0.01
#pragma parameter SCANLINE_WEIGHT "Scanline weight" 0.3 0.0 1.0 0.05
uniform float CURVATURE;
uniform float SCANLINE_WEIGHT;
void main() {
    float3 c = saturate(float3(CURVATURE) * 2.0);
    gl_FragColor = float4(lerp(c, float3(SCANLINE_WEIGHT), 0.5), 1.0);
}
"#;

const BLUR_SOURCE: &str = "void main() {\n    gl_FragColor = float4(0.0);\n}\n";

fn preset_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("shaders")).unwrap();
    std::fs::write(dir.path().join("shaders/crt.slang"), CRT_SOURCE).unwrap();
    std::fs::write(dir.path().join("shaders/blur.slang"), BLUR_SOURCE).unwrap();
    std::fs::write(dir.path().join("crt.slangp"), CRT_PRESET).unwrap();
    dir
}

#[test]
fn preset_to_compiled_pipeline() {
    let dir = preset_dir();
    let mut session =
        Session::with_source(SessionConfig::default(), DirectorySource::new(dir.path()));
    assert!(session.initialize());
    assert!(session.parse_preset(CRT_PRESET));

    let pipeline = session.pipeline();
    assert_eq!(pipeline.shader_count, 2);
    assert_eq!(pipeline.shaders[0].path, "shaders/crt.slang");
    assert_eq!(pipeline.shaders[0].scale, 2.0);
    assert!(pipeline.shaders[1].srgb_framebuffer);

    let compiled = session.compile_pipeline().unwrap();
    assert_eq!(compiled.passes.len(), 2);

    let crt = &compiled.passes[0].fragment;
    assert!(crt.starts_with("#version 100\nprecision mediump float;\n"));
    assert!(crt.contains("vec3 c = clamp(vec3(CURVATURE) * 2.0, 0.0, 1.0);"));
    assert!(crt.contains("gl_FragColor = vec4(mix(c, vec3(SCANLINE_WEIGHT), 0.5), 1.0);"));

    let curvature = compiled.pipeline.parameter("CURVATURE").unwrap();
    assert_eq!(curvature.default_value, 0.25);
    assert!(curvature.overridden);
    assert_eq!(curvature.maximum, 0.5);
    let weight = compiled.pipeline.parameter("SCANLINE_WEIGHT").unwrap();
    assert_eq!(weight.default_value, 0.3);
    assert_eq!(weight.description, "Scanline weight");

    session.cleanup();
    assert!(session.compile_pipeline().is_none());
}

#[test]
fn disk_cache_is_reused_across_sessions() {
    let cache_dir = tempfile::tempdir().unwrap();
    let config = SessionConfig {
        cache_dir: Some(cache_dir.path().to_path_buf()),
        ..SessionConfig::default()
    };

    let first = {
        let mut session = Session::new(config.clone());
        assert!(session.initialize());
        let out = session.compile_shader(BLUR_SOURCE, ShaderStage::Fragment);
        session.cleanup();
        out
    };
    assert!(!first.is_empty());

    let cache = retrofx_host::ShaderCache::with_disk(
        cache_dir.path(),
        config.cache_max_age(),
        config.memory_cache_capacity,
    )
    .unwrap()
    .with_target(ShaderPreprocessor::new().fingerprint());
    let stats = cache.stats();
    assert_eq!(stats.disk_entries, 1);
    assert_eq!(stats.memory_entries, 0);
    assert_eq!(cache.get(BLUR_SOURCE, ShaderStage::Fragment), Some(first.clone()));

    let mut session = Session::new(config);
    assert!(session.initialize());
    assert_eq!(session.compile_shader(BLUR_SOURCE, ShaderStage::Fragment), first);

    cache.clear();
    assert_eq!(cache.stats(), CacheStats::default());
}

#[test]
fn external_preset_resolves_first_pass() {
    let dir = preset_dir();
    let mut session = Session::default();
    assert!(session.initialize());

    let shader = ExternalShader::load(dir.path().join("crt.slangp")).unwrap();
    assert_eq!(shader.name, "crt");
    assert_eq!(session.load_external_fragment(&shader), CRT_SOURCE);
}

#[test]
fn shared_session_matches_sequential_results() {
    let mut session = Session::default();
    assert!(session.initialize());
    let session = Arc::new(session);

    let sources: Vec<String> = (0..16)
        .map(|i| format!("void main() {{ gl_FragColor = float4(saturate({i}.0)); }}"))
        .collect();
    let expected: Vec<String> = sources
        .iter()
        .map(|source| session.compile_shader(source, ShaderStage::Fragment))
        .collect();

    let handles: Vec<_> = sources
        .into_iter()
        .map(|source| {
            let session = Arc::clone(&session);
            thread::spawn(move || {
                (0..8)
                    .map(|_| session.compile_shader(&source, ShaderStage::Fragment))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for (handle, expected) in handles.into_iter().zip(expected) {
        for out in handle.join().unwrap() {
            assert_eq!(out, expected);
        }
    }
}
