//! Keyword rewriting from the HLSL-flavoured dialect to portable GLSL.
//!
//! Rewrites are plain substring substitutions, not token aware: `float3`
//! inside `myfloat3x` becomes `myvec3x` just as a standalone `float3`
//! does.

/// Vector type aliases and their GLSL names.
const VECTOR_ALIASES: [(&str, &str); 3] = [("float2", "vec2"), ("float3", "vec3"), ("float4", "vec4")];

const LERP_CALL: &str = "lerp(";
const MIX_CALL: &str = "mix(";
const SATURATE_CALL: &str = "saturate(";
const CLAMP_CALL: &str = "clamp(";
const CLAMP_BOUNDS: &str = ", 0.0, 1.0)";

/// Apply every dialect rewrite to one line.
///
/// The passes run in a fixed order (vector aliases, then `lerp`, then
/// `saturate`), each over the output of the previous one.
pub fn rewrite_line(line: &str) -> String {
    let mut out = line.to_string();
    for (alias, glsl) in VECTOR_ALIASES {
        if out.contains(alias) {
            out = out.replace(alias, glsl);
        }
    }
    if out.contains(LERP_CALL) {
        out = out.replace(LERP_CALL, MIX_CALL);
    }
    if out.contains(SATURATE_CALL) {
        out = rewrite_saturate(&out);
    }
    out
}

/// Rewrite every `saturate(expr)` into `clamp(expr, 0.0, 1.0)`.
///
/// `expr` runs up to the parenthesis that balances the call's opening
/// one, so nested calls stay intact. Calls nested inside `expr` are
/// rewritten as well. A call without a balancing `)` is left as written.
///
/// Parentheses are paired up front with an explicit stack, then the line
/// is copied once. Time is linear in the line length and the call depth
/// never grows with the input.
pub fn rewrite_saturate(line: &str) -> String {
    let bytes = line.as_bytes();
    let pairs = paren_pairs(bytes);
    let mut closes_call = vec![false; bytes.len()];

    let mut out = String::with_capacity(line.len() + 16);
    let mut copied = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i..].starts_with(SATURATE_CALL.as_bytes()) {
            let open = i + SATURATE_CALL.len() - 1;
            if let Some(close) = pairs[open] {
                // Both `s` and `)` are ASCII, so every cut is a char boundary.
                out.push_str(&line[copied..i]);
                out.push_str(CLAMP_CALL);
                closes_call[close] = true;
                i = open + 1;
                copied = i;
                continue;
            }
        }
        if closes_call[i] {
            out.push_str(&line[copied..i]);
            out.push_str(CLAMP_BOUNDS);
            copied = i + 1;
        }
        i += 1;
    }

    out.push_str(&line[copied..]);
    out
}

/// For every `(` in `text`, the offset of the `)` that balances it, or
/// `None` if it is never closed. Other offsets hold `None`.
fn paren_pairs(text: &[u8]) -> Vec<Option<usize>> {
    let mut pairs = vec![None; text.len()];
    let mut open = Vec::new();
    for (i, byte) in text.iter().enumerate() {
        match byte {
            b'(' => open.push(i),
            b')' => {
                if let Some(start) = open.pop() {
                    pairs[start] = Some(i);
                }
            }
            _ => {}
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_aliases() {
        assert_eq!(rewrite_line("float3 foo;"), "vec3 foo;");
        assert_eq!(
            rewrite_line("float4 c = float4(float2(0.0), 1.0, 1.0);"),
            "vec4 c = vec4(vec2(0.0), 1.0, 1.0);"
        );
    }

    #[test]
    fn aliases_match_inside_identifiers() {
        assert_eq!(rewrite_line("int myfloat3x;"), "int myvec3x;");
        assert_eq!(rewrite_line("float22"), "vec22");
    }

    #[test]
    fn lerp_becomes_mix() {
        assert_eq!(rewrite_line("c = lerp(a, b, t);"), "c = mix(a, b, t);");
        assert_eq!(rewrite_line("c = lerp (a, b, t);"), "c = lerp (a, b, t);");
        assert_eq!(rewrite_line("superlerp(x)"), "supermix(x)");
    }

    #[test]
    fn saturate_simple() {
        assert_eq!(rewrite_line("saturate(a + b)"), "clamp(a + b, 0.0, 1.0)");
    }

    #[test]
    fn saturate_nested_parens() {
        assert_eq!(
            rewrite_line("x = saturate(f(x) + 1.0);"),
            "x = clamp(f(x) + 1.0, 0.0, 1.0);"
        );
    }

    #[test]
    fn saturate_nested_calls() {
        assert_eq!(
            rewrite_line("saturate(saturate(x) * 2.0)"),
            "clamp(clamp(x, 0.0, 1.0) * 2.0, 0.0, 1.0)"
        );
        assert_eq!(
            rewrite_line("a = saturate(x) + saturate(y);"),
            "a = clamp(x, 0.0, 1.0) + clamp(y, 0.0, 1.0);"
        );
    }

    #[test]
    fn saturate_unmatched_is_left_alone() {
        assert_eq!(rewrite_line("saturate(a + b"), "saturate(a + b");
        assert_eq!(
            rewrite_line("saturate(saturate(x)"),
            "saturate(clamp(x, 0.0, 1.0)"
        );
        assert_eq!(rewrite_line("saturate("), "saturate(");
    }

    #[test]
    fn passes_compose_in_order() {
        assert_eq!(
            rewrite_line("float3 c = saturate(lerp(a, b, t));"),
            "vec3 c = clamp(mix(a, b, t), 0.0, 1.0);"
        );
    }

    #[test]
    fn non_ascii_text_survives() {
        assert_eq!(
            rewrite_line("// ° saturate(é) float2"),
            "// ° clamp(é, 0.0, 1.0) vec2"
        );
        assert_eq!(rewrite_line("saturate(é"), "saturate(é");
    }

    #[test]
    fn paren_pairing() {
        assert_eq!(paren_pairs(b"a)"), vec![None, None]);
        assert_eq!(paren_pairs(b"(f(x))"), vec![Some(5), None, Some(4), None, None, None]);
        assert_eq!(paren_pairs(b"(("), vec![None, None]);
        assert!(paren_pairs(b"").is_empty());
    }

    #[test]
    fn deeply_nested_saturate() {
        let depth = 10_000;
        let line = format!("{}x{}", "saturate(".repeat(depth), ")".repeat(depth));
        assert_eq!(
            rewrite_line(&line),
            format!("{}x{}", "clamp(".repeat(depth), ", 0.0, 1.0)".repeat(depth))
        );
    }

    #[test]
    fn deeply_nested_unmatched_saturate() {
        let depth = 10_000;
        let line = "saturate(".repeat(depth);
        assert_eq!(rewrite_line(&line), line);
    }
}
