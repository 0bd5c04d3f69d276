//! Shared value parsing for preset text.
//!
//! Callers trim before parsing; the numeric helpers do not skip
//! whitespace themselves.

/// Characters stripped by [`trim`]: space, tab, CR and LF.
const TRIM_CHARS: [char; 4] = [' ', '\t', '\r', '\n'];

/// Strip leading and trailing spaces, tabs, CRs and LFs.
///
/// Other Unicode whitespace is preserved.
pub fn trim(text: &str) -> &str {
    text.trim_matches(&TRIM_CHARS[..])
}

/// Strip exactly one pair of surrounding double quotes.
///
/// Values shorter than two characters are returned unchanged, so an empty
/// value or a lone `"` is never indexed out of range.
pub fn strip_quotes(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Base-10 integer, locale independent.
pub fn parse_int(text: &str) -> Option<i32> {
    text.parse().ok()
}

/// Decimal float, locale independent.
pub fn parse_float(text: &str) -> Option<f32> {
    text.parse().ok()
}

/// The index of an indexed key such as `shader12`.
///
/// Matches only when `key` is exactly `prefix` followed by one or more
/// ASCII digits. `shaderboard`, `shader` and `shader1a` do not match.
pub fn indexed_suffix(key: &str, prefix: &str) -> Option<usize> {
    let digits = key.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// `true` only for the exact literal `true`.
pub fn parse_flag(value: &str) -> bool {
    value == "true"
}
