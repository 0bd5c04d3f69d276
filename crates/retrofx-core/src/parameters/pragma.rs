use crate::value::parse_float;

use super::Parameter;

const PRAGMA: &str = "#pragma";
const PARAMETER: &str = "parameter";

/// Parse a `#pragma parameter NAME "Description" DEFAULT MIN MAX [STEP]`
/// line.
///
/// Returns `None` for any other line, or when the name, description or
/// one of the three mandatory numbers is missing or malformed. A missing
/// step is read as `0.0`.
pub fn parse_parameter_pragma(line: &str) -> Option<Parameter> {
    let rest = line.trim().strip_prefix(PRAGMA)?;
    let rest = rest.trim_start().strip_prefix(PARAMETER)?;
    // `#pragma parameterfoo` is not a parameter pragma.
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim_start();

    let name_end = rest.find(char::is_whitespace)?;
    let (name, rest) = rest.split_at(name_end);

    let rest = rest.trim_start().strip_prefix('"')?;
    let close = rest.find('"')?;
    let description = &rest[..close];
    let mut numbers = rest[close + 1..].split_whitespace().map(parse_float);

    let default_value = numbers.next()??;
    let minimum = numbers.next()??;
    let maximum = numbers.next()??;
    let step = match numbers.next() {
        Some(step) => step?,
        None => 0.0,
    };

    Some(Parameter {
        name: name.to_string(),
        description: description.to_string(),
        default_value,
        minimum,
        maximum,
        step,
        overridden: false,
    })
}

/// Collect every parameter pragma in a shader source, in line order.
pub fn collect_parameter_pragmas(source: &str) -> Vec<Parameter> {
    source.lines().filter_map(parse_parameter_pragma).collect()
}
