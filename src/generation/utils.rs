//! String transformation utilities for code generation

use once_cell::sync::Lazy;
use regex::Regex;

static CAMEL_BOUNDARY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(.)([A-Z][a-z]+)").expect("valid regex"));
static LOWER_UPPER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("valid regex"));
static PATH_PARAM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^}]+)\}").expect("valid regex"));

/// Converts camelCase or PascalCase to snake_case.
///
/// Handles acronym runs gracefully (`HTTPResponse` -> `http_response`).
pub fn to_snake_case(name: &str) -> String {
    let step = CAMEL_BOUNDARY_RE.replace_all(name, "${1}_${2}");
    LOWER_UPPER_RE.replace_all(&step, "${1}_${2}").to_lowercase()
}

/// Converts path parameter names to snake_case.
///
/// `/pet/{petId}` -> `/pet/{pet_id}`
pub fn normalize_path(path: &str) -> String {
    PATH_PARAM_RE
        .replace_all(path, |caps: &regex::Captures| {
            format!("{{{}}}", to_snake_case(&caps[1]))
        })
        .to_string()
}

/// Renders a JSON value as a Python literal, the way `repr()` would.
///
/// Used for schema-declared defaults, which are emitted verbatim into
/// generated signatures.
pub fn python_repr(value: &serde_json::Value) -> String {
    use serde_json::Value;

    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            let escaped = s
                .replace('\\', "\\\\")
                .replace('\'', "\\'")
                .replace('\n', "\\n")
                .replace('\r', "\\r")
                .replace('\t', "\\t");
            format!("'{escaped}'")
        }
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(python_repr).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .map(|(k, v)| {
                    format!(
                        "{}: {}",
                        python_repr(&serde_json::Value::String(k.clone())),
                        python_repr(v)
                    )
                })
                .collect();
            format!("{{{}}}", parts.join(", "))
        }
    }
}
