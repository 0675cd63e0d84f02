//! Project metadata extraction
//!
//! Derives the generated package's name, description and version from the
//! spec's `info` block, normalized for use in a `pyproject.toml`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

static INVALID_PACKAGE_CHAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9-]").expect("valid regex"));

/// Sanitized project metadata handed to the renderer.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectMetadata {
    /// Package name: lowercase, alphanumeric and hyphens only
    pub project_name: String,
    /// One-line description with collapsed whitespace
    pub description: String,
    /// Version string from the spec, `0.1.0` when absent
    pub version: String,
}

/// Extracts and sanitizes project metadata from the spec's info block.
pub fn extract_metadata(spec: &Value) -> ProjectMetadata {
    let info = spec.get("info");
    let field = |key: &str| info.and_then(|i| i.get(key)).and_then(Value::as_str);

    let raw_title = field("title").unwrap_or("generated-client");
    let project_name = INVALID_PACKAGE_CHAR_RE
        .replace_all(&raw_title.to_lowercase().replace(' ', "-"), "")
        .to_string();

    // Tabs and newlines have no place in a pyproject one-liner.
    let raw_description = field("description").unwrap_or("Generated Client");
    let description = raw_description.split_whitespace().collect::<Vec<_>>().join(" ");

    ProjectMetadata {
        project_name,
        description,
        // 0.y.z is the SemVer convention for initial development releases.
        version: field("version").unwrap_or("0.1.0").to_string(),
    }
}
