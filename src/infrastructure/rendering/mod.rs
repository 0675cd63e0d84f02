//! Template rendering
//!
//! Renders the parsed spec into the generated Python package using Tera
//! templates embedded in the binary.

use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tera::Tera;
use tokio::fs;

use crate::generation::sanitizers::sanitize_identifier;
use crate::generation::{GenerationError, ParsedSpec};

/// One rendered output file.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub path: PathBuf,
    pub content: String,
}

/// Embedded templates, keyed by output filename.
const EMBEDDED_TEMPLATES: &[(&str, &str)] = &[
    (
        "pyproject.toml",
        include_str!("../../../templates/python/pyproject.toml.tera"),
    ),
    (
        "_base.py",
        include_str!("../../../templates/python/_base.py.tera"),
    ),
    (
        "models.py",
        include_str!("../../../templates/python/models.py.tera"),
    ),
    (
        "client.py",
        include_str!("../../../templates/python/client.py.tera"),
    ),
];

/// Derives a Python method name from an operation's path and method.
///
/// Registered as the `operation_name` Tera filter:
/// `GET /pet/{pet_id}` becomes `get_pet_pet_id`.
fn operation_name_filter(
    value: &JsonValue,
    args: &HashMap<String, JsonValue>,
) -> tera::Result<JsonValue> {
    let path = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("operation_name expects a string path"))?;
    let method = args
        .get("method")
        .and_then(JsonValue::as_str)
        .unwrap_or("get");

    let raw = format!("{}_{}", method.to_lowercase(), path.replace(['{', '}'], ""));
    let name = sanitize_identifier(&raw).map_err(|e| tera::Error::msg(e.to_string()))?;
    Ok(JsonValue::String(name))
}

/// Renders the generated Python package from a parsed spec.
pub struct PythonRenderer {
    tera: Tera,
}

impl PythonRenderer {
    pub fn new() -> Result<Self, GenerationError> {
        let mut tera = Tera::default();
        tera.register_filter("operation_name", operation_name_filter);
        for (name, content) in EMBEDDED_TEMPLATES {
            tera.add_raw_template(name, content).map_err(|e| {
                GenerationError::RenderError(format!("failed to add template {name}: {e}"))
            })?;
        }
        Ok(Self { tera })
    }

    /// Renders every template against the parsed spec.
    pub fn render(&self, parsed: &ParsedSpec) -> Result<Vec<Artifact>, GenerationError> {
        let mut context = tera::Context::new();
        context.insert("metadata", &parsed.metadata);
        context.insert("models", &parsed.models);
        context.insert("operations", &parsed.operations);

        let mut artifacts = Vec::new();
        for (name, _) in EMBEDDED_TEMPLATES {
            let content = self.tera.render(name, &context).map_err(|e| {
                GenerationError::RenderError(format!("failed to render {name}: {e}"))
            })?;
            artifacts.push(Artifact {
                path: PathBuf::from(name),
                content,
            });
        }
        Ok(artifacts)
    }
}

/// Writes rendered artifacts under the output directory, creating it first.
pub async fn write_artifacts(
    output_dir: &Path,
    artifacts: &[Artifact],
) -> Result<(), GenerationError> {
    fs::create_dir_all(output_dir).await?;
    for artifact in artifacts {
        fs::write(output_dir.join(&artifact.path), &artifact.content).await?;
    }
    Ok(())
}
