//! End-to-end generation: load, resolve, parse, render, write

use std::path::Path;
use std::sync::Arc;

use crate::generation::{DiagnosticsSink, GenerationError, ParsedSpec, SinkExt, parse_spec};
use crate::infrastructure::openapi::{load_spec, resolve_refs};
use crate::infrastructure::rendering::{PythonRenderer, write_artifacts};

/// Generates the Python SDK from the given OpenAPI source.
///
/// `source` is a file path or HTTP(S) URL; the rendered package lands in
/// `output_dir`.
pub async fn generate_sdk(
    source: &str,
    output_dir: &Path,
    sink: Arc<dyn DiagnosticsSink>,
) -> Result<ParsedSpec, GenerationError> {
    let raw_spec = load_spec(source).await?;
    let resolved = resolve_refs(&raw_spec)?;

    let parsed = parse_spec(&resolved, sink.clone())?;
    sink.info(format!(
        "loaded spec: {} v{}",
        parsed.metadata.project_name, parsed.metadata.version
    ));

    let artifacts = PythonRenderer::new()?.render(&parsed)?;
    sink.info(format!("writing output to {}", output_dir.display()));
    write_artifacts(output_dir, &artifacts).await?;

    Ok(parsed)
}
