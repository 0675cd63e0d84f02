//! Generation domain - translates a resolved OpenAPI spec into parsed
//! models and operations
//!
//! The pipeline is synchronous and read-only with respect to the spec. The
//! only shared state is the [`SchemaLookup`] table, built once up front and
//! consulted by both parsers.

pub mod diagnostics;
pub mod errors;
pub mod lookup;
pub mod metadata;
pub mod models;
pub mod operation;
pub mod sanitizers;
pub mod schema;
pub mod types;
pub mod utils;

pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticsSink, Severity, SinkExt, TracingSink};
pub use errors::GenerationError;
pub use lookup::SchemaLookup;
pub use metadata::{ProjectMetadata, extract_metadata};
pub use models::{
    ArgDefault, ArgLocation, ParsedArg, ParsedModel, ParsedOperation, ParsedProperty,
    ParsedResponses, StatusCode,
};
pub use operation::{HttpMethod, OperationParser};
pub use schema::{SchemaParser, flatten_schema};
pub use types::{TypeExpr, TypeNode, TypeTranslator};

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Lowest OpenAPI version the translation rules are written against.
pub const MIN_OPENAPI_VERSION: &str = "3.0.0";

/// Everything the renderer needs: metadata plus the parsed spec contents.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedSpec {
    pub metadata: ProjectMetadata,
    pub models: Vec<ParsedModel>,
    pub operations: Vec<ParsedOperation>,
}

/// Runs the full translation pipeline over a resolved spec.
///
/// The spec must already have its `$ref` pointers expanded (see
/// `infrastructure::openapi::resolve_refs`); the parsers recognize expanded
/// copies of named models by content, not by pointer.
pub fn parse_spec(
    spec: &Value,
    sink: Arc<dyn DiagnosticsSink>,
) -> Result<ParsedSpec, GenerationError> {
    let openapi_version = spec.get("openapi").and_then(Value::as_str).unwrap_or("0.0.0");
    if openapi_version < MIN_OPENAPI_VERSION {
        sink.warn(format!(
            "OpenAPI version {openapi_version} is below minimum {MIN_OPENAPI_VERSION}, \
             generated code may not work"
        ));
    }

    let metadata = extract_metadata(spec);

    let lookup = SchemaLookup::build(spec)?;
    sink.debug(format!("built schema lookup with {} entries", lookup.len()));

    let models = SchemaParser::new(spec, &lookup, sink.clone()).parse()?;
    let operations = OperationParser::new(spec, &lookup, sink.clone()).parse()?;

    sink.info(format!(
        "parsed {} models, {} operations",
        models.len(),
        operations.len()
    ));

    Ok(ParsedSpec {
        metadata,
        models,
        operations,
    })
}
