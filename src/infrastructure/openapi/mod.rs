//! OpenAPI spec acquisition and reference expansion
//!
//! Loaders produce the raw spec tree from a file or URL; the resolver then
//! expands `$ref` pointers so the core pipeline sees a self-contained
//! document.

pub mod file_loader;
pub mod http_loader;
pub mod resolver;

pub use file_loader::FileOpenApiLoader;
pub use http_loader::HttpOpenApiLoader;
pub use resolver::resolve_refs;

use async_trait::async_trait;
use serde_json::Value;

use crate::generation::GenerationError;

/// Loads a raw, unresolved OpenAPI document from some source.
#[async_trait]
pub trait OpenApiLoader {
    async fn load(&self, source: &str) -> Result<Value, GenerationError>;
}

/// Loads a spec from a path or URL, picking the loader by source shape.
pub async fn load_spec(source: &str) -> Result<Value, GenerationError> {
    if source.starts_with("http://") || source.starts_with("https://") {
        HttpOpenApiLoader::new().load(source).await
    } else {
        FileOpenApiLoader::new().load(source).await
    }
}

/// Parses spec text as JSON or YAML, guided by the source name.
///
/// Sources without a telling extension are tried as JSON first, then YAML.
pub(crate) fn deserialize_spec(source: &str, content: &str) -> Result<Value, GenerationError> {
    if source.ends_with(".json") {
        serde_json::from_str(content).map_err(GenerationError::SerializationError)
    } else if source.ends_with(".yaml") || source.ends_with(".yml") {
        serde_yaml::from_str(content)
            .map_err(|e| GenerationError::LoadError(format!("failed to parse YAML: {e}")))
    } else {
        serde_json::from_str(content)
            .or_else(|_| serde_yaml::from_str(content))
            .map_err(|e| GenerationError::LoadError(format!("failed to parse OpenAPI spec: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_json_by_extension() {
        let value = deserialize_spec("spec.json", r#"{"openapi": "3.0.0"}"#).unwrap();
        assert_eq!(value["openapi"], "3.0.0");
    }

    #[test]
    fn test_deserialize_yaml_by_extension() {
        let value = deserialize_spec("spec.yaml", "openapi: 3.0.0\ninfo:\n  title: T\n").unwrap();
        assert_eq!(value["info"]["title"], "T");
    }

    #[test]
    fn test_deserialize_sniffs_without_extension() {
        assert!(deserialize_spec("spec", r#"{"openapi": "3.0.0"}"#).is_ok());
        assert!(deserialize_spec("spec", "openapi: 3.0.0\n").is_ok());
        assert!(deserialize_spec("spec", ":{not valid").is_err());
    }
}
