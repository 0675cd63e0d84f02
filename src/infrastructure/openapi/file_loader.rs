//! File-based OpenAPI spec loader

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;

use super::{OpenApiLoader, deserialize_spec};
use crate::generation::GenerationError;

/// Loads OpenAPI specifications from local files.
#[derive(Debug, Default)]
pub struct FileOpenApiLoader;

impl FileOpenApiLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OpenApiLoader for FileOpenApiLoader {
    async fn load(&self, source: &str) -> Result<Value, GenerationError> {
        let content = fs::read_to_string(source)
            .await
            .map_err(|e| GenerationError::LoadError(format!("cannot read {source}: {e}")))?;

        deserialize_spec(source, &content)
    }
}
