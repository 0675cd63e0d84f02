//! HTTP-based OpenAPI spec loader

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::{OpenApiLoader, deserialize_spec};
use crate::generation::GenerationError;

/// Loads OpenAPI specifications from HTTP(S) URLs.
pub struct HttpOpenApiLoader {
    client: Client,
}

impl HttpOpenApiLoader {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }
}

impl Default for HttpOpenApiLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OpenApiLoader for HttpOpenApiLoader {
    async fn load(&self, source: &str) -> Result<Value, GenerationError> {
        if !source.starts_with("http://") && !source.starts_with("https://") {
            return Err(GenerationError::LoadError(format!(
                "HttpOpenApiLoader only handles HTTP(S) URLs, got: {source}"
            )));
        }

        let response = self.client.get(source).send().await.map_err(|e| {
            GenerationError::LoadError(format!("failed to fetch OpenAPI spec from {source}: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::LoadError(format!(
                "HTTP {status} when fetching {source}"
            )));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let content = response.text().await.map_err(|e| {
            GenerationError::LoadError(format!("failed to read response body: {e}"))
        })?;

        // The content type is a stronger hint than the URL's extension.
        if content_type.contains("json") {
            serde_json::from_str(&content).map_err(GenerationError::SerializationError)
        } else if content_type.contains("yaml") {
            serde_yaml::from_str(&content)
                .map_err(|e| GenerationError::LoadError(format!("failed to parse YAML: {e}")))
        } else {
            deserialize_spec(source, &content)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_http_loader_json() {
        let mock_server = MockServer::start().await;

        let spec_json = r#"{
            "openapi": "3.0.0",
            "info": {"title": "Remote API", "version": "1.0.0"},
            "paths": {}
        }"#;
        Mock::given(method("GET"))
            .and(path("/openapi.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(spec_json)
                    .insert_header("content-type", "application/json"),
            )
            .mount(&mock_server)
            .await;

        let spec = HttpOpenApiLoader::new()
            .load(&format!("{}/openapi.json", mock_server.uri()))
            .await
            .unwrap();
        assert_eq!(spec["info"]["title"], "Remote API");
    }

    #[tokio::test]
    async fn test_http_loader_yaml() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/openapi.yaml"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("openapi: 3.0.0\ninfo:\n  title: Yaml API\n  version: 1.0.0\npaths: {}\n")
                    .insert_header("content-type", "application/yaml"),
            )
            .mount(&mock_server)
            .await;

        let spec = HttpOpenApiLoader::new()
            .load(&format!("{}/openapi.yaml", mock_server.uri()))
            .await
            .unwrap();
        assert_eq!(spec["info"]["title"], "Yaml API");
    }

    #[tokio::test]
    async fn test_http_loader_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let result = HttpOpenApiLoader::new()
            .load(&format!("{}/missing.json", mock_server.uri()))
            .await;
        assert!(matches!(result, Err(GenerationError::LoadError(_))));
    }

    #[tokio::test]
    async fn test_http_loader_rejects_non_http_source() {
        let result = HttpOpenApiLoader::new().load("./local.yaml").await;
        assert!(matches!(result, Err(GenerationError::LoadError(_))));
    }
}
