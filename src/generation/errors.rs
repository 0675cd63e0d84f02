//! Error types for the generation domain

use thiserror::Error;

/// Errors that abort generation.
///
/// Anything recoverable (unsupported locations, odd content types, bad status
/// keys) is handled by dropping the offending element and emitting a
/// diagnostic instead of erroring; see the individual parsers.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("cannot derive a valid identifier from {0:?}")]
    EmptyIdentifier(String),

    #[error("failed to load OpenAPI spec: {0}")]
    LoadError(String),

    #[error("failed to resolve reference: {0}")]
    ResolveError(String),

    #[error("render error: {0}")]
    RenderError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
