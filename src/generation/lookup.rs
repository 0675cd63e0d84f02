//! Content-addressed lookup from schema subtrees to model names
//!
//! Reference expansion copies every referenced schema inline, so the same
//! named model shows up as structurally identical subtrees all over the spec.
//! This table hashes each entry of `components/schemas` once and matches any
//! later copy back to the model name it came from.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

use super::errors::GenerationError;
use super::sanitizers::sanitize_identifier;

/// Serializes a value deterministically: object keys are emitted in sorted
/// order at every level, so two copies of a schema hash identically no matter
/// how their keys were ordered by the producing parser.
fn canonicalize(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                canonicalize(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                canonicalize(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Stable content hash of a schema subtree.
///
/// SHA-256 over the canonical serialization. A collision would silently alias
/// two models; at the scale of an OpenAPI document this is not guarded
/// against.
fn schema_hash(schema: &Value) -> String {
    let mut serialized = String::new();
    canonicalize(schema, &mut serialized);
    format!("{:x}", Sha256::digest(serialized.as_bytes()))
}

/// Lookup table resolving schema subtrees to their model names.
#[derive(Debug, Default)]
pub struct SchemaLookup {
    entries: HashMap<String, String>,
}

impl SchemaLookup {
    /// Builds the table from the registry of named schemas.
    ///
    /// Must run against the resolved spec before any parsing, so that every
    /// expansion-induced copy matches its registry entry.
    pub fn build(spec: &Value) -> Result<Self, GenerationError> {
        let schemas = spec
            .get("components")
            .and_then(|c| c.get("schemas"))
            .and_then(Value::as_object);

        let mut entries = HashMap::new();
        if let Some(schemas) = schemas {
            for (name, schema) in schemas {
                entries.insert(schema_hash(schema), sanitize_identifier(name)?);
            }
        }

        Ok(Self { entries })
    }

    /// Returns the sanitized model name a schema subtree was registered
    /// under, or `None` for inline types.
    pub fn get(&self, schema: &Value) -> Option<&str> {
        self.entries.get(&schema_hash(schema)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
