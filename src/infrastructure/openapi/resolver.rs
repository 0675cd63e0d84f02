//! `$ref` expansion
//!
//! Replaces every internal JSON pointer reference with an inline copy of the
//! referenced content, producing the resolved tree the core pipeline expects.
//! Each pointer is expanded exactly once and the result memoized, so every
//! occurrence of the same reference expands to identical content -- which is
//! what lets the content-addressed lookup deduplicate the copies again.
//!
//! Cyclic references terminate instead of diverging: a pointer re-entered
//! during its own expansion is left as a literal `$ref` node. Named schemas
//! are expanded through the same machinery before the rest of the document
//! and written back into `components/schemas`, so the registry entry and
//! every expanded occurrence agree byte-for-byte, cycles included.

use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

use crate::generation::GenerationError;

/// Expands all internal `$ref` pointers in a spec document.
///
/// External references (anything not starting with `#`) and dangling
/// pointers are load-time errors.
pub fn resolve_refs(spec: &Value) -> Result<Value, GenerationError> {
    let mut resolver = RefResolver {
        root: spec,
        cache: HashMap::new(),
        in_progress: HashSet::new(),
    };

    let mut registry = Map::new();
    if let Some(schemas) = spec
        .pointer("/components/schemas")
        .and_then(Value::as_object)
    {
        for name in schemas.keys() {
            let reference = format!("#/components/schemas/{}", escape_pointer_token(name));
            registry.insert(name.clone(), resolver.expand_pointer(&reference)?);
        }
    }

    let mut resolved = resolver.resolve(spec)?;
    if !registry.is_empty() {
        if let Some(schemas) = resolved.pointer_mut("/components/schemas") {
            *schemas = Value::Object(registry);
        }
    }
    Ok(resolved)
}

/// Escapes a key for use as a JSON pointer token (RFC 6901).
fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

struct RefResolver<'a> {
    root: &'a Value,
    cache: HashMap<String, Value>,
    in_progress: HashSet<String>,
}

impl RefResolver<'_> {
    fn resolve(&mut self, value: &Value) -> Result<Value, GenerationError> {
        match value {
            Value::Object(obj) => {
                if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
                    return self.expand_pointer(reference);
                }

                let mut resolved = Map::new();
                for (key, val) in obj {
                    resolved.insert(key.clone(), self.resolve(val)?);
                }
                Ok(Value::Object(resolved))
            }
            Value::Array(items) => {
                let resolved: Result<Vec<_>, _> =
                    items.iter().map(|item| self.resolve(item)).collect();
                Ok(Value::Array(resolved?))
            }
            scalar => Ok(scalar.clone()),
        }
    }

    fn expand_pointer(&mut self, reference: &str) -> Result<Value, GenerationError> {
        let Some(pointer) = reference.strip_prefix('#') else {
            return Err(GenerationError::ResolveError(format!(
                "external references are not supported: {reference}"
            )));
        };

        if let Some(cached) = self.cache.get(reference) {
            return Ok(cached.clone());
        }

        // Cycle: keep the reference node verbatim. Deterministic, and the
        // memo makes every other occurrence agree.
        if self.in_progress.contains(reference) {
            let mut obj = Map::new();
            obj.insert("$ref".to_string(), Value::String(reference.to_string()));
            return Ok(Value::Object(obj));
        }

        let target = self.root.pointer(pointer).cloned().ok_or_else(|| {
            GenerationError::ResolveError(format!("unable to resolve reference: {reference}"))
        })?;

        self.in_progress.insert(reference.to_string());
        let expanded = self.resolve(&target)?;
        self.in_progress.remove(reference);

        self.cache.insert(reference.to_string(), expanded.clone());
        Ok(expanded)
    }
}
