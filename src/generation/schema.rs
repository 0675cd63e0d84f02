//! Schema (model) parser
//!
//! Walks the registry of named schemas and produces one [`ParsedModel`] per
//! entry, flattening `allOf` inheritance chains into a single property map
//! first.

use indexmap::IndexSet;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

use super::diagnostics::{DiagnosticsSink, SinkExt};
use super::errors::GenerationError;
use super::lookup::SchemaLookup;
use super::models::{ParsedModel, ParsedProperty};
use super::sanitizers::{safe_bool, sanitize_docstring, sanitize_identifier};
use super::types::TypeTranslator;
use super::utils::python_repr;

/// Recursively merges `allOf` chains into a single flat schema.
///
/// Each branch is flattened before merging; a later branch's properties and
/// required names override identically-named ones from earlier branches, and
/// the schema's own properties override everything, which models "own fields
/// override inherited fields" without a type hierarchy. Property declaration
/// order is preserved: an override replaces the value in place.
///
/// A schema without `allOf` is returned unchanged, so flattening is
/// idempotent.
pub fn flatten_schema(schema: &Value) -> Value {
    let branches = match schema.get("allOf").and_then(Value::as_array) {
        Some(branches) if !branches.is_empty() => branches,
        _ => return schema.clone(),
    };

    let mut flat_properties: Map<String, Value> = Map::new();
    let mut flat_required: IndexSet<String> = IndexSet::new();

    let mut merge = |properties: Option<&Value>, required: Option<&Value>| {
        if let Some(props) = properties.and_then(Value::as_object) {
            for (name, prop) in props {
                flat_properties.insert(name.clone(), prop.clone());
            }
        }
        if let Some(names) = required.and_then(Value::as_array) {
            for name in names.iter().filter_map(Value::as_str) {
                flat_required.insert(name.to_string());
            }
        }
    };

    for branch in branches {
        let flattened_branch = flatten_schema(branch);
        merge(
            flattened_branch.get("properties"),
            flattened_branch.get("required"),
        );
    }

    // Own properties override inherited ones.
    merge(schema.get("properties"), schema.get("required"));

    let mut flattened = schema
        .as_object()
        .cloned()
        .unwrap_or_default();
    flattened.insert("properties".to_string(), Value::Object(flat_properties));
    flattened.insert(
        "required".to_string(),
        Value::Array(flat_required.into_iter().map(Value::String).collect()),
    );
    // Drop allOf to prevent downstream double-processing.
    flattened.remove("allOf");
    Value::Object(flattened)
}

/// Parses the spec's named schemas into a structured list of models.
pub struct SchemaParser<'a> {
    spec: &'a Value,
    translator: TypeTranslator<'a>,
    sink: Arc<dyn DiagnosticsSink>,
}

impl<'a> SchemaParser<'a> {
    pub fn new(
        spec: &'a Value,
        lookup: &'a SchemaLookup,
        sink: Arc<dyn DiagnosticsSink>,
    ) -> Self {
        Self {
            spec,
            translator: TypeTranslator::new(lookup, sink.clone()),
            sink,
        }
    }

    /// Parses every schema under `components/schemas`, in declaration order.
    pub fn parse(&self) -> Result<Vec<ParsedModel>, GenerationError> {
        let schemas = self
            .spec
            .get("components")
            .and_then(|c| c.get("schemas"))
            .and_then(Value::as_object);

        let mut models = Vec::new();
        for (name, schema) in schemas.into_iter().flatten() {
            self.sink.debug(format!("parsing schema {name}"));

            let flat = flatten_schema(schema);
            let required: HashSet<&str> = flat
                .get("required")
                .and_then(Value::as_array)
                .map(|names| names.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();

            let mut properties = Vec::new();
            if let Some(props) = flat.get("properties").and_then(Value::as_object) {
                for (prop_name, prop_schema) in props {
                    properties.push(self.parse_property(
                        prop_name,
                        prop_schema,
                        required.contains(prop_name.as_str()),
                    )?);
                }
            }

            let sanitized = sanitize_identifier(name)?;
            models.push(ParsedModel {
                ref_name: (sanitized != *name).then(|| name.clone()),
                name: sanitized,
                properties,
                doc: sanitize_docstring(
                    schema.get("description").and_then(Value::as_str).unwrap_or(""),
                ),
            });
        }

        Ok(models)
    }

    fn parse_property(
        &self,
        name: &str,
        schema: &Value,
        required: bool,
    ) -> Result<ParsedProperty, GenerationError> {
        let mut ty = self.translator.render(schema);
        if !required {
            // Absent-vs-null: a property missing from the payload is not the
            // same as a property explicitly set to null.
            ty = format!("NotRequired[{ty}]");
        }

        Ok(ParsedProperty {
            name: sanitize_identifier(name)?,
            ty,
            required,
            doc: sanitize_docstring(
                schema.get("description").and_then(Value::as_str).unwrap_or(""),
            ),
            read_only: safe_bool(schema, "readOnly", false),
            write_only: safe_bool(schema, "writeOnly", false),
            default: schema.get("default").map(python_repr),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::diagnostics::CollectingSink;
    use serde_json::json;

    fn parse_models(spec: &Value) -> Vec<ParsedModel> {
        let lookup = SchemaLookup::build(spec).unwrap();
        let sink = Arc::new(CollectingSink::new());
        SchemaParser::new(spec, &lookup, sink).parse().unwrap()
    }

    #[test]
    fn test_flatten_is_identity_for_flat_schema() {
        let schema = json!({
            "type": "object",
            "properties": {"name": {"type": "string"}},
            "required": ["name"]
        });
        assert_eq!(flatten_schema(&schema), schema);
    }

    #[test]
    fn test_flatten_three_level_chain() {
        let level1 = json!({
            "properties": {"field": {"type": "string"}, "base_only": {"type": "integer"}},
            "required": ["base_only"]
        });
        let level2 = json!({
            "allOf": [level1],
            "properties": {"field": {"type": "integer"}},
            "required": ["field"]
        });
        let level3 = json!({
            "allOf": [level2],
            "properties": {"field": {"type": "boolean"}, "own": {"type": "string"}},
            "required": ["own"]
        });

        let flat = flatten_schema(&level3);

        // Most specific definition wins.
        assert_eq!(
            flat["properties"]["field"],
            json!({"type": "boolean"})
        );
        // Required set is the union of all levels.
        let required: Vec<&str> = flat["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(required, vec!["base_only", "field", "own"]);
        assert!(flat.get("allOf").is_none());
    }

    #[test]
    fn test_flatten_preserves_declaration_order() {
        let schema = json!({
            "allOf": [
                {"properties": {"a": {"type": "string"}, "b": {"type": "string"}}},
                {"properties": {"b": {"type": "integer"}, "c": {"type": "string"}}}
            ]
        });
        let flat = flatten_schema(&schema);
        let keys: Vec<&String> = flat["properties"].as_object().unwrap().keys().collect();
        assert_eq!(keys, ["a", "b", "c"]);
        // Override replaced the value in place.
        assert_eq!(flat["properties"]["b"], json!({"type": "integer"}));
    }

    #[test]
    fn test_parse_wraps_optional_properties() {
        let spec = json!({
            "components": {
                "schemas": {
                    "Pet": {
                        "type": "object",
                        "description": "A pet.",
                        "properties": {
                            "name": {"type": "string"},
                            "tag": {"type": "string"}
                        },
                        "required": ["name"]
                    }
                }
            }
        });
        let models = parse_models(&spec);
        assert_eq!(models.len(), 1);

        let pet = &models[0];
        assert_eq!(pet.name, "Pet");
        assert_eq!(pet.doc, "A pet.");
        assert_eq!(pet.ref_name, None);

        assert_eq!(pet.properties[0].name, "name");
        assert_eq!(pet.properties[0].ty, "str");
        assert!(pet.properties[0].required);

        assert_eq!(pet.properties[1].name, "tag");
        assert_eq!(pet.properties[1].ty, "NotRequired[str]");
        assert!(!pet.properties[1].required);
    }

    #[test]
    fn test_parse_carries_defaults_and_flags() {
        let spec = json!({
            "components": {
                "schemas": {
                    "Order": {
                        "type": "object",
                        "properties": {
                            "status": {"type": "string", "default": "placed"},
                            "id": {"type": "integer", "readOnly": true},
                            "secret": {"type": "string", "writeOnly": true}
                        }
                    }
                }
            }
        });
        let models = parse_models(&spec);
        let order = &models[0];

        assert_eq!(order.properties[0].default.as_deref(), Some("'placed'"));
        assert!(order.properties[1].read_only);
        assert!(order.properties[2].write_only);
        assert_eq!(order.properties[1].name, "id");
    }

    #[test]
    fn test_parse_sanitizes_names_and_keeps_original() {
        let spec = json!({
            "components": {
                "schemas": {
                    "pet-response": {
                        "type": "object",
                        "properties": {"class": {"type": "string"}}
                    }
                }
            }
        });
        let models = parse_models(&spec);
        assert_eq!(models[0].name, "pet_response");
        assert_eq!(models[0].ref_name.as_deref(), Some("pet-response"));
        assert_eq!(models[0].properties[0].name, "class_");
    }

    #[test]
    fn test_parse_flattens_inheritance() {
        let spec = json!({
            "components": {
                "schemas": {
                    "Base": {
                        "type": "object",
                        "properties": {"id": {"type": "integer"}},
                        "required": ["id"]
                    },
                    "Derived": {
                        "allOf": [
                            {"type": "object", "properties": {"id": {"type": "integer"}}, "required": ["id"]},
                            {"type": "object", "properties": {"label": {"type": "string"}}}
                        ]
                    }
                }
            }
        });
        let models = parse_models(&spec);
        let derived = models.iter().find(|m| m.name == "Derived").unwrap();
        assert_eq!(derived.properties.len(), 2);
        assert_eq!(derived.properties[0].name, "id");
        assert!(derived.properties[0].required);
        assert_eq!(derived.properties[1].ty, "NotRequired[str]");
    }
}
