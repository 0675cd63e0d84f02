//! Schema-to-type translation
//!
//! [`TypeTranslator`] turns OpenAPI schema subtrees into [`TypeExpr`] trees,
//! which render to Python type annotations. Rendering is the canonical form:
//! two expressions are equal (and hash equal) iff they render identically,
//! which is what deduplicates union members regardless of branch order.

use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::diagnostics::{DiagnosticsSink, SinkExt};
use super::lookup::SchemaLookup;
use super::sanitizers::{safe_bool, sanitize_string};

/// Nesting depth at which translation of anonymous self-referential schemas
/// gives up and degrades to `Any`. Named recursive models never get this deep
/// because the lookup short-circuits them.
const MAX_TRANSLATION_DEPTH: usize = 64;

/// Python primitive targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Str,
    Int,
    Float,
    Bool,
    Bytes,
}

impl Primitive {
    fn as_str(self) -> &'static str {
        match self {
            Primitive::Str => "str",
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::Bool => "bool",
            Primitive::Bytes => "bytes",
        }
    }
}

/// One node of a type expression.
#[derive(Debug, Clone)]
pub enum TypeNode {
    /// Unconstrained value; renders `Any`
    Any,
    /// Uninhabited type; renders `Never`
    Never,
    /// The null literal type; renders `None`
    Null,
    Primitive(Primitive),
    /// Reference to a named model
    Model(String),
    /// Literal-values union; members are pre-rendered literal tokens
    Literal(Vec<String>),
    List(Box<TypeExpr>),
    /// Homogeneous string-keyed container
    Dict(Box<TypeExpr>),
    Union(Vec<TypeExpr>),
}

/// A type expression: a node plus its nullability.
///
/// Nullability is carried out-of-band so union rendering can fold an explicit
/// null member and a `nullable` marker into a single trailing `| None`.
#[derive(Debug, Clone)]
pub struct TypeExpr {
    pub node: TypeNode,
    pub nullable: bool,
}

impl TypeExpr {
    pub fn new(node: TypeNode) -> Self {
        Self {
            node,
            nullable: false,
        }
    }

    pub fn any() -> Self {
        Self::new(TypeNode::Any)
    }

    pub fn never() -> Self {
        Self::new(TypeNode::Never)
    }

    /// Canonical Python annotation text.
    ///
    /// Union members are rendered, deduplicated and sorted, so structurally
    /// equal expressions render identically no matter how they were built. An
    /// explicit `None` member is folded into the nullability suffix, and
    /// `Any`/`Never` are never suffixed.
    pub fn render(&self) -> String {
        let (base, union_had_null) = match &self.node {
            TypeNode::Any => ("Any".to_string(), false),
            TypeNode::Never => ("Never".to_string(), false),
            TypeNode::Null => ("None".to_string(), false),
            TypeNode::Primitive(p) => (p.as_str().to_string(), false),
            TypeNode::Model(name) => (name.clone(), false),
            TypeNode::Literal(tokens) => (format!("Literal[{}]", tokens.join(", ")), false),
            TypeNode::List(item) => (format!("list[{}]", item.render()), false),
            TypeNode::Dict(value) => (format!("dict[str, {}]", value.render()), false),
            TypeNode::Union(members) => {
                let mut parts: BTreeSet<String> =
                    members.iter().map(TypeExpr::render).collect();
                let had_null = parts.remove("None");
                if parts.is_empty() {
                    ("None".to_string(), false)
                } else {
                    (
                        parts.into_iter().collect::<Vec<_>>().join(" | "),
                        had_null,
                    )
                }
            }
        };

        let suffix_null = (self.nullable || union_had_null)
            && base != "Any"
            && base != "Never"
            && base != "None";

        if suffix_null {
            format!("{base} | None")
        } else {
            base
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl PartialEq for TypeExpr {
    fn eq(&self, other: &Self) -> bool {
        self.render() == other.render()
    }
}

impl Eq for TypeExpr {}

impl Hash for TypeExpr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.render().hash(state);
    }
}

/// Translates OpenAPI schema subtrees into type expressions.
pub struct TypeTranslator<'a> {
    lookup: &'a SchemaLookup,
    sink: Arc<dyn DiagnosticsSink>,
}

impl<'a> TypeTranslator<'a> {
    pub fn new(lookup: &'a SchemaLookup, sink: Arc<dyn DiagnosticsSink>) -> Self {
        Self { lookup, sink }
    }

    /// Translates a schema and renders it in one step.
    pub fn render(&self, schema: &Value) -> String {
        self.translate(schema).render()
    }

    /// Core translation entry point.
    pub fn translate(&self, schema: &Value) -> TypeExpr {
        self.translate_at_depth(schema, 0)
    }

    fn translate_at_depth(&self, schema: &Value, depth: usize) -> TypeExpr {
        if depth > MAX_TRANSLATION_DEPTH {
            self.sink.warn(format!(
                "schema nesting exceeds {MAX_TRANSLATION_DEPTH} levels, defaulting to Any"
            ));
            return TypeExpr::any();
        }

        // Boolean schemas (JSON Schema draft 2020-12 / OpenAPI 3.1): `true`
        // and the empty schema accept anything, `false` accepts nothing.
        let obj = match schema {
            Value::Bool(true) | Value::Null => return TypeExpr::any(),
            Value::Bool(false) => return TypeExpr::never(),
            Value::Object(obj) if obj.is_empty() => return TypeExpr::any(),
            Value::Object(obj) => obj,
            other => {
                self.sink.warn(format!(
                    "schema is not an object ({other}), defaulting to Any"
                ));
                return TypeExpr::any();
            }
        };

        // A subtree that hashes to a registry entry is a reference-expanded
        // copy of a named model. Returning the reference also stops recursion
        // for named self-referential models.
        if let Some(model) = self.lookup.get(schema) {
            return TypeExpr::new(TypeNode::Model(model.to_string()));
        }

        let mut expr = if obj.contains_key("enum") {
            self.translate_enum(schema)
        } else if obj.contains_key("oneOf") || obj.contains_key("anyOf") {
            self.translate_poly(schema, depth)
        } else if let Some(all_of) = obj.get("allOf").and_then(Value::as_array) {
            if all_of.len() == 1 {
                // Single-member allOf is a common $ref wrapper pattern.
                self.translate_at_depth(&all_of[0], depth + 1)
            } else {
                self.sink.warn(format!(
                    "allOf with {} members is an intersection, which is not modeled; defaulting to Any",
                    all_of.len()
                ));
                TypeExpr::any()
            }
        } else if let Some(types) = obj.get("type").and_then(Value::as_array) {
            self.translate_multi_type(schema, types, depth)
        } else {
            self.translate_tagged(schema, depth)
        };

        expr.nullable = safe_bool(schema, "nullable", false);
        expr
    }

    fn translate_enum(&self, schema: &Value) -> TypeExpr {
        let tokens = schema
            .get("enum")
            .and_then(Value::as_array)
            .map(|values| values.iter().map(literal_token).collect())
            .unwrap_or_default();
        TypeExpr::new(TypeNode::Literal(tokens))
    }

    fn translate_poly(&self, schema: &Value, depth: usize) -> TypeExpr {
        if let Some(branches) = schema.get("oneOf").and_then(Value::as_array) {
            let mut members: Vec<TypeExpr> = Vec::new();
            for branch in branches {
                let translated = self.translate_at_depth(branch, depth + 1);
                if !members.contains(&translated) {
                    members.push(translated);
                }
            }
            return TypeExpr::new(TypeNode::Union(members));
        }

        // anyOf without oneOf: "at least one of" has no counterpart in the
        // generated type system yet.
        self.sink
            .warn("anyOf handling is not supported yet, defaulting to Any");
        TypeExpr::any()
    }

    /// OpenAPI 3.1 multi-type arrays, e.g. `type: ["string", "null"]`.
    ///
    /// Each named type is translated on its own with nullability suppressed,
    /// so a `null` list entry contributes exactly one `None` to the union.
    fn translate_multi_type(&self, schema: &Value, types: &[Value], depth: usize) -> TypeExpr {
        let mut members: Vec<TypeExpr> = Vec::new();
        for type_name in types {
            let mut sub_schema = schema.clone();
            if let Some(sub) = sub_schema.as_object_mut() {
                sub.insert("type".to_string(), type_name.clone());
                sub.insert("nullable".to_string(), Value::Bool(false));
            }
            let translated = self.translate_at_depth(&sub_schema, depth + 1);
            if !members.contains(&translated) {
                members.push(translated);
            }
        }
        TypeExpr::new(TypeNode::Union(members))
    }

    /// Closed dispatch over the single declared or inferred type tag.
    fn translate_tagged(&self, schema: &Value, depth: usize) -> TypeExpr {
        let declared = schema.get("type").and_then(Value::as_str);

        // Infer the tag from structure when it is not explicit.
        let tag = declared.or_else(|| {
            if schema.get("properties").is_some() || schema.get("additionalProperties").is_some() {
                Some("object")
            } else if schema.get("items").is_some() {
                Some("array")
            } else {
                None
            }
        });

        match tag {
            Some("object") => self.translate_object(schema, depth),
            Some("array") => self.translate_array(schema, depth),
            Some("string") => {
                let is_binary = schema.get("format").and_then(Value::as_str) == Some("binary");
                TypeExpr::new(TypeNode::Primitive(if is_binary {
                    Primitive::Bytes
                } else {
                    Primitive::Str
                }))
            }
            Some("integer") => TypeExpr::new(TypeNode::Primitive(Primitive::Int)),
            Some("boolean") => TypeExpr::new(TypeNode::Primitive(Primitive::Bool)),
            Some("number") => TypeExpr::new(TypeNode::Primitive(Primitive::Float)),
            Some("null") => TypeExpr::new(TypeNode::Null),
            Some(unknown) => {
                self.sink.warn(format!(
                    "unknown schema type {unknown:?}, defaulting to Any \
                     (supported: object, array, string, integer, boolean, number, null)"
                ));
                TypeExpr::any()
            }
            None => {
                self.sink
                    .warn("schema has no usable type tag, defaulting to Any");
                TypeExpr::any()
            }
        }
    }

    /// Object schemas not resolved through the lookup.
    ///
    /// `additionalProperties` with a schema becomes a typed dict; anything
    /// else loses its shape and becomes `dict[str, Any]`.
    fn translate_object(&self, schema: &Value, depth: usize) -> TypeExpr {
        let value_type = match schema.get("additionalProperties") {
            Some(ap @ Value::Object(obj)) if !obj.is_empty() => {
                self.translate_at_depth(ap, depth + 1)
            }
            _ => {
                self.sink
                    .warn("inline object schema detected, defaulting to dict[str, Any]");
                TypeExpr::any()
            }
        };
        TypeExpr::new(TypeNode::Dict(Box::new(value_type)))
    }

    fn translate_array(&self, schema: &Value, depth: usize) -> TypeExpr {
        match schema.get("items") {
            Some(items) => TypeExpr::new(TypeNode::List(Box::new(
                self.translate_at_depth(items, depth + 1),
            ))),
            None => {
                self.sink
                    .debug("array schema missing items key, defaulting to list[Any]");
                TypeExpr::new(TypeNode::List(Box::new(TypeExpr::any())))
            }
        }
    }
}

/// Renders an enum value as a Python literal token.
///
/// Strings are escaped through string-literal sanitization; everything else
/// uses its Python literal spelling.
fn literal_token(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", sanitize_string(s)),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Null => "None".to_string(),
        Value::Number(n) => n.to_string(),
        // Composite enum members are rare; their JSON text is at least stable.
        other => other.to_string(),
    }
}
