//! Operation parser
//!
//! Walks every path/verb pair in the spec and produces one
//! [`ParsedOperation`] with a merged, ordered argument list and aggregated
//! response types.

use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use super::diagnostics::{DiagnosticsSink, SinkExt};
use super::errors::GenerationError;
use super::lookup::SchemaLookup;
use super::models::{
    ArgDefault, ArgLocation, ParsedArg, ParsedOperation, ParsedResponses, StatusCode,
};
use super::sanitizers::{
    safe_bool, safe_status, sanitize_docstring, sanitize_identifier, sanitize_string,
};
use super::types::TypeTranslator;
use super::utils::{normalize_path, python_repr, to_snake_case};

/// HTTP methods recognized on a path item. Everything else under a path key
/// (shared `parameters`, `description`, vendor extensions) is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    /// Matches a lowercase path-item key against the supported verbs.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "delete" => Some(HttpMethod::Delete),
            "patch" => Some(HttpMethod::Patch),
            "head" => Some(HttpMethod::Head),
            "options" => Some(HttpMethod::Options),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request body content types, in lookup priority order, with the argument
/// name each one binds to in generated signatures.
const BODY_MIME_TYPES: &[(&str, &str)] = &[
    ("application/json", "json"),
    ("application/x-www-form-urlencoded", "data"),
    ("multipart/form-data", "files"),
    ("application/octet-stream", "content"),
];

/// Content shape of a single response entry.
enum ResponseContent<'a> {
    Json(&'a Value),
    Bytes,
    Empty,
}

/// Parses all operations from the resolved spec.
pub struct OperationParser<'a> {
    spec: &'a Value,
    translator: TypeTranslator<'a>,
    sink: Arc<dyn DiagnosticsSink>,
}

impl<'a> OperationParser<'a> {
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

    /// Parses every path/verb pair, preserving spec declaration order.
    pub fn parse(&self) -> Result<Vec<ParsedOperation>, GenerationError> {
        let paths = self.spec.get("paths").and_then(Value::as_object);

        let mut operations = Vec::new();
        for (path, path_item) in paths.into_iter().flatten() {
            self.sink.debug(format!("parsing path {path}"));

            // Paths can carry parameters shared by all their operations.
            let path_params: Vec<&Value> = path_item
                .get("parameters")
                .and_then(Value::as_array)
                .map(|arr| arr.iter().collect())
                .unwrap_or_default();

            let Some(entries) = path_item.as_object() else {
                continue;
            };
            for (key, op_data) in entries {
                let Some(method) = HttpMethod::from_key(key) else {
                    self.sink
                        .debug(format!("skipping non-operation key {key} in path {path}"));
                    continue;
                };

                let mut raw_params = path_params.clone();
                if let Some(op_params) = op_data.get("parameters").and_then(Value::as_array) {
                    raw_params.extend(op_params.iter());
                }

                let params = self.parse_parameters(&raw_params)?;
                let body = self.parse_request_body(op_data)?;

                operations.push(ParsedOperation {
                    method: method.as_str().to_string(),
                    path: normalize_path(&sanitize_string(path)),
                    args: self.build_args(params, body),
                    responses: self.parse_responses(op_data.get("responses")),
                    doc: sanitize_docstring(&synthesize_doc(op_data, path_item)),
                });
            }
        }

        Ok(operations)
    }

    /// Parses path, query, header and cookie parameters of an operation.
    fn parse_parameters(&self, params: &[&Value]) -> Result<Vec<ParsedArg>, GenerationError> {
        let empty_schema = Value::Object(serde_json::Map::new());
        let mut parsed = Vec::new();

        for param in params {
            let Some(name) = param.get("name").and_then(Value::as_str) else {
                self.sink.warn("skipping parameter without a name");
                continue;
            };

            let location = match param.get("in").and_then(Value::as_str) {
                Some("path") => ArgLocation::Path,
                Some("query") => ArgLocation::Query,
                Some("header") => ArgLocation::Header,
                Some("cookie") => ArgLocation::Cookie,
                other => {
                    self.sink.warn(format!(
                        "skipping parameter {name} with unsupported location {}, \
                         only path, query, header, cookie are supported",
                        other.unwrap_or("<missing>")
                    ));
                    continue;
                }
            };

            let schema = param.get("schema").unwrap_or(&empty_schema);
            let required = safe_bool(param, "required", false);

            let default = if let Some(value) = schema.get("default") {
                ArgDefault::Literal(python_repr(value))
            } else if required {
                // The runtime raises when the caller leaves this out.
                ArgDefault::Required
            } else {
                // Omitted from the request entirely when not supplied.
                ArgDefault::Unset
            };

            // snake_casing alone can land on a reserved word ("Class" ->
            // "class"), so the result goes through identifier sanitization a
            // second time.
            let py_name = sanitize_identifier(&to_snake_case(&sanitize_identifier(name)?))?;

            parsed.push(ParsedArg {
                name: py_name,
                api_name: Some(name.to_string()),
                ty: self.translator.render(schema),
                location,
                required,
                default,
                doc: sanitize_docstring(
                    param.get("description").and_then(Value::as_str).unwrap_or(""),
                ),
            });
        }

        Ok(parsed)
    }

    /// Parses the request body of an operation, if it declares one.
    fn parse_request_body(&self, op: &Value) -> Result<Option<ParsedArg>, GenerationError> {
        let req_body = match op.get("requestBody") {
            Some(body) if body.as_object().is_some_and(|o| !o.is_empty()) => body,
            _ => return Ok(None),
        };

        let content = req_body.get("content");
        let required = safe_bool(req_body, "required", false);
        let default = if required {
            ArgDefault::Required
        } else {
            ArgDefault::Unset
        };
        let doc = sanitize_docstring(
            req_body
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or("Request body."),
        );

        // Only one content type per operation is supported; take the first
        // match in priority order.
        for (mime, arg_name) in BODY_MIME_TYPES {
            if let Some(media) = content.and_then(|c| c.get(mime)) {
                let empty_schema = Value::Object(serde_json::Map::new());
                let schema = media.get("schema").unwrap_or(&empty_schema);
                return Ok(Some(ParsedArg {
                    name: (*arg_name).to_string(),
                    api_name: None,
                    ty: self.translator.render(schema),
                    location: ArgLocation::Body,
                    required,
                    default,
                    doc,
                }));
            }
        }

        self.sink.warn(format!(
            "request body has unsupported content type, only supported types are: {}",
            BODY_MIME_TYPES
                .iter()
                .map(|(mime, _)| *mime)
                .collect::<Vec<_>>()
                .join(", ")
        ));
        Ok(Some(ParsedArg {
            name: "data".to_string(),
            api_name: None,
            ty: "Any".to_string(),
            location: ArgLocation::Body,
            required,
            default,
            doc,
        }))
    }

    /// Merges parameters and body into one ordered argument list.
    fn build_args(&self, params: Vec<ParsedArg>, body: Option<ParsedArg>) -> Vec<ParsedArg> {
        let mut args = params;

        if let Some(mut body) = body {
            // A query param literally named "json" (or "data", ...) would
            // collide with the body argument.
            if args.iter().any(|a| a.name == body.name) {
                let renamed = format!("{}_body", body.name);
                self.sink.info(format!(
                    "renamed colliding body arg {} to {}",
                    body.name, renamed
                ));
                body.name = renamed;
            }
            args.push(body);
        }

        // Location-marker wrappers let the runtime route each argument
        // without inspecting names.
        for arg in &mut args {
            let wrapper = match arg.location {
                ArgLocation::Query => Some("Query"),
                ArgLocation::Header => Some("Header"),
                ArgLocation::Cookie => Some("Cookie"),
                ArgLocation::Path | ArgLocation::Body => None,
            };
            if let Some(wrapper) = wrapper {
                arg.ty = format!("{wrapper}[{}]", arg.ty);
            }
        }

        // Stable sort keeps declaration order within each category.
        args.sort_by_key(|arg| arg.location.rank());
        args
    }

    /// Aggregates response declarations into success and error type unions.
    fn parse_responses(&self, responses: Option<&Value>) -> ParsedResponses {
        let mut parsed: Vec<(StatusCode, ResponseContent)> = Vec::new();

        let entries = responses.and_then(Value::as_object);
        for (code, resp) in entries.into_iter().flatten() {
            // "default" is ambiguous (could be success or error), so it never
            // contributes to either union.
            if code == "default" {
                self.sink
                    .debug("skipping 'default' response, use a valid status code to include");
                continue;
            }
            let Some(status) = safe_status(code) else {
                self.sink
                    .warn(format!("skipping response with invalid status code {code}"));
                continue;
            };

            let content = resp.get("content");
            let media = |mime: &str| content.and_then(|c| c.get(mime));

            if let Some(schema) = media("application/json").and_then(|m| m.get("schema")) {
                parsed.push((status, ResponseContent::Json(schema)));
            } else if media("application/octet-stream").is_some() {
                parsed.push((status, ResponseContent::Bytes));
            } else if content.and_then(Value::as_object).is_none_or(|c| c.is_empty()) {
                // No content body (204, empty error responses).
                parsed.push((status, ResponseContent::Empty));
            } else {
                self.sink.warn(format!(
                    "response {code} has no supported content type \
                     (supported: application/json, application/octet-stream)"
                ));
            }
        }

        ParsedResponses {
            success_type: self.success_type(&parsed),
            error_type: self.error_type(&parsed),
        }
    }

    /// All 2xx response types, unioned.
    fn success_type(&self, parsed: &[(StatusCode, ResponseContent)]) -> String {
        let mut types = BTreeSet::new();
        for (status, content) in parsed {
            if status.is_success() {
                match content {
                    ResponseContent::Empty => {
                        types.insert("None".to_string());
                    }
                    ResponseContent::Bytes => {
                        types.insert("bytes".to_string());
                    }
                    ResponseContent::Json(schema) => {
                        types.insert(self.translator.render(schema));
                    }
                }
            }
        }
        join_union(types)
    }

    /// All 4xx/5xx response types, unioned.
    fn error_type(&self, parsed: &[(StatusCode, ResponseContent)]) -> String {
        let mut types = BTreeSet::new();
        for (status, content) in parsed {
            if status.is_client_error() || status.is_server_error() {
                match content {
                    ResponseContent::Empty => {
                        types.insert("None".to_string());
                    }
                    ResponseContent::Json(schema) => {
                        types.insert(self.translator.render(schema));
                    }
                    ResponseContent::Bytes => {
                        self.sink.warn(format!(
                            "error response {status} has unsupported binary content"
                        ));
                    }
                }
            }
        }
        join_union(types)
    }
}

/// Joins a sorted, deduplicated set of rendered types into a union string.
///
/// The catch-all `Any` always moves to the end so narrower types are
/// preferred by pattern-matching consumers; an empty union defaults to `Any`.
fn join_union(mut types: BTreeSet<String>) -> String {
    let had_any = types.remove("Any");
    let mut parts: Vec<String> = types.into_iter().collect();
    if had_any {
        parts.push("Any".to_string());
    }
    if parts.is_empty() {
        "Any".to_string()
    } else {
        parts.join(" | ")
    }
}

/// Synthesizes one docstring from operation summary, operation description
/// and path-level description, skipping blanks and duplicated text.
fn synthesize_doc(op: &Value, path_item: &Value) -> String {
    let field = |source: &Value, key: &str| -> String {
        source
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim()
            .to_string()
    };

    let summary = field(op, "summary");
    let op_desc = field(op, "description");
    let path_desc = field(path_item, "description");

    let mut paragraphs = vec![summary, op_desc.clone()];
    if !op_desc.contains(&path_desc) {
        paragraphs.push(path_desc);
    }

    paragraphs
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
