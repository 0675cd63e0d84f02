//! Data model for parsed API operations and schemas
//!
//! Everything here is constructed once per generation run from the resolved
//! spec and handed to the template renderer as-is, so all types serialize.

use serde::{Serialize, Serializer};
use std::fmt;

/// Where an argument travels in the request.
///
/// The variant order is the argument sort order in generated signatures:
/// path, body, query, header, cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgLocation {
    Path,
    Body,
    Query,
    Header,
    Cookie,
}

impl ArgLocation {
    /// Sort rank within an argument list.
    pub fn rank(self) -> usize {
        match self {
            ArgLocation::Path => 0,
            ArgLocation::Body => 1,
            ArgLocation::Query => 2,
            ArgLocation::Header => 3,
            ArgLocation::Cookie => 4,
        }
    }
}

impl fmt::Display for ArgLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgLocation::Path => write!(f, "path"),
            ArgLocation::Body => write!(f, "body"),
            ArgLocation::Query => write!(f, "query"),
            ArgLocation::Header => write!(f, "header"),
            ArgLocation::Cookie => write!(f, "cookie"),
        }
    }
}

/// Default state of a generated argument.
///
/// `Required` and `Unset` render as sentinel names provided by the generated
/// runtime: a `Required` argument must be supplied by the caller, an `Unset`
/// argument is omitted from the request entirely when not supplied (which is
/// distinct from passing an explicit `None`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgDefault {
    Required,
    Unset,
    /// Python literal taken from the schema's `default`.
    Literal(String),
}

impl ArgDefault {
    /// The token the renderer drops into the generated signature.
    pub fn render(&self) -> &str {
        match self {
            ArgDefault::Required => "REQUIRED",
            ArgDefault::Unset => "UNSET",
            ArgDefault::Literal(lit) => lit,
        }
    }
}

impl Serialize for ArgDefault {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.render())
    }
}

/// HTTP status code wrapper that supports non-standard numeric codes
/// (e.g. 458, 499) some APIs use for application-specific errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub fn is_success(self) -> bool {
        (200..300).contains(&self.0)
    }

    pub fn is_client_error(self) -> bool {
        (400..500).contains(&self.0)
    }

    pub fn is_server_error(self) -> bool {
        (500..600).contains(&self.0)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A parsed API argument (path, query, header, cookie, or body).
#[derive(Debug, Clone, Serialize)]
pub struct ParsedArg {
    /// Python-safe snake_case name
    pub name: String,
    /// Original API parameter name from the spec (absent for body)
    pub api_name: Option<String>,
    /// Rendered Python type annotation
    #[serde(rename = "type")]
    pub ty: String,
    /// Argument location
    pub location: ArgLocation,
    /// Whether the argument is required
    pub required: bool,
    /// Default state (REQUIRED, UNSET, or a literal)
    pub default: ArgDefault,
    /// Sanitized documentation
    pub doc: String,
}

/// Parsed response types for an operation.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedResponses {
    /// Type annotation for 2xx responses
    pub success_type: String,
    /// Type annotation for 4xx/5xx responses
    pub error_type: String,
}

/// A fully parsed API operation.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedOperation {
    /// HTTP method (GET, POST, ...)
    pub method: String,
    /// Normalized API path
    pub path: String,
    /// All arguments, ordered path < body < query < header < cookie
    pub args: Vec<ParsedArg>,
    /// Response type information
    pub responses: ParsedResponses,
    /// Sanitized documentation
    pub doc: String,
}

/// A property of a parsed model.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedProperty {
    /// Python-safe property name
    pub name: String,
    /// Rendered Python type annotation
    #[serde(rename = "type")]
    pub ty: String,
    /// Whether the property is required
    pub required: bool,
    /// Sanitized documentation
    pub doc: String,
    /// Whether the property is read-only
    pub read_only: bool,
    /// Whether the property is write-only
    pub write_only: bool,
    /// Python literal of the default value, if any
    pub default: Option<String>,
}

/// A parsed schema/model.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedModel {
    /// Sanitized model class name
    pub name: String,
    /// Properties in declaration order (after inheritance flattening)
    pub properties: Vec<ParsedProperty>,
    /// Sanitized documentation
    pub doc: String,
    /// Original name in components/schemas, when it differs from `name`
    pub ref_name: Option<String>,
}
