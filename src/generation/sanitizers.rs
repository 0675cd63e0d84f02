//! Security-critical sanitization for code generation
//!
//! Every string that ends up in generated source -- model names, property
//! names, enum values, descriptions -- originates from an untrusted OpenAPI
//! document. An unescaped value is a code injection vector (see
//! CVE-2020-15142 / GHSA-9x4c-63pf-525f for prior art in another generator),
//! so all spec-derived text passes through one of the transforms below before
//! it is rendered.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;

use super::errors::GenerationError;
use super::models::StatusCode;

static NON_IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("valid regex"));
static UNDERSCORE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"_+").expect("valid regex"));

/// Python keywords plus builtin names that generated identifiers must not
/// shadow. The short name `id` is ubiquitous in APIs and explicitly allowed.
static RESERVED_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    const KEYWORDS: &[&str] = &[
        "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
        "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
        "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
        "try", "while", "with", "yield", "match", "case",
    ];
    const BUILTINS: &[&str] = &[
        "abs",
        "aiter",
        "all",
        "anext",
        "any",
        "ascii",
        "bin",
        "bool",
        "breakpoint",
        "bytearray",
        "bytes",
        "callable",
        "chr",
        "classmethod",
        "compile",
        "complex",
        "delattr",
        "dict",
        "dir",
        "divmod",
        "enumerate",
        "eval",
        "exec",
        "exit",
        "filter",
        "float",
        "format",
        "frozenset",
        "getattr",
        "globals",
        "hasattr",
        "hash",
        "help",
        "hex",
        "input",
        "int",
        "isinstance",
        "issubclass",
        "iter",
        "len",
        "list",
        "locals",
        "map",
        "max",
        "memoryview",
        "min",
        "next",
        "object",
        "oct",
        "open",
        "ord",
        "pow",
        "print",
        "property",
        "quit",
        "range",
        "repr",
        "reversed",
        "round",
        "set",
        "setattr",
        "slice",
        "sorted",
        "staticmethod",
        "str",
        "sum",
        "super",
        "tuple",
        "type",
        "vars",
        "zip",
        "ArithmeticError",
        "AssertionError",
        "AttributeError",
        "BaseException",
        "BaseExceptionGroup",
        "BlockingIOError",
        "BrokenPipeError",
        "BufferError",
        "BytesWarning",
        "ChildProcessError",
        "ConnectionAbortedError",
        "ConnectionError",
        "ConnectionRefusedError",
        "ConnectionResetError",
        "DeprecationWarning",
        "EOFError",
        "EncodingWarning",
        "EnvironmentError",
        "Exception",
        "ExceptionGroup",
        "FileExistsError",
        "FileNotFoundError",
        "FloatingPointError",
        "FutureWarning",
        "GeneratorExit",
        "IOError",
        "ImportError",
        "ImportWarning",
        "IndentationError",
        "IndexError",
        "InterruptedError",
        "IsADirectoryError",
        "KeyError",
        "KeyboardInterrupt",
        "LookupError",
        "MemoryError",
        "ModuleNotFoundError",
        "NameError",
        "NotADirectoryError",
        "NotImplemented",
        "NotImplementedError",
        "OSError",
        "OverflowError",
        "PendingDeprecationWarning",
        "PermissionError",
        "ProcessLookupError",
        "RecursionError",
        "ReferenceError",
        "ResourceWarning",
        "RuntimeError",
        "RuntimeWarning",
        "StopAsyncIteration",
        "StopIteration",
        "SyntaxError",
        "SyntaxWarning",
        "SystemError",
        "SystemExit",
        "TabError",
        "TimeoutError",
        "TypeError",
        "UnboundLocalError",
        "UnicodeDecodeError",
        "UnicodeEncodeError",
        "UnicodeError",
        "UnicodeTranslateError",
        "UnicodeWarning",
        "UserWarning",
        "ValueError",
        "Warning",
        "ZeroDivisionError",
        "Ellipsis",
    ];
    const EXTRA: &[&str] = &["self", "cls", "true", "false", "null", "undefined"];

    KEYWORDS
        .iter()
        .chain(BUILTINS)
        .chain(EXTRA)
        .copied()
        .filter(|w| *w != "id")
        .collect()
});

/// Converts an arbitrary string into a valid Python identifier.
///
/// Replaces every character outside `[A-Za-z0-9_]` with `_`, collapses
/// underscore runs, trims the edges, prefixes a digit-leading result with `_`
/// and suffixes reserved words with `_`. Deterministic, and never returns a
/// reserved word.
///
/// # Errors
///
/// [`GenerationError::EmptyIdentifier`] when nothing identifier-like remains,
/// which is the one input irregularity generation cannot recover from.
pub fn sanitize_identifier(value: &str) -> Result<String, GenerationError> {
    let replaced = NON_IDENTIFIER_RE.replace_all(value, "_");
    let collapsed = UNDERSCORE_RUN_RE.replace_all(&replaced, "_");
    let trimmed = collapsed.trim_matches('_');

    if trimmed.is_empty() {
        return Err(GenerationError::EmptyIdentifier(value.to_string()));
    }

    let mut sanitized = trimmed.to_string();

    if sanitized.starts_with(|c: char| c.is_ascii_digit()) {
        sanitized.insert(0, '_');
    }

    if RESERVED_WORDS.contains(sanitized.as_str()) {
        sanitized.push('_');
    }

    Ok(sanitized)
}

/// Escapes a string for safe inclusion in a quoted Python string literal.
pub fn sanitize_string(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Escapes the triple-quote delimiters for safe inclusion in a docstring.
///
/// Everything else passes through untouched so formatting survives.
pub fn sanitize_docstring(value: &str) -> String {
    value
        .replace("\"\"\"", "\\\"\\\"\\\"")
        .replace("'''", "\\'\\'\\'")
}

/// Extracts a boolean from an object field using Python-style truthiness,
/// without ever treating the value as anything but data.
pub fn safe_bool(object: &Value, key: &str, default: bool) -> bool {
    match object.get(key) {
        None => default,
        Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

/// Parses a response-code key into a [`StatusCode`].
///
/// Returns `None` for the ambiguous `"default"` key and anything else that is
/// not a plain integer.
pub fn safe_status(code: &str) -> Option<StatusCode> {
    code.trim().parse::<u16>().ok().map(StatusCode)
}
