//! clientforge - generate type-safe Python API clients from OpenAPI
//! specifications
//!
//! The heart of the crate is the [`generation`] module: a synchronous,
//! side-effect-free pipeline that translates a `$ref`-resolved OpenAPI
//! document into parsed models and operations. [`infrastructure`] supplies
//! the collaborators around it (loaders, reference expansion, template
//! rendering), and [`generator`] wires everything together.

#![deny(unsafe_code)]

pub mod generation;
pub mod generator;
pub mod infrastructure;

pub use generation::{GenerationError, ParsedSpec, parse_spec};
pub use generator::generate_sdk;
