//! @ai:module:intent asti parser library for extracting annotated service interfaces
//! @ai:module:layer infrastructure
//! @ai:module:public_api annotation, model, parser, pipeline, source, typeexpr, output, error
//! @ai:module:stateless true
//!
//! # asti Parser
//!
//! A library for extracting `@asti`-annotated service interfaces from Go
//! packages, resolving the type graph their signatures reach, and
//! serializing the result to canonical JSON.
//!
//! ## Example
//!
//! ```rust,no_run
//! use asti_parser::{output, Parser};
//!
//! // Parse a package directory
//! let parser = Parser::new();
//! let package = parser.parse_package("./internal/service").unwrap();
//! println!(
//!     "{}",
//!     output::format_package(&package, output::OutputFormat::JsonPretty)
//! );
//!
//! // Strict mode turns convention violations into errors
//! let strict = Parser::new().strict(true);
//! strict.parse_package("./internal/service").unwrap();
//! ```

pub mod annotation;
pub mod error;
pub mod model;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod source;
pub mod typeexpr;

pub use annotation::{AnnotationParser, DEFAULT_PREFIX};
pub use error::{Error, Result};
pub use model::{
    Annotations, ConstantInfo, FieldInfo, GenericInfo, Interface, Method, MethodInfo, Package,
    Position, TypeInfo, TypeKind, Variable,
};
pub use output::{format_package, OutputFormat};
pub use parser::Parser;
pub use pipeline::{CancelToken, Data, Pipeline, Stage};
