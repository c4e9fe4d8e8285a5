//! toml2c-compiler
//!
//! This crate implements:
//!  1) Parsing an example TOML document and inferring its schema,
//!  2) An identifier verifier (C keywords, invalid names, collisions),
//!  3) The shared naming rules for handles and record members (`path`),
//!  4) Code generation (`emit_declaration` / `emit_implementation` → `String`),
//!  5) Error types (`T2cError`) and the `SchemaVisitor` trait.

pub mod error;
pub mod types;
pub mod utils;
pub mod config;
pub mod path;
pub mod writer;
pub mod traits;
pub mod verifier;
pub mod gen_header;
pub mod gen_source;
pub mod compiler;

pub use compiler::{compile_document, compile_file, generate, infer_schema, parse_document, write_output};
pub use config::GeneratorConfig;
pub use error::T2cError;
pub use gen_header::emit_declaration;
pub use gen_source::emit_implementation;
pub use verifier::verify_identifiers;
