//! toml2c-schema
//!
//! The typed schema inferred from an example TOML document.
//!
//! ```
//! use toml2c_schema::*;
//!
//! let document: toml::Table = toml::from_str("port = 8080\n[db]\nhosts = [\"a\"]").unwrap();
//! let schema = build_schema(&document, "server_t");
//!
//! let root = schema.node(schema.root());
//! assert_eq!(root.fields[0], Field::new("port", FieldKind::Int));
//! assert_eq!(schema.node(root.children[0]).fields[0].kind, FieldKind::ArrayOfString);
//! ```

pub mod builder;
pub mod naming;
pub mod schema;

pub use builder::*;
pub use naming::*;
pub use schema::*;
