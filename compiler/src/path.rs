//! The names a table or field goes by in generated code.
//!
//! All of them walk the same ancestor chain in [`path`]. The separator, the
//! treatment of the root, the starting table and whether a table contributes
//! its name or its document key are the only differences, and they live in
//! [`PathKind`].

use toml2c_schema::{NodeId, Schema, SchemaNode};

/// Name of the parsed document handle in the generated reader.
pub const ROOT_HANDLE: &str = "root";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Local handle bound to a table in the read routine, e.g. `root_server_db`.
    Local,
    /// The [`PathKind::Local`] handle of the enclosing table, e.g. `root_server`.
    Parent,
    /// Member chain inside the record, e.g. `server.db.port`.
    Member,
    /// Dotted document keys as written in the input, e.g. `server.db-opts.max_conn`.
    Key,
}

impl PathKind {
    fn separator(self) -> &'static str {
        match self {
            PathKind::Local | PathKind::Parent => "_",
            PathKind::Member | PathKind::Key => ".",
        }
    }

    fn names_root(self) -> bool {
        match self {
            PathKind::Local | PathKind::Parent => true,
            PathKind::Member | PathKind::Key => false,
        }
    }

    fn segment(self, table: &SchemaNode) -> &str {
        match self {
            PathKind::Key => &table.key,
            PathKind::Local | PathKind::Parent | PathKind::Member => &table.name,
        }
    }

    fn start(self, schema: &Schema, node: NodeId) -> Option<NodeId> {
        match self {
            PathKind::Parent => schema.node(node).parent,
            PathKind::Local | PathKind::Member | PathKind::Key => Some(node),
        }
    }
}

/// Builds the `kind` path of `node`, with `leaf` appended when given.
pub fn path(schema: &Schema, node: NodeId, kind: PathKind, leaf: Option<&str>) -> String {
    let mut segments: Vec<&str> = Vec::new();
    if let Some(start) = kind.start(schema, node) {
        for id in schema.ancestors(start) {
            let table = schema.node(id);
            if !table.is_root() {
                segments.push(kind.segment(table));
            } else if kind.names_root() {
                segments.push(ROOT_HANDLE);
            }
        }
    }
    segments.reverse();
    segments.extend(leaf);
    segments.join(kind.separator())
}

pub fn local(schema: &Schema, node: NodeId) -> String {
    path(schema, node, PathKind::Local, None)
}

pub fn parent(schema: &Schema, node: NodeId) -> String {
    path(schema, node, PathKind::Parent, None)
}

pub fn member(schema: &Schema, node: NodeId, field: &str) -> String {
    path(schema, node, PathKind::Member, Some(field))
}

#[cfg(test)]
fn nested() -> (Schema, NodeId, NodeId) {
    let mut schema = Schema::new("app_t");
    let server = schema.add_child(schema.root(), "server");
    let db = schema.add_child(server, "db");
    (schema, server, db)
}

#[test]
fn local_paths_name_the_root() {
    let (schema, server, db) = nested();
    assert_eq!(local(&schema, schema.root()), "root");
    assert_eq!(local(&schema, server), "root_server");
    assert_eq!(local(&schema, db), "root_server_db");
}

#[test]
fn parent_path_is_the_parents_local_path() {
    let (schema, server, db) = nested();
    assert_eq!(parent(&schema, server), local(&schema, schema.root()));
    assert_eq!(parent(&schema, db), local(&schema, server));
    assert_eq!(parent(&schema, schema.root()), "");
}

#[test]
fn member_paths_skip_the_root() {
    let (schema, server, db) = nested();
    assert_eq!(member(&schema, schema.root(), "title"), "title");
    assert_eq!(member(&schema, server, "port"), "server.port");
    assert_eq!(member(&schema, db, "hosts"), "server.db.hosts");
}

#[test]
fn key_paths_use_document_keys() {
    let mut schema = Schema::new("app_t");
    let pool = schema.add_child(schema.root(), "pool_opts");
    let tls = schema.add_child(pool, "tls-opts");
    assert_eq!(path(&schema, tls, PathKind::Key, Some("max_conn")), "pool_opts.tls-opts.max_conn");
    assert_eq!(member(&schema, tls, "max_conn"), "pool_opts.tls_opts.max_conn");
    assert_eq!(path(&schema, tls, PathKind::Key, None), "pool_opts.tls-opts");
    assert_eq!(path(&schema, schema.root(), PathKind::Key, Some("title")), "title");
}

#[test]
fn member_path_has_one_dot_per_table() {
    let mut schema = Schema::new("deep_t");
    let mut node = schema.root();
    for (depth, name) in ["a", "b", "c", "d"].iter().enumerate() {
        node = schema.add_child(node, *name);
        let chain = member(&schema, node, "x");
        assert_eq!(chain.matches('.').count(), depth + 1);
        assert_eq!(schema.node(node).depth, depth + 1);
    }
}
