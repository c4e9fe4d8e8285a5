//! Schema inference over a parsed example document.

use toml::{Table, Value};
use tracing::trace;

use crate::schema::{Field, FieldKind, NodeId, Schema};

/// Infers the schema tree of `document`.
///
/// The root table is named `root_name`; every nested table becomes a child
/// node and every supported scalar or homogeneous array becomes a field, both
/// in document order. Anything else (date/time values, mixed arrays, arrays of
/// tables or of arrays, empty arrays) is left out without a diagnostic.
pub fn build_schema(document: &Table, root_name: &str) -> Schema {
    let mut schema = Schema::new(root_name);
    let root = schema.root();
    collect_table(&mut schema, root, document);
    schema
}

fn collect_table(schema: &mut Schema, node: NodeId, table: &Table) {
    for (key, value) in table {
        match value {
            Value::Table(inner) => {
                let child = schema.add_child(node, key.as_str());
                trace!(table = %key, depth = schema.node(child).depth, "entering table");
                collect_table(schema, child, inner);
            }
            Value::Integer(_) => schema.push_field(node, Field::new(key.as_str(), FieldKind::Int)),
            Value::Float(_)   => schema.push_field(node, Field::new(key.as_str(), FieldKind::Double)),
            Value::Boolean(_) => schema.push_field(node, Field::new(key.as_str(), FieldKind::Bool)),
            Value::String(_)  => schema.push_field(node, Field::new(key.as_str(), FieldKind::String)),
            Value::Array(items) => {
                if let Some(kind) = classify_array(items) {
                    schema.push_field(node, Field::new(key.as_str(), kind));
                }
            }
            Value::Datetime(_) => {}
        }
    }
}

#[derive(PartialEq)]
enum Tag {
    Integer,
    Float,
    Boolean,
    String,
    Datetime,
    Array,
    Table,
}

fn tag(value: &Value) -> Tag {
    match value {
        Value::Integer(_)  => Tag::Integer,
        Value::Float(_)    => Tag::Float,
        Value::Boolean(_)  => Tag::Boolean,
        Value::String(_)   => Tag::String,
        Value::Datetime(_) => Tag::Datetime,
        Value::Array(_)    => Tag::Array,
        Value::Table(_)    => Tag::Table,
    }
}

/// Field kind of a homogeneous array of supported scalars, `None` otherwise.
pub fn classify_array(items: &[Value]) -> Option<FieldKind> {
    let first = tag(items.first()?);
    if items.iter().any(|item| tag(item) != first) {
        return None;
    }
    match first {
        Tag::Integer => Some(FieldKind::ArrayOfInt),
        Tag::Float   => Some(FieldKind::ArrayOfDouble),
        Tag::Boolean => Some(FieldKind::ArrayOfBool),
        Tag::String  => Some(FieldKind::ArrayOfString),
        Tag::Datetime | Tag::Array | Tag::Table => None,
    }
}

#[cfg(test)]
fn infer(text: &str) -> Schema {
    let document: Table = toml::from_str(text).unwrap();
    build_schema(&document, "doc_t")
}

#[test]
fn scalars_become_fields_in_document_order() {
    let schema = infer(
        r#"
        zeta = 1
        alpha = 2.5
        mid = true
        name = "x"
        "#,
    );
    let root = schema.node(schema.root());
    assert_eq!(root.name, "doc_t");
    assert_eq!(root.depth, 0);
    let fields: Vec<(&str, FieldKind)> = root.fields.iter().map(|f| (f.name.as_str(), f.kind)).collect();
    assert_eq!(
        fields,
        [
            ("zeta", FieldKind::Int),
            ("alpha", FieldKind::Double),
            ("mid", FieldKind::Bool),
            ("name", FieldKind::String),
        ]
    );
}

#[test]
fn nested_tables_become_children() {
    let schema = infer(
        r#"
        title = "x"

        [server]
        port = 8080

        [server.tls-opts]
        enabled = false

        [client]
        retries = 3
        "#,
    );
    let root = schema.node(schema.root());
    assert_eq!(root.fields.len(), 1);
    assert_eq!(root.children.len(), 2);

    let server = schema.node(root.children[0]);
    assert_eq!(server.name, "server");
    assert_eq!(server.depth, 1);
    assert_eq!(server.parent, Some(schema.root()));

    let tls = schema.node(server.children[0]);
    assert_eq!(tls.name, "tls_opts");
    assert_eq!(tls.depth, 2);
    assert_eq!(tls.key, "tls-opts");

    let client = schema.node(root.children[1]);
    assert_eq!(client.name, "client");
    assert_eq!(client.depth, 1);
}

#[test]
fn homogeneous_arrays_are_typed() {
    let schema = infer(
        r#"
        ints = [1, 2, 3]
        floats = [1.0, 2.0]
        flags = [true, false]
        names = ["a", "b"]
        "#,
    );
    let kinds: Vec<FieldKind> = schema.node(schema.root()).fields.iter().map(|f| f.kind).collect();
    assert_eq!(
        kinds,
        [
            FieldKind::ArrayOfInt,
            FieldKind::ArrayOfDouble,
            FieldKind::ArrayOfBool,
            FieldKind::ArrayOfString,
        ]
    );
}

#[test]
fn unsupported_values_are_dropped_silently() {
    let schema = infer(
        r#"
        mixed = [1, "a"]
        int_and_float = [1, 2.0]
        nested = [[1], [2]]
        empty = []
        when = 1979-05-27T07:32:00Z
        kept = 1

        [[products]]
        name = "hammer"
        "#,
    );
    let root = schema.node(schema.root());
    let names: Vec<&str> = root.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["kept"]);
    assert!(root.children.is_empty());
}

#[test]
fn classify_array_needs_a_first_element() {
    assert_eq!(classify_array(&[]), None);
    assert_eq!(
        classify_array(&[Value::Integer(1), Value::Integer(2)]),
        Some(FieldKind::ArrayOfInt)
    );
    assert_eq!(classify_array(&[Value::Integer(1), Value::Boolean(true)]), None);
}

#[test]
fn sibling_keys_collide_after_sanitizing() {
    let schema = infer(
        r#"
        a-b = 1
        a_b = 2
        "#,
    );
    let fields = &schema.node(schema.root()).fields;
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].name, "a_b");
    assert_eq!(fields[1].name, "a_b");
    assert_eq!(fields[0].key, "a-b");
    assert_eq!(fields[1].key, "a_b");
}

#[test]
fn underscore_keys_are_kept_verbatim() {
    let schema = infer(
        r#"
        max_conn = 5

        [pool_opts]
        idle-timeout = 30
        "#,
    );
    let root = schema.node(schema.root());
    assert_eq!(root.fields[0].key, "max_conn");

    let pool = schema.node(root.children[0]);
    assert_eq!((pool.name.as_str(), pool.key.as_str()), ("pool_opts", "pool_opts"));
    assert_eq!((pool.fields[0].name.as_str(), pool.fields[0].key.as_str()), ("idle_timeout", "idle-timeout"));
}
