use serde::{Deserialize, Serialize};

use crate::naming::sanitize;

/// Stable index of a [`SchemaNode`] inside a [`Schema`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Int,
    Double,
    Bool,
    String,
    /// Untyped array. Inference never produces it; arrays it cannot type are dropped.
    Array,
    ArrayOfInt,
    ArrayOfDouble,
    ArrayOfBool,
    ArrayOfString,
}

impl FieldKind {
    pub fn is_array(self) -> bool {
        matches!(
            self,
            FieldKind::Array
                | FieldKind::ArrayOfInt
                | FieldKind::ArrayOfDouble
                | FieldKind::ArrayOfBool
                | FieldKind::ArrayOfString
        )
    }

    /// Whether the generated record owns heap memory for this member.
    pub fn owns_heap(self) -> bool {
        self == FieldKind::String || self.is_array()
    }

    /// C type of the record member, without the trailing space.
    pub fn c_type(self) -> &'static str {
        match self {
            FieldKind::Int           => "int64_t",
            FieldKind::Double        => "double",
            FieldKind::Bool          => "bool",
            FieldKind::String        => "char*",
            FieldKind::Array         => "void**",
            FieldKind::ArrayOfInt    => "int64_t*",
            FieldKind::ArrayOfDouble => "double*",
            FieldKind::ArrayOfBool   => "bool*",
            FieldKind::ArrayOfString => "char**",
        }
    }

    /// C type of a single element, for array kinds.
    pub fn element_c_type(self) -> Option<&'static str> {
        match self {
            FieldKind::Array         => Some("void*"),
            FieldKind::ArrayOfInt    => Some("int64_t"),
            FieldKind::ArrayOfDouble => Some("double"),
            FieldKind::ArrayOfBool   => Some("bool"),
            FieldKind::ArrayOfString => Some("char*"),
            _ => None,
        }
    }
}

/// One scalar or homogeneous-array key of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Record member name, the sanitized key.
    pub name: String,
    /// Key exactly as written in the document; the reader looks it up by this.
    pub key:  String,
    pub kind: FieldKind,
}

impl Field {
    pub fn new(key: impl Into<String>, kind: FieldKind) -> Self {
        let key = key.into();
        Field { name: sanitize(&key), key, kind }
    }
}

/// One table of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    pub name:     String,
    /// Document key of the table, empty for the root.
    pub key:      String,
    pub depth:    usize,
    pub fields:   Vec<Field>,
    pub children: Vec<NodeId>,
    pub parent:   Option<NodeId>,
}

impl SchemaNode {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Append-only arena holding the inferred table tree.
///
/// Nodes are addressed by [`NodeId`]; the root is always the first node. Parent
/// links are plain indices, so appending never invalidates a reference held
/// elsewhere in the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    nodes: Vec<SchemaNode>,
}

impl Schema {
    pub fn new(root_name: impl Into<String>) -> Self {
        Schema {
            nodes: vec![SchemaNode {
                name:     root_name.into(),
                key:      String::new(),
                depth:    0,
                fields:   Vec::new(),
                children: Vec::new(),
                parent:   None,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Appends a child table for document key `key` under `parent` and
    /// returns its id.
    pub fn add_child(&mut self, parent: NodeId, key: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let depth = self.nodes[parent.0].depth + 1;
        let key = key.into();
        self.nodes.push(SchemaNode {
            name: sanitize(&key),
            key,
            depth,
            fields: Vec::new(),
            children: Vec::new(),
            parent: Some(parent),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn push_field(&mut self, node: NodeId, field: Field) {
        self.nodes[node.0].fields.push(field);
    }

    /// `node` and every table above it, nearest first, root last.
    pub fn ancestors(&self, node: NodeId) -> Ancestors<'_> {
        Ancestors { schema: self, next: Some(node) }
    }

    /// Every table in pre-order, children in document order.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        order
    }

    /// Every table except the root, in pre-order.
    pub fn descendants(&self) -> Vec<NodeId> {
        self.preorder().into_iter().skip(1).collect()
    }

    /// Every field with its owning table, tables visited in pre-order.
    pub fn fields(&self) -> impl Iterator<Item = (NodeId, &Field)> + '_ {
        self.preorder()
            .into_iter()
            .flat_map(move |id| self.node(id).fields.iter().map(move |f| (id, f)))
    }
}

pub struct Ancestors<'a> {
    schema: &'a Schema,
    next:   Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.schema.node(current).parent;
        Some(current)
    }
}

#[cfg(test)]
fn sample() -> Schema {
    let mut schema = Schema::new("app_t");
    let root = schema.root();
    schema.push_field(root, Field::new("title", FieldKind::String));
    let server = schema.add_child(root, "server");
    schema.push_field(server, Field::new("port", FieldKind::Int));
    let db = schema.add_child(server, "db");
    schema.push_field(db, Field::new("hosts", FieldKind::ArrayOfString));
    let log = schema.add_child(root, "log");
    schema.push_field(log, Field::new("level", FieldKind::String));
    schema
}

#[test]
fn depth_follows_nesting() {
    let schema = sample();
    let depths: Vec<usize> = schema.preorder().iter().map(|id| schema.node(*id).depth).collect();
    assert_eq!(depths, [0, 1, 2, 1]);
    assert!(schema.node(schema.root()).is_root());
}

#[test]
fn preorder_keeps_insertion_order() {
    let schema = sample();
    let names: Vec<&str> = schema.preorder().iter().map(|id| schema.node(*id).name.as_str()).collect();
    assert_eq!(names, ["app_t", "server", "db", "log"]);

    let descendants: Vec<&str> = schema
        .descendants()
        .iter()
        .map(|id| schema.node(*id).name.as_str())
        .collect();
    assert_eq!(descendants, ["server", "db", "log"]);
}

#[test]
fn ancestors_end_at_root() {
    let schema = sample();
    let db = schema.node(schema.root()).children[0];
    let db = schema.node(db).children[0];
    let chain: Vec<&str> = schema.ancestors(db).map(|id| schema.node(id).name.as_str()).collect();
    assert_eq!(chain, ["db", "server", "app_t"]);
}

#[test]
fn fields_follow_table_order() {
    let schema = sample();
    let names: Vec<&str> = schema.fields().map(|(_, f)| f.name.as_str()).collect();
    assert_eq!(names, ["title", "port", "hosts", "level"]);
}

#[test]
fn names_are_sanitized_keys_are_kept() {
    let mut schema = Schema::new("app_t");
    let root = schema.root();
    let tls = schema.add_child(root, "tls-opts");
    schema.push_field(tls, Field::new("max-conn", FieldKind::Int));
    schema.push_field(tls, Field::new("min_conn", FieldKind::Int));

    let table = schema.node(tls);
    assert_eq!((table.name.as_str(), table.key.as_str()), ("tls_opts", "tls-opts"));
    assert_eq!((table.fields[0].name.as_str(), table.fields[0].key.as_str()), ("max_conn", "max-conn"));
    assert_eq!((table.fields[1].name.as_str(), table.fields[1].key.as_str()), ("min_conn", "min_conn"));
    assert_eq!(schema.node(root).key, "");
}

#[test]
fn heap_ownership() {
    assert!(FieldKind::String.owns_heap());
    assert!(FieldKind::ArrayOfInt.owns_heap());
    assert!(!FieldKind::Int.owns_heap());
    assert!(!FieldKind::Bool.owns_heap());
    assert!(!FieldKind::Double.owns_heap());
    assert_eq!(FieldKind::ArrayOfBool.element_c_type(), Some("bool"));
    assert_eq!(FieldKind::String.element_c_type(), None);
}

#[test]
fn json_round_trip_keeps_links() {
    let schema = sample();
    let json = serde_json::to_string(&schema).unwrap();
    let loaded: Schema = serde_json::from_str(&json).unwrap();
    assert_eq!(loaded, schema);
    assert_eq!(loaded.node(NodeId(2)).parent, Some(NodeId(1)));
}
