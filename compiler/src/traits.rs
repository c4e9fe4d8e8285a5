use toml2c_schema::{Field, NodeId, Schema};

use crate::writer::CodeWriter;

/// One generation pass over the schema tree.
///
/// [`walk`] calls the hooks in a fixed order, so every pass sees tables and
/// fields in the same sequence: a table is entered, its fields are visited in
/// document order, its children are walked in document order, then the table
/// is left.
pub trait SchemaVisitor {
    fn enter_table(&mut self, _schema: &Schema, _node: NodeId, _out: &mut CodeWriter) {}

    fn visit_field(&mut self, _schema: &Schema, _node: NodeId, _field: &Field, _out: &mut CodeWriter) {}

    fn leave_table(&mut self, _schema: &Schema, _node: NodeId, _out: &mut CodeWriter) {}
}

/// Walks the whole tree from the root.
pub fn walk<V: SchemaVisitor + ?Sized>(schema: &Schema, visitor: &mut V, out: &mut CodeWriter) {
    walk_table(schema, schema.root(), visitor, out);
}

fn walk_table<V: SchemaVisitor + ?Sized>(
    schema: &Schema,
    node: NodeId,
    visitor: &mut V,
    out: &mut CodeWriter,
) {
    visitor.enter_table(schema, node, out);
    for field in &schema.node(node).fields {
        visitor.visit_field(schema, node, field, out);
    }
    for &child in &schema.node(node).children {
        walk_table(schema, child, visitor, out);
    }
    visitor.leave_table(schema, node, out);
}

#[cfg(test)]
struct Trace(Vec<String>);

#[cfg(test)]
impl SchemaVisitor for Trace {
    fn enter_table(&mut self, schema: &Schema, node: NodeId, _out: &mut CodeWriter) {
        self.0.push(format!("enter {}", schema.node(node).name));
    }

    fn visit_field(&mut self, _schema: &Schema, _node: NodeId, field: &Field, _out: &mut CodeWriter) {
        self.0.push(field.name.clone());
    }

    fn leave_table(&mut self, schema: &Schema, node: NodeId, _out: &mut CodeWriter) {
        self.0.push(format!("leave {}", schema.node(node).name));
    }
}

#[test]
fn walk_is_preorder_with_fields_first() {
    use toml2c_schema::FieldKind;

    let mut schema = Schema::new("app_t");
    let root = schema.root();
    let server = schema.add_child(root, "server");
    schema.push_field(server, Field::new("port", FieldKind::Int));
    schema.push_field(root, Field::new("title", FieldKind::String));
    let log = schema.add_child(root, "log");
    schema.push_field(log, Field::new("level", FieldKind::String));

    let mut trace = Trace(Vec::new());
    walk(&schema, &mut trace, &mut CodeWriter::new());
    assert_eq!(
        trace.0,
        [
            "enter app_t",
            "title",
            "enter server",
            "port",
            "leave server",
            "enter log",
            "level",
            "leave log",
            "leave app_t",
        ]
    );
}
