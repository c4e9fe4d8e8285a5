use toml2c_schema::{Field, NodeId, Schema};

use crate::{
    config::{GeneratorConfig, Symbols},
    traits::{walk, SchemaVisitor},
    writer::CodeWriter,
};

/// Writes the nested record type: one anonymous `struct` block per table,
/// indented by depth and closed with the table's name.
pub struct RecordDeclaration;

impl SchemaVisitor for RecordDeclaration {
    fn enter_table(&mut self, schema: &Schema, node: NodeId, out: &mut CodeWriter) {
        let table = schema.node(node);
        if table.is_root() {
            out.line(0, "typedef struct {");
        } else {
            out.line(table.depth, "struct {");
        }
    }

    fn visit_field(&mut self, schema: &Schema, node: NodeId, field: &Field, out: &mut CodeWriter) {
        let level = schema.node(node).depth + 1;
        out.line(level, format!("{} {};", field.kind.c_type(), field.name));
        if field.kind.is_array() {
            out.line(level, format!("size_t {}_len;", field.name));
        }
    }

    fn leave_table(&mut self, schema: &Schema, node: NodeId, out: &mut CodeWriter) {
        let table = schema.node(node);
        out.line(table.depth, format!("}} {};", table.name));
    }
}

pub fn emit_prototypes(symbols: &Symbols, out: &mut CodeWriter) {
    out.line(0, "#ifdef __cplusplus");
    out.line(0, "extern \"C\" {");
    out.line(0, "#endif");
    out.line(0, format!("int {}(const char* file_path, {}** out);", symbols.read_fn, symbols.type_name));
    out.line(0, format!("void {}(const {}* value);", symbols.print_fn, symbols.type_name));
    out.line(0, format!("void {}({}* value);", symbols.free_fn, symbols.type_name));
    out.line(0, "#ifdef __cplusplus");
    out.line(0, "}");
    out.line(0, "#endif");
}

/// Generates the declaration artifact for `schema`.
pub fn emit_declaration(schema: &Schema, config: &GeneratorConfig) -> String {
    let symbols = config.symbols(schema);
    let mut out = CodeWriter::new();

    out.line(0, format!("#ifndef {}", symbols.guard));
    out.line(0, format!("#define {}", symbols.guard));
    out.blank();
    out.line(0, "#include <stdbool.h>");
    out.line(0, "#include <stddef.h>");
    out.line(0, "#include <stdint.h>");
    out.line(0, "#include <stdio.h>");
    out.blank();

    walk(schema, &mut RecordDeclaration, &mut out);
    out.blank();
    emit_prototypes(&symbols, &mut out);
    out.blank();
    out.line(0, format!("#endif /* {} */", symbols.guard));

    out.into_string()
}

#[test]
fn nested_blocks_are_indented_by_depth() {
    use toml2c_schema::FieldKind;

    let mut schema = Schema::new("app_t");
    let root = schema.root();
    schema.push_field(root, Field::new("debug", FieldKind::Bool));
    let server = schema.add_child(root, "server");
    schema.push_field(server, Field::new("ratio", FieldKind::Double));
    schema.push_field(server, Field::new("ids", FieldKind::ArrayOfInt));

    let mut out = CodeWriter::new();
    walk(&schema, &mut RecordDeclaration, &mut out);
    assert_eq!(
        out.as_str(),
        "typedef struct {\n    bool debug;\n    struct {\n        double ratio;\n        int64_t* ids;\n        size_t ids_len;\n    } server;\n} app_t;\n"
    );
}

#[test]
fn declaration_has_guard_and_prototypes() {
    let schema = Schema::new("app_t");
    let text = emit_declaration(&schema, &GeneratorConfig::default());
    assert!(text.starts_with("#ifndef T2C_APP_H\n#define T2C_APP_H\n"));
    assert!(text.contains("int t2c_app_read(const char* file_path, app_t** out);"));
    assert!(text.contains("void t2c_app_print(const app_t* value);"));
    assert!(text.contains("void t2c_app_free(app_t* value);"));
    assert!(text.contains("extern \"C\" {"));
    assert!(text.trim_end().ends_with("#endif /* T2C_APP_H */"));
}
