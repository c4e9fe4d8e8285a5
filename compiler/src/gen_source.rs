//! The implementation artifact: `read`, `print` and `free` for the record.
//!
//! Each routine is one or more [`walk`]s over the schema. Tables are bound to
//! local handles named by [`path::local`], looked up from [`path::parent`],
//! and fields land in the record member named by [`path::member`]. Lookups
//! and their failure messages use the keys as written in the document.

use toml2c_schema::{Field, FieldKind, NodeId, Schema};

use crate::{
    config::{GeneratorConfig, Symbols},
    path::{self, PathKind, ROOT_HANDLE},
    traits::{walk, SchemaVisitor},
    utils::{format_literal, quote},
    writer::CodeWriter,
};

/// tomlc99 accessor family and `toml_datum_t` union member for a kind.
fn accessor(kind: FieldKind) -> Option<(&'static str, &'static str)> {
    match kind {
        FieldKind::Int | FieldKind::ArrayOfInt => Some(("int", "i")),
        FieldKind::Double | FieldKind::ArrayOfDouble => Some(("double", "d")),
        FieldKind::Bool | FieldKind::ArrayOfBool => Some(("bool", "b")),
        FieldKind::String | FieldKind::ArrayOfString => Some(("string", "s")),
        FieldKind::Array => None,
    }
}

/// Key path of a table or field as written in the document, for messages.
fn key_path(schema: &Schema, node: NodeId, leaf: Option<&str>) -> String {
    format_literal(&path::path(schema, node, PathKind::Key, leaf))
}

fn emit_read_failure(symbols: &Symbols, message: &str, out: &mut CodeWriter) {
    out.line(2, format!("fprintf(stderr, \"{}() failed: {}\\n\");", symbols.read_fn, message));
    out.line(2, format!("toml_free({});", ROOT_HANDLE));
    out.line(2, "return 1;");
}

/// Collects the local handle of every table below the root.
#[derive(Default)]
pub struct TableHandles {
    pub names: Vec<String>,
}

impl SchemaVisitor for TableHandles {
    fn enter_table(&mut self, schema: &Schema, node: NodeId, _out: &mut CodeWriter) {
        if !schema.node(node).is_root() {
            self.names.push(path::local(schema, node));
        }
    }
}

/// Binds every table below the root to its handle, failing on absent tables.
pub struct TableLookups<'a> {
    pub symbols: &'a Symbols,
}

impl SchemaVisitor for TableLookups<'_> {
    fn enter_table(&mut self, schema: &Schema, node: NodeId, out: &mut CodeWriter) {
        let table = schema.node(node);
        if table.is_root() {
            return;
        }
        out.line(1, format!(
            "if (!({} = toml_table_in({}, {}))) {{",
            path::local(schema, node),
            path::parent(schema, node),
            quote(&table.key),
        ));
        let message = format!("failed locating [{}] table", key_path(schema, node, None));
        emit_read_failure(self.symbols, &message, out);
        out.line(1, "}");
    }
}

/// Copies every field out of its table handle into the record.
pub struct FieldReads<'a> {
    pub symbols: &'a Symbols,
}

impl SchemaVisitor for FieldReads<'_> {
    fn visit_field(&mut self, schema: &Schema, node: NodeId, field: &Field, out: &mut CodeWriter) {
        let Some((family, member)) = accessor(field.kind) else {
            return;
        };
        let handle = path::local(schema, node);
        let target = format!("(*out)->{}", path::member(schema, node, &field.name));
        let missing = format!("failed locating key '{}'", key_path(schema, node, Some(field.key.as_str())));

        if let Some(element) = field.kind.element_c_type() {
            out.line(1, format!("arr = toml_array_in({}, {});", handle, quote(&field.key)));
            out.line(1, "if (!arr) {");
            emit_read_failure(self.symbols, &missing, out);
            out.line(1, "}");
            out.line(1, format!("{} = malloc(toml_array_nelem(arr) * sizeof({}));", target, element));
            out.line(1, "for (int i = 0; i < toml_array_nelem(arr); ++i) {");
            out.line(2, format!("datum = toml_{}_at(arr, i);", family));
            out.line(2, format!("{}[i] = datum.u.{};", target, member));
            out.line(1, "}");
            out.line(1, format!("{}_len = toml_array_nelem(arr);", target));
        } else {
            out.line(1, format!("datum = toml_{}_in({}, {});", family, handle, quote(&field.key)));
            out.line(1, "if (!datum.ok) {");
            emit_read_failure(self.symbols, &missing, out);
            out.line(1, "}");
            out.line(1, format!("{} = datum.u.{};", target, member));
        }
    }
}

/// One `printf` per scalar, one index loop per array.
pub struct FieldPrints<'a> {
    pub symbols: &'a Symbols,
}

impl SchemaVisitor for FieldPrints<'_> {
    fn visit_field(&mut self, schema: &Schema, node: NodeId, field: &Field, out: &mut CodeWriter) {
        let member = path::member(schema, node, &field.name);
        let label = format_literal(&format!("{}.{}", self.symbols.base, member));
        let value = format!("value->{}", member);

        let (conversion, arg) = match field.kind {
            FieldKind::Int | FieldKind::ArrayOfInt => ("%\" PRId64 \"", "{}"),
            FieldKind::Double | FieldKind::ArrayOfDouble => ("%f", "{}"),
            FieldKind::Bool | FieldKind::ArrayOfBool => ("%s", "{} ? \"true\" : \"false\""),
            FieldKind::String | FieldKind::ArrayOfString => ("%s", "{}"),
            FieldKind::Array => return,
        };

        if field.kind.is_array() {
            out.line(1, format!("for (size_t i = 0; i < {}_len; ++i) {{", value));
            out.line(2, format!(
                "printf(\"{}[%zu] = {}\\n\", i, {});",
                label,
                conversion,
                arg.replace("{}", &format!("{}[i]", value)),
            ));
            out.line(1, "}");
        } else {
            out.line(1, format!(
                "printf(\"{} = {}\\n\", {});",
                label,
                conversion,
                arg.replace("{}", &value),
            ));
        }
    }
}

/// Releases every heap-owning member, in declaration order.
pub struct FieldFrees;

impl SchemaVisitor for FieldFrees {
    fn visit_field(&mut self, schema: &Schema, node: NodeId, field: &Field, out: &mut CodeWriter) {
        if !field.kind.owns_heap() {
            return;
        }
        let value = format!("value->{}", path::member(schema, node, &field.name));
        if field.kind == FieldKind::ArrayOfString {
            out.line(1, format!("for (size_t i = 0; i < {}_len; ++i) {{", value));
            out.line(2, format!("free({}[i]);", value));
            out.line(1, "}");
        }
        out.line(1, format!("free({});", value));
    }
}

pub fn emit_read_routine(schema: &Schema, symbols: &Symbols, out: &mut CodeWriter) {
    out.line(0, format!(
        "int {}(const char* file_path, {}** out) {{",
        symbols.read_fn, symbols.type_name
    ));
    out.line(1, "FILE* fp;");
    out.line(1, format!("toml_table_t* {};", ROOT_HANDLE));
    out.line(1, "char errbuf[200];");
    out.blank();
    out.line(1, "if (*out == NULL) {");
    out.line(2, format!("*out = calloc(1, sizeof({}));", symbols.type_name));
    out.line(2, "if (*out == NULL) {");
    out.line(3, format!("fprintf(stderr, \"{}() failed: out of memory\\n\");", symbols.read_fn));
    out.line(3, "return 1;");
    out.line(2, "}");
    out.line(1, "}");
    out.blank();
    out.line(1, "/* Open the file. */");
    out.line(1, "if (0 == (fp = fopen(file_path, \"r\"))) {");
    out.line(2, format!("fprintf(stderr, \"{}() failed: couldn't open %s\\n\", file_path);", symbols.read_fn));
    out.line(2, "return 1;");
    out.line(1, "}");
    out.blank();
    out.line(1, "/* Run the file through the parser. */");
    out.line(1, format!("{} = toml_parse_file(fp, errbuf, sizeof(errbuf));", ROOT_HANDLE));
    out.line(1, "fclose(fp);");
    out.line(1, format!("if (0 == {}) {{", ROOT_HANDLE));
    out.line(2, format!(
        "fprintf(stderr, \"{}() failed: error while parsing %s: %s\\n\", file_path, errbuf);",
        symbols.read_fn
    ));
    out.line(2, "return 1;");
    out.line(1, "}");

    let mut handles = TableHandles::default();
    walk(schema, &mut handles, out);
    if !handles.names.is_empty() {
        out.blank();
        out.line(1, "/* Tables. */");
        let declared: Vec<String> = handles.names.iter().map(|name| format!("*{}", name)).collect();
        out.line(1, format!("toml_table_t {};", declared.join(", ")));
        walk(schema, &mut TableLookups { symbols }, out);
    }

    let needs_datum = schema.fields().any(|(_, f)| accessor(f.kind).is_some());
    let needs_arr = schema.fields().any(|(_, f)| f.kind.element_c_type().is_some() && accessor(f.kind).is_some());
    if needs_datum {
        out.blank();
        out.line(1, "/* Fields. */");
        out.line(1, "toml_datum_t datum;");
        if needs_arr {
            out.line(1, "toml_array_t* arr;");
        }
        walk(schema, &mut FieldReads { symbols }, out);
    }

    out.blank();
    out.line(1, format!("toml_free({});", ROOT_HANDLE));
    out.line(1, "return 0;");
    out.line(0, "}");
}

pub fn emit_print_routine(schema: &Schema, symbols: &Symbols, out: &mut CodeWriter) {
    out.line(0, format!("void {}(const {}* value) {{", symbols.print_fn, symbols.type_name));
    out.line(1, format!("printf(\"Read {}.toml values:\\n\");", format_literal(&symbols.base)));
    walk(schema, &mut FieldPrints { symbols }, out);
    out.line(1, "fflush(stdout);");
    out.line(0, "}");
}

pub fn emit_free_routine(schema: &Schema, symbols: &Symbols, out: &mut CodeWriter) {
    out.line(0, format!("void {}({}* value) {{", symbols.free_fn, symbols.type_name));
    out.line(1, "if (value == NULL) {");
    out.line(2, "return;");
    out.line(1, "}");
    walk(schema, &mut FieldFrees, out);
    out.line(1, "free(value);");
    out.line(0, "}");
}

/// Generates the implementation artifact for `schema`.
pub fn emit_implementation(schema: &Schema, config: &GeneratorConfig) -> String {
    let symbols = config.symbols(schema);
    let mut out = CodeWriter::new();

    out.line(0, format!("#include {}", quote(&symbols.header_file)));
    out.line(0, "#include <inttypes.h>");
    out.line(0, "#include <stdlib.h>");
    out.line(0, "#include <toml.h>");
    out.blank();
    emit_read_routine(schema, &symbols, &mut out);
    out.blank();
    emit_print_routine(schema, &symbols, &mut out);
    out.blank();
    emit_free_routine(schema, &symbols, &mut out);

    out.into_string()
}

#[cfg(test)]
fn symbols_for(schema: &Schema) -> Symbols {
    GeneratorConfig::default().symbols(schema)
}

#[test]
fn lookups_resolve_from_parent_handles() {
    let mut schema = Schema::new("app_t");
    let server = schema.add_child(schema.root(), "server");
    schema.add_child(server, "tls-opts");
    let symbols = symbols_for(&schema);

    let mut out = CodeWriter::new();
    walk(&schema, &mut TableLookups { symbols: &symbols }, &mut out);
    let text = out.into_string();
    assert!(text.contains("if (!(root_server = toml_table_in(root, \"server\"))) {"));
    assert!(text.contains("if (!(root_server_tls_opts = toml_table_in(root_server, \"tls-opts\"))) {"));
    assert!(text.contains("failed locating [server.tls-opts] table"));
}

#[test]
fn scalar_read_checks_presence() {
    let mut schema = Schema::new("app_t");
    let server = schema.add_child(schema.root(), "server");
    schema.push_field(server, Field::new("max-conn", FieldKind::Int));
    let symbols = symbols_for(&schema);

    let mut out = CodeWriter::new();
    walk(&schema, &mut FieldReads { symbols: &symbols }, &mut out);
    assert_eq!(
        out.as_str(),
        "    datum = toml_int_in(root_server, \"max-conn\");\n\
         \x20   if (!datum.ok) {\n\
         \x20       fprintf(stderr, \"t2c_app_read() failed: failed locating key 'server.max-conn'\\n\");\n\
         \x20       toml_free(root);\n\
         \x20       return 1;\n\
         \x20   }\n\
         \x20   (*out)->server.max_conn = datum.u.i;\n"
    );
}

#[test]
fn lookups_use_keys_as_written() {
    let mut schema = Schema::new("app_t");
    let root = schema.root();
    schema.push_field(root, Field::new("max_conn", FieldKind::Int));
    schema.push_field(root, Field::new("allowed_hosts", FieldKind::ArrayOfString));
    let pool = schema.add_child(root, "pool_opts");
    schema.push_field(pool, Field::new("idle-timeout", FieldKind::Int));
    let text = emit_implementation(&schema, &GeneratorConfig::default());

    assert!(text.contains("datum = toml_int_in(root, \"max_conn\");"));
    assert!(text.contains("arr = toml_array_in(root, \"allowed_hosts\");"));
    assert!(text.contains("toml_table_in(root, \"pool_opts\")"));
    assert!(text.contains("datum = toml_int_in(root_pool_opts, \"idle-timeout\");"));
    assert!(text.contains("failed locating key 'pool_opts.idle-timeout'"));
    assert!(!text.contains("max-conn"));
    assert!(!text.contains("pool-opts"));
}

#[test]
fn bool_arrays_use_bool_elements() {
    let mut schema = Schema::new("app_t");
    schema.push_field(schema.root(), Field::new("flags", FieldKind::ArrayOfBool));
    let symbols = symbols_for(&schema);

    let mut out = CodeWriter::new();
    walk(&schema, &mut FieldReads { symbols: &symbols }, &mut out);
    let text = out.into_string();
    assert!(text.contains("(*out)->flags = malloc(toml_array_nelem(arr) * sizeof(bool));"));
    assert!(text.contains("datum = toml_bool_at(arr, i);"));
    assert!(text.contains("(*out)->flags_len = toml_array_nelem(arr);"));
}

#[test]
fn booleans_print_as_words() {
    let mut schema = Schema::new("app_t");
    schema.push_field(schema.root(), Field::new("debug", FieldKind::Bool));
    let symbols = symbols_for(&schema);

    let mut out = CodeWriter::new();
    walk(&schema, &mut FieldPrints { symbols: &symbols }, &mut out);
    assert_eq!(
        out.as_str(),
        "    printf(\"app.debug = %s\\n\", value->debug ? \"true\" : \"false\");\n"
    );
}

#[test]
fn untyped_arrays_are_declared_but_not_read() {
    let mut schema = Schema::new("app_t");
    schema.push_field(schema.root(), Field::new("blob", FieldKind::Array));
    let text = emit_implementation(&schema, &GeneratorConfig::default());
    assert!(!text.contains("\"blob\""));
    assert!(!text.contains("toml_datum_t datum;"));
    assert!(text.contains("free(value->blob);"));
}
