#![cfg(test)]

use std::path::{Path, PathBuf};

use toml2c_compiler::{
    compile_document, compile_file, emit_declaration, emit_implementation,
    gen_source::{emit_free_routine, emit_print_routine, emit_read_routine},
    path,
    verify_identifiers, write_output, GeneratorConfig, T2cError,
};
use toml2c_compiler::writer::CodeWriter;
use toml2c_schema::Schema;

fn fixture() -> Schema {
    serde_json::from_str(include_str!("fixtures/nested.json")).expect("fixture should load")
}

fn compile(name: &str, text: &str) -> (Schema, String, String) {
    let (schema, output) = compile_document(Path::new(name), text, &GeneratorConfig::default())
        .expect("compile_document failed");
    (schema, output.header.contents, output.source.contents)
}

/// Lines of the root record block, between `typedef struct {` and its close.
fn record_body<'a>(header: &'a str, type_name: &str) -> Vec<&'a str> {
    let close = format!("}} {};", type_name);
    header
        .lines()
        .skip_while(|l| *l != "typedef struct {")
        .skip(1)
        .take_while(|l| *l != close)
        .collect()
}

#[test]
fn test_end_to_end_server() {
    let (schema, header, source) = compile("conf/server.toml", include_str!("fixtures/server.toml"));
    assert_eq!(schema.len(), 2);

    assert!(header.contains(
        "typedef struct {\n    char* title;\n    struct {\n        int64_t port;\n        char** tags;\n        size_t tags_len;\n    } server;\n} server_t;\n"
    ));
    assert!(header.contains("int t2c_server_read(const char* file_path, server_t** out);"));

    assert!(source.starts_with("#include \"t2c-server.h\"\n"));
    assert_eq!(source.matches("toml_table_in(").count(), 1);
    assert!(source.contains("if (!(root_server = toml_table_in(root, \"server\"))) {"));
    assert_eq!(source.matches("toml_string_in(").count(), 1);
    assert_eq!(source.matches("toml_int_in(").count(), 1);
    assert!(source.contains("(*out)->title = datum.u.s;"));
    assert!(source.contains("(*out)->server.port = datum.u.i;"));

    // One copy loop bounded by the runtime element count, then the length.
    assert_eq!(source.matches("for (int i = 0; i < toml_array_nelem(arr); ++i) {").count(), 1);
    assert!(source.contains("(*out)->server.tags[i] = datum.u.s;"));
    assert!(source.contains("(*out)->server.tags_len = toml_array_nelem(arr);"));
    assert!(!source.contains("< 2;"));
}

#[test]
fn test_scalar_only_member_count() {
    let text = r#"
        a = 1
        b = 2.0
        c = true
        d = "four"
        e = 1979-05-27
        f = [1, "mixed"]
    "#;
    let (_, header, _) = compile("flat.toml", text);
    let body = record_body(&header, "flat_t");
    assert_eq!(body, ["    int64_t a;", "    double b;", "    bool c;", "    char* d;"]);
}

#[test]
fn test_array_yields_pointer_and_length() {
    let (_, header, _) = compile("arr.toml", "ids = [1, 2, 3]\n");
    assert_eq!(record_body(&header, "arr_t"), ["    int64_t* ids;", "    size_t ids_len;"]);
}

#[test]
fn test_mixed_array_is_silently_dropped() {
    let (schema, header, source) = compile("mixed.toml", "values = [1, \"a\"]\n");
    assert_eq!(schema.fields().count(), 0);
    assert!(record_body(&header, "mixed_t").is_empty());
    assert!(!source.contains("values"));
    assert_eq!(verify_identifiers(&schema), ["The record type \"mixed_t\" has no members"]);
}

#[test]
fn test_member_paths_agree_across_passes() {
    let schema = fixture();
    let header = emit_declaration(&schema, &GeneratorConfig::default());
    let source = emit_implementation(&schema, &GeneratorConfig::default());

    for (node, field) in schema.fields() {
        let member = path::member(&schema, node, &field.name);
        assert_eq!(member.matches('.').count(), schema.node(node).depth);

        // Declared inside the block of its table, at the table's depth.
        let indent = "    ".repeat(schema.node(node).depth + 1);
        let declared = format!("\n{}{} {};\n", indent, field.kind.c_type(), field.name);
        assert!(header.contains(&declared), "{} not declared", member);

        assert!(source.contains(&format!("(*out)->{}", member)), "{} not read", member);
        assert!(source.contains(&format!("value->{}", member)), "{} not printed", member);
    }
}

#[test]
fn test_handles_are_declared_before_lookups() {
    let schema = fixture();
    let symbols = GeneratorConfig::default().symbols(&schema);
    let mut out = CodeWriter::new();
    emit_read_routine(&schema, &symbols, &mut out);
    let text = out.into_string();

    let declaration = "toml_table_t *root_http, *root_http_limits, *root_log;";
    let declared_at = text.find(declaration).expect("handles not declared");

    let lookups: Vec<&str> = text.lines().filter(|l| l.contains("toml_table_in(")).map(str::trim).collect();
    assert_eq!(
        lookups,
        [
            "if (!(root_http = toml_table_in(root, \"http\"))) {",
            "if (!(root_http_limits = toml_table_in(root_http, \"limits\"))) {",
            "if (!(root_log = toml_table_in(root, \"log\"))) {",
        ]
    );
    assert!(text.find(lookups[0]).unwrap() > declared_at);

    for id in schema.descendants() {
        let parent = path::parent(&schema, id);
        assert!(parent == "root" || text.contains(&format!("*{}", parent)));
    }
}

#[test]
fn test_lookup_failure_is_fatal() {
    let schema = fixture();
    let source = emit_implementation(&schema, &GeneratorConfig::default());
    assert!(source.contains(
        "fprintf(stderr, \"t2c_service_read() failed: failed locating [http.limits] table\\n\");"
    ));
    assert!(source.contains("failed locating key 'http.allowed-hosts'"));
    // Every failure after the parse releases the document; the three before it cannot.
    let releasing = source.matches("        toml_free(root);\n        return 1;\n").count();
    assert_eq!(releasing, 3 + 10);
    assert_eq!(source.matches("return 1;").count(), releasing + 3);
}

#[test]
fn test_print_routine_order() {
    let schema = fixture();
    let symbols = GeneratorConfig::default().symbols(&schema);
    let mut out = CodeWriter::new();
    emit_print_routine(&schema, &symbols, &mut out);
    let text = out.into_string();

    let printed: Vec<&str> = text.lines().map(str::trim).filter(|l| l.starts_with("printf(\"service.")).collect();
    assert_eq!(
        printed,
        [
            "printf(\"service.name = %s\\n\", value->name);",
            "printf(\"service.workers = %\" PRId64 \"\\n\", value->workers);",
            "printf(\"service.http.port = %\" PRId64 \"\\n\", value->http.port);",
            "printf(\"service.http.tls = %s\\n\", value->http.tls ? \"true\" : \"false\");",
            "printf(\"service.http.allowed_hosts[%zu] = %s\\n\", i, value->http.allowed_hosts[i]);",
            "printf(\"service.http.limits.rate = %f\\n\", value->http.limits.rate);",
            "printf(\"service.http.limits.burst[%zu] = %\" PRId64 \"\\n\", i, value->http.limits.burst[i]);",
            "printf(\"service.log.level = %s\\n\", value->log.level);",
            "printf(\"service.log.ratios[%zu] = %f\\n\", i, value->log.ratios[i]);",
            "printf(\"service.log.verbose = %s\\n\", value->log.verbose ? \"true\" : \"false\");",
        ]
    );
    assert!(text.contains("printf(\"Read service.toml values:\\n\");"));
}

#[test]
fn test_free_covers_exactly_heap_fields() {
    let schema = fixture();
    let symbols = GeneratorConfig::default().symbols(&schema);
    let mut out = CodeWriter::new();
    emit_free_routine(&schema, &symbols, &mut out);
    let text = out.into_string();

    let freed: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter_map(|l| l.strip_prefix("free(value->"))
        .filter(|l| !l.ends_with("[i]);"))
        .map(|l| l.trim_end_matches(");"))
        .collect();
    assert_eq!(freed, ["name", "http.allowed_hosts", "http.limits.burst", "log.level", "log.ratios"]);

    let expected: Vec<String> = schema
        .fields()
        .filter(|(_, f)| f.kind.owns_heap())
        .map(|(id, f)| path::member(&schema, id, &f.name))
        .collect();
    assert_eq!(freed, expected);

    assert_eq!(text.matches("free(value->http.allowed_hosts[i]);").count(), 1);
    assert!(text.trim_end().ends_with("free(value);\n}"));
}

#[test]
fn test_sanitized_keys_collide() {
    let (schema, header, source) = compile("dup.toml", "a-b = 1\na_b = 2\n");
    assert_eq!(header.matches("    int64_t a_b;\n").count(), 2);
    assert_eq!(source.matches("toml_int_in(root, \"a-b\")").count(), 1);
    assert_eq!(source.matches("toml_int_in(root, \"a_b\")").count(), 1);
    assert_eq!(verify_identifiers(&schema).len(), 1);
}

#[test]
fn test_underscore_keys_read_their_own_document() {
    let (_, _, source) = compile("pool.toml", "max_conn = 5\n[pool_opts]\nidle-timeout = 30\n");
    assert!(source.contains("datum = toml_int_in(root, \"max_conn\");"));
    assert!(source.contains("if (!(root_pool_opts = toml_table_in(root, \"pool_opts\"))) {"));
    assert!(source.contains("datum = toml_int_in(root_pool_opts, \"idle-timeout\");"));
    assert!(source.contains("(*out)->pool_opts.idle_timeout = datum.u.i;"));
    assert!(!source.contains("\"max-conn\""));
}

#[test]
fn test_flattened_handles_collide() {
    let (schema, _, source) = compile("collide.toml", "[x.y]\na = 1\n[x_y]\nb = 2\n");
    assert!(source.contains("toml_table_t *root_x, *root_x_y, *root_x_y;"));
    let warnings = verify_identifiers(&schema);
    assert_eq!(warnings, ["The table handle \"root_x_y\" is bound twice"]);
}

#[test]
fn test_tables_without_members_are_reported() {
    let (schema, header, _) = compile("dates.toml", "when = 1979-05-27\n");
    assert!(header.contains("typedef struct {\n} dates_t;\n"));
    assert_eq!(verify_identifiers(&schema), ["The record type \"dates_t\" has no members"]);

    let (schema, _, _) = compile("empty.toml", "a = 1\n[t]\nwhen = 1979-05-27\n");
    assert_eq!(verify_identifiers(&schema), ["The table \"t\" has no members"]);
}

#[test]
fn test_control_characters_in_keys_use_octal_escapes() {
    let (_, _, source) = compile("ctl.toml", "\"a\\u0001b\" = 1\n");
    assert!(source.contains("toml_int_in(root, \"a\\001b\")"));
    assert!(!source.contains("\\u0001"));
}

#[test]
fn test_parse_failure() {
    let result = compile_document(Path::new("bad.toml"), "key = = 1", &GeneratorConfig::default());
    match result {
        Err(T2cError::ParseError { path, message }) => {
            assert_eq!(path, PathBuf::from("bad.toml"));
            assert!(!message.is_empty());
        }
        other => panic!("expected a parse error, got {:?}", other.map(|(s, _)| s)),
    }
}

#[test]
fn test_missing_file() {
    let result = compile_file(Path::new("does/not/exist.toml"), &GeneratorConfig::default());
    assert!(matches!(result, Err(T2cError::Read { .. })));
}

#[test]
fn test_prefix_configuration() {
    let config = GeneratorConfig::default().with_prefix(Some("acme".into()));
    let (_, output) = compile_document(Path::new("my-app.toml"), "x = 1\n", &config).unwrap();
    assert_eq!(output.header.file_name, "acme-my_app.h");
    assert_eq!(output.source.file_name, "acme-my_app.c");
    assert!(output.source.contents.contains("int acme_my_app_read(const char* file_path, my_app_t** out) {"));

    let bare = GeneratorConfig::default().with_prefix(None);
    let (_, output) = compile_document(Path::new("my-app.toml"), "x = 1\n", &bare).unwrap();
    assert_eq!(output.header.file_name, "my_app.h");
    assert!(output.source.contents.starts_with("#include \"my_app.h\"\n"));
    assert!(output.source.contents.contains("void my_app_free(my_app_t* value) {"));
}

#[test]
fn test_write_output() {
    let dir = std::env::temp_dir().join(format!("toml2c-write-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let (_, output) = compile_document(Path::new("out.toml"), "x = 1\n", &GeneratorConfig::default()).unwrap();
    write_output(&output, &dir).unwrap();
    assert_eq!(std::fs::read_to_string(dir.join("t2c-out.h")).unwrap(), output.header.contents);
    assert_eq!(std::fs::read_to_string(dir.join("t2c-out.c")).unwrap(), output.source.contents);

    let missing = dir.join("missing");
    assert!(matches!(write_output(&output, &missing), Err(T2cError::Write { .. })));

    std::fs::remove_dir_all(&dir).unwrap();
}
