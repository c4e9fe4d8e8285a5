use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use toml2c_schema::Schema;

use crate::{path, utils::quote};

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

pub const C_KEYWORDS: [&str; 44] = [
    "auto", "break", "case", "char", "const", "continue", "default", "do",
    "double", "else", "enum", "extern", "float", "for", "goto", "if",
    "inline", "int", "long", "register", "restrict", "return", "short", "signed",
    "sizeof", "static", "struct", "switch", "typedef", "union", "unsigned", "void",
    "volatile", "while", "_Alignas", "_Alignof", "_Atomic", "_Bool", "_Complex", "_Generic",
    "_Imaginary", "_Noreturn", "_Static_assert", "_Thread_local",
];

/// Names in `schema` that will not compile as C identifiers, and tables that
/// would generate ill-formed C.
///
/// Nothing here changes the generated code; the caller decides whether the
/// returned warnings are fatal.
pub fn verify_identifiers(schema: &Schema) -> Vec<String> {
    let mut warnings = Vec::new();

    for id in schema.preorder() {
        let table = schema.node(id);
        let what = if table.is_root() { "record type" } else { "table" };
        check_name(what, &table.name, &mut warnings);

        // ISO C has no empty structs.
        if table.fields.is_empty() && table.children.is_empty() {
            warnings.push(format!("The {} {} has no members", what, quote(&table.name)));
        }

        // Fields and child tables share one C struct scope.
        let mut seen: HashSet<&str> = HashSet::new();
        for field in &table.fields {
            check_name("field", &field.name, &mut warnings);
            if !seen.insert(&field.name) {
                warnings.push(duplicate(&table.name, &field.name));
            }
            if field.kind.is_array() {
                let len_member = format!("{}_len", field.name);
                if table.fields.iter().any(|f| f.name == len_member) {
                    warnings.push(duplicate(&table.name, &len_member));
                }
            }
        }
        for &child in &table.children {
            let name = &schema.node(child).name;
            if !seen.insert(name) {
                warnings.push(duplicate(&table.name, name));
            }
        }
    }

    // Handles of all tables share the read routine's scope.
    let mut handles: HashSet<String> = HashSet::new();
    for id in schema.descendants() {
        let handle = path::local(schema, id);
        if !handles.insert(handle.clone()) {
            warnings.push(format!("The table handle {} is bound twice", quote(&handle)));
        }
    }

    warnings
}

fn check_name(what: &str, name: &str, warnings: &mut Vec<String>) {
    if !IDENTIFIER.is_match(name) {
        warnings.push(format!("The {} name {} is not a valid C identifier", what, quote(name)));
    } else if C_KEYWORDS.contains(&name) {
        warnings.push(format!("The {} name {} is a C keyword", what, quote(name)));
    }
}

fn duplicate(table: &str, member: &str) -> String {
    format!("The member {} is declared twice in {}", quote(member), quote(table))
}

#[test]
fn clean_schema_has_no_warnings() {
    use toml2c_schema::{Field, FieldKind};

    let mut schema = Schema::new("app_t");
    let server = schema.add_child(schema.root(), "server");
    schema.push_field(server, Field::new("port", FieldKind::Int));
    assert!(verify_identifiers(&schema).is_empty());
}

#[test]
fn reports_invalid_and_reserved_names() {
    use toml2c_schema::{Field, FieldKind};

    let mut schema = Schema::new("my.app_t");
    let root = schema.root();
    schema.push_field(root, Field::new("int", FieldKind::Int));
    schema.push_field(root, Field::new("2fast", FieldKind::Bool));
    let warnings = verify_identifiers(&schema);
    assert_eq!(warnings.len(), 3);
    assert!(warnings[0].contains("\"my.app_t\""));
    assert!(warnings[1].contains("C keyword"));
    assert!(warnings[2].contains("\"2fast\""));
}

#[test]
fn reports_sanitized_collisions() {
    use toml2c_schema::{Field, FieldKind};

    let mut schema = Schema::new("app_t");
    let root = schema.root();
    schema.push_field(root, Field::new("a_b", FieldKind::Int));
    schema.push_field(root, Field::new("a_b", FieldKind::Int));
    schema.push_field(root, Field::new("tags", FieldKind::ArrayOfString));
    schema.push_field(root, Field::new("tags_len", FieldKind::Int));
    let child = schema.add_child(root, "a_b");
    schema.push_field(child, Field::new("c", FieldKind::Int));
    let warnings = verify_identifiers(&schema);
    assert_eq!(warnings.len(), 3);
    assert!(warnings.iter().all(|w| w.contains("declared twice")));
}

#[test]
fn reports_colliding_table_handles() {
    use toml2c_schema::{Field, FieldKind};

    let mut schema = Schema::new("app_t");
    let root = schema.root();
    let x = schema.add_child(root, "x");
    let y = schema.add_child(x, "y");
    schema.push_field(y, Field::new("a", FieldKind::Int));
    let x_y = schema.add_child(root, "x_y");
    schema.push_field(x_y, Field::new("b", FieldKind::Int));

    let warnings = verify_identifiers(&schema);
    assert_eq!(warnings, ["The table handle \"root_x_y\" is bound twice"]);
}

#[test]
fn reports_tables_without_members() {
    use toml2c_schema::{Field, FieldKind};

    let schema = Schema::new("app_t");
    assert_eq!(verify_identifiers(&schema), ["The record type \"app_t\" has no members"]);

    let mut schema = Schema::new("app_t");
    let root = schema.root();
    schema.push_field(root, Field::new("a", FieldKind::Int));
    let outer = schema.add_child(root, "outer");
    schema.add_child(outer, "inner");
    assert_eq!(verify_identifiers(&schema), ["The table \"inner\" has no members"]);
}
