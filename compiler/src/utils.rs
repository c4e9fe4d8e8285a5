use std::fmt::Write;

/// Quotes `text` as a C string literal.
///
/// Control characters become three-digit octal escapes, so a following digit
/// never extends them. Non-ASCII text is passed through as UTF-8.
pub fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c.is_ascii_control() => {
                let _ = write!(quoted, "\\{:03o}", c as u32);
            }
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Escapes `text` for use inside a `printf` format string literal.
pub fn format_literal(text: &str) -> String {
    let quoted = quote(text);
    quoted[1..quoted.len() - 1].replace('%', "%%")
}

#[test]
fn quote_escapes() {
    assert_eq!(quote("server"), "\"server\"");
    assert_eq!(quote("a\"b"), "\"a\\\"b\"");
    assert_eq!(quote("a\\b\tc\n"), r#""a\\b\tc\n""#);
}

#[test]
fn control_characters_use_octal_escapes() {
    assert_eq!(quote("a\u{1}b"), r#""a\001b""#);
    assert_eq!(quote("\u{1}7"), r#""\0017""#);
    assert_eq!(quote("del\u{7f}"), r#""del\177""#);
    assert_eq!(quote("caf\u{e9}"), "\"caf\u{e9}\"");
    assert!(!quote("\u{1f}").contains("\\u"));
}

#[test]
fn format_literal_escapes_percent() {
    assert_eq!(format_literal("100%"), "100%%");
    assert_eq!(format_literal("plain"), "plain");
}
