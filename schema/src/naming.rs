use std::path::Path;

const DOCUMENT_EXTENSION: &str = ".toml";

/// Turns a document key into an identifier: every `-` becomes `_`.
///
/// This is not injective, `a-b` and `a_b` both map to `a_b`.
pub fn sanitize(key: &str) -> String {
    key.replace('-', "_")
}

/// File name without directory and trailing `.toml`, sanitized.
pub fn base_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name
        .strip_suffix(DOCUMENT_EXTENSION)
        .unwrap_or(&file_name);
    sanitize(stem)
}

#[test]
fn sanitize_replaces_hyphens() {
    assert_eq!(sanitize("max-conn"), "max_conn");
    assert_eq!(sanitize("a-b-c"), "a_b_c");
    assert_eq!(sanitize("plain"), "plain");
}

#[test]
fn sanitize_is_not_injective() {
    assert_eq!(sanitize("a-b"), sanitize("a_b"));
}

#[test]
fn base_name_strips_directory_and_extension() {
    assert_eq!(base_name(Path::new("conf/my-app.toml")), "my_app");
    assert_eq!(base_name(Path::new("/etc/server.toml")), "server");
    assert_eq!(base_name(Path::new("settings")), "settings");
    assert_eq!(base_name(Path::new("a.toml.toml")), "a.toml");
}
