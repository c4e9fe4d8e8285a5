const INDENT: &str = "    ";

/// Line-oriented output sink for generated C.
#[derive(Debug, Default)]
pub struct CodeWriter {
    out: String,
}

impl CodeWriter {
    pub fn new() -> Self {
        CodeWriter { out: String::new() }
    }

    /// Writes `text` on its own line, indented `level` steps.
    pub fn line(&mut self, level: usize, text: impl AsRef<str>) {
        for _ in 0..level {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Writes `text` verbatim.
    pub fn raw(&mut self, text: &str) {
        self.out.push_str(text);
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

#[test]
fn lines_are_indented() {
    let mut w = CodeWriter::new();
    w.line(0, "struct {");
    w.line(1, "int x;");
    w.blank();
    w.raw("}");
    assert_eq!(w.into_string(), "struct {\n    int x;\n\n}");
}
