use std::path::{Path, PathBuf};

/// One generated file: its name (no directory) and its text.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub file_name: String,
    pub contents:  String,
}

impl Artifact {
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(&self.file_name)
    }
}

/// The declaration and implementation artifacts of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub header: Artifact,
    pub source: Artifact,
}
