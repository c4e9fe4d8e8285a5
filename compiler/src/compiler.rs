use std::path::Path;

use toml2c_schema::{base_name, build_schema, Schema};
use tracing::{debug, info};

use crate::{
    config::GeneratorConfig,
    error::T2cError,
    gen_header::emit_declaration,
    gen_source::emit_implementation,
    types::{Artifact, Output},
};

/// Parses `text` as TOML, reporting failures against `path`.
pub fn parse_document(path: &Path, text: &str) -> Result<toml::Table, T2cError> {
    toml::from_str::<toml::Table>(text).map_err(|e| T2cError::ParseError {
        path:    path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Infers the schema of the document at `path` whose contents are `text`.
pub fn infer_schema(path: &Path, text: &str, config: &GeneratorConfig) -> Result<Schema, T2cError> {
    let document = parse_document(path, text)?;
    let root_name = config.root_type_name(&base_name(path));
    let schema = build_schema(&document, &root_name);
    debug!(
        root = %root_name,
        tables = schema.len(),
        fields = schema.fields().count(),
        "inferred schema"
    );
    Ok(schema)
}

/// Generates both artifacts for an already inferred schema.
pub fn generate(schema: &Schema, config: &GeneratorConfig) -> Output {
    let symbols = config.symbols(schema);
    Output {
        header: Artifact {
            file_name: symbols.header_file,
            contents:  emit_declaration(schema, config),
        },
        source: Artifact {
            file_name: symbols.source_file,
            contents:  emit_implementation(schema, config),
        },
    }
}

/// Infer and generate in one step: `(Schema, Output)`.
/// Returns `Err(T2cError::ParseError)` if the example document is malformed.
pub fn compile_document(path: &Path, text: &str, config: &GeneratorConfig) -> Result<(Schema, Output), T2cError> {
    let schema = infer_schema(path, text, config)?;
    let output = generate(&schema, config);
    Ok((schema, output))
}

/// Reads the example document from disk and compiles it.
pub fn compile_file(path: &Path, config: &GeneratorConfig) -> Result<(Schema, Output), T2cError> {
    let text = std::fs::read_to_string(path).map_err(|source| T2cError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    compile_document(path, &text, config)
}

/// Writes both artifacts into `dir`, header first.
pub fn write_output(output: &Output, dir: &Path) -> Result<(), T2cError> {
    for artifact in [&output.header, &output.source] {
        let path = artifact.path_in(dir);
        std::fs::write(&path, &artifact.contents).map_err(|source| T2cError::Write {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "wrote artifact");
    }
    Ok(())
}
