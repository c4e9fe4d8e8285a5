use toml2c_schema::Schema;

pub const DEFAULT_LIB_PREFIX: &str = "t2c";
pub const DEFAULT_TYPE_SUFFIX: &str = "_t";

/// Naming knobs for one generator run.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Namespace for exported functions (`t2c_x_read`) and artifacts (`t2c-x.h`).
    pub lib_prefix:  Option<String>,
    /// Appended to the base name to form the record type name.
    pub type_suffix: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            lib_prefix:  Some(DEFAULT_LIB_PREFIX.to_string()),
            type_suffix: DEFAULT_TYPE_SUFFIX.to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn with_prefix(mut self, prefix: Option<String>) -> Self {
        self.lib_prefix = prefix.filter(|p| !p.is_empty());
        self
    }

    pub fn root_type_name(&self, base_name: &str) -> String {
        format!("{}{}", base_name, self.type_suffix)
    }

    fn symbol_prefix(&self) -> String {
        match &self.lib_prefix {
            Some(prefix) => format!("{}_", prefix),
            None => String::new(),
        }
    }

    fn file_prefix(&self) -> String {
        match &self.lib_prefix {
            Some(prefix) => format!("{}-", prefix),
            None => String::new(),
        }
    }

    /// Every generated name derived from the root of `schema`.
    pub fn symbols(&self, schema: &Schema) -> Symbols {
        let type_name = schema.node(schema.root()).name.clone();
        let base = type_name
            .strip_suffix(self.type_suffix.as_str())
            .unwrap_or(&type_name)
            .to_string();
        let symbol_prefix = self.symbol_prefix();
        let header_file = format!("{}{}.h", self.file_prefix(), base);
        let guard = header_file
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();

        Symbols {
            read_fn:     format!("{}{}_read", symbol_prefix, base),
            print_fn:    format!("{}{}_print", symbol_prefix, base),
            free_fn:     format!("{}{}_free", symbol_prefix, base),
            source_file: format!("{}{}.c", self.file_prefix(), base),
            header_file,
            guard,
            type_name,
            base,
        }
    }
}

/// Names shared by the declaration and implementation passes.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbols {
    pub type_name:   String,
    pub base:        String,
    pub read_fn:     String,
    pub print_fn:    String,
    pub free_fn:     String,
    pub header_file: String,
    pub source_file: String,
    pub guard:       String,
}

#[test]
fn default_symbols() {
    let schema = Schema::new("my_app_t");
    let symbols = GeneratorConfig::default().symbols(&schema);
    assert_eq!(symbols.base, "my_app");
    assert_eq!(symbols.type_name, "my_app_t");
    assert_eq!(symbols.read_fn, "t2c_my_app_read");
    assert_eq!(symbols.print_fn, "t2c_my_app_print");
    assert_eq!(symbols.free_fn, "t2c_my_app_free");
    assert_eq!(symbols.header_file, "t2c-my_app.h");
    assert_eq!(symbols.source_file, "t2c-my_app.c");
    assert_eq!(symbols.guard, "T2C_MY_APP_H");
}

#[test]
fn symbols_without_prefix() {
    let schema = Schema::new("cfg_t");
    let symbols = GeneratorConfig::default().with_prefix(None).symbols(&schema);
    assert_eq!(symbols.read_fn, "cfg_read");
    assert_eq!(symbols.header_file, "cfg.h");
    assert_eq!(symbols.source_file, "cfg.c");

    let empty = GeneratorConfig::default().with_prefix(Some(String::new()));
    assert_eq!(empty.lib_prefix, None);
}

#[test]
fn custom_suffix() {
    let config = GeneratorConfig { lib_prefix: Some("acme".into()), type_suffix: "_rec".into() };
    assert_eq!(config.root_type_name("cfg"), "cfg_rec");
    let symbols = config.symbols(&Schema::new("cfg_rec"));
    assert_eq!(symbols.base, "cfg");
    assert_eq!(symbols.free_fn, "acme_cfg_free");
}
