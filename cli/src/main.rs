use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{warn, Level};

use toml2c_compiler::config::DEFAULT_LIB_PREFIX;
use toml2c_compiler::{compile_file, verify_identifiers, write_output, GeneratorConfig, T2cError};

#[derive(Parser, Debug)]
#[command(name = "toml2c")]
#[command(about = "Generate a C record type and its reader from an example TOML file", long_about = None)]
struct Cli {
    /// Example `.toml` document to infer the record type from
    input: PathBuf,

    /// Namespace for generated functions and file names
    #[arg(long, default_value = DEFAULT_LIB_PREFIX, conflicts_with = "no_prefix")]
    prefix: String,

    /// Generate functions and files without a namespace
    #[arg(long)]
    no_prefix: bool,

    /// Directory the `.h` and `.c` files are written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Print the inferred schema as JSON instead of generating code
    #[arg(long)]
    emit_schema: bool,

    /// Treat identifier warnings as errors
    #[arg(long)]
    strict: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn config(&self) -> GeneratorConfig {
        let prefix = if self.no_prefix { None } else { Some(self.prefix.clone()) };
        GeneratorConfig::default().with_prefix(prefix)
    }

    fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

fn run(cli: &Cli) -> Result<(), T2cError> {
    let config = cli.config();
    let (schema, output) = compile_file(&cli.input, &config)?;

    let warnings = verify_identifiers(&schema);
    for warning in &warnings {
        warn!("{}", warning);
    }
    if cli.strict && !warnings.is_empty() {
        return Err(T2cError::VerifierError(warnings.join("; ")));
    }

    if cli.emit_schema {
        let json = serde_json::to_string_pretty(&schema)
            .map_err(|e| T2cError::EncodeError(e.to_string()))?;
        println!("{}", json);
        return Ok(());
    }

    write_output(&output, &cli.out_dir)?;
    println!(
        "Generated {} and {}",
        output.header.path_in(&cli.out_dir).display(),
        output.source.path_in(&cli.out_dir).display()
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            _ => {
                let _ = err.print();
                return ExitCode::from(1);
            }
        },
    };

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::from(1)
        }
    }
}

#[test]
fn input_is_required() {
    let err = Cli::try_parse_from(["toml2c"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn defaults() {
    let cli = Cli::try_parse_from(["toml2c", "conf/app.toml"]).unwrap();
    assert_eq!(cli.input, PathBuf::from("conf/app.toml"));
    assert_eq!(cli.out_dir, PathBuf::from("."));
    assert_eq!(cli.config(), GeneratorConfig::default());
    assert_eq!(cli.log_level(), Level::WARN);
}

#[test]
fn prefix_flags() {
    let cli = Cli::try_parse_from(["toml2c", "app.toml", "--no-prefix", "-vv"]).unwrap();
    assert_eq!(cli.config().lib_prefix, None);
    assert_eq!(cli.log_level(), Level::DEBUG);

    let cli = Cli::try_parse_from(["toml2c", "app.toml", "--prefix", "acme"]).unwrap();
    assert_eq!(cli.config().lib_prefix.as_deref(), Some("acme"));

    assert!(Cli::try_parse_from(["toml2c", "app.toml", "--prefix", "acme", "--no-prefix"]).is_err());
}

#[test]
fn single_input_only() {
    assert!(Cli::try_parse_from(["toml2c", "a.toml", "b.toml"]).is_err());
}
