//! @ai:module:intent CLI entry point for the asti interface extractor
//! @ai:module:layer presentation
//! @ai:module:public_api main
//! @ai:module:depends_on parser, output

use asti_parser::{output, Error, OutputFormat, Parser as PackageParser};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "asti")]
#[command(author, version, about = "Extract annotated service interfaces from Go packages")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a package and print the extraction result
    Parse {
        /// Path to the package directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Annotation prefix to look for
        #[arg(long, default_value = asti_parser::DEFAULT_PREFIX)]
        prefix: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "json-pretty")]
        format: Format,
    },

    /// Check every annotated interface against the calling convention
    Validate {
        /// Path to the package directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Annotation prefix to look for
        #[arg(long, default_value = asti_parser::DEFAULT_PREFIX)]
        prefix: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    JsonPretty,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            path,
            prefix,
            format,
        } => {
            let parser = PackageParser::with_prefix(prefix);
            match parser.parse_package(&path) {
                Ok(package) => {
                    println!("{}", output::format_package(&package, format.into()));
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    ExitCode::from(2)
                }
            }
        }

        Commands::Validate {
            path,
            prefix,
            format,
        } => {
            let parser = PackageParser::with_prefix(prefix).strict(true);
            match parser.parse_package(&path) {
                Ok(package) => {
                    println!("{}", output::format_package(&package, format.into()));
                    ExitCode::SUCCESS
                }
                Err(e @ Error::Validation { .. }) => {
                    eprintln!("{}", e);
                    ExitCode::from(1)
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    ExitCode::from(2)
                }
            }
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}
