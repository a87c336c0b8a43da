use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::colors::{ColorMode, Colors, ThemeMode};

#[derive(Parser, Debug)]
#[command(name = "contract-gen")]
#[command(author, version, about = "Compiles OpenAPI contracts into a resolved type model")]
#[command(styles = Colors::clap_styles())]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  /// Control color output
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub color: ColorMode,

  /// Terminal theme (dark or light background)
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub theme: ThemeMode,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// List information from a contract
  List {
    #[command(subcommand)]
    list_command: ListCommands,
  },
  /// Compile a contract and write the type model as JSON
  Generate(GenerateCommand),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateCommand {
  /// Path to the OpenAPI contract (JSON or YAML)
  #[arg(short, long, value_name = "FILE")]
  pub input: PathBuf,

  /// Where the compiled model is written; printed to stdout when omitted
  #[arg(short, long, value_name = "FILE")]
  pub output: Option<PathBuf>,

  /// Additional standalone JSON Schema files to compile alongside the contract
  #[arg(long = "schema", value_name = "FILE")]
  pub schemas: Vec<PathBuf>,

  /// Compile every schema under components/schemas, including ones no
  /// operation refers to
  #[arg(long, default_value_t = false)]
  pub all_schemas: bool,

  /// Include only specific operations (comma-separated identifiers)
  #[arg(long, value_name = "IDS", value_delimiter = ',')]
  pub only: Option<Vec<String>>,

  /// Exclude specific operations (comma-separated identifiers)
  #[arg(long, value_name = "IDS", value_delimiter = ',')]
  pub exclude: Option<Vec<String>>,

  /// Enable verbose output with detailed progress information
  #[arg(short, long, default_value_t = false)]
  pub verbose: bool,

  /// Suppress non-essential output (errors only)
  #[arg(short, long, default_value_t = false)]
  pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum ListCommands {
  /// List all operations and their method identifiers
  Operations {
    /// Path to the OpenAPI contract (JSON or YAML)
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,
  },
  /// List every named type the contract compiles to
  Types {
    /// Path to the OpenAPI contract (JSON or YAML)
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Include schemas no operation refers to
    #[arg(long, default_value_t = false)]
    all_schemas: bool,
  },
}
