//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};

/// Relex CLI - Run relation extraction strategies over documents.
#[derive(Debug, Parser)]
#[command(name = "relex")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "RELEX_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (one summary line per document)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one strategy over every document of an experiment bundle
    Run(RunArgs),

    /// Print the JSON schema an oracle call is constrained by
    Schema(SchemaArgs),
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Experiment bundle (JSON with documents, few_shot, schema_info, constraint_table)
    #[arg(short, long)]
    pub input: String,

    /// Extraction strategy
    #[arg(short, long, value_enum, default_value = "baseline")]
    pub strategy: StrategyArg,

    /// Write records as JSON to this file as well
    #[arg(short, long)]
    pub output: Option<String>,

    /// Override the configured model
    #[arg(short, long)]
    pub model: Option<String>,
}

/// Arguments for the schema command.
#[derive(Debug, Parser)]
pub struct SchemaArgs {
    /// Schema name
    #[arg(value_enum)]
    pub name: SchemaArg,
}

/// Strategy argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StrategyArg {
    /// Single extraction call
    Baseline,
    /// Generate, verify, then apply domain/range constraints
    Proposed,
    /// Entity-only extraction and pair classification
    EntityPair,
}

/// Output schema argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SchemaArg {
    /// Entities and relations
    Extraction,
    /// Entities only
    EntityOnly,
    /// Pair classification decisions
    PairClassification,
    /// Verification decisions
    Verification,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<StrategyArg> for relex_extractor::Strategy {
    fn from(strategy: StrategyArg) -> Self {
        match strategy {
            StrategyArg::Baseline => relex_extractor::Strategy::Baseline,
            StrategyArg::Proposed => relex_extractor::Strategy::Proposed,
            StrategyArg::EntityPair => relex_extractor::Strategy::EntityPair,
        }
    }
}

impl From<SchemaArg> for relex_domain::OutputSchema {
    fn from(schema: SchemaArg) -> Self {
        match schema {
            SchemaArg::Extraction => relex_domain::OutputSchema::Extraction,
            SchemaArg::EntityOnly => relex_domain::OutputSchema::EntityOnly,
            SchemaArg::PairClassification => relex_domain::OutputSchema::PairClassification,
            SchemaArg::Verification => relex_domain::OutputSchema::Verification,
        }
    }
}
