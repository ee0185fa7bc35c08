//! Run command implementation.

use crate::cli::RunArgs;
use crate::config::{Config, OutputFormat};
use crate::error::{CliError, Result};
use crate::input::Bundle;
use crate::output::Formatter;
use relex_domain::Oracle;
use relex_extractor::{ExtractionRecord, Extractor, Strategy};
use relex_oracle::OllamaOracle;
use std::fmt::Display;
use std::fs;
use std::path::Path;
use tracing::info;

/// Execute the run command.
pub async fn execute_run(args: RunArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let bundle = Bundle::load(Path::new(&args.input))?;
    let strategy: Strategy = args.strategy.into();

    let extractor = build_extractor(config, args.model)?;

    info!(
        strategy = strategy.as_str(),
        documents = bundle.documents.len(),
        timeout_secs = extractor.config().oracle_timeout_secs,
        "Starting run"
    );

    let records = run_bundle(&extractor, strategy, &bundle).await?;

    println!("{}", formatter.format_records(&records)?);
    if formatter.format() == OutputFormat::Table {
        for record in records.iter().filter(|r| !r.is_failure()) {
            println!("{}", formatter.format_triples(record));
        }
    }

    if let Some(path) = args.output {
        write_records(Path::new(&path), &records)?;
        eprintln!("{}", formatter.info(&format!("Records written to {}", path)));
    }

    for line in formatter.format_failures(&records) {
        eprintln!("{}", line);
    }
    eprintln!("{}", formatter.run_summary(&records));
    Ok(())
}

/// Build an extractor backed by the configured Ollama model.
///
/// The HTTP client carries the same deadline as the extractor, so a timed
/// out request is dropped by the client instead of left running.
pub fn build_extractor(config: &Config, model: Option<String>) -> Result<Extractor<OllamaOracle>> {
    let model = model.unwrap_or_else(|| config.oracle.model.clone());
    let oracle = OllamaOracle::with_timeout(
        config.oracle.endpoint.clone(),
        model,
        config.extractor.oracle_timeout(),
    )?
    .with_temperature(config.oracle.temperature);

    info!(model = oracle.model(), "Using Ollama oracle");
    Ok(Extractor::new(oracle, config.extractor.clone())?)
}

/// Run `strategy` over every document of `bundle`.
///
/// Fails up front when the strategy needs a constraint table the bundle does
/// not carry; per-document failures end up in the records.
pub async fn run_bundle<O>(
    extractor: &Extractor<O>,
    strategy: Strategy,
    bundle: &Bundle,
) -> Result<Vec<ExtractionRecord>>
where
    O: Oracle + Send + Sync + 'static,
    O::Error: Display,
{
    if strategy.uses_constraints() && bundle.constraint_table.is_none() {
        return Err(CliError::InvalidInput(format!(
            "strategy '{}' requires a constraint_table in the input bundle",
            strategy
        )));
    }

    Ok(extractor
        .run_documents(
            strategy,
            &bundle.documents,
            &bundle.few_shot,
            &bundle.schema_info,
            bundle.constraint_table.as_ref(),
        )
        .await)
}

/// Write records as pretty JSON.
pub fn write_records(path: &Path, records: &[ExtractionRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string_pretty(records)?)?;
    Ok(())
}
