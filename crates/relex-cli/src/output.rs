//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use relex_extractor::{ExtractionRecord, StrategyStats};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format extraction records.
    pub fn format_records(&self, records: &[ExtractionRecord]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
            OutputFormat::Table => Ok(self.format_records_table(records)),
            OutputFormat::Quiet => Ok(self.format_records_quiet(records)),
        }
    }

    /// Format extracted triples of one record as a table.
    pub fn format_triples(&self, record: &ExtractionRecord) -> String {
        if record.triples.is_empty() {
            return self.colorize(&format!("{}: no triples", record.title), "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Head", "Relation", "Tail", "Evidence"]);

        for triple in &record.triples {
            builder.push_record([
                format!("{} ({})", triple.head_name, triple.head_type),
                triple.relation.clone(),
                format!("{} ({})", triple.tail_name, triple.tail_type),
                truncate(&triple.evidence, 60),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        format!("{}\n{}", self.colorize(&record.title, "cyan"), table)
    }

    /// Format records as a summary table.
    fn format_records_table(&self, records: &[ExtractionRecord]) -> String {
        if records.is_empty() {
            return self.colorize("No documents processed.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Document", "Strategy", "Entities", "Triples", "Stats", "Status"]);

        for record in records {
            let status = match &record.error {
                Some(error) => format!("failed: {}", truncate(error, 40)),
                None => "ok".to_string(),
            };
            builder.push_record([
                record.title.clone(),
                record.strategy.to_string(),
                record.entities.len().to_string(),
                record.triples.len().to_string(),
                format_stats(record.stats.as_ref()),
                status,
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format records in quiet mode (one line per document).
    fn format_records_quiet(&self, records: &[ExtractionRecord]) -> String {
        records
            .iter()
            .map(|r| match &r.error {
                Some(_) => format!("{}\terror", r.title),
                None => format!("{}\t{}", r.title, r.triples.len()),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Format a JSON value for display.
    pub fn format_json(&self, value: &serde_json::Value) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }

    /// Summary line for a finished run.
    pub fn run_summary(&self, records: &[ExtractionRecord]) -> String {
        let failed = records.iter().filter(|r| r.is_failure()).count();
        let triples: usize = records.iter().map(|r| r.triples.len()).sum();
        let message = format!(
            "{} document(s), {} triple(s), {} failed",
            records.len(),
            triples,
            failed
        );
        if failed > 0 {
            self.warning(&message)
        } else {
            self.success(&message)
        }
    }

    /// One error line per failed record.
    pub fn format_failures(&self, records: &[ExtractionRecord]) -> Vec<String> {
        records
            .iter()
            .filter_map(|r| {
                r.error
                    .as_deref()
                    .map(|e| self.error(&format!("{}: {}", r.title, e)))
            })
            .collect()
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Output format in use.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Compact rendering of strategy stats for a table cell.
pub fn format_stats(stats: Option<&StrategyStats>) -> String {
    match stats {
        None => "-".to_string(),
        Some(StrategyStats::TwoStage(s)) => format!(
            "{} → {} → {}",
            s.stage1_candidates, s.stage2_kept, s.after_constraints
        ),
        Some(StrategyStats::EntityPair(s)) => format!(
            "pairs {}/{}, calls {}",
            s.filtered_pairs, s.total_pairs, s.num_classification_calls
        ),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push('…');
    out
}
