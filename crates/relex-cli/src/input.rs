//! Experiment bundle loading.

use crate::error::{CliError, Result};
use relex_domain::{ConstraintTable, Document, FewShotExample, SchemaInfo};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Everything one run needs, prepared upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct Bundle {
    /// Documents to extract from, in processing order
    pub documents: Vec<Document>,

    /// Worked example shown before every document
    pub few_shot: FewShotExample,

    /// Relation vocabulary
    pub schema_info: SchemaInfo,

    /// Observed domain/range pairs; required by the multi-stage strategies
    #[serde(default)]
    pub constraint_table: Option<ConstraintTable>,
}

impl Bundle {
    /// Read and parse a bundle file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse a bundle from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let bundle: Bundle = serde_json::from_str(json)?;
        if bundle.schema_info.rel_info.is_empty() {
            return Err(CliError::InvalidInput(
                "schema_info.rel_info must declare at least one relation".to_string(),
            ));
        }
        Ok(bundle)
    }
}
