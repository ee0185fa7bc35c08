//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and
//! infrastructure. Implementations live in other crates.

/// Output schema an oracle response must conform to
///
/// Each oracle call names exactly one schema; the caller decodes the
/// response into the matching shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputSchema {
    /// `{entities: [...], relations: [...]}`
    Extraction,
    /// `{entities: [...]}`
    EntityOnly,
    /// `{pair_decisions: [{pair_index, relation, evidence}]}`
    PairClassification,
    /// `{decisions: [{candidate_index, keep}]}`
    Verification,
}

impl OutputSchema {
    /// Get the schema name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputSchema::Extraction => "extraction",
            OutputSchema::EntityOnly => "entity-only",
            OutputSchema::PairClassification => "pair-classification",
            OutputSchema::Verification => "verification",
        }
    }

    /// Parse a schema name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "extraction" => Some(OutputSchema::Extraction),
            "entity-only" => Some(OutputSchema::EntityOnly),
            "pair-classification" => Some(OutputSchema::PairClassification),
            "verification" => Some(OutputSchema::Verification),
            _ => None,
        }
    }
}

impl std::str::FromStr for OutputSchema {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid output schema: {}", s))
    }
}

/// Trait for the external text-generation oracle
///
/// Implemented by the infrastructure layer (relex-oracle). Calls are
/// blocking; the pipeline moves them off the async executor itself.
pub trait Oracle {
    /// Error type for oracle operations
    type Error;

    /// Submit a prompt pair and return the JSON text of a response that
    /// conforms to `schema`
    fn submit(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema: OutputSchema,
    ) -> Result<String, Self::Error>;
}
