//! Core Extractor implementation

use crate::caller::{OracleCaller, RetryPolicy};
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::pairs::{ordered_pairs, PairClassifier, TypePairIndex};
use crate::parser::{entity_names, parse_extraction, resolve_entities};
use crate::prompt::{DefaultPrompts, PromptSource};
use crate::types::{
    EntityPairStats, ExtractionRecord, Strategy, StrategyOutput, StrategyStats, TwoStageStats,
};
use crate::verifier::BatchVerifier;
use relex_domain::{
    ConstraintTable, Document, Entity, ExtractionMode, FewShotExample, Oracle, OutputSchema,
    SchemaInfo, Triple,
};
use relex_gatekeeper::{FilterReport, Gatekeeper, ValidationConfig};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The Extractor runs extraction strategies against an oracle
pub struct Extractor<O> {
    caller: OracleCaller<O>,
    prompts: Box<dyn PromptSource>,
    config: ExtractorConfig,
}

impl<O> Extractor<O>
where
    O: Oracle + Send + Sync + 'static,
    O::Error: Display,
{
    /// Create a new Extractor
    ///
    /// # Errors
    ///
    /// Returns `ExtractorError::Config` if the config fails validation.
    pub fn new(oracle: O, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;

        Ok(Self {
            caller: OracleCaller::new(Arc::new(oracle), &config),
            prompts: Box::new(DefaultPrompts),
            config,
        })
    }

    /// Use a different prompt source
    pub fn with_prompts(mut self, prompts: impl PromptSource + 'static) -> Self {
        self.prompts = Box::new(prompts);
        self
    }

    /// Override the retry policy derived from the config
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.caller = self.caller.with_retry(retry);
        self
    }

    /// Configuration in use
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Single-pass extraction filtered by label and entity type
    pub async fn run_baseline(
        &self,
        doc: &Document,
        few_shot: &FewShotExample,
        schema: &SchemaInfo,
    ) -> Result<StrategyOutput, ExtractorError> {
        self.check_length(doc)?;
        info!(title = %doc.title, "Running baseline extraction");

        let (entities, candidates) = self
            .extract(doc, few_shot, schema, ExtractionMode::Baseline)
            .await?;

        let outcome = Gatekeeper::for_schema(ValidationConfig::single_pass(), schema)
            .filter(&candidates, None);
        log_report("baseline", &outcome.report);

        info!(
            title = %doc.title,
            entities = entities.len(),
            triples = outcome.kept.len(),
            "Baseline extraction complete"
        );
        Ok(StrategyOutput::single_pass(entities, outcome.kept))
    }

    /// Recall-tuned extraction, batched verification, then domain/range
    /// filtering
    pub async fn run_proposed(
        &self,
        doc: &Document,
        few_shot: &FewShotExample,
        schema: &SchemaInfo,
        constraint_table: &ConstraintTable,
    ) -> Result<StrategyOutput, ExtractorError> {
        self.check_length(doc)?;
        info!(title = %doc.title, "Running two-stage extraction");

        // Stage 1: generate
        let (entities, candidates) = self
            .extract(doc, few_shot, schema, ExtractionMode::Recall)
            .await?;
        let stage1 = Gatekeeper::for_schema(ValidationConfig::single_pass(), schema)
            .filter(&candidates, None);
        log_report("stage1", &stage1.report);

        // Stage 2: verify
        let names = entity_names(&entities);
        let (verified, calls) = BatchVerifier::new(&self.caller, self.prompts.as_ref())
            .with_batch_size(self.config.verify_batch_size)
            .verify(doc, &stage1.kept, &names, schema)
            .await?;
        debug!(calls, kept = verified.len(), "Verification complete");

        let constrained = Gatekeeper::for_schema(ValidationConfig::constraints_only(), schema)
            .filter(&verified, Some(constraint_table));
        log_report("constraints", &constrained.report);

        let stats = TwoStageStats {
            stage1_candidates: stage1.kept.len(),
            stage2_kept: verified.len(),
            after_constraints: constrained.kept.len(),
        };
        info!(
            title = %doc.title,
            stage1 = stats.stage1_candidates,
            stage2 = stats.stage2_kept,
            final_count = stats.after_constraints,
            "Two-stage extraction complete"
        );

        Ok(StrategyOutput {
            entities,
            triples: constrained.kept,
            stats: Some(StrategyStats::TwoStage(stats)),
        })
    }

    /// Entity-only extraction followed by classification of type-compatible
    /// entity pairs
    pub async fn run_entity_pair(
        &self,
        doc: &Document,
        few_shot: &FewShotExample,
        schema: &SchemaInfo,
        constraint_table: &ConstraintTable,
    ) -> Result<StrategyOutput, ExtractorError> {
        self.check_length(doc)?;
        info!(title = %doc.title, "Running entity-pair extraction");

        let system_prompt = self.prompts.system_prompt(schema);
        let user_prompt = self.prompts.entity_only_prompt(doc, few_shot);
        let result = self
            .caller
            .call(&system_prompt, &user_prompt, OutputSchema::EntityOnly)
            .await?
            .into_entity_only()?;
        let entities = resolve_entities(result.entities);

        let pairs = ordered_pairs(&entities);
        let index = TypePairIndex::from_constraints(constraint_table);
        let candidates = index.prefilter(&pairs);
        debug!(
            entities = entities.len(),
            total_pairs = pairs.len(),
            filtered_pairs = candidates.len(),
            "Generated entity pairs"
        );

        let (triples, calls) = PairClassifier::new(&self.caller, self.prompts.as_ref())
            .with_batch_size(self.config.pair_batch_size)
            .classify(doc, &candidates, schema)
            .await?;

        let outcome = Gatekeeper::for_schema(ValidationConfig::labels_only(), schema)
            .filter(&triples, None);
        log_report("entity_pair", &outcome.report);

        let stats = EntityPairStats {
            total_pairs: pairs.len(),
            filtered_pairs: candidates.len(),
            num_classification_calls: calls,
            num_triples: outcome.kept.len(),
        };
        info!(
            title = %doc.title,
            total_pairs = stats.total_pairs,
            filtered_pairs = stats.filtered_pairs,
            calls = stats.num_classification_calls,
            triples = stats.num_triples,
            "Entity-pair extraction complete"
        );

        Ok(StrategyOutput {
            entities,
            triples: outcome.kept,
            stats: Some(StrategyStats::EntityPair(stats)),
        })
    }

    /// Run `strategy` on one document
    ///
    /// Strategies other than baseline need a constraint table.
    pub async fn run(
        &self,
        strategy: Strategy,
        doc: &Document,
        few_shot: &FewShotExample,
        schema: &SchemaInfo,
        constraint_table: Option<&ConstraintTable>,
    ) -> Result<StrategyOutput, ExtractorError> {
        match (strategy, constraint_table) {
            (Strategy::Baseline, _) => self.run_baseline(doc, few_shot, schema).await,
            (Strategy::Proposed, Some(table)) => {
                self.run_proposed(doc, few_shot, schema, table).await
            }
            (Strategy::EntityPair, Some(table)) => {
                self.run_entity_pair(doc, few_shot, schema, table).await
            }
            (strategy, None) => Err(ExtractorError::Config(format!(
                "strategy '{}' requires a constraint table",
                strategy
            ))),
        }
    }

    /// Run `strategy` over `docs` in order, one record per document
    ///
    /// A failed document is recorded with its error and does not stop the
    /// run.
    pub async fn run_documents(
        &self,
        strategy: Strategy,
        docs: &[Document],
        few_shot: &FewShotExample,
        schema: &SchemaInfo,
        constraint_table: Option<&ConstraintTable>,
    ) -> Vec<ExtractionRecord> {
        let mut records = Vec::with_capacity(docs.len());

        for (idx, doc) in docs.iter().enumerate() {
            debug!("Processing document {}/{}", idx + 1, docs.len());

            let record = match self
                .run(strategy, doc, few_shot, schema, constraint_table)
                .await
            {
                Ok(output) => ExtractionRecord::completed(&doc.title, strategy, output),
                Err(e) => {
                    warn!(title = %doc.title, error = %e, "Document failed");
                    ExtractionRecord::failed(&doc.title, strategy, e)
                }
            };
            records.push(record);
        }

        let failed = records.iter().filter(|r| r.is_failure()).count();
        info!(
            strategy = strategy.as_str(),
            documents = records.len(),
            failed,
            "Run complete"
        );
        records
    }

    /// Full extraction call and reference resolution
    async fn extract(
        &self,
        doc: &Document,
        few_shot: &FewShotExample,
        schema: &SchemaInfo,
        mode: ExtractionMode,
    ) -> Result<(Vec<Entity>, Vec<Triple>), ExtractorError> {
        let system_prompt = self.prompts.system_prompt(schema);
        let user_prompt = self.prompts.extraction_prompt(doc, few_shot, mode);
        debug!(
            mode = mode.as_str(),
            prompt_chars = user_prompt.len(),
            "Built extraction prompt"
        );

        let result = self
            .caller
            .call(&system_prompt, &user_prompt, OutputSchema::Extraction)
            .await?
            .into_extraction()?;

        let raw_relations = result.relations.len();
        let (entities, triples) = parse_extraction(result);
        if triples.len() < raw_relations {
            debug!(
                dropped = raw_relations - triples.len(),
                "Dropped relations with dangling entity references"
            );
        }
        Ok((entities, triples))
    }

    fn check_length(&self, doc: &Document) -> Result<(), ExtractorError> {
        let length = doc.doc_text.chars().count();
        if length > self.config.max_text_length {
            return Err(ExtractorError::TextTooLong(
                length,
                self.config.max_text_length,
            ));
        }
        Ok(())
    }
}

fn log_report(stage: &str, report: &FilterReport) {
    debug!(
        stage,
        input = report.input,
        dropped_labels = report.dropped_labels,
        dropped_types = report.dropped_types,
        dropped_constraints = report.dropped_constraints,
        output = report.output,
        "Filtered candidates"
    );
}
