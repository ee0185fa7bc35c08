//! Batched keep/discard verification of candidate triples

use crate::caller::OracleCaller;
use crate::error::ExtractorError;
use crate::prompt::PromptSource;
use crate::response::{resolve_keep, VerificationResult};
use relex_domain::{Document, EntityId, Oracle, OutputSchema, SchemaInfo, Triple};
use std::collections::HashMap;
use std::fmt::Display;
use tracing::debug;

/// Default number of candidates per verification call
pub const DEFAULT_VERIFY_BATCH_SIZE: usize = 10;

/// Keep the members of `batch` the decisions allow
///
/// Decision `i` refers to `batch[i]`. A candidate without a decision is kept.
pub fn apply_verification(batch: &[Triple], result: &VerificationResult) -> Vec<Triple> {
    let decisions = result.decision_map();
    batch
        .iter()
        .enumerate()
        .filter(|(index, _)| resolve_keep(decisions.get(index).copied()))
        .map(|(_, triple)| triple.clone())
        .collect()
}

/// Verifies candidates in consecutive fixed-size batches
pub struct BatchVerifier<'a, O> {
    caller: &'a OracleCaller<O>,
    prompts: &'a dyn PromptSource,
    batch_size: usize,
}

impl<'a, O> BatchVerifier<'a, O>
where
    O: Oracle + Send + Sync + 'static,
    O::Error: Display,
{
    /// Create a verifier with the default batch size
    pub fn new(caller: &'a OracleCaller<O>, prompts: &'a dyn PromptSource) -> Self {
        Self {
            caller,
            prompts,
            batch_size: DEFAULT_VERIFY_BATCH_SIZE,
        }
    }

    /// Set the batch size; zero is treated as one
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Verify `candidates`, one oracle call per batch, preserving order
    ///
    /// Returns the kept candidates and the number of oracle calls made.
    pub async fn verify(
        &self,
        doc: &Document,
        candidates: &[Triple],
        names: &HashMap<EntityId, String>,
        schema: &SchemaInfo,
    ) -> Result<(Vec<Triple>, usize), ExtractorError> {
        if candidates.is_empty() {
            return Ok((Vec::new(), 0));
        }

        let system_prompt = self.prompts.verification_system_prompt();
        let mut verified = Vec::with_capacity(candidates.len());
        let mut calls = 0;

        for batch in candidates.chunks(self.batch_size) {
            let user_prompt = self.prompts.verification_prompt(doc, batch, names, schema);
            let result = self
                .caller
                .call(&system_prompt, &user_prompt, OutputSchema::Verification)
                .await?
                .into_verification()?;
            calls += 1;

            let kept = apply_verification(batch, &result);
            debug!(
                batch = calls,
                size = batch.len(),
                kept = kept.len(),
                "Verified batch"
            );
            verified.extend(kept);
        }

        Ok((verified, calls))
    }
}
