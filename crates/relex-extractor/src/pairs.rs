//! Entity-pair generation, type-pair pruning and pair classification

use crate::caller::OracleCaller;
use crate::error::ExtractorError;
use crate::prompt::PromptSource;
use crate::response::{
    resolve_evidence, resolve_index, resolve_relation, PairClassificationResult, NO_RELATION,
};
use relex_domain::{
    ConstraintTable, Document, Entity, EntityType, Oracle, OutputSchema, RelationCode, SchemaInfo,
    Triple, TypePair,
};
use std::collections::BTreeMap;
use std::fmt::Display;
use tracing::debug;

/// Default number of pairs per classification call
pub const DEFAULT_PAIR_BATCH_SIZE: usize = 20;

/// An ordered entity pair the classifier is asked about
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePair {
    /// Head entity
    pub head: Entity,
    /// Tail entity
    pub tail: Entity,
    /// Relations observed for this pair's type combination
    pub applicable_relations: Vec<RelationCode>,
}

/// All ordered pairs of distinct positions, `n(n-1)` in total
///
/// Positions, not ids, decide distinctness: two entries sharing an id still
/// form a pair.
pub fn ordered_pairs(entities: &[Entity]) -> Vec<(&Entity, &Entity)> {
    let mut pairs = Vec::with_capacity(entities.len() * entities.len().saturating_sub(1));
    for (i, head) in entities.iter().enumerate() {
        for (j, tail) in entities.iter().enumerate() {
            if i != j {
                pairs.push((head, tail));
            }
        }
    }
    pairs
}

/// Observed `(head_type, tail_type)` -> relations seen with it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypePairIndex {
    by_pair: BTreeMap<TypePair, Vec<RelationCode>>,
}

impl TypePairIndex {
    /// Invert a constraint table; relations keep the table's order
    pub fn from_constraints(table: &ConstraintTable) -> Self {
        let mut by_pair: BTreeMap<TypePair, Vec<RelationCode>> = BTreeMap::new();
        for (relation, pairs) in table.iter() {
            for pair in pairs {
                by_pair
                    .entry(pair.clone())
                    .or_default()
                    .push(relation.clone());
            }
        }
        Self { by_pair }
    }

    /// Whether any relation was observed with this type pair
    pub fn contains(&self, head: &EntityType, tail: &EntityType) -> bool {
        self.applicable(head, tail).is_some()
    }

    /// Relations observed with this type pair
    pub fn applicable(&self, head: &EntityType, tail: &EntityType) -> Option<&[RelationCode]> {
        self.by_pair
            .get(&(head.clone(), tail.clone()))
            .map(Vec::as_slice)
    }

    /// Keep pairs whose type pair was observed, attaching applicable relations
    pub fn prefilter(&self, pairs: &[(&Entity, &Entity)]) -> Vec<CandidatePair> {
        pairs
            .iter()
            .filter_map(|(head, tail)| {
                let relations = self.applicable(&head.entity_type, &tail.entity_type)?;
                Some(CandidatePair {
                    head: (*head).clone(),
                    tail: (*tail).clone(),
                    applicable_relations: relations.to_vec(),
                })
            })
            .collect()
    }

    /// Number of distinct observed type pairs
    pub fn len(&self) -> usize {
        self.by_pair.len()
    }

    /// Whether no type pair was observed
    pub fn is_empty(&self) -> bool {
        self.by_pair.is_empty()
    }
}

/// Turn one batch's classification decisions into triples
///
/// Decisions choosing `"NA"`, or whose index is missing, negative or past the
/// end of `batch`, are skipped. The chosen relation is not checked against
/// the pair's applicable list; label filtering happens afterwards.
pub fn resolve_pair_decisions(
    batch: &[CandidatePair],
    result: PairClassificationResult,
) -> Vec<Triple> {
    result
        .pair_decisions
        .into_iter()
        .filter_map(|decision| {
            let relation = resolve_relation(decision.relation);
            if relation == NO_RELATION {
                return None;
            }
            let pair = &batch[resolve_index(decision.pair_index, batch.len())?];
            Some(Triple::between(
                &pair.head,
                relation,
                &pair.tail,
                resolve_evidence(decision.evidence),
            ))
        })
        .collect()
}

/// Classifies candidate pairs in consecutive fixed-size batches
pub struct PairClassifier<'a, O> {
    caller: &'a OracleCaller<O>,
    prompts: &'a dyn PromptSource,
    batch_size: usize,
}

impl<'a, O> PairClassifier<'a, O>
where
    O: Oracle + Send + Sync + 'static,
    O::Error: Display,
{
    /// Create a classifier with the default batch size
    pub fn new(caller: &'a OracleCaller<O>, prompts: &'a dyn PromptSource) -> Self {
        Self {
            caller,
            prompts,
            batch_size: DEFAULT_PAIR_BATCH_SIZE,
        }
    }

    /// Set the batch size; zero is treated as one
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Classify `pairs`, returning the triples found and the number of calls
    pub async fn classify(
        &self,
        doc: &Document,
        pairs: &[CandidatePair],
        schema: &SchemaInfo,
    ) -> Result<(Vec<Triple>, usize), ExtractorError> {
        let system_prompt = self.prompts.classification_system_prompt();
        let mut triples = Vec::new();
        let mut calls = 0;

        for batch in pairs.chunks(self.batch_size) {
            let user_prompt = self.prompts.pair_classification_prompt(doc, batch, schema);
            let result = self
                .caller
                .call(&system_prompt, &user_prompt, OutputSchema::PairClassification)
                .await?
                .into_pair_classification()?;
            calls += 1;

            let found = resolve_pair_decisions(batch, result);
            debug!(
                batch = calls,
                size = batch.len(),
                found = found.len(),
                "Classified batch"
            );
            triples.extend(found);
        }

        Ok((triples, calls))
    }
}
