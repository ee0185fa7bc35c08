//! Turn raw extraction output into entities and triples

use crate::response::{resolve_evidence, ExtractionResult, RawEntity};
use relex_domain::{Entity, EntityId, Triple};
use std::collections::HashMap;

/// Resolve raw entity records, keeping order and duplicates
pub fn resolve_entities(raw: Vec<RawEntity>) -> Vec<Entity> {
    raw.into_iter().map(RawEntity::resolve).collect()
}

/// Parse an extraction result into `(entities, triples)`
///
/// The entity list comes back as the oracle produced it. Relations are
/// resolved through an id lookup in which a repeated id refers to its last
/// occurrence; a relation whose head or tail id is unknown is dropped.
pub fn parse_extraction(result: ExtractionResult) -> (Vec<Entity>, Vec<Triple>) {
    let entities = resolve_entities(result.entities);
    let by_id: HashMap<&EntityId, &Entity> = entities.iter().map(|e| (&e.id, e)).collect();

    let triples = result
        .relations
        .into_iter()
        .filter_map(|rel| {
            let head = by_id.get(&rel.head)?;
            let tail = by_id.get(&rel.tail)?;
            Some(Triple::between(
                head,
                rel.relation,
                tail,
                resolve_evidence(rel.evidence),
            ))
        })
        .collect();

    (entities, triples)
}

/// Entity id -> name lookup used when rendering candidates for the oracle
pub fn entity_names(entities: &[Entity]) -> HashMap<EntityId, String> {
    entities
        .iter()
        .map(|e| (e.id.clone(), e.name.clone()))
        .collect()
}
