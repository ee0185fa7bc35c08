//! Prompt construction for every oracle call the strategies make

use crate::pairs::CandidatePair;
use relex_domain::{
    Document, EntityId, EntityType, ExtractionMode, FewShotExample, SchemaInfo, Triple,
};
use serde_json::json;
use std::collections::HashMap;

/// Source of prompt text
///
/// The strategies only need strings; how they are worded is up to the
/// implementation. [`DefaultPrompts`] is used unless the extractor is given
/// another source.
pub trait PromptSource: Send + Sync {
    /// System prompt for extraction and entity-only calls
    fn system_prompt(&self, schema: &SchemaInfo) -> String;

    /// User prompt for a full extraction call
    fn extraction_prompt(
        &self,
        doc: &Document,
        few_shot: &FewShotExample,
        mode: ExtractionMode,
    ) -> String;

    /// User prompt for an entity-only call
    fn entity_only_prompt(&self, doc: &Document, few_shot: &FewShotExample) -> String;

    /// System prompt for verification calls
    fn verification_system_prompt(&self) -> String;

    /// User prompt for one verification batch; candidate `i` of the prompt is
    /// `batch[i]`
    fn verification_prompt(
        &self,
        doc: &Document,
        batch: &[Triple],
        names: &HashMap<EntityId, String>,
        schema: &SchemaInfo,
    ) -> String;

    /// System prompt for pair classification calls
    fn classification_system_prompt(&self) -> String;

    /// User prompt for one classification batch; pair `i` of the prompt is
    /// `batch[i]`
    fn pair_classification_prompt(
        &self,
        doc: &Document,
        batch: &[CandidatePair],
        schema: &SchemaInfo,
    ) -> String;
}

/// Built-in English prompts
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPrompts;

impl DefaultPrompts {
    fn push_document(prompt: &mut String, label: &str, text: &str) {
        prompt.push_str(label);
        prompt.push_str(":\n---\n");
        prompt.push_str(text);
        prompt.push_str("\n---\n\n");
    }

    fn push_relation_list(prompt: &mut String, schema: &SchemaInfo) {
        for (code, description) in &schema.rel_info {
            prompt.push_str(&format!("- {}: {}\n", code, description));
        }
    }
}

impl PromptSource for DefaultPrompts {
    fn system_prompt(&self, schema: &SchemaInfo) -> String {
        let mut prompt = String::new();
        prompt.push_str(SYSTEM_INSTRUCTIONS);
        prompt.push_str("\n\nEntity types: ");
        prompt.push_str(&EntityType::CODES.join(", "));
        prompt.push_str("\n\nRelation types:\n");
        Self::push_relation_list(&mut prompt, schema);
        prompt
    }

    fn extraction_prompt(
        &self,
        doc: &Document,
        few_shot: &FewShotExample,
        mode: ExtractionMode,
    ) -> String {
        let mut prompt = String::new();

        prompt.push_str(match mode {
            ExtractionMode::Baseline => BASELINE_GUIDANCE,
            ExtractionMode::Recall => RECALL_GUIDANCE,
        });
        prompt.push_str("\n\n");

        Self::push_document(&mut prompt, "Example text", &few_shot.doc_text);
        prompt.push_str("Example output:\n");
        prompt.push_str(&format!("{:#}", few_shot_output(few_shot, true)));
        prompt.push_str("\n\n");

        Self::push_document(&mut prompt, "Text to analyze", &doc.doc_text);
        prompt.push_str(EXTRACTION_OUTPUT_REMINDER);
        prompt
    }

    fn entity_only_prompt(&self, doc: &Document, few_shot: &FewShotExample) -> String {
        let mut prompt = String::new();
        prompt.push_str(ENTITY_ONLY_GUIDANCE);
        prompt.push_str("\n\n");

        Self::push_document(&mut prompt, "Example text", &few_shot.doc_text);
        prompt.push_str("Example output:\n");
        prompt.push_str(&format!("{:#}", few_shot_output(few_shot, false)));
        prompt.push_str("\n\n");

        Self::push_document(&mut prompt, "Text to analyze", &doc.doc_text);
        prompt.push_str("List every entity mention as {id, name, type}.");
        prompt
    }

    fn verification_system_prompt(&self) -> String {
        VERIFICATION_SYSTEM.to_string()
    }

    fn verification_prompt(
        &self,
        doc: &Document,
        batch: &[Triple],
        names: &HashMap<EntityId, String>,
        schema: &SchemaInfo,
    ) -> String {
        let mut prompt = String::new();
        Self::push_document(&mut prompt, "Document", &doc.doc_text);

        prompt.push_str("Relation candidates:\n");
        for (index, triple) in batch.iter().enumerate() {
            let head = names.get(&triple.head).unwrap_or(&triple.head_name);
            let tail = names.get(&triple.tail).unwrap_or(&triple.tail_name);
            let description = schema.describe(&triple.relation).unwrap_or("unknown");
            prompt.push_str(&format!(
                "[{}] {} --{} ({})--> {}\n    evidence: {}\n",
                index, head, triple.relation, description, tail, triple.evidence
            ));
        }

        prompt.push('\n');
        prompt.push_str(VERIFICATION_REMINDER);
        prompt
    }

    fn classification_system_prompt(&self) -> String {
        CLASSIFICATION_SYSTEM.to_string()
    }

    fn pair_classification_prompt(
        &self,
        doc: &Document,
        batch: &[CandidatePair],
        schema: &SchemaInfo,
    ) -> String {
        let mut prompt = String::new();
        Self::push_document(&mut prompt, "Document", &doc.doc_text);

        prompt.push_str("Entity pairs:\n");
        for (index, pair) in batch.iter().enumerate() {
            prompt.push_str(&format!(
                "[{}] {} ({}) -> {} ({})\n    candidates: {}\n",
                index,
                pair.head.name,
                pair.head.entity_type,
                pair.tail.name,
                pair.tail.entity_type,
                pair.applicable_relations
                    .iter()
                    .map(|code| match schema.describe(code) {
                        Some(description) => format!("{} ({})", code, description),
                        None => code.clone(),
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }

        prompt.push('\n');
        prompt.push_str(CLASSIFICATION_REMINDER);
        prompt
    }
}

/// Render a few-shot example in the same shape the oracle must answer with
fn few_shot_output(few_shot: &FewShotExample, with_relations: bool) -> serde_json::Value {
    let entities: Vec<_> = few_shot
        .entities
        .iter()
        .map(|e| json!({"id": e.id, "name": e.name, "type": e.entity_type.as_str()}))
        .collect();

    if !with_relations {
        return json!({ "entities": entities });
    }

    let relations: Vec<_> = few_shot
        .relations
        .iter()
        .map(|r| {
            json!({
                "head": r.head,
                "relation": r.relation,
                "tail": r.tail,
                "evidence": r.evidence,
            })
        })
        .collect();

    json!({ "entities": entities, "relations": relations })
}

const SYSTEM_INSTRUCTIONS: &str = r#"You are an information extraction system.
You read a document and report the entities it mentions and the relations that
hold between them. Use only the entity types and relation codes listed below."#;

const BASELINE_GUIDANCE: &str = r#"Extract entities and relations from the text.
Report a relation only when the text clearly supports it."#;

const RECALL_GUIDANCE: &str = r#"Extract entities and relations from the text.
Report every relation the text plausibly supports, including ones that are only
implied. Candidates will be checked afterwards, so prefer including a doubtful
relation over leaving it out."#;

const ENTITY_ONLY_GUIDANCE: &str = r#"Extract the named entities mentioned in the text.
Do not report relations."#;

const EXTRACTION_OUTPUT_REMINDER: &str = r#"Rules:
- Give each entity a short id ("e0", "e1", ...) and refer to entities by id in relations
- Use the relation codes exactly as listed
- Quote the supporting sentence as evidence"#;

const VERIFICATION_SYSTEM: &str = r#"You verify relation extraction output.
Decide for each candidate whether the document supports it."#;

const VERIFICATION_REMINDER: &str = r#"Return one decision per candidate, using the candidate's index
in brackets as candidate_index. Set keep to false only when the document does not
support the relation."#;

const CLASSIFICATION_SYSTEM: &str = r#"You classify the relation between pairs of entities.
Choose the most appropriate relation for each pair based on the document."#;

const CLASSIFICATION_REMINDER: &str = r#"Return one decision per pair, using the pair's index in brackets
as pair_index. Choose a relation from that pair's candidates, or "NA" when the
document states none of them."#;
