//! JSON schemas for structured oracle output
//!
//! Every schema is a strict object: all listed fields are required and no
//! additional properties are allowed. Entity types are constrained to the
//! eight known codes.

use relex_domain::{EntityType, OutputSchema};
use serde_json::{json, Value};

/// JSON schema for the given output shape
///
/// # Examples
///
/// ```
/// use relex_oracle::json_schema;
/// use relex_domain::OutputSchema;
///
/// let schema = json_schema(OutputSchema::Verification);
/// assert_eq!(schema["required"][0], "decisions");
/// ```
pub fn json_schema(schema: OutputSchema) -> Value {
    match schema {
        OutputSchema::Extraction => strict_object(json!({
            "entities": array_of(entity_schema()),
            "relations": array_of(relation_schema()),
        })),
        OutputSchema::EntityOnly => strict_object(json!({
            "entities": array_of(entity_schema()),
        })),
        OutputSchema::PairClassification => strict_object(json!({
            "pair_decisions": array_of(strict_object(json!({
                "pair_index": {"type": "integer"},
                "relation": {"type": "string"},
                "evidence": {"type": "string"},
            }))),
        })),
        OutputSchema::Verification => strict_object(json!({
            "decisions": array_of(strict_object(json!({
                "candidate_index": {"type": "integer"},
                "keep": {"type": "boolean"},
            }))),
        })),
    }
}

fn entity_schema() -> Value {
    strict_object(json!({
        "id": {"type": "string"},
        "name": {"type": "string"},
        "type": {"type": "string", "enum": EntityType::CODES},
    }))
}

fn relation_schema() -> Value {
    strict_object(json!({
        "head": {"type": "string"},
        "relation": {"type": "string"},
        "tail": {"type": "string"},
        "evidence": {"type": "string"},
    }))
}

fn array_of(items: Value) -> Value {
    json!({"type": "array", "items": items})
}

/// Wrap a property map into an object schema requiring every property
fn strict_object(properties: Value) -> Value {
    let required: Vec<String> = properties
        .as_object()
        .map(|props| props.keys().cloned().collect())
        .unwrap_or_default();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}
