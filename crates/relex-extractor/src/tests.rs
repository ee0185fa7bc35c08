//! Strategy flows against a scripted oracle

#[cfg(test)]
mod tests {
    use crate::{
        Extractor, ExtractorConfig, ExtractorError, RetryPolicy, Strategy, StrategyStats,
    };
    use relex_domain::{
        ConstraintTable, Document, Entity, EntityType, FewShotExample, OutputSchema, SchemaInfo,
    };
    use relex_oracle::MockOracle;
    use serde_json::json;

    fn few_shot() -> FewShotExample {
        FewShotExample {
            title: "example".to_string(),
            doc_text: "Bob works for Initech.".to_string(),
            entities: vec![
                Entity::new("e0", "Bob", EntityType::Person),
                Entity::new("e1", "Initech", EntityType::Organization),
            ],
            relations: Vec::new(),
        }
    }

    fn schema() -> SchemaInfo {
        SchemaInfo::from_rel_info([
            ("P108", "employer"),
            ("P17", "country"),
            ("P159", "headquarters location"),
        ])
    }

    fn employer_only() -> ConstraintTable {
        [("P108", EntityType::Person, EntityType::Organization)]
            .into_iter()
            .collect()
    }

    fn fast_extractor(oracle: &MockOracle) -> Extractor<MockOracle> {
        Extractor::new(oracle.clone(), ExtractorConfig::default())
            .unwrap()
            .with_retry(RetryPolicy::new(2, 1, 2))
    }

    fn alice_acme() -> String {
        json!({
            "entities": [
                {"id": "e0", "name": "Alice", "type": "PER"},
                {"id": "e1", "name": "Acme", "type": "ORG"}
            ],
            "relations": [
                {"head": "e0", "relation": "P108", "tail": "e1", "evidence": "Alice works at Acme."}
            ]
        })
        .to_string()
    }

    /// `n` people all employed by one organization
    fn employees(n: usize) -> String {
        let mut entities: Vec<_> = (0..n)
            .map(|i| json!({"id": format!("p{}", i), "name": format!("Person {}", i), "type": "PER"}))
            .collect();
        entities.push(json!({"id": "org", "name": "Acme", "type": "ORG"}));

        let relations: Vec<_> = (0..n)
            .map(|i| json!({"head": format!("p{}", i), "relation": "P108", "tail": "org", "evidence": ""}))
            .collect();

        json!({"entities": entities, "relations": relations}).to_string()
    }

    #[tokio::test]
    async fn test_baseline_alice_acme() {
        let oracle = MockOracle::new(alice_acme());
        let extractor = fast_extractor(&oracle);
        let doc = Document::new("alice", "Alice works at Acme.");

        let output = extractor.run_baseline(&doc, &few_shot(), &schema()).await.unwrap();

        assert_eq!(output.entities.len(), 2);
        assert_eq!(output.triples.len(), 1);
        let triple = &output.triples[0];
        assert_eq!(triple.relation, "P108");
        assert_eq!(triple.head_name, "Alice");
        assert_eq!(triple.tail_name, "Acme");
        assert_eq!(triple.head_type, EntityType::Person);
        assert_eq!(triple.tail_type, EntityType::Organization);
        assert!(output.stats.is_none());
        assert_eq!(oracle.calls_for(OutputSchema::Extraction), 1);
    }

    #[tokio::test]
    async fn test_baseline_prompt_carries_document_and_schema() {
        let oracle = MockOracle::new(alice_acme());
        let extractor = fast_extractor(&oracle);
        let doc = Document::new("alice", "Alice works at Acme.");

        extractor.run_baseline(&doc, &few_shot(), &schema()).await.unwrap();

        let call = &oracle.calls()[0];
        assert!(call.system_prompt.contains("P108: employer"));
        assert!(call.user_prompt.contains("Alice works at Acme."));
        assert!(call.user_prompt.contains("Bob works for Initech."));
    }

    #[tokio::test]
    async fn test_baseline_drops_dangling_and_invalid() {
        let response = json!({
            "entities": [
                {"id": "e0", "name": "Alice", "type": "PER"},
                {"id": "e1", "name": "Acme", "type": "ORG"},
                {"id": "e2", "name": "Thing", "type": "WIDGET"}
            ],
            "relations": [
                {"head": "e9", "relation": "P108", "tail": "e1", "evidence": ""},
                {"head": "e0", "relation": "P999", "tail": "e1", "evidence": ""},
                {"head": "e2", "relation": "P17", "tail": "e1", "evidence": ""},
                {"head": "e0", "relation": "P108", "tail": "e1", "evidence": ""}
            ]
        });
        let oracle = MockOracle::new(response.to_string());
        let extractor = fast_extractor(&oracle);
        let doc = Document::new("d", "text");

        let output = extractor.run_baseline(&doc, &few_shot(), &schema()).await.unwrap();

        // Entity list is returned as extracted
        assert_eq!(output.entities.len(), 3);
        assert_eq!(output.triples.len(), 1);
        assert_eq!(output.triples[0].head, "e0");
    }

    #[tokio::test]
    async fn test_proposed_verifies_in_batches_of_ten() {
        let oracle = MockOracle::default();
        oracle.set_schema_response(OutputSchema::Extraction, employees(23));
        oracle.set_schema_response(OutputSchema::Verification, r#"{"decisions": []}"#);
        let extractor = fast_extractor(&oracle);
        let doc = Document::new("d", "text");

        let output = extractor
            .run_proposed(&doc, &few_shot(), &schema(), &employer_only())
            .await
            .unwrap();

        assert_eq!(oracle.calls_for(OutputSchema::Verification), 3);
        assert_eq!(output.triples.len(), 23);
        assert_eq!(
            output.stats,
            Some(StrategyStats::TwoStage(crate::TwoStageStats {
                stage1_candidates: 23,
                stage2_kept: 23,
                after_constraints: 23,
            }))
        );
    }

    #[tokio::test]
    async fn test_proposed_recall_prompt_and_default_keep() {
        let oracle = MockOracle::default();
        oracle.push_response(employees(3));
        // Only candidate 1 has a decision; 0 and 2 default to keep
        oracle.push_response(r#"{"decisions": [{"candidate_index": 1, "keep": false}]}"#);
        let extractor = fast_extractor(&oracle);
        let doc = Document::new("d", "text");

        let output = extractor
            .run_proposed(&doc, &few_shot(), &schema(), &employer_only())
            .await
            .unwrap();

        let heads: Vec<&str> = output.triples.iter().map(|t| t.head.as_str()).collect();
        assert_eq!(heads, vec!["p0", "p2"]);
        assert!(oracle.calls()[0].user_prompt.contains("plausibly"));
    }

    #[tokio::test]
    async fn test_proposed_applies_domain_range_constraints() {
        let response = json!({
            "entities": [
                {"id": "e0", "name": "Alice", "type": "PER"},
                {"id": "e1", "name": "Acme", "type": "ORG"},
                {"id": "e2", "name": "Paris", "type": "LOC"},
                {"id": "e3", "name": "France", "type": "LOC"}
            ],
            "relations": [
                {"head": "e0", "relation": "P108", "tail": "e1", "evidence": ""},
                {"head": "e0", "relation": "P108", "tail": "e2", "evidence": ""},
                {"head": "e2", "relation": "P17", "tail": "e3", "evidence": ""}
            ]
        });
        let oracle = MockOracle::default();
        oracle.set_schema_response(OutputSchema::Extraction, response.to_string());
        oracle.set_schema_response(OutputSchema::Verification, r#"{"decisions": []}"#);
        let extractor = fast_extractor(&oracle);
        let doc = Document::new("d", "text");

        let output = extractor
            .run_proposed(&doc, &few_shot(), &schema(), &employer_only())
            .await
            .unwrap();

        // (PER, ORG) kept, (PER, LOC) removed, P17 absent from the table passes
        let kept: Vec<(&str, &str)> = output
            .triples
            .iter()
            .map(|t| (t.relation.as_str(), t.tail.as_str()))
            .collect();
        assert_eq!(kept, vec![("P108", "e1"), ("P17", "e3")]);

        match output.stats {
            Some(StrategyStats::TwoStage(stats)) => {
                assert_eq!(stats.stage1_candidates, 3);
                assert_eq!(stats.stage2_kept, 3);
                assert_eq!(stats.after_constraints, 2);
            }
            other => panic!("unexpected stats: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_proposed_without_candidates_skips_verification() {
        let oracle = MockOracle::new(r#"{"entities": [], "relations": []}"#);
        let extractor = fast_extractor(&oracle);
        let doc = Document::new("d", "text");

        let output = extractor
            .run_proposed(&doc, &few_shot(), &schema(), &employer_only())
            .await
            .unwrap();

        assert!(output.triples.is_empty());
        assert_eq!(oracle.call_count(), 1);
    }

    #[tokio::test]
    async fn test_entity_pair_flow() {
        let oracle = MockOracle::default();
        oracle.set_schema_response(
            OutputSchema::EntityOnly,
            json!({
                "entities": [
                    {"id": "e0", "name": "Alice", "type": "PER"},
                    {"id": "e1", "name": "Acme", "type": "ORG"},
                    {"id": "e2", "name": "Paris", "type": "LOC"}
                ]
            })
            .to_string(),
        );
        oracle.set_schema_response(
            OutputSchema::PairClassification,
            json!({
                "pair_decisions": [
                    {"pair_index": 0, "relation": "P108", "evidence": "Alice works at Acme."},
                    {"pair_index": 1, "relation": "P108", "evidence": ""},
                    {"pair_index": 0, "relation": "NA", "evidence": ""}
                ]
            })
            .to_string(),
        );
        let extractor = fast_extractor(&oracle);
        let doc = Document::new("d", "Alice works at Acme in Paris.");

        let output = extractor
            .run_entity_pair(&doc, &few_shot(), &schema(), &employer_only())
            .await
            .unwrap();

        assert_eq!(output.entities.len(), 3);
        assert_eq!(output.triples.len(), 1);
        assert_eq!(output.triples[0].head, "e0");
        assert_eq!(output.triples[0].tail, "e1");
        assert_eq!(
            output.stats,
            Some(StrategyStats::EntityPair(crate::EntityPairStats {
                total_pairs: 6,
                filtered_pairs: 1,
                num_classification_calls: 1,
                num_triples: 1,
            }))
        );
        assert_eq!(oracle.calls_for(OutputSchema::Extraction), 0);
    }

    #[tokio::test]
    async fn test_entity_pair_label_filter_applies() {
        let oracle = MockOracle::default();
        oracle.push_response(
            r#"{"entities": [{"id": "a", "name": "Alice", "type": "PER"}, {"id": "b", "name": "Acme", "type": "ORG"}]}"#,
        );
        oracle.push_response(
            r#"{"pair_decisions": [{"pair_index": 0, "relation": "P999", "evidence": ""}]}"#,
        );
        let extractor = fast_extractor(&oracle);
        let doc = Document::new("d", "text");

        let output = extractor
            .run_entity_pair(&doc, &few_shot(), &schema(), &employer_only())
            .await
            .unwrap();

        assert!(output.triples.is_empty());
    }

    #[tokio::test]
    async fn test_entity_pair_without_observed_pairs_makes_no_classification_calls() {
        let oracle = MockOracle::new(
            r#"{"entities": [{"id": "a", "name": "Paris", "type": "LOC"}, {"id": "b", "name": "France", "type": "LOC"}]}"#,
        );
        let extractor = fast_extractor(&oracle);
        let doc = Document::new("d", "text");

        let output = extractor
            .run_entity_pair(&doc, &few_shot(), &schema(), &employer_only())
            .await
            .unwrap();

        assert_eq!(oracle.call_count(), 1);
        match output.stats {
            Some(StrategyStats::EntityPair(stats)) => {
                assert_eq!(stats.total_pairs, 2);
                assert_eq!(stats.filtered_pairs, 0);
                assert_eq!(stats.num_classification_calls, 0);
            }
            other => panic!("unexpected stats: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failure() {
        let oracle = MockOracle::default();
        oracle.push_error("connection refused");
        oracle.push_response(alice_acme());
        let extractor = fast_extractor(&oracle);
        let doc = Document::new("d", "Alice works at Acme.");

        let output = extractor.run_baseline(&doc, &few_shot(), &schema()).await.unwrap();

        assert_eq!(output.triples.len(), 1);
        assert_eq!(oracle.call_count(), 2);
    }

    #[tokio::test]
    async fn test_exhausted_retries_fail_the_document() {
        let oracle = MockOracle::default();
        for _ in 0..3 {
            oracle.push_error("service unavailable");
        }
        let extractor = fast_extractor(&oracle);
        let doc = Document::new("d", "text");

        let result = extractor.run_baseline(&doc, &few_shot(), &schema()).await;

        assert!(matches!(result, Err(ExtractorError::Oracle(_))));
        assert_eq!(oracle.call_count(), 3);
    }

    #[tokio::test]
    async fn test_run_documents_records_failures_and_continues() {
        let oracle = MockOracle::new(alice_acme());
        let config = ExtractorConfig {
            max_text_length: 50,
            ..ExtractorConfig::default()
        };
        let extractor = Extractor::new(oracle.clone(), config).unwrap();
        let docs = vec![
            Document::new("first", "Alice works at Acme."),
            Document::new("too long", "x".repeat(51)),
            Document::new("third", "Alice works at Acme."),
        ];

        let records = extractor
            .run_documents(Strategy::Baseline, &docs, &few_shot(), &schema(), None)
            .await;

        assert_eq!(records.len(), 3);
        assert!(!records[0].is_failure());
        assert!(records[1].is_failure());
        assert!(records[1].error.as_deref().unwrap_or_default().contains("Text too long"));
        assert_eq!(records[2].title, "third");
        assert_eq!(records[2].triples.len(), 1);
        assert_eq!(oracle.call_count(), 2);
    }

    #[tokio::test]
    async fn test_run_dispatches_by_strategy() {
        let oracle = MockOracle::default();
        oracle.set_schema_response(OutputSchema::Extraction, alice_acme());
        oracle.set_schema_response(OutputSchema::Verification, r#"{"decisions": []}"#);
        let extractor = fast_extractor(&oracle);
        let doc = Document::new("d", "Alice works at Acme.");
        let table = employer_only();

        let output = extractor
            .run(Strategy::Proposed, &doc, &few_shot(), &schema(), Some(&table))
            .await
            .unwrap();

        assert!(matches!(output.stats, Some(StrategyStats::TwoStage(_))));
        assert_eq!(oracle.calls_for(OutputSchema::Verification), 1);
    }
}
