//! Integration tests for sync query batch execution
//!
//! Covers:
//! - Mode selection by document size and configuration
//! - Sequential vs isolated-unit result equivalence
//! - Fixture results under both modes

mod common;

use common::{init_tracing, petstore, PETSTORE_OPERATIONS};
use oas_analyzer::{
    Analyzer, Document, ExecutionConfig, ExecutionMode, QueryCatalog, QueryName, QueryResult,
};
use proptest::prelude::*;
use serde_json::{json, Value};

/// Petstore padded past the default worker threshold
fn large_petstore() -> Document {
    let mut doc = petstore();
    doc["info"]["description"] = Value::String("x".repeat(120_000));
    doc
}

#[tokio::test]
async fn test_matches_direct_sync_query_results() {
    init_tracing();
    let definition = petstore();
    let catalog = QueryCatalog::standard();
    let names = [QueryName::MediaTypes, QueryName::TotalOperations];

    let actual = Analyzer::new()
        .with_config(ExecutionConfig::default().with_min_size(0))
        .run_queries(&names, &definition)
        .await
        .expect("parallel run failed");

    assert_eq!(actual.execution_mode, ExecutionMode::Parallel);
    for name in names {
        assert_eq!(
            actual.results.get(name),
            Some(&catalog.run(name, &definition).unwrap())
        );
    }
}

#[tokio::test]
async fn test_fixture_scenario_under_both_modes() {
    init_tracing();
    let definition = petstore();
    let names = [QueryName::MediaTypes, QueryName::TotalOperations];

    for config in [
        ExecutionConfig::sequential(),
        ExecutionConfig::default().with_min_size(0),
    ] {
        let execution = Analyzer::new()
            .with_config(config)
            .run_queries(&names, &definition)
            .await
            .unwrap();

        assert_eq!(execution.results.len(), 2);
        assert_eq!(
            execution.results.get(QueryName::MediaTypes),
            Some(&QueryResult::Locations(vec!["application/json".to_string()]))
        );
        assert_eq!(
            execution.results.count(QueryName::TotalOperations).unwrap(),
            PETSTORE_OPERATIONS
        );
    }
}

#[tokio::test]
async fn test_uses_sequential_execution_when_workers_disabled() {
    let execution = Analyzer::new()
        .with_config(ExecutionConfig::default().with_workers(false))
        .run_queries(&[QueryName::MediaTypes], &large_petstore())
        .await
        .unwrap();

    assert_eq!(execution.execution_mode, ExecutionMode::Sequential);
}

#[tokio::test]
async fn test_small_document_is_sequential_regardless_of_workers() {
    for use_workers in [true, false] {
        let execution = Analyzer::new()
            .with_config(ExecutionConfig::default().with_workers(use_workers))
            .run_queries(&[QueryName::MediaTypes], &petstore())
            .await
            .unwrap();

        assert_eq!(execution.execution_mode, ExecutionMode::Sequential);
    }
}

#[tokio::test]
async fn test_large_document_uses_workers_by_default() {
    init_tracing();
    let definition = large_petstore();

    let parallel = Analyzer::new()
        .run_queries(&QueryName::ALL, &definition)
        .await
        .unwrap();
    let sequential = Analyzer::new()
        .with_config(ExecutionConfig::sequential())
        .run_queries(&QueryName::ALL, &definition)
        .await
        .unwrap();

    assert_eq!(parallel.execution_mode, ExecutionMode::Parallel);
    assert_eq!(parallel.results, sequential.results);
    assert_eq!(parallel.results.len(), QueryName::ALL.len());
}

#[tokio::test]
async fn test_malformed_document_fails_in_both_modes() {
    let definition = json!(["not", "an", "object"]);

    for config in [
        ExecutionConfig::sequential(),
        ExecutionConfig::default().with_min_size(0),
    ] {
        let err = Analyzer::new()
            .with_config(config)
            .run_queries(&[QueryName::Links], &definition)
            .await
            .unwrap_err();

        assert_eq!(err.query(), Some(QueryName::Links));
    }
}

const METHODS: [&str; 4] = ["get", "post", "put", "delete"];
const MEDIA: [&str; 4] = ["application/json", "application/xml", "text/plain", "application/atom+xml"];

fn operation() -> impl Strategy<Value = Value> {
    (
        prop::sample::subsequence(MEDIA.to_vec(), 0..=3),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(media, styled, callbacks, x_readme)| {
            let content: serde_json::Map<String, Value> = media
                .into_iter()
                .map(|m| (m.to_string(), json!({"schema": {"type": "string"}})))
                .collect();

            let mut op = json!({
                "responses": {"200": {"description": "ok", "content": content}}
            });
            if styled {
                op["parameters"] = json!([{"name": "q", "in": "query", "style": "form"}]);
            }
            if callbacks {
                op["callbacks"] = json!({"event": {}});
            }
            if x_readme {
                op["x-readme"] = json!({"explorer-enabled": false});
            }
            op
        })
}

fn document() -> impl Strategy<Value = Document> {
    prop::collection::btree_map(
        "/[a-z]{1,6}",
        prop::collection::btree_map(prop::sample::select(METHODS.to_vec()), operation(), 0..4),
        0..5,
    )
    .prop_map(|paths| {
        let paths: serde_json::Map<String, Value> = paths
            .into_iter()
            .map(|(path, ops)| {
                let ops: serde_json::Map<String, Value> = ops
                    .into_iter()
                    .map(|(method, op)| (method.to_string(), op))
                    .collect();
                (path, Value::Object(ops))
            })
            .collect();
        json!({"openapi": "3.0.0", "paths": paths})
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_mode_never_changes_results(definition in document()) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (parallel, sequential) = runtime.block_on(async {
            let parallel = Analyzer::new()
                .with_config(ExecutionConfig::default().with_min_size(0))
                .run_queries(&QueryName::ALL, &definition)
                .await
                .unwrap();
            let sequential = Analyzer::new()
                .with_config(ExecutionConfig::sequential())
                .run_queries(&QueryName::ALL, &definition)
                .await
                .unwrap();
            (parallel, sequential)
        });

        prop_assert_eq!(parallel.execution_mode, ExecutionMode::Parallel);
        prop_assert_eq!(sequential.execution_mode, ExecutionMode::Sequential);
        prop_assert_eq!(parallel.results, sequential.results);
    }
}
