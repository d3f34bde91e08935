//! Integration tests for full report analysis
//!
//! Covers:
//! - Petstore fixture report contents
//! - Circular references as findings, not failures
//! - Presence flag consistency and idempotence

mod common;

use common::{circular, init_tracing, petstore, PETSTORE_OPERATIONS};
use oas_analyzer::{analyze, Analyzer, Category, ExecutionConfig, Finding, Found};
use pretty_assertions::assert_eq;

fn location(value: &str) -> Vec<String> {
    vec![value.to_string()]
}

#[tokio::test]
async fn test_petstore_general_stats() {
    init_tracing();
    let report = analyze(&petstore()).await.unwrap();

    assert_eq!(report.general.len(), 5);
    assert_eq!(
        report.general["operationTotal"].found,
        Found::Count(PETSTORE_OPERATIONS)
    );
    assert_eq!(
        report.general["mediaTypes"].found,
        Found::Values(location("application/json"))
    );
    assert_eq!(
        report.general["securityTypes"].found,
        Found::Values(location("apiKey"))
    );
    assert_eq!(report.general["rawFileSize"].name, "Raw File Size");
    assert!(matches!(report.general["rawFileSize"].found, Found::Size(_)));
}

#[tokio::test]
async fn test_petstore_openapi_findings() {
    let report = analyze(&petstore()).await.unwrap();

    assert_eq!(
        report.finding(Category::OpenApi, "polymorphism"),
        Some(&Finding::from_locations(location("#/components/schemas/Pet/allOf")))
    );
    assert_eq!(
        report.finding(Category::OpenApi, "commonParameters"),
        Some(&Finding::from_locations(location("#/paths/~1pets~1{id}/parameters")))
    );
    assert_eq!(
        report.finding(Category::OpenApi, "style"),
        Some(&Finding::from_locations(location("#/paths/~1pets/get/parameters/0/style")))
    );

    for key in ["circularRefs", "callbacks", "links", "webhooks", "xml", "discriminators"] {
        let finding = report.finding(Category::OpenApi, key).unwrap();
        assert!(!finding.present, "{} should be absent", key);
    }
}

#[tokio::test]
async fn test_petstore_readme_findings_absent() {
    let report = analyze(&petstore()).await.unwrap();

    assert_eq!(report.readme.len(), 7);
    assert!(report.readme.values().all(|finding| !finding.present));
    assert!(!report.readme.contains_key("raw_body"));
    assert!(!report.readme.contains_key("x-readme.samples-enabled"));
}

#[tokio::test]
async fn test_circular_document_reports_cycle() {
    init_tracing();
    let report = analyze(&circular()).await.unwrap();

    let circular_refs = report.finding(Category::OpenApi, "circularRefs").unwrap();
    assert!(circular_refs.present);
    assert_eq!(
        circular_refs.locations,
        vec![
            "#/components/schemas/A/properties/b".to_string(),
            "#/components/schemas/B/properties/a".to_string(),
        ]
    );
    assert_eq!(report.general["operationTotal"].found, Found::Count(1));
}

#[tokio::test]
async fn test_presence_matches_locations() {
    for document in [petstore(), circular()] {
        let report = analyze(&document).await.unwrap();
        for (key, finding) in report.findings() {
            assert_eq!(finding.present, !finding.locations.is_empty(), "{}", key);
        }
    }
}

#[tokio::test]
async fn test_analysis_is_idempotent() {
    let analyzer = Analyzer::new();
    let definition = petstore();

    let first = analyzer.analyze(&definition).await.unwrap();
    let second = analyzer.analyze(&definition).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_report_independent_of_execution_mode() {
    let definition = circular();

    let parallel = Analyzer::new()
        .with_config(ExecutionConfig::default().with_min_size(0))
        .analyze(&definition)
        .await
        .unwrap();
    let sequential = Analyzer::new()
        .with_config(ExecutionConfig::sequential())
        .analyze(&definition)
        .await
        .unwrap();

    assert_eq!(parallel, sequential);
}

#[tokio::test]
async fn test_report_serializes_to_json() {
    let report = analyze(&petstore()).await.unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["general"]["operationTotal"]["name"], "Operation");
    assert_eq!(json["general"]["operationTotal"]["found"], 4);
    assert_eq!(json["openapi"]["polymorphism"]["present"], true);
    assert_eq!(json["readme"]["x-default"]["locations"], serde_json::json!([]));
}

#[tokio::test]
async fn test_external_reference_fails_analysis() {
    let mut definition = petstore();
    definition["components"]["schemas"]["Remote"] = serde_json::json!({"$ref": "remote.yaml#/Pet"});

    let err = analyze(&definition).await.unwrap_err();
    assert_eq!(err.kind().as_str(), "dereference");
}
