//! Benchmark for sync query batch execution
//!
//! Measures:
//! - Sequential batch time
//! - Isolated-unit (parallel) batch time
//! - Scaling with document size

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use oas_analyzer::{Analyzer, Document, ExecutionConfig, QueryName};
use serde_json::{json, Map, Value};

/// Generate a document with `num_paths` path items of four operations each
fn generate_document(num_paths: usize) -> Document {
    let mut paths = Map::new();
    for i in 0..num_paths {
        let operation = json!({
            "parameters": [{"name": "q", "in": "query", "style": "form"}],
            "requestBody": {"content": {"application/json": {"schema": {"$ref": "#/components/schemas/Item"}}}},
            "responses": {
                "200": {"content": {
                    "application/json": {"schema": {"$ref": "#/components/schemas/Item"}},
                    "application/xml": {"schema": {"$ref": "#/components/schemas/Item"}}
                }}
            }
        });
        paths.insert(
            format!("/resource_{}/{{id}}", i),
            json!({"get": operation, "put": operation, "post": operation, "delete": operation}),
        );
    }

    json!({
        "openapi": "3.1.0",
        "paths": Value::Object(paths),
        "components": {"schemas": {"Item": {
            "type": "object",
            "properties": {"id": {"type": "integer"}, "tags": {"oneOf": [{"type": "string"}, {"type": "array"}]}}
        }}}
    })
}

fn bench_sync_batch(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("sync_batch");

    for num_paths in [10, 100, 500] {
        let document = generate_document(num_paths);

        let sequential = Analyzer::new().with_config(ExecutionConfig::sequential());
        group.bench_with_input(
            BenchmarkId::new("sequential", num_paths),
            &document,
            |b, document| {
                b.to_async(&runtime).iter(|| async {
                    black_box(
                        sequential
                            .run_queries(&QueryName::ALL, document)
                            .await
                            .unwrap(),
                    )
                });
            },
        );

        let parallel = Analyzer::new().with_config(ExecutionConfig::default().with_min_size(0));
        group.bench_with_input(
            BenchmarkId::new("parallel", num_paths),
            &document,
            |b, document| {
                b.to_async(&runtime).iter(|| async {
                    black_box(parallel.run_queries(&QueryName::ALL, document).await.unwrap())
                });
            },
        );
    }

    group.finish();
}

fn bench_analyze(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let document = generate_document(100);
    let analyzer = Analyzer::new();

    c.bench_function("analyze_100_paths", |b| {
        b.to_async(&runtime)
            .iter(|| async { black_box(analyzer.analyze(&document).await.unwrap()) });
    });
}

criterion_group!(benches, bench_sync_batch, bench_analyze);
criterion_main!(benches);
