//! Sync query batch execution: sequential and isolated-unit fan-out
//!
//! Both paths are all-or-nothing. A failing query (or unit) fails the
//! whole batch and no partial results are returned.

use crate::document::{Document, DocumentSnapshot};
use crate::error::{AnalyzerError, Result};
use crate::isolation::{IsolatedExecutor, UnitTask};
use crate::mode::ExecutionMode;
use crate::queries::{QueryCatalog, QueryName, QueryResults};
use std::time::Instant;
use tracing::{debug, error, info};

/// Drop repeated names, keeping first-seen order
pub fn dedup_names(names: &[QueryName]) -> Vec<QueryName> {
    let mut unique = Vec::with_capacity(names.len());
    for name in names {
        if !unique.contains(name) {
            unique.push(*name);
        }
    }
    unique
}

/// Run each query in order against the same document, failing fast
pub fn run_sequential(
    catalog: &QueryCatalog,
    names: &[QueryName],
    document: &Document,
) -> Result<QueryResults> {
    let start = Instant::now();
    let mut results = QueryResults::new();

    for name in dedup_names(names) {
        let result = catalog
            .run(name, document)
            .map_err(|e| {
                error!("Query {} failed: {}", name, e);
                AnalyzerError::QueryExecution {
                    query: name,
                    mode: ExecutionMode::Sequential,
                    message: e.to_string(),
                }
            })?;
        results.insert(name, result);
    }

    debug!(
        "Sequential batch: {} queries in {}ms",
        results.len(),
        start.elapsed().as_millis()
    );
    Ok(results)
}

/// Run one unit per query concurrently and join all of them.
///
/// Every unit gets its own copy of `snapshot`. Outcomes are keyed by
/// name, so arrival order does not matter. When several units fail, the
/// error reported is the first in request order.
pub async fn dispatch_units(
    executor: &dyn IsolatedExecutor,
    names: &[QueryName],
    snapshot: &DocumentSnapshot,
) -> Result<QueryResults> {
    let start = Instant::now();
    let names = dedup_names(names);

    info!(
        "Dispatching {} units on {} executor ({} byte snapshot)",
        names.len(),
        executor.name(),
        snapshot.len()
    );

    let units = names.iter().map(|name| {
        executor.submit(UnitTask {
            query: *name,
            snapshot: snapshot.clone(),
        })
    });

    // Every unit settles before any outcome is inspected
    let outcomes = futures::future::join_all(units).await;

    let mut results = QueryResults::new();
    for (name, outcome) in names.iter().zip(outcomes) {
        let outcome = outcome.map_err(|e| {
            error!("Unit {} failed in transport: {}", name, e);
            e
        })?;

        match outcome.result {
            Ok(result) => results.insert(*name, result),
            Err(message) => {
                error!("Unit {} reported failure: {}", name, message);
                return Err(AnalyzerError::QueryExecution {
                    query: *name,
                    mode: ExecutionMode::Parallel,
                    message,
                });
            }
        }
    }

    debug!(
        "Unit batch joined: {} results in {}ms",
        results.len(),
        start.elapsed().as_millis()
    );
    Ok(results)
}
