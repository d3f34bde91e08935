//! Isolated execution units
//!
//! A unit receives a [`UnitTask`] (query name + owned document snapshot),
//! runs exactly one query against its private copy, and answers with one
//! [`UnitOutcome`]. The dispatcher only sees the [`IsolatedExecutor`]
//! trait, so the isolation mechanism is replaceable.

use crate::document::DocumentSnapshot;
use crate::error::{AnalyzerError, Result};
use crate::queries::{QueryCatalog, QueryName, QueryResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Self-contained payload for one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitTask {
    pub query: QueryName,
    pub snapshot: DocumentSnapshot,
}

/// What a unit reports back. A query failure is an outcome, not a transport error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitOutcome {
    pub query: QueryName,
    pub result: std::result::Result<QueryResult, String>,
}

impl UnitOutcome {
    /// Run `task` against the catalog. `Err` means the snapshot itself was unusable.
    pub fn evaluate(catalog: &QueryCatalog, task: &UnitTask) -> std::result::Result<Self, String> {
        let document = task
            .snapshot
            .decode()
            .map_err(|e| format!("cannot decode document snapshot: {}", e))?;

        Ok(Self {
            query: task.query,
            result: catalog
                .run(task.query, &document)
                .map_err(|e| e.to_string()),
        })
    }
}

/// Runs one unit task per call
#[async_trait]
pub trait IsolatedExecutor: Send + Sync {
    /// Executor identifier, used in errors and logs
    fn name(&self) -> &'static str;

    /// Whether this executor can run units in the current environment
    fn is_available(&self) -> bool {
        true
    }

    /// Run one task to completion. `Err` is a transport failure.
    async fn submit(&self, task: UnitTask) -> Result<UnitOutcome>;
}

/// Same-memory executor: evaluates the task in the caller's context
pub struct InProcessExecutor {
    catalog: Arc<QueryCatalog>,
}

impl InProcessExecutor {
    pub fn new(catalog: Arc<QueryCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl IsolatedExecutor for InProcessExecutor {
    fn name(&self) -> &'static str {
        "in-process"
    }

    async fn submit(&self, task: UnitTask) -> Result<UnitOutcome> {
        UnitOutcome::evaluate(&self.catalog, &task)
            .map_err(|message| AnalyzerError::transport(task.query, self.name(), message))
    }
}

/// One dedicated OS thread per task, with copy-in/copy-out JSON payloads.
///
/// The thread decodes its own document from the encoded task and replies
/// with an encoded outcome over a oneshot channel. Threads are never
/// reused.
pub struct ThreadUnitExecutor {
    catalog: Arc<QueryCatalog>,
}

type UnitReply = std::result::Result<Vec<u8>, String>;

impl ThreadUnitExecutor {
    pub fn new(catalog: Arc<QueryCatalog>) -> Self {
        Self { catalog }
    }

    /// Body of a unit thread: encoded task in, encoded outcome out
    fn run_unit(catalog: &QueryCatalog, payload: &[u8]) -> UnitReply {
        let task: UnitTask =
            serde_json::from_slice(payload).map_err(|e| format!("cannot decode task: {}", e))?;
        let outcome = UnitOutcome::evaluate(catalog, &task)?;
        serde_json::to_vec(&outcome).map_err(|e| format!("cannot encode outcome: {}", e))
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[async_trait]
impl IsolatedExecutor for ThreadUnitExecutor {
    fn name(&self) -> &'static str {
        "thread"
    }

    fn is_available(&self) -> bool {
        !cfg!(target_family = "wasm")
    }

    async fn submit(&self, task: UnitTask) -> Result<UnitOutcome> {
        let query = task.query;
        let transport = |message: String| AnalyzerError::transport(query, self.name(), message);

        let payload =
            serde_json::to_vec(&task).map_err(|e| transport(format!("cannot encode task: {}", e)))?;
        drop(task);

        let catalog = Arc::clone(&self.catalog);
        let (tx, rx) = oneshot::channel::<UnitReply>();

        std::thread::Builder::new()
            .name(format!("oas-unit-{}", query))
            .spawn(move || {
                let reply = std::panic::catch_unwind(AssertUnwindSafe(|| {
                    Self::run_unit(&catalog, &payload)
                }))
                .unwrap_or_else(|panic| Err(format!("unit panicked: {}", panic_message(&*panic))));

                // Receiver is gone only if the caller stopped waiting
                let _ = tx.send(reply);
            })
            .map_err(|e| transport(format!("cannot spawn unit thread: {}", e)))?;

        debug!("Unit {} started", query);

        let reply = rx
            .await
            .map_err(|_| transport("unit exited without reporting an outcome".to_string()))?;
        let bytes = reply.map_err(|message| {
            warn!("Unit {} failed: {}", query, message);
            transport(message)
        })?;

        let outcome: UnitOutcome = serde_json::from_slice(&bytes)
            .map_err(|e| transport(format!("cannot decode outcome: {}", e)))?;

        if outcome.query != query {
            return Err(transport(format!(
                "received outcome for {} instead",
                outcome.query
            )));
        }

        Ok(outcome)
    }
}
