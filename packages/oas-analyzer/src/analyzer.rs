//! Top-level analysis entry point

use crate::auxiliary::run_auxiliary;
use crate::config::ExecutionConfig;
use crate::deref::{Dereferencer, InternalRefDereferencer};
use crate::dispatch::{dispatch_units, run_sequential};
use crate::document::{Document, DocumentSnapshot};
use crate::error::Result;
use crate::isolation::{IsolatedExecutor, ThreadUnitExecutor};
use crate::mode::{select_mode, size_threshold_strategy, ExecutionMode, ModeStrategy};
use crate::queries::{QueryCatalog, QueryName, QueryResults};
use crate::report::{assemble, Report};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Every sync query, run as one batch by [`Analyzer::analyze`]
pub const SYNC_QUERY_NAMES: [QueryName; 25] = QueryName::ALL;

/// Sync batch results plus the mode that produced them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryExecution {
    pub results: QueryResults,
    pub execution_mode: ExecutionMode,
}

/// Query execution engine.
///
/// Holds its collaborators explicitly: the query catalog, the
/// dereferencer used by the auxiliary queries, and the isolated executor
/// (if any) used for parallel batches.
pub struct Analyzer {
    catalog: Arc<QueryCatalog>,
    dereferencer: Arc<dyn Dereferencer>,
    executor: Option<Arc<dyn IsolatedExecutor>>,
    config: ExecutionConfig,
    strategy: ModeStrategy,
}

impl Analyzer {
    /// Standard catalog, internal-ref dereferencer, one thread per unit
    pub fn new() -> Self {
        Self::with_catalog(QueryCatalog::standard())
    }

    /// Use `catalog`; the default thread executor is built over the same catalog
    pub fn with_catalog(catalog: QueryCatalog) -> Self {
        let catalog = Arc::new(catalog);
        Self {
            executor: Some(Arc::new(ThreadUnitExecutor::new(catalog.clone()))),
            catalog,
            dereferencer: Arc::new(InternalRefDereferencer::new()),
            config: ExecutionConfig::default(),
            strategy: size_threshold_strategy,
        }
    }

    pub fn with_config(mut self, config: ExecutionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_strategy(mut self, strategy: ModeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_dereferencer(mut self, dereferencer: Arc<dyn Dereferencer>) -> Self {
        self.dereferencer = dereferencer;
        self
    }

    /// Replace the isolated executor. It must evaluate against an
    /// equivalent catalog, or results will differ between modes.
    pub fn with_executor(mut self, executor: Arc<dyn IsolatedExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Drop isolation capability; every batch runs sequentially
    pub fn without_isolation(mut self) -> Self {
        self.executor = None;
        self
    }

    pub fn catalog(&self) -> &QueryCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    fn isolation(&self) -> Option<&Arc<dyn IsolatedExecutor>> {
        self.executor.as_ref().filter(|executor| executor.is_available())
    }

    /// Run a batch of sync queries, in-process or fanned out to units
    pub async fn run_queries(
        &self,
        names: &[QueryName],
        document: &Document,
    ) -> Result<QueryExecution> {
        // Measured once; the same snapshot seeds the units in parallel mode
        let snapshot = DocumentSnapshot::capture(document)?;
        let isolation = self.isolation();
        let mode = select_mode(self.strategy, snapshot.len(), &self.config, isolation.is_some());

        let results = match isolation.filter(|_| mode == ExecutionMode::Parallel) {
            Some(executor) => dispatch_units(executor.as_ref(), names, &snapshot).await?,
            None => run_sequential(&self.catalog, names, document)?,
        };

        Ok(QueryExecution {
            results,
            execution_mode: mode,
        })
    }

    /// Full feature-usage report for `document`
    pub async fn analyze(&self, document: &Document) -> Result<Report> {
        let start = Instant::now();

        let joined = tokio::try_join!(
            run_auxiliary(self.dereferencer.as_ref(), document),
            self.run_queries(&SYNC_QUERY_NAMES, document),
        );

        let (auxiliary, execution) = joined.map_err(|e| {
            error!("Analysis failed ({}): {}", e.kind(), e);
            e
        })?;

        let report = assemble(&execution.results, &auxiliary)?;

        info!(
            "Analysis completed in {}ms ({} mode, {} queries)",
            start.elapsed().as_millis(),
            execution.execution_mode,
            execution.results.len()
        );
        Ok(report)
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("catalog", &self.catalog)
            .field("executor", &self.executor.as_ref().map(|e| e.name()))
            .field("config", &self.config)
            .finish()
    }
}

/// Analyze with the default engine
pub async fn analyze(document: &Document) -> Result<Report> {
    Analyzer::new().analyze(document).await
}
