/*
 * OAS Analyzer - OpenAPI Feature Usage Analysis
 *
 * Runs a fixed catalog of pure queries against a parsed OpenAPI/Swagger
 * document and assembles a categorized feature-usage report.
 *
 * Architecture:
 * - Query Catalog (explicit, replaceable table of pure functions)
 * - Mode Selector (sequential vs isolated units, by document size)
 * - Sequential Executor / Isolated-Unit Dispatcher (all-or-nothing join)
 * - Auxiliary Runner (circular refs + file size, via dereferencing)
 * - Report Assembler (declarative finding tables)
 */

// Public modules
pub mod analyzer;
pub mod auxiliary;
pub mod config;
pub mod deref;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod isolation;
pub mod mode;
pub mod queries;
pub mod report;

// Re-exports
pub use analyzer::{analyze, Analyzer, QueryExecution, SYNC_QUERY_NAMES};
pub use auxiliary::{AuxiliaryFindings, FileSize};
pub use config::{ConfigError, ExecutionConfig};
pub use deref::{Dereferenced, Dereferencer, InternalRefDereferencer};
pub use document::{Document, DocumentSnapshot};
pub use error::{AnalyzerError, DereferenceError, ErrorKind, QueryError, Result};
pub use isolation::{
    InProcessExecutor, IsolatedExecutor, ThreadUnitExecutor, UnitOutcome, UnitTask,
};
pub use mode::{select_mode, size_threshold_strategy, ExecutionMode, ModeStrategy};
pub use queries::{QueryCatalog, QueryFn, QueryName, QueryResult, QueryResults, ResultShape};
pub use report::{Category, Finding, Found, InclusionRule, Report, ScalarStat};
