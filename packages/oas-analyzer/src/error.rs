use crate::mode::ExecutionMode;
use crate::queries::QueryName;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalyzerError>;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Query {query} failed ({mode} mode): {message}")]
    QueryExecution {
        query: QueryName,
        mode: ExecutionMode,
        message: String,
    },

    #[error("Isolation unit for {query} failed on {executor}: {message}")]
    IsolationTransport {
        query: QueryName,
        executor: String,
        message: String,
    },

    #[error(transparent)]
    Dereference(#[from] DereferenceError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Missing result for query {query}")]
    MissingResult { query: QueryName },

    #[error("Query {query} produced the wrong result shape (expected {expected})")]
    ShapeMismatch {
        query: QueryName,
        expected: &'static str,
    },

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}

impl AnalyzerError {
    pub fn serialization<E: std::fmt::Display>(e: E) -> Self {
        Self::Serialization(e.to_string())
    }

    pub fn transport(query: QueryName, executor: &str, message: impl Into<String>) -> Self {
        Self::IsolationTransport {
            query,
            executor: executor.to_string(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalyzerError::QueryExecution { .. } => ErrorKind::QueryExecution,
            AnalyzerError::IsolationTransport { .. } => ErrorKind::IsolationTransport,
            AnalyzerError::Dereference(_) => ErrorKind::Dereference,
            AnalyzerError::Serialization(_) => ErrorKind::Serialization,
            AnalyzerError::MissingResult { .. } | AnalyzerError::ShapeMismatch { .. } => {
                ErrorKind::Contract
            }
            AnalyzerError::Config(_) => ErrorKind::Config,
        }
    }

    /// Query the error is attributed to, if any
    pub fn query(&self) -> Option<QueryName> {
        match self {
            AnalyzerError::QueryExecution { query, .. }
            | AnalyzerError::IsolationTransport { query, .. }
            | AnalyzerError::MissingResult { query }
            | AnalyzerError::ShapeMismatch { query, .. } => Some(*query),
            _ => None,
        }
    }
}

/// Error kinds, for callers that only need to branch on the failure class
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// A catalog query raised against the document
    QueryExecution,
    /// An isolated unit failed to start, crashed, or lost its outcome
    IsolationTransport,
    /// References could not be expanded
    Dereference,
    Serialization,
    /// Report assembly received results that break the catalog contract
    Contract,
    Config,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::QueryExecution => "query_execution",
            ErrorKind::IsolationTransport => "isolation_transport",
            ErrorKind::Dereference => "dereference",
            ErrorKind::Serialization => "serialization",
            ErrorKind::Contract => "contract",
            ErrorKind::Config => "config",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error raised by a catalog query
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Query not registered in catalog: {0}")]
    Unregistered(QueryName),

    #[error("Unknown query name: {0}")]
    UnknownQuery(String),
}

impl QueryError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDocument(message.into())
    }
}

/// Reference expansion failure. A detected cycle is not an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot resolve {reference}: {reason}")]
pub struct DereferenceError {
    pub reference: String,
    pub reason: String,
}

impl DereferenceError {
    pub fn new(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            reason: reason.into(),
        }
    }
}
