//! Query catalog
//!
//! A fixed set of named, pure functions over a [`Document`]. Each query is
//! deterministic, performs no I/O, keeps no state, and reports malformed
//! input as a [`QueryError`]. The catalog is an explicit value handed to
//! the engine, so entries can be swapped out (e.g. for mocks) without
//! touching execution logic.

pub mod openapi;
pub mod readme;
mod walk;

use crate::document::Document;
use crate::error::{AnalyzerError, QueryError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

/// Names of all synchronous queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryName {
    // OpenAPI
    AdditionalProperties,
    Callbacks,
    CommonParameters,
    Discriminators,
    Links,
    MediaTypes,
    ParameterSerialization,
    Polymorphism,
    SecurityTypes,
    ServerVariables,
    TotalOperations,
    Webhooks,
    Xml,
    XmlRequests,
    XmlResponses,
    XmlSchemas,
    // ReadMe extensions
    AuthDefaults,
    CodeSampleLanguages,
    CodeSamplesDisabled,
    CorsProxyDisabled,
    CustomCodeSamples,
    ExplorerDisabled,
    RawBody,
    RefNames,
    StaticHeaders,
}

/// Result shape of a query, fixed per name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    Locations,
    Count,
}

impl ResultShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultShape::Locations => "locations",
            ResultShape::Count => "count",
        }
    }
}

impl QueryName {
    pub const ALL: [QueryName; 25] = [
        QueryName::AdditionalProperties,
        QueryName::Callbacks,
        QueryName::CommonParameters,
        QueryName::Discriminators,
        QueryName::Links,
        QueryName::MediaTypes,
        QueryName::ParameterSerialization,
        QueryName::Polymorphism,
        QueryName::SecurityTypes,
        QueryName::ServerVariables,
        QueryName::TotalOperations,
        QueryName::Webhooks,
        QueryName::Xml,
        QueryName::XmlRequests,
        QueryName::XmlResponses,
        QueryName::XmlSchemas,
        QueryName::AuthDefaults,
        QueryName::CodeSampleLanguages,
        QueryName::CodeSamplesDisabled,
        QueryName::CorsProxyDisabled,
        QueryName::CustomCodeSamples,
        QueryName::ExplorerDisabled,
        QueryName::RawBody,
        QueryName::RefNames,
        QueryName::StaticHeaders,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryName::AdditionalProperties => "additionalProperties",
            QueryName::Callbacks => "callbacks",
            QueryName::CommonParameters => "commonParameters",
            QueryName::Discriminators => "discriminators",
            QueryName::Links => "links",
            QueryName::MediaTypes => "mediaTypes",
            QueryName::ParameterSerialization => "parameterSerialization",
            QueryName::Polymorphism => "polymorphism",
            QueryName::SecurityTypes => "securityTypes",
            QueryName::ServerVariables => "serverVariables",
            QueryName::TotalOperations => "totalOperations",
            QueryName::Webhooks => "webhooks",
            QueryName::Xml => "xml",
            QueryName::XmlRequests => "xmlRequests",
            QueryName::XmlResponses => "xmlResponses",
            QueryName::XmlSchemas => "xmlSchemas",
            QueryName::AuthDefaults => "authDefaults",
            QueryName::CodeSampleLanguages => "codeSampleLanguages",
            QueryName::CodeSamplesDisabled => "codeSamplesDisabled",
            QueryName::CorsProxyDisabled => "corsProxyDisabled",
            QueryName::CustomCodeSamples => "customCodeSamples",
            QueryName::ExplorerDisabled => "explorerDisabled",
            QueryName::RawBody => "rawBody",
            QueryName::RefNames => "refNames",
            QueryName::StaticHeaders => "staticHeaders",
        }
    }

    pub fn shape(&self) -> ResultShape {
        match self {
            QueryName::TotalOperations => ResultShape::Count,
            _ => ResultShape::Locations,
        }
    }
}

impl FromStr for QueryName {
    type Err = QueryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        QueryName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| QueryError::UnknownQuery(s.to_string()))
    }
}

impl std::fmt::Display for QueryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output of one query: a location list or a count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryResult {
    Locations(Vec<String>),
    Count(u64),
}

impl QueryResult {
    pub fn shape(&self) -> ResultShape {
        match self {
            QueryResult::Locations(_) => ResultShape::Locations,
            QueryResult::Count(_) => ResultShape::Count,
        }
    }

    pub fn as_locations(&self) -> Option<&[String]> {
        match self {
            QueryResult::Locations(locations) => Some(locations),
            QueryResult::Count(_) => None,
        }
    }

    pub fn as_count(&self) -> Option<u64> {
        match self {
            QueryResult::Count(count) => Some(*count),
            QueryResult::Locations(_) => None,
        }
    }
}

pub type QueryFn = fn(&Document) -> std::result::Result<QueryResult, QueryError>;

/// Table of query functions, keyed by name
#[derive(Clone)]
pub struct QueryCatalog {
    queries: HashMap<QueryName, QueryFn>,
}

impl QueryCatalog {
    pub fn empty() -> Self {
        Self {
            queries: HashMap::new(),
        }
    }

    /// The built-in OpenAPI + ReadMe extension queries
    pub fn standard() -> Self {
        let entries: [(QueryName, QueryFn); 25] = [
            (QueryName::AdditionalProperties, openapi::additional_properties),
            (QueryName::Callbacks, openapi::callbacks),
            (QueryName::CommonParameters, openapi::common_parameters),
            (QueryName::Discriminators, openapi::discriminators),
            (QueryName::Links, openapi::links),
            (QueryName::MediaTypes, openapi::media_types),
            (QueryName::ParameterSerialization, openapi::parameter_serialization),
            (QueryName::Polymorphism, openapi::polymorphism),
            (QueryName::SecurityTypes, openapi::security_types),
            (QueryName::ServerVariables, openapi::server_variables),
            (QueryName::TotalOperations, openapi::total_operations),
            (QueryName::Webhooks, openapi::webhooks),
            (QueryName::Xml, openapi::xml),
            (QueryName::XmlRequests, openapi::xml_requests),
            (QueryName::XmlResponses, openapi::xml_responses),
            (QueryName::XmlSchemas, openapi::xml_schemas),
            (QueryName::AuthDefaults, readme::auth_defaults),
            (QueryName::CodeSampleLanguages, readme::code_sample_languages),
            (QueryName::CodeSamplesDisabled, readme::code_samples_disabled),
            (QueryName::CorsProxyDisabled, readme::cors_proxy_disabled),
            (QueryName::CustomCodeSamples, readme::custom_code_samples),
            (QueryName::ExplorerDisabled, readme::explorer_disabled),
            (QueryName::RawBody, readme::raw_body),
            (QueryName::RefNames, readme::ref_names),
            (QueryName::StaticHeaders, readme::static_headers),
        ];

        Self {
            queries: entries.into_iter().collect(),
        }
    }

    /// Replace (or add) a single entry
    pub fn with_query(mut self, name: QueryName, query: QueryFn) -> Self {
        self.queries.insert(name, query);
        self
    }

    pub fn contains(&self, name: QueryName) -> bool {
        self.queries.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    pub fn run(
        &self,
        name: QueryName,
        document: &Document,
    ) -> std::result::Result<QueryResult, QueryError> {
        let query = self
            .queries
            .get(&name)
            .ok_or(QueryError::Unregistered(name))?;
        query(document)
    }
}

impl Default for QueryCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for QueryCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.queries.keys().map(|n| n.as_str()).collect();
        names.sort_unstable();
        f.debug_struct("QueryCatalog").field("queries", &names).finish()
    }
}

/// Merged query outputs, keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryResults {
    results: BTreeMap<QueryName, QueryResult>,
}

impl QueryResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: QueryName, result: QueryResult) {
        self.results.insert(name, result);
    }

    pub fn get(&self, name: QueryName) -> Option<&QueryResult> {
        self.results.get(&name)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = QueryName> + '_ {
        self.results.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QueryName, &QueryResult)> {
        self.results.iter().map(|(name, result)| (*name, result))
    }

    fn require(&self, name: QueryName) -> Result<&QueryResult> {
        self.results
            .get(&name)
            .ok_or(AnalyzerError::MissingResult { query: name })
    }

    /// Location list for `name`; missing or count-shaped results are contract violations
    pub fn locations(&self, name: QueryName) -> Result<&[String]> {
        self.require(name)?
            .as_locations()
            .ok_or(AnalyzerError::ShapeMismatch {
                query: name,
                expected: ResultShape::Locations.as_str(),
            })
    }

    pub fn count(&self, name: QueryName) -> Result<u64> {
        self.require(name)?
            .as_count()
            .ok_or(AnalyzerError::ShapeMismatch {
                query: name,
                expected: ResultShape::Count.as_str(),
            })
    }
}

impl FromIterator<(QueryName, QueryResult)> for QueryResults {
    fn from_iter<I: IntoIterator<Item = (QueryName, QueryResult)>>(iter: I) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}
