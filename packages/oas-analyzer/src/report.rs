//! Report assembly
//!
//! The report layout is data: [`GENERAL_STATS`] and [`FINDING_RULES`]
//! name every entry, where its value comes from, and when it is included.
//! [`assemble`] is the single generic consumer of those tables.

use crate::auxiliary::AuxiliaryFindings;
use crate::error::{AnalyzerError, Result};
use crate::queries::{QueryName, QueryResult, QueryResults};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A presence-flagged finding. `present` is always `!locations.is_empty()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub present: bool,
    pub locations: Vec<String>,
}

impl Finding {
    pub fn from_locations(locations: Vec<String>) -> Self {
        Self {
            present: !locations.is_empty(),
            locations,
        }
    }
}

/// Value of a general statistic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Found {
    Count(u64),
    /// Megabytes
    Size(f64),
    Values(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarStat {
    pub name: String,
    pub found: Found,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub general: BTreeMap<String, ScalarStat>,
    pub openapi: BTreeMap<String, Finding>,
    pub readme: BTreeMap<String, Finding>,
}

impl Report {
    pub fn finding(&self, category: Category, key: &str) -> Option<&Finding> {
        match category {
            Category::OpenApi => self.openapi.get(key),
            Category::Readme => self.readme.get(key),
        }
    }

    /// Every location-style finding, across both categories
    pub fn findings(&self) -> impl Iterator<Item = (&str, &Finding)> {
        self.openapi
            .iter()
            .chain(self.readme.iter())
            .map(|(key, finding)| (key.as_str(), finding))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// OpenAPI / JSON Schema features
    OpenApi,
    /// ReadMe vendor extensions
    Readme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindingSource {
    Query(QueryName),
    CircularRefs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InclusionRule {
    /// Always reported, with `present: false` when empty
    Always,
    /// Reported only when there is at least one location (deprecated features)
    WhenPresent,
}

#[derive(Debug, Clone, Copy)]
pub struct FindingRule {
    pub category: Category,
    pub key: &'static str,
    pub source: FindingSource,
    pub inclusion: InclusionRule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatSource {
    Query(QueryName),
    RawFileSize,
    DereferencedFileSize,
}

#[derive(Debug, Clone, Copy)]
pub struct StatRule {
    pub key: &'static str,
    pub name: &'static str,
    pub source: StatSource,
}

pub const GENERAL_STATS: &[StatRule] = &[
    StatRule {
        key: "dereferencedFileSize",
        name: "Dereferenced File Size",
        source: StatSource::DereferencedFileSize,
    },
    StatRule {
        key: "mediaTypes",
        name: "Media Type",
        source: StatSource::Query(QueryName::MediaTypes),
    },
    StatRule {
        key: "operationTotal",
        name: "Operation",
        source: StatSource::Query(QueryName::TotalOperations),
    },
    StatRule {
        key: "rawFileSize",
        name: "Raw File Size",
        source: StatSource::RawFileSize,
    },
    StatRule {
        key: "securityTypes",
        name: "Security Type",
        source: StatSource::Query(QueryName::SecurityTypes),
    },
];

const fn openapi(key: &'static str, query: QueryName) -> FindingRule {
    FindingRule {
        category: Category::OpenApi,
        key,
        source: FindingSource::Query(query),
        inclusion: InclusionRule::Always,
    }
}

const fn readme(key: &'static str, query: QueryName, inclusion: InclusionRule) -> FindingRule {
    FindingRule {
        category: Category::Readme,
        key,
        source: FindingSource::Query(query),
        inclusion,
    }
}

pub const FINDING_RULES: &[FindingRule] = &[
    openapi("additionalProperties", QueryName::AdditionalProperties),
    openapi("callbacks", QueryName::Callbacks),
    FindingRule {
        category: Category::OpenApi,
        key: "circularRefs",
        source: FindingSource::CircularRefs,
        inclusion: InclusionRule::Always,
    },
    openapi("commonParameters", QueryName::CommonParameters),
    openapi("discriminators", QueryName::Discriminators),
    openapi("links", QueryName::Links),
    openapi("style", QueryName::ParameterSerialization),
    openapi("polymorphism", QueryName::Polymorphism),
    openapi("serverVariables", QueryName::ServerVariables),
    openapi("webhooks", QueryName::Webhooks),
    openapi("xml", QueryName::Xml),
    openapi("xmlSchemas", QueryName::XmlSchemas),
    openapi("xmlRequests", QueryName::XmlRequests),
    openapi("xmlResponses", QueryName::XmlResponses),
    readme("x-default", QueryName::AuthDefaults, InclusionRule::Always),
    readme("x-readme.code-samples", QueryName::CustomCodeSamples, InclusionRule::Always),
    readme("x-readme.headers", QueryName::StaticHeaders, InclusionRule::Always),
    readme("x-readme.explorer-enabled", QueryName::ExplorerDisabled, InclusionRule::Always),
    readme("x-readme.proxy-enabled", QueryName::CorsProxyDisabled, InclusionRule::Always),
    readme("x-readme.samples-languages", QueryName::CodeSampleLanguages, InclusionRule::Always),
    readme("x-readme-ref-name", QueryName::RefNames, InclusionRule::Always),
    readme("x-readme.samples-enabled", QueryName::CodeSamplesDisabled, InclusionRule::WhenPresent),
    readme("raw_body", QueryName::RawBody, InclusionRule::WhenPresent),
];

fn stat_value(rule: &StatRule, queries: &QueryResults, aux: &AuxiliaryFindings) -> Result<Found> {
    Ok(match rule.source {
        StatSource::RawFileSize => Found::Size(aux.file_size.raw),
        StatSource::DereferencedFileSize => Found::Size(aux.file_size.dereferenced),
        StatSource::Query(name) => match queries
            .get(name)
            .ok_or(AnalyzerError::MissingResult { query: name })?
        {
            QueryResult::Count(count) => Found::Count(*count),
            QueryResult::Locations(values) => Found::Values(values.clone()),
        },
    })
}

/// Merge sync query results and auxiliary findings into the report.
///
/// A missing or wrongly shaped query result is a contract violation and
/// surfaces as an error rather than a partial report.
pub fn assemble(queries: &QueryResults, aux: &AuxiliaryFindings) -> Result<Report> {
    let mut report = Report::default();

    for rule in GENERAL_STATS {
        let stat = ScalarStat {
            name: rule.name.to_string(),
            found: stat_value(rule, queries, aux)?,
        };
        report.general.insert(rule.key.to_string(), stat);
    }

    for rule in FINDING_RULES {
        let locations = match rule.source {
            FindingSource::Query(name) => queries.locations(name)?.to_vec(),
            FindingSource::CircularRefs => aux.circular_refs.clone(),
        };

        let finding = Finding::from_locations(locations);
        if rule.inclusion == InclusionRule::WhenPresent && !finding.present {
            continue;
        }

        let category = match rule.category {
            Category::OpenApi => &mut report.openapi,
            Category::Readme => &mut report.readme,
        };
        category.insert(rule.key.to_string(), finding);
    }

    Ok(report)
}
