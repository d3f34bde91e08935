//! ReadMe vendor-extension queries
//!
//! Most extensions can be written either nested under `x-readme`
//! (`x-readme: {explorer-enabled: false}`) or as a flat legacy key
//! (`x-explorer-enabled: false`). Both spellings are reported.

use super::walk::{find_key, find_key_where, root, segment_from_end, sorted_unique, walk_from};
use super::QueryResult;
use crate::document::{to_location, Document};
use crate::error::QueryError;
use serde_json::Value;

type QueryOutput = Result<QueryResult, QueryError>;

fn locations(found: Vec<String>) -> QueryOutput {
    Ok(QueryResult::Locations(sorted_unique(found)))
}

/// Locations of `x-readme.<option>` and `x-<option>` whose value satisfies `predicate`
fn extension<P>(document: &Document, option: &str, predicate: P) -> Vec<String>
where
    P: Fn(&Value) -> bool,
{
    let mut found = Vec::new();
    walk_from(document, &[], &mut |path, value| {
        if path.last().map(String::as_str) == Some("x-readme") {
            if let Some(option_value) = value.get(option) {
                if predicate(option_value) {
                    let mut location = path.to_vec();
                    location.push(option.to_string());
                    found.push(to_location(&location));
                }
            }
        }
    });
    found.extend(find_key_where(document, &format!("x-{}", option), predicate));
    found
}

fn is_false(value: &Value) -> bool {
    value == &Value::Bool(false)
}

fn is_non_empty(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

/// `x-default` values on security schemes
pub fn auth_defaults(document: &Document) -> QueryOutput {
    root(document)?;
    let mut found = find_key(document, &["components", "securitySchemes"], "x-default");
    found.extend(find_key(document, &["securityDefinitions"], "x-default"));
    locations(found)
}

/// Distinct languages configured for generated code samples
pub fn code_sample_languages(document: &Document) -> QueryOutput {
    root(document)?;
    let mut found = Vec::new();
    let mut collect = |value: &Value| {
        if let Value::Array(languages) = value {
            found.extend(languages.iter().filter_map(Value::as_str).map(str::to_string));
        }
    };

    walk_from(document, &[], &mut |path, value| {
        match path.last().map(String::as_str) {
            Some("x-readme") => {
                if let Some(languages) = value.get("samples-languages") {
                    collect(languages);
                }
            }
            Some("x-samples-languages") if segment_from_end(path, 1) != Some("properties") => {
                collect(value)
            }
            _ => {}
        }
    });
    locations(found)
}

/// Deprecated: `samples-enabled: false`
pub fn code_samples_disabled(document: &Document) -> QueryOutput {
    root(document)?;
    locations(extension(document, "samples-enabled", is_false))
}

pub fn cors_proxy_disabled(document: &Document) -> QueryOutput {
    root(document)?;
    locations(extension(document, "proxy-enabled", is_false))
}

pub fn custom_code_samples(document: &Document) -> QueryOutput {
    root(document)?;
    locations(extension(document, "code-samples", is_non_empty))
}

pub fn explorer_disabled(document: &Document) -> QueryOutput {
    root(document)?;
    locations(extension(document, "explorer-enabled", is_false))
}

/// Deprecated: schemas exposing a single `RAW_BODY` property
pub fn raw_body(document: &Document) -> QueryOutput {
    root(document)?;
    let mut found = Vec::new();
    walk_from(document, &[], &mut |path, _| {
        if path.last().map(String::as_str) == Some("RAW_BODY")
            && segment_from_end(path, 1) == Some("properties")
        {
            found.push(to_location(path));
        }
    });
    locations(found)
}

pub fn ref_names(document: &Document) -> QueryOutput {
    root(document)?;
    locations(find_key(document, &[], "x-readme-ref-name"))
}

pub fn static_headers(document: &Document) -> QueryOutput {
    root(document)?;
    locations(extension(document, "headers", is_non_empty))
}
