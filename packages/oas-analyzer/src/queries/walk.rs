//! Tree traversal shared by the query predicates

use crate::document::{to_location, Document};
use crate::error::QueryError;
use serde_json::{Map, Value};

/// Root object of the document; anything else is malformed
pub(crate) fn root(document: &Document) -> Result<&Map<String, Value>, QueryError> {
    document
        .as_object()
        .ok_or_else(|| QueryError::malformed("document root is not an object"))
}

/// `paths` object, if present
pub(crate) fn paths(document: &Document) -> Result<Option<&Map<String, Value>>, QueryError> {
    match root(document)?.get("paths") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(paths)) => Ok(Some(paths)),
        Some(_) => Err(QueryError::malformed("`paths` is not an object")),
    }
}

/// Visit every node below `prefix` in document order, with its path
pub(crate) fn walk_from<'a, F>(document: &'a Document, prefix: &[&str], visit: &mut F)
where
    F: FnMut(&[String], &'a Value),
{
    let mut node = document;
    for segment in prefix {
        node = match node {
            Value::Object(map) => match map.get(*segment) {
                Some(child) => child,
                None => return,
            },
            _ => return,
        };
    }

    let mut path: Vec<String> = prefix.iter().map(|s| s.to_string()).collect();
    walk_inner(node, &mut path, visit);
}

fn walk_inner<'a, F>(value: &'a Value, path: &mut Vec<String>, visit: &mut F)
where
    F: FnMut(&[String], &'a Value),
{
    visit(path, value);
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                path.push(key.clone());
                walk_inner(child, path, visit);
                path.pop();
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                path.push(index.to_string());
                walk_inner(child, path, visit);
                path.pop();
            }
        }
        _ => {}
    }
}

/// Segment `n` positions from the end of `path` (0 = last)
pub(crate) fn segment_from_end(path: &[String], n: usize) -> Option<&str> {
    path.len()
        .checked_sub(n + 1)
        .and_then(|i| path.get(i))
        .map(String::as_str)
}

/// Whether the node is a schema property named like a keyword (`properties/<key>`)
fn is_property_name(path: &[String]) -> bool {
    segment_from_end(path, 1) == Some("properties")
}

/// Locations of every `key` member below `prefix`, skipping schema property names
pub(crate) fn find_key(document: &Document, prefix: &[&str], key: &str) -> Vec<String> {
    let mut found = Vec::new();
    walk_from(document, prefix, &mut |path, _| {
        if path.last().map(String::as_str) == Some(key) && !is_property_name(path) {
            found.push(to_location(path));
        }
    });
    found
}

/// Locations of `key` members whose value satisfies `predicate`
pub(crate) fn find_key_where<P>(document: &Document, key: &str, predicate: P) -> Vec<String>
where
    P: Fn(&Value) -> bool,
{
    let mut found = Vec::new();
    walk_from(document, &[], &mut |path, value| {
        if path.last().map(String::as_str) == Some(key) && !is_property_name(path) && predicate(value)
        {
            found.push(to_location(path));
        }
    });
    found
}

pub(crate) fn sorted_unique(mut values: Vec<String>) -> Vec<String> {
    values.sort();
    values.dedup();
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_must_be_object() {
        assert!(root(&json!([])).is_err());
        assert!(root(&json!({})).is_ok());
    }

    #[test]
    fn test_paths_shape() {
        assert!(paths(&json!({})).unwrap().is_none());
        assert!(paths(&json!({"paths": {}})).unwrap().is_some());
        assert!(paths(&json!({"paths": 3})).is_err());
    }

    #[test]
    fn test_find_key_skips_property_names() {
        let doc = json!({
            "components": {"schemas": {"Pet": {
                "discriminator": {"propertyName": "kind"},
                "properties": {"discriminator": {"type": "string"}}
            }}}
        });

        assert_eq!(
            find_key(&doc, &[], "discriminator"),
            vec!["#/components/schemas/Pet/discriminator".to_string()]
        );
    }

    #[test]
    fn test_walk_from_missing_prefix_visits_nothing() {
        let doc = json!({"a": 1});
        let mut visited = 0;
        walk_from(&doc, &["missing", "deeper"], &mut |_, _| visited += 1);
        assert_eq!(visited, 0);
    }

    #[test]
    fn test_segment_from_end() {
        let path: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(segment_from_end(&path, 0), Some("c"));
        assert_eq!(segment_from_end(&path, 2), Some("a"));
        assert_eq!(segment_from_end(&path, 3), None);
    }
}
