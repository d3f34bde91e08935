//! OpenAPI / JSON Schema feature queries

use super::walk::{find_key, paths, root, segment_from_end, sorted_unique, walk_from};
use super::QueryResult;
use crate::document::{to_location, Document};
use crate::error::QueryError;
use serde_json::Value;

type QueryOutput = Result<QueryResult, QueryError>;

/// HTTP methods that make up an operation within a path item
pub const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

fn locations(found: Vec<String>) -> QueryOutput {
    Ok(QueryResult::Locations(sorted_unique(found)))
}

pub fn is_xml_media_type(media_type: &str) -> bool {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/xml" || essence == "text/xml" || essence.ends_with("+xml")
}

pub fn additional_properties(document: &Document) -> QueryOutput {
    root(document)?;
    locations(find_key(document, &[], "additionalProperties"))
}

pub fn callbacks(document: &Document) -> QueryOutput {
    root(document)?;
    let mut found = find_key(document, &["paths"], "callbacks");
    found.extend(find_key(document, &["components"], "callbacks"));
    locations(found)
}

/// Parameters declared on a path item rather than an operation
pub fn common_parameters(document: &Document) -> QueryOutput {
    let mut found = Vec::new();
    if let Some(paths) = paths(document)? {
        for (path, item) in paths {
            if item.get("parameters").is_some() {
                found.push(to_location(&["paths", path.as_str(), "parameters"]));
            }
        }
    }
    locations(found)
}

pub fn discriminators(document: &Document) -> QueryOutput {
    root(document)?;
    locations(find_key(document, &[], "discriminator"))
}

pub fn links(document: &Document) -> QueryOutput {
    root(document)?;
    let mut found = find_key(document, &["paths"], "links");
    found.extend(find_key(document, &["components"], "links"));
    locations(found)
}

/// Distinct media types used by requests and responses
pub fn media_types(document: &Document) -> QueryOutput {
    let root = root(document)?;
    let mut found = Vec::new();

    // OpenAPI 3: `content` maps under paths
    walk_from(document, &["paths"], &mut |path, value| {
        if path.last().map(String::as_str) == Some("content")
            && segment_from_end(path, 1) != Some("properties")
        {
            if let Value::Object(content) = value {
                found.extend(content.keys().cloned());
            }
        }
    });

    // Swagger 2: `consumes` / `produces` at the root and per operation
    let mut collect = |value: Option<&Value>| {
        if let Some(Value::Array(items)) = value {
            found.extend(items.iter().filter_map(Value::as_str).map(str::to_string));
        }
    };
    collect(root.get("consumes"));
    collect(root.get("produces"));
    if let Some(paths) = paths(document)? {
        for item in paths.values() {
            for method in HTTP_METHODS {
                if let Some(operation) = item.get(method) {
                    collect(operation.get("consumes"));
                    collect(operation.get("produces"));
                }
            }
        }
    }

    locations(found)
}

/// Parameters that set an explicit serialization `style`
pub fn parameter_serialization(document: &Document) -> QueryOutput {
    root(document)?;
    let mut found = Vec::new();
    let mut visit = |path: &[String], value: &Value| {
        if segment_from_end(path, 1) == Some("parameters") && value.get("style").is_some() {
            let mut style = path.to_vec();
            style.push("style".to_string());
            found.push(to_location(&style));
        }
    };
    walk_from(document, &["paths"], &mut visit);
    walk_from(document, &["components", "parameters"], &mut |path, value| {
        if path.len() == 3 && value.get("style").is_some() {
            let mut style = path.to_vec();
            style.push("style".to_string());
            found.push(to_location(&style));
        }
    });
    locations(found)
}

pub fn polymorphism(document: &Document) -> QueryOutput {
    root(document)?;
    let mut found = Vec::new();
    for keyword in ["allOf", "anyOf", "oneOf"] {
        found.extend(find_key(document, &[], keyword));
    }
    locations(found)
}

/// Distinct security scheme types (`apiKey`, `oauth2`, ...)
pub fn security_types(document: &Document) -> QueryOutput {
    let root = root(document)?;
    let schemes = root
        .get("components")
        .and_then(|c| c.get("securitySchemes"))
        .or_else(|| root.get("securityDefinitions"));

    let mut found = Vec::new();
    if let Some(Value::Object(schemes)) = schemes {
        for scheme in schemes.values() {
            if let Some(kind) = scheme.get("type").and_then(Value::as_str) {
                found.push(kind.to_string());
            }
        }
    }
    locations(found)
}

pub fn server_variables(document: &Document) -> QueryOutput {
    root(document)?;
    let mut found = Vec::new();
    walk_from(document, &[], &mut |path, value| {
        if path.last().map(String::as_str) == Some("variables")
            && segment_from_end(path, 2) == Some("servers")
            && value.is_object()
        {
            found.push(to_location(path));
        }
    });
    locations(found)
}

pub fn total_operations(document: &Document) -> QueryOutput {
    let mut total = 0u64;
    if let Some(paths) = paths(document)? {
        for (path, item) in paths {
            let item = item.as_object().ok_or_else(|| {
                QueryError::malformed(format!("path item `{}` is not an object", path))
            })?;
            total += HTTP_METHODS
                .iter()
                .filter(|method| item.contains_key(**method))
                .count() as u64;
        }
    }
    Ok(QueryResult::Count(total))
}

pub fn webhooks(document: &Document) -> QueryOutput {
    let root = root(document)?;
    let mut found = Vec::new();
    if let Some(Value::Object(hooks)) = root.get("webhooks") {
        for name in hooks.keys() {
            found.push(to_location(&["webhooks", name.as_str()]));
        }
    }
    locations(found)
}

/// Any use of the `xml` schema keyword
pub fn xml(document: &Document) -> QueryOutput {
    root(document)?;
    locations(find_key(document, &[], "xml"))
}

pub fn xml_schemas(document: &Document) -> QueryOutput {
    root(document)?;
    let mut found = find_key(document, &["components", "schemas"], "xml");
    found.extend(find_key(document, &["definitions"], "xml"));
    locations(found)
}

pub fn xml_requests(document: &Document) -> QueryOutput {
    xml_payloads(document, "requestBody", "consumes")
}

pub fn xml_responses(document: &Document) -> QueryOutput {
    xml_payloads(document, "responses", "produces")
}

/// XML media types under `container` (OpenAPI 3) or in the `swagger_list` (Swagger 2)
fn xml_payloads(document: &Document, container: &str, swagger_list: &str) -> QueryOutput {
    root(document)?;
    let mut found = Vec::new();
    walk_from(document, &["paths"], &mut |path, value| {
        if path.last().map(String::as_str) != Some("content") || !path.iter().any(|s| s == container)
        {
            return;
        }
        if let Value::Object(content) = value {
            for media_type in content.keys().filter(|m| is_xml_media_type(m)) {
                let mut location = path.to_vec();
                location.push(media_type.clone());
                found.push(to_location(&location));
            }
        }
    });

    walk_from(document, &["paths"], &mut |path, value| {
        if path.last().map(String::as_str) == Some(swagger_list) {
            if let Value::Array(items) = value {
                for (index, item) in items.iter().enumerate() {
                    if item.as_str().map_or(false, is_xml_media_type) {
                        let mut location = path.to_vec();
                        location.push(index.to_string());
                        found.push(to_location(&location));
                    }
                }
            }
        }
    });

    locations(found)
}
