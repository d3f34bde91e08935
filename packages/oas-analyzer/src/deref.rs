//! Reference expansion
//!
//! Internal `$ref`s (`#/...`) are inlined. A `$ref` that lies on a cycle of
//! the reference graph stays in place and its location is recorded. Cycles
//! are findings, not errors.
//!
//! Expansion runs in two passes. The first collects every `$ref`, links
//! each one to the `$ref`s found inside its target, and marks the members
//! of every cycle. The second inlines the remaining references, which form
//! an acyclic graph, so each target is expanded once and reused.

use crate::document::{to_location, unescape_segment, Document};
use crate::error::DereferenceError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// A fully expanded document plus the cyclic references left in place
#[derive(Debug, Clone, PartialEq)]
pub struct Dereferenced {
    pub document: Document,
    /// Locations of `$ref` nodes that lie on a cycle, sorted and unique
    pub circular_refs: Vec<String>,
}

#[async_trait]
pub trait Dereferencer: Send + Sync {
    async fn dereference(&self, document: &Document) -> Result<Dereferenced, DereferenceError>;
}

/// Expands internal references only; external refs cannot be resolved
#[derive(Debug, Clone, Copy, Default)]
pub struct InternalRefDereferencer;

impl InternalRefDereferencer {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous expansion
    pub fn expand(document: &Document) -> Result<Dereferenced, DereferenceError> {
        let graph = ReferenceGraph::build(document)?;
        let circular = graph.circular_locations();

        let mut expansion = Expansion {
            root: document,
            circular: &circular,
            expanded_targets: HashMap::new(),
        };
        let expanded = expansion.expand(document, &mut Vec::new())?;
        let targets = expansion.expanded_targets.len();

        let mut circular_refs: Vec<String> = circular.into_iter().collect();
        circular_refs.sort();

        debug!(
            "Expanded {} references ({} targets, {} circular)",
            graph.references.len(),
            targets,
            circular_refs.len()
        );

        Ok(Dereferenced {
            document: expanded,
            circular_refs,
        })
    }
}

#[async_trait]
impl Dereferencer for InternalRefDereferencer {
    async fn dereference(&self, document: &Document) -> Result<Dereferenced, DereferenceError> {
        let owned = document.clone();
        tokio::task::spawn_blocking(move || Self::expand(&owned))
            .await
            .map_err(|e| DereferenceError::new("#", format!("dereference task failed: {}", e)))?
    }
}

/// Split `#/a/b~1c` into unescaped segments
fn parse_reference(reference: &str) -> Result<Vec<String>, DereferenceError> {
    let pointer = reference.strip_prefix('#').ok_or_else(|| {
        DereferenceError::new(reference, "external references are not supported")
    })?;

    if pointer.is_empty() {
        return Ok(Vec::new());
    }

    let pointer = pointer
        .strip_prefix('/')
        .ok_or_else(|| DereferenceError::new(reference, "malformed JSON pointer"))?;

    Ok(pointer.split('/').map(unescape_segment).collect())
}

/// Node at `target`. Array indices must be canonical (no leading zeros).
fn resolve<'a>(
    root: &'a Document,
    reference: &str,
    target: &[String],
) -> Result<&'a Value, DereferenceError> {
    let mut node = root;
    for segment in target {
        node = match node {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment
                .parse::<usize>()
                .ok()
                .filter(|index| index.to_string() == *segment)
                .and_then(|index| items.get(index)),
            _ => None,
        }
        .ok_or_else(|| DereferenceError::new(reference, "target not found"))?;
    }
    Ok(node)
}

/// Whether `location` is `target` or lies below it
fn within(location: &str, target: &str) -> bool {
    location
        .strip_prefix(target)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

struct Reference {
    location: String,
    target: String,
}

/// Every `$ref` in the document, linked to the `$ref`s inside its target
struct ReferenceGraph {
    references: Vec<Reference>,
    edges: Vec<Vec<usize>>,
}

impl ReferenceGraph {
    fn build(document: &Document) -> Result<Self, DereferenceError> {
        let mut references = Vec::new();
        collect_references(document, document, &mut Vec::new(), &mut references)?;

        let edges: Vec<Vec<usize>> = {
            let by_location: BTreeMap<&str, usize> = references
                .iter()
                .enumerate()
                .map(|(index, reference)| (reference.location.as_str(), index))
                .collect();

            references
                .iter()
                .map(|reference| {
                    let target = reference.target.as_str();
                    by_location
                        .range(target..)
                        .take_while(|(location, _)| location.starts_with(target))
                        .filter(|(location, _)| within(location, target))
                        .map(|(_, index)| *index)
                        .collect::<Vec<usize>>()
                })
                .collect()
        };

        Ok(Self { references, edges })
    }

    /// Locations of references that belong to a cycle (Tarjan's SCC)
    fn circular_locations(&self) -> HashSet<String> {
        const UNVISITED: usize = usize::MAX;

        let count = self.references.len();
        let mut index = vec![UNVISITED; count];
        let mut low = vec![0; count];
        let mut on_stack = vec![false; count];
        let mut stack = Vec::new();
        let mut next = 0;
        let mut circular = HashSet::new();

        for start in 0..count {
            if index[start] != UNVISITED {
                continue;
            }

            index[start] = next;
            low[start] = next;
            next += 1;
            stack.push(start);
            on_stack[start] = true;
            let mut frames = vec![(start, 0usize)];

            while let Some(frame) = frames.last_mut() {
                let node = frame.0;

                if let Some(&successor) = self.edges[node].get(frame.1) {
                    frame.1 += 1;
                    if index[successor] == UNVISITED {
                        index[successor] = next;
                        low[successor] = next;
                        next += 1;
                        stack.push(successor);
                        on_stack[successor] = true;
                        frames.push((successor, 0));
                    } else if on_stack[successor] {
                        low[node] = low[node].min(index[successor]);
                    }
                    continue;
                }

                frames.pop();
                if let Some(parent) = frames.last() {
                    low[parent.0] = low[parent.0].min(low[node]);
                }

                if low[node] == index[node] {
                    let mut members = Vec::new();
                    while let Some(member) = stack.pop() {
                        on_stack[member] = false;
                        members.push(member);
                        if member == node {
                            break;
                        }
                    }

                    if members.len() > 1 || self.edges[node].contains(&node) {
                        for member in members {
                            circular.insert(self.references[member].location.clone());
                        }
                    }
                }
            }
        }

        circular
    }
}

/// Record every `$ref` below `value`, checking that each target exists.
/// Members next to a `$ref` are scanned too, since a target may point into them.
fn collect_references(
    root: &Document,
    value: &Value,
    path: &mut Vec<String>,
    references: &mut Vec<Reference>,
) -> Result<(), DereferenceError> {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(reference)) = map.get("$ref") {
                let target = parse_reference(reference)?;
                resolve(root, reference, &target)?;
                references.push(Reference {
                    location: to_location(path),
                    target: to_location(&target),
                });
            }

            for (key, child) in map {
                path.push(key.clone());
                let collected = collect_references(root, child, path, references);
                path.pop();
                collected?;
            }
        }
        Value::Array(items) => {
            for (position, child) in items.iter().enumerate() {
                path.push(position.to_string());
                let collected = collect_references(root, child, path, references);
                path.pop();
                collected?;
            }
        }
        _ => {}
    }
    Ok(())
}

struct Expansion<'a> {
    root: &'a Document,
    circular: &'a HashSet<String>,
    /// Fully expanded targets, keyed by pointer
    expanded_targets: HashMap<String, Value>,
}

impl<'a> Expansion<'a> {
    fn expand(&mut self, value: &'a Value, origin: &mut Vec<String>) -> Result<Value, DereferenceError> {
        match value {
            Value::Object(map) => {
                if let Some(Value::String(reference)) = map.get("$ref") {
                    if self.circular.contains(&to_location(origin)) {
                        return Ok(value.clone());
                    }
                    return self.expand_target(reference);
                }

                let mut expanded = Map::with_capacity(map.len());
                for (key, child) in map {
                    origin.push(key.clone());
                    let child = self.expand(child, origin);
                    origin.pop();
                    expanded.insert(key.clone(), child?);
                }
                Ok(Value::Object(expanded))
            }
            Value::Array(items) => {
                let mut expanded = Vec::with_capacity(items.len());
                for (index, child) in items.iter().enumerate() {
                    origin.push(index.to_string());
                    let child = self.expand(child, origin);
                    origin.pop();
                    expanded.push(child?);
                }
                Ok(Value::Array(expanded))
            }
            _ => Ok(value.clone()),
        }
    }

    fn expand_target(&mut self, reference: &str) -> Result<Value, DereferenceError> {
        let target = parse_reference(reference)?;
        let key = to_location(&target);
        if let Some(expanded) = self.expanded_targets.get(&key) {
            return Ok(expanded.clone());
        }

        let resolved = resolve(self.root, reference, &target)?;

        // Children of the inlined target are reported at their own location
        let mut target_origin = target;
        let expanded = self.expand(resolved, &mut target_origin)?;
        self.expanded_targets.insert(key, expanded.clone());
        Ok(expanded)
    }
}
