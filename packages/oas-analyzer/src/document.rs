//! Document handle, snapshots and JSON pointer helpers

use crate::error::{AnalyzerError, Result};
use serde::{Deserialize, Serialize};

/// A parsed API description (OpenAPI 3.x or Swagger 2.0), read-only
pub type Document = serde_json::Value;

/// Owned serialized copy of a document.
///
/// This is what crosses an isolation boundary: plain JSON text, no shared
/// references. Decoding yields a private document for the receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentSnapshot {
    json: String,
}

impl DocumentSnapshot {
    pub fn capture(document: &Document) -> Result<Self> {
        let json = serde_json::to_string(document).map_err(AnalyzerError::serialization)?;
        Ok(Self { json })
    }

    pub fn from_json(json: impl Into<String>) -> Self {
        Self { json: json.into() }
    }

    /// Serialized size in bytes
    pub fn len(&self) -> usize {
        self.json.len()
    }

    pub fn is_empty(&self) -> bool {
        self.json.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.json
    }

    pub fn decode(&self) -> Result<Document> {
        serde_json::from_str(&self.json).map_err(AnalyzerError::serialization)
    }
}

/// Serialized document size, in bytes
pub fn serialized_size(document: &Document) -> Result<usize> {
    Ok(DocumentSnapshot::capture(document)?.len())
}

/// Escape a single pointer segment (RFC 6901)
pub fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

pub fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Build a `#/a/b` style location from path segments
pub fn to_location<S: AsRef<str>>(segments: &[S]) -> String {
    let mut location = String::from("#");
    for segment in segments {
        location.push('/');
        location.push_str(&escape_segment(segment.as_ref()));
    }
    location
}
