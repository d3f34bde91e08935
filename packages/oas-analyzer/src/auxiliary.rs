//! Async auxiliary queries that need the dereferenced document

use crate::deref::{Dereferenced, Dereferencer};
use crate::document::{serialized_size, Document};
use crate::error::{DereferenceError, Result};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::info;

/// Serialized size before and after dereferencing, in megabytes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FileSize {
    pub raw: f64,
    pub dereferenced: f64,
}

/// Output of the auxiliary pair
#[derive(Debug, Clone, PartialEq)]
pub struct AuxiliaryFindings {
    pub circular_refs: Vec<String>,
    pub file_size: FileSize,
}

/// Bytes to megabytes, rounded to two decimals
pub fn to_megabytes(bytes: usize) -> f64 {
    let mb = bytes as f64 / 1024.0 / 1024.0;
    (mb * 100.0).round() / 100.0
}

type DereferenceOutcome = std::result::Result<Arc<Dereferenced>, DereferenceError>;

async fn cycles_from<F>(dereferenced: F) -> Result<Vec<String>>
where
    F: Future<Output = DereferenceOutcome>,
{
    Ok(dereferenced.await?.circular_refs.clone())
}

async fn sizes_from<F>(document: &Document, dereferenced: F) -> Result<FileSize>
where
    F: Future<Output = DereferenceOutcome>,
{
    let raw = serialized_size(document)?;
    let expanded = serialized_size(&dereferenced.await?.document)?;

    Ok(FileSize {
        raw: to_megabytes(raw),
        dereferenced: to_megabytes(expanded),
    })
}

/// Locations of references that form a cycle
pub async fn circular_refs(
    dereferencer: &dyn Dereferencer,
    document: &Document,
) -> Result<Vec<String>> {
    cycles_from(dereferencer.dereference(document).map(|outcome| outcome.map(Arc::new))).await
}

pub async fn file_size(dereferencer: &dyn Dereferencer, document: &Document) -> Result<FileSize> {
    let dereferenced = dereferencer.dereference(document).map(|outcome| outcome.map(Arc::new));
    sizes_from(document, dereferenced).await
}

/// Run both auxiliary queries concurrently over one shared dereference;
/// either failing fails both
pub async fn run_auxiliary(
    dereferencer: &dyn Dereferencer,
    document: &Document,
) -> Result<AuxiliaryFindings> {
    let dereferenced = dereferencer
        .dereference(document)
        .map(|outcome| outcome.map(Arc::new))
        .shared();

    let (circular_refs, file_size) = tokio::try_join!(
        cycles_from(dereferenced.clone()),
        sizes_from(document, dereferenced),
    )?;

    info!(
        "Auxiliary queries done: {} circular refs, {}MB raw, {}MB dereferenced",
        circular_refs.len(),
        file_size.raw,
        file_size.dereferenced
    );

    Ok(AuxiliaryFindings {
        circular_refs,
        file_size,
    })
}
