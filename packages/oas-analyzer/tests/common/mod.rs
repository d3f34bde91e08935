//! Shared helpers for integration tests

#![allow(dead_code)]

use oas_analyzer::Document;
use std::path::PathBuf;
use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a test subscriber once; honours RUST_LOG
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn load_fixture(name: &str) -> Document {
    let content = std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", name, e));
    serde_json::from_str(&content).unwrap_or_else(|e| panic!("Invalid fixture {}: {}", name, e))
}

pub fn petstore() -> Document {
    load_fixture("petstore.json")
}

pub fn circular() -> Document {
    load_fixture("circular.json")
}

/// Operation count of the petstore fixture
pub const PETSTORE_OPERATIONS: u64 = 4;
