//! End-to-end test utilities for spelunk
//!
//! Provides a local HTTP server that stands in for the Vault and Kubernetes
//! APIs, so the plug-in HTTP clients can be exercised through a full
//! `Spelunker` without external services.

pub mod mock_api;

pub use mock_api::{CannedResponse, MockApiServer, RecordedRequest};

/// Initialize tracing for tests (safe to call more than once)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("spelunk=debug,spelunk_vault=debug,spelunk_kubernetes=debug")
        .with_test_writer()
        .try_init();
}
