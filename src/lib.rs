//! # AAT Reconcile
//!
//! OpenRefine reconciliation service for the Getty Art & Architecture Thesaurus:
//! - `AATGetTermMatch` lookups with a SQLite response cache
//! - Token-sort fuzzy ranking, top 10 candidates per query
//! - Batch queries resolved concurrently
//! - Multiple interfaces: Rust library, HTTP API (JSON/JSONP), CLI
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use aat_reconcile::{Config, ReconcileEngine, ReconcileQuery};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = ReconcileEngine::from_config(&Config::default()).await?;
//!
//!     for candidate in engine.search(&ReconcileQuery::new("Romantic")).await {
//!         println!("{} - {}% {}", candidate.name, candidate.score, candidate.id);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod providers;
pub mod ranking;

#[cfg(feature = "server")]
pub mod server;

// Re-export primary types
pub use cache::{ResponseCache, SqliteCache};
pub use config::Config;
pub use core::{Candidate, QueryResult, QueryType, QueryTypeRegistry, ReconcileQuery, ServiceMetadata};
pub use engine::ReconcileEngine;
pub use error::{ReconcileError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
