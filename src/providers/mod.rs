pub mod aat;
pub mod parser;

use async_trait::async_trait;
use crate::core::RawMatch;
use crate::error::Result;

pub use aat::AatProvider;

/// Trait for vocabulary lookup services (AAT, TGN, ULAN, etc.)
#[async_trait]
pub trait VocabularyProvider: Send + Sync {
    /// Look up a label, returning matches in upstream order
    async fn term_match(&self, query: &str) -> Result<Vec<RawMatch>>;

    /// Public resource URI for an identifier returned by `term_match`
    fn resource_uri(&self, result_id: &str) -> String;

    /// Get provider name
    fn name(&self) -> &str;

    /// Check if provider is available
    async fn is_available(&self) -> bool;
}
