use futures::future::join_all;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::cache::{CacheStats, ResponseCache, SqliteCache};
use crate::config::Config;
use crate::core::{
    BatchQueries, BatchResults, Candidate, QueryResult, QueryType, QueryTypeRegistry,
    ReconcileQuery, ServiceMetadata,
};
use crate::error::{ReconcileError, Result};
use crate::providers::{AatProvider, VocabularyProvider};
use crate::ranking::{Ranker, TokenSortRanker, MAX_RESULTS};

/// Reconciliation orchestrator: provider lookup, ranking, result shaping
pub struct ReconcileEngine {
    registry: QueryTypeRegistry,
    providers: HashMap<String, Arc<dyn VocabularyProvider>>,
    ranker: Arc<dyn Ranker>,
    cache: Option<Arc<dyn ResponseCache>>,
    service_name: String,
    view_url: String,
}

impl ReconcileEngine {
    /// Engine with no query types registered
    pub fn new(
        ranker: Arc<dyn Ranker>,
        service_name: impl Into<String>,
        view_url: impl Into<String>,
    ) -> Self {
        Self {
            registry: QueryTypeRegistry::new(),
            providers: HashMap::new(),
            ranker,
            cache: None,
            service_name: service_name.into(),
            view_url: view_url.into(),
        }
    }

    /// AAT engine with the SQLite response cache, as described by `config`
    pub async fn from_config(config: &Config) -> Result<Self> {
        let cache: Arc<dyn ResponseCache> =
            Arc::new(SqliteCache::new(&config.cache_path, config.cache_ttl_chrono()).await?);

        let provider = AatProvider::new(config.http_timeout)?
            .with_endpoint(&config.aat_endpoint)
            .with_cache(cache.clone());

        let mut engine = Self::new(
            Arc::new(TokenSortRanker::new()),
            &config.service_name,
            &config.view_url,
        )
        .with_cache(cache);
        engine.register(QueryType::aat_term(), Arc::new(provider));

        Ok(engine)
    }

    /// Attach the cache used by the providers, for stats and cleanup
    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Serve `query_type` from `provider`. The first registered type is the default.
    pub fn register(&mut self, query_type: QueryType, provider: Arc<dyn VocabularyProvider>) {
        tracing::debug!("Registering query type {} ({})", query_type.id, provider.name());
        self.providers.insert(query_type.id.clone(), provider);
        self.registry.register(query_type);
    }

    /// Service manifest for reconciliation clients
    pub fn metadata(&self) -> ServiceMetadata {
        ServiceMetadata::new(&self.service_name, &self.registry, &self.view_url)
    }

    /// Reconcile one query.
    ///
    /// Upstream and lookup failures are logged and yield no candidates.
    pub async fn search(&self, query: &ReconcileQuery) -> Vec<Candidate> {
        let text = query.text();

        let query_type = match &query.query_type {
            Some(id) => self.registry.get(id),
            None => self.registry.default_type(),
        };
        let Some(query_type) = query_type else {
            tracing::warn!("No query type {:?} registered, skipping '{}'", query.query_type, text);
            return Vec::new();
        };
        let Some(provider) = self.providers.get(&query_type.id) else {
            tracing::warn!("No provider for query type {}", query_type.id);
            return Vec::new();
        };

        let matches = match provider.term_match(text).await {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(
                    "{} lookup failed ({}) for '{}': {}",
                    provider.name(),
                    e.kind(),
                    text,
                    e
                );
                return Vec::new();
            }
        };

        let limit = query.limit.unwrap_or(MAX_RESULTS).min(MAX_RESULTS);
        let types = vec![query_type.tag()];

        self.ranker
            .rank(text, matches)
            .into_iter()
            .take(limit)
            .map(|ranked| {
                let candidate = Candidate::new(
                    provider.resource_uri(&ranked.raw.result_id),
                    ranked.raw.name,
                    ranked.score,
                    types.clone(),
                );
                tracing::debug!(
                    "Label is {}. Score is {}. URI is {}",
                    candidate.name,
                    candidate.score,
                    candidate.id
                );
                candidate
            })
            .collect()
    }

    /// Reconcile a keyed batch. Every input key appears in the output.
    pub async fn search_batch(&self, queries: BatchQueries) -> BatchResults {
        let lookups = queries.into_iter().map(|(key, query)| async move {
            let result = self.search(&query).await;
            (key, QueryResult::new(result))
        });

        join_all(lookups).await.into_iter().collect()
    }

    /// Reachability of each registered provider, keyed by query type id
    pub async fn provider_health(&self) -> BTreeMap<String, bool> {
        let checks = self.providers.iter().map(|(id, provider)| async move {
            let available = provider.is_available().await;
            if !available {
                tracing::warn!("{} provider for {} is unavailable", provider.name(), id);
            }
            (id.clone(), available)
        });

        join_all(checks).await.into_iter().collect()
    }

    /// Get cache statistics
    pub async fn cache_stats(&self) -> Result<CacheStats> {
        self.cache()?.stats().await
    }

    /// Clean up old cache entries
    pub async fn cleanup_cache(&self, max_age_hours: i64) -> Result<u64> {
        self.cache()?.cleanup(max_age_hours).await
    }

    fn cache(&self) -> Result<&Arc<dyn ResponseCache>> {
        self.cache
            .as_ref()
            .ok_or_else(|| ReconcileError::Cache("no response cache configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RawMatch;
    use async_trait::async_trait;

    /// Provider answering from a fixed list, or failing when given none
    struct FixedProvider(Option<Vec<RawMatch>>);

    #[async_trait]
    impl VocabularyProvider for FixedProvider {
        async fn term_match(&self, _query: &str) -> Result<Vec<RawMatch>> {
            self.0.clone().ok_or_else(|| ReconcileError::Provider {
                provider: "fixed".to_string(),
                message: "HTTP 503 Service Unavailable".to_string(),
            })
        }

        fn resource_uri(&self, result_id: &str) -> String {
            format!("http://vocab.getty.edu/aat/{}", result_id)
        }

        fn name(&self) -> &str {
            "fixed"
        }

        async fn is_available(&self) -> bool {
            self.0.is_some()
        }
    }

    fn engine(matches: Option<Vec<RawMatch>>) -> ReconcileEngine {
        let mut engine = ReconcileEngine::new(
            Arc::new(TokenSortRanker::new()),
            "Test Service",
            "http://vocab.getty.edu/aat/{{id}}",
        );
        engine.register(QueryType::aat_term(), Arc::new(FixedProvider(matches)));
        engine
    }

    #[tokio::test]
    async fn test_search_ranks_and_flags() {
        let engine = engine(Some(vec![
            RawMatch::new("Neo-Romantic ", "300021476"),
            RawMatch::new("Romantic ", "300172863"),
        ]));

        let result = engine.search(&ReconcileQuery::new("Romantic")).await;

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, "http://vocab.getty.edu/aat/300172863");
        assert_eq!(result[0].score, 100);
        assert!(result[0].is_match);
        assert_eq!(result[1].name, "Neo-Romantic ");
        assert_eq!(result[1].score, 80);
        assert!(!result[1].is_match);
        assert_eq!(result[1].types[0].id, "AATGetTermMatch");
    }

    #[tokio::test]
    async fn test_search_caps_results() {
        let matches = (0..25)
            .map(|i| RawMatch::new(format!("term {} ", i), i.to_string()))
            .collect();
        let engine = engine(Some(matches));

        let result = engine.search(&ReconcileQuery::new("term")).await;
        assert_eq!(result.len(), MAX_RESULTS);
        assert!(result.windows(2).all(|w| w[0].score >= w[1].score));

        let limited = engine.search(&ReconcileQuery::new("term").with_limit(3)).await;
        assert_eq!(limited.len(), 3);

        let over = engine.search(&ReconcileQuery::new("term").with_limit(50)).await;
        assert_eq!(over.len(), MAX_RESULTS);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_empty() {
        let engine = engine(None);
        assert!(engine.search(&ReconcileQuery::new("Romantic")).await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_type_is_empty() {
        let engine = engine(Some(vec![RawMatch::new("Romantic ", "1")]));
        let query = ReconcileQuery::new("Romantic").with_type("ULANGetTermMatch");

        assert!(engine.search(&query).await.is_empty());
    }

    #[tokio::test]
    async fn test_batch_keeps_every_key() {
        let engine = engine(Some(vec![RawMatch::new("Romantic ", "1")]));

        let mut queries = BatchQueries::new();
        queries.insert("q1".to_string(), ReconcileQuery::new("Romantic"));
        queries.insert("q2".to_string(), ReconcileQuery::new("Romantic").with_type("nope"));

        let results = engine.search_batch(queries).await;

        assert_eq!(results.keys().collect::<Vec<_>>(), vec!["q1", "q2"]);
        assert_eq!(results["q1"].result.len(), 1);
        assert!(results["q2"].result.is_empty());
    }

    #[tokio::test]
    async fn test_metadata() {
        let metadata = engine(None).metadata();
        assert_eq!(metadata.name, "Test Service");
        assert_eq!(metadata.default_types.len(), 1);
    }

    #[tokio::test]
    async fn test_provider_health() {
        let health = engine(Some(Vec::new())).provider_health().await;
        assert_eq!(health.get("AATGetTermMatch"), Some(&true));

        let health = engine(None).provider_health().await;
        assert_eq!(health.get("AATGetTermMatch"), Some(&false));

        let empty = ReconcileEngine::new(Arc::new(TokenSortRanker::new()), "Empty", "");
        assert!(empty.provider_health().await.is_empty());
    }

    #[tokio::test]
    async fn test_cache_stats_without_cache() {
        assert!(engine(None).cache_stats().await.is_err());
    }
}
