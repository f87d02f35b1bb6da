use async_trait::async_trait;
use reqwest::{Client, Url};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::ResponseCache;
use crate::core::RawMatch;
use crate::error::{ReconcileError, Result};
use crate::providers::parser::parse_term_match;
use crate::providers::VocabularyProvider;

/// Getty term-matching endpoint
pub const DEFAULT_ENDPOINT: &str =
    "http://vocabsservices.getty.edu/AATService.asmx/AATGetTermMatch";

/// Namespace of AAT resource URIs
pub const AAT_URI_BASE: &str = "http://vocab.getty.edu/aat/";

/// View link template advertised in the service metadata
pub const VIEW_URL_TEMPLATE: &str = "http://vocab.getty.edu/aat/{{id}}";

/// Getty AAT vocabulary provider
pub struct AatProvider {
    client: Client,
    endpoint: String,
    uri_base: String,
    cache: Option<Arc<dyn ResponseCache>>,
}

impl AatProvider {
    /// Create new AAT provider against the public endpoint
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            uri_base: AAT_URI_BASE.to_string(),
            cache: None,
        })
    }

    /// Point the provider at another term-matching endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Serve repeated lookups from `cache`
    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Upstream URL for a query: trimmed term, AND-combined, empty notes
    pub fn request_url(&self, query: &str) -> Result<Url> {
        Url::parse_with_params(
            &self.endpoint,
            &[("term", query.trim()), ("logop", "and"), ("notes", "")],
        )
        .map_err(|e| ReconcileError::Config(format!("invalid AAT endpoint '{}': {}", self.endpoint, e)))
    }

    /// Response body for `url`, from cache when possible
    async fn fetch(&self, url: &Url) -> Result<String> {
        let key = url.as_str();

        if let Some(cache) = &self.cache {
            match cache.get(key).await {
                Ok(Some(cached)) => {
                    if let Err(e) = cache.increment_hit(key).await {
                        tracing::warn!("Failed to record cache hit: {}", e);
                    }
                    tracing::debug!("Cache hit for {}", key);
                    return Ok(cached.body);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("Cache lookup failed, querying AAT: {}", e),
            }
        }

        let body = self.request(url).await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.save(key, &body).await {
                tracing::warn!("Failed to save to cache: {}", e);
            }
        }

        Ok(body)
    }

    /// Response body for `url` straight from upstream; non-2xx is an error
    async fn request(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ReconcileError::Provider {
                provider: "aat".to_string(),
                message: format!("Request failed: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(ReconcileError::Provider {
                provider: "aat".to_string(),
                message: format!("HTTP {}", response.status()),
            });
        }

        let body = response.text().await.map_err(|e| ReconcileError::Provider {
            provider: "aat".to_string(),
            message: format!("Unreadable body: {}", e),
        })?;

        Ok(body)
    }
}

#[async_trait]
impl VocabularyProvider for AatProvider {
    async fn term_match(&self, query: &str) -> Result<Vec<RawMatch>> {
        let url = self.request_url(query)?;
        tracing::debug!("AAT url is {}", url);

        let body = self.fetch(&url).await?;
        parse_term_match(&body)
    }

    fn resource_uri(&self, result_id: &str) -> String {
        format!("{}{}", self.uri_base, result_id)
    }

    fn name(&self) -> &str {
        "aat"
    }

    async fn is_available(&self) -> bool {
        // uncached, a stored body says nothing about the upstream now
        match self.request_url("gold leaf") {
            Ok(url) => self.request(&url).await.is_ok(),
            Err(_) => false,
        }
    }
}
