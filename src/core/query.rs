use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::core::Candidate;
use crate::error::{ReconcileError, Result};

/// One reconciliation query as sent by the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReconcileQuery {
    /// Free-text label to reconcile
    pub query: String,

    /// Registered type id; the default type is used when absent
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub query_type: Option<String>,

    /// Upper bound on returned candidates (never above the service maximum)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl ReconcileQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            query_type: None,
            limit: None,
        }
    }

    pub fn with_type(mut self, query_type: impl Into<String>) -> Self {
        self.query_type = Some(query_type.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query text with surrounding whitespace removed
    pub fn text(&self) -> &str {
        self.query.trim()
    }

    /// Parse a single `query` parameter: either a JSON query object or plain text
    pub fn from_param(raw: &str) -> Result<Self> {
        if raw.trim_start().starts_with('{') {
            serde_json::from_str(raw)
                .map_err(|e| ReconcileError::InvalidQuery(format!("query object: {}", e)))
        } else {
            Ok(Self::new(raw))
        }
    }
}

/// Candidates for one query, wrapped the way reconciliation clients expect
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QueryResult {
    pub result: Vec<Candidate>,
}

impl QueryResult {
    pub fn new(result: Vec<Candidate>) -> Self {
        Self { result }
    }
}

/// Keyed batch of queries (`queries` parameter)
pub type BatchQueries = HashMap<String, ReconcileQuery>;

/// Keyed batch results; ordered by key for stable output
pub type BatchResults = BTreeMap<String, QueryResult>;

/// Parse the `queries` parameter into a keyed batch
pub fn parse_batch(raw: &str) -> Result<BatchQueries> {
    serde_json::from_str(raw).map_err(|e| ReconcileError::InvalidQuery(format!("queries: {}", e)))
}
