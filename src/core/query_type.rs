use serde::{Deserialize, Serialize};

/// `{id, name}` descriptor exposed to reconciliation clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeTag {
    pub id: String,
    pub name: String,
}

impl TypeTag {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A query index offered by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryType {
    /// Type id sent by clients (e.g. `AATGetTermMatch`)
    pub id: String,

    /// Human readable name
    pub name: String,

    /// Upstream index the type searches
    pub index: String,
}

impl QueryType {
    pub fn new(id: impl Into<String>, name: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            index: index.into(),
        }
    }

    /// The AAT term-matching index
    pub fn aat_term() -> Self {
        Self::new("AATGetTermMatch", "AAT term", "term")
    }

    pub fn tag(&self) -> TypeTag {
        TypeTag::new(&self.id, &self.name)
    }
}

/// Ordered registry of supported query types, keyed by type id.
///
/// The first registered type is the default used for queries that do not
/// name one.
#[derive(Debug, Clone, Default)]
pub struct QueryTypeRegistry {
    types: Vec<QueryType>,
}

impl QueryTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding only the AAT term index
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(QueryType::aat_term());
        registry
    }

    /// Add a type, replacing any existing entry with the same id
    pub fn register(&mut self, query_type: QueryType) {
        match self.types.iter_mut().find(|t| t.id == query_type.id) {
            Some(existing) => *existing = query_type,
            None => self.types.push(query_type),
        }
    }

    pub fn get(&self, id: &str) -> Option<&QueryType> {
        self.types.iter().find(|t| t.id == id)
    }

    pub fn default_type(&self) -> Option<&QueryType> {
        self.types.first()
    }

    /// `{id, name}` descriptors for every registered type, in registration order
    pub fn tags(&self) -> Vec<TypeTag> {
        self.types.iter().map(QueryType::tag).collect()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
