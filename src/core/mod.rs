pub mod candidate;
pub mod metadata;
pub mod query;
pub mod query_type;

pub use candidate::{is_confident, Candidate, RawMatch, MATCH_THRESHOLD};
pub use metadata::{ServiceMetadata, ViewTemplate};
pub use query::{parse_batch, BatchQueries, BatchResults, QueryResult, ReconcileQuery};
pub use query_type::{QueryType, QueryTypeRegistry, TypeTag};
