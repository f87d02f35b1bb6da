use serde::{Deserialize, Serialize};

use crate::core::{QueryTypeRegistry, TypeTag};

/// Link template clients use to build a human-facing URL from a candidate id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewTemplate {
    pub url: String,
}

/// Service manifest returned when a request carries no query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceMetadata {
    pub name: String,

    #[serde(rename = "defaultTypes")]
    pub default_types: Vec<TypeTag>,

    pub view: ViewTemplate,
}

impl ServiceMetadata {
    pub fn new(
        name: impl Into<String>,
        registry: &QueryTypeRegistry,
        view_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            default_types: registry.tags(),
            view: ViewTemplate {
                url: view_url.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_json() {
        let metadata = ServiceMetadata::new(
            "Getty Reconciliation Service",
            &QueryTypeRegistry::with_defaults(),
            "http://vocab.getty.edu/aat/{{id}}",
        );

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["name"], "Getty Reconciliation Service");
        assert_eq!(json["defaultTypes"].as_array().unwrap().len(), 1);
        assert_eq!(json["defaultTypes"][0]["id"], "AATGetTermMatch");
        assert_eq!(json["view"]["url"], "http://vocab.getty.edu/aat/{{id}}");
    }
}
