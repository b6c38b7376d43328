//! Data structures shared across OpenAI resources.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Up to 16 string key/value pairs attached to an object.
pub type Metadata = BTreeMap<String, String>;

/// An assistant id, e.g. `asst_abc123`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssistantId(String);

impl AssistantId {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AssistantId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AssistantId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&AssistantId> for AssistantId {
    fn from(value: &AssistantId) -> Self {
        value.clone()
    }
}

/// Sort order for cursor-paginated list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListOrder {
    Asc,
    Desc,
}

impl ListOrder {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// A page returned by a cursor-paginated list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ListResponse<T> {
    pub object: String,
    pub data: Vec<T>,
    #[serde(default)]
    pub first_id: Option<String>,
    #[serde(default)]
    pub last_id: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

/// Acknowledgement returned by `DELETE` endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct DeletionStatus<Id> {
    pub id: Id,
    pub object: String,
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_response_tolerates_missing_cursors() {
        let page: ListResponse<serde_json::Value> =
            serde_json::from_value(json!({ "object": "list", "data": [] })).unwrap();
        assert!(page.data.is_empty());
        assert!(!page.has_more);
        assert_eq!(page.last_id, None);
    }

    #[test]
    fn assistant_id_is_transparent() {
        let id: AssistantId = serde_json::from_value(json!("asst_1")).unwrap();
        assert_eq!(id.as_str(), "asst_1");
        assert_eq!(serde_json::to_value(&id).unwrap(), json!("asst_1"));
    }
}
