use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::access::ActionGates;
use super::ports::RequestBody;
use super::sorting::SortValue;
use super::validation::ValidationErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

/// Describes one backend collection: where it lives, how its records are
/// shaped, validated, sorted and filtered.
///
/// Implemented by a zero-sized marker per entity (`Brands`, `Orders`, ...),
/// so list pages, forms and delete flows stay generic over it.
pub trait Resource: Send + Sync + 'static {
    type Record: DeserializeOwned + Serialize + Clone + Debug + Send + Sync + 'static;
    type Draft: Serialize + Clone + Debug + Default + Send + Sync + 'static;

    /// Cache key; also the invalidation group after a mutation.
    const NAME: &'static str;
    /// Singular, human-facing noun used in notifications.
    const LABEL: &'static str;
    const PATH: &'static str;
    /// Field holding the rows in a list envelope.
    const COLLECTION_KEY: &'static str;
    /// Query parameter names for sort field and order, when the backend
    /// sorts this collection.
    const SORT_PARAMS: Option<(&'static str, &'static str)> = None;
    const READ_ONLY: bool = false;
    const GATES: ActionGates;

    fn record_id(record: &Self::Record) -> &str;

    /// Form values for editing an existing record.
    fn draft_from(record: &Self::Record) -> Self::Draft;

    /// Applied before validation on submit.
    fn normalize(draft: Self::Draft) -> Self::Draft {
        draft
    }

    fn validate(draft: &Self::Draft, mode: FormMode) -> Result<(), ValidationErrors>;

    fn create_body(draft: &Self::Draft) -> Result<RequestBody, serde_json::Error> {
        Ok(RequestBody::Json(serde_json::to_value(draft)?))
    }

    fn update_body(draft: &Self::Draft) -> Result<RequestBody, serde_json::Error> {
        Ok(RequestBody::Json(serde_json::to_value(draft)?))
    }

    fn sort_value(record: &Self::Record, field: &str) -> Option<SortValue>;

    fn tie_breakers(_field: &str) -> &'static [&'static str] {
        &[]
    }

    /// `keyword` is already lowercased.
    fn matches_keyword(record: &Self::Record, keyword: &str) -> bool;

    fn matches_filter(_record: &Self::Record, _key: &str, _value: &str) -> bool {
        true
    }

    /// Filters a freshly opened list page starts with.
    fn default_filters() -> &'static [(&'static str, &'static str)] {
        &[]
    }
}

/// Lowercased containment check used by the keyword matchers.
pub fn contains_keyword(haystack: &str, keyword: &str) -> bool {
    haystack.to_lowercase().contains(keyword)
}
