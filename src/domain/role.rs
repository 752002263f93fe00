use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::access::{ActionGates, Gate};
use super::lenient;
use super::resource::{contains_keyword, FormMode, Resource};
use super::sorting::SortValue;
use super::validation::{ValidationErrors, Validator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default, alias = "createdAt", with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "updatedAt", with = "lenient::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoleDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
}

pub struct Roles;

impl Resource for Roles {
    type Record = Role;
    type Draft = RoleDraft;

    const NAME: &'static str = "roles";
    const LABEL: &'static str = "Role";
    const PATH: &'static str = "/v1/roles";
    const COLLECTION_KEY: &'static str = "roles";
    const GATES: ActionGates = ActionGates::uniform(Gate::ADMIN);

    fn record_id(record: &Role) -> &str {
        &record.id
    }

    fn draft_from(record: &Role) -> RoleDraft {
        RoleDraft {
            name: record.name.clone(),
            description: record.description.clone(),
            permissions: record.permissions.clone(),
        }
    }

    fn normalize(mut draft: RoleDraft) -> RoleDraft {
        draft.name = draft.name.trim().to_string();
        draft.description = draft.description.filter(|d| !d.trim().is_empty());
        draft
    }

    fn validate(draft: &RoleDraft, _mode: FormMode) -> Result<(), ValidationErrors> {
        Validator::new()
            .required("name", &draft.name)
            .max_length("name", &draft.name, 100)
            .finish()
    }

    fn sort_value(record: &Role, field: &str) -> Option<SortValue> {
        match field {
            "name" => Some(SortValue::text(&record.name)),
            "createdAt" | "created_at" => record.created_at.map(SortValue::Date),
            _ => None,
        }
    }

    fn matches_keyword(record: &Role, keyword: &str) -> bool {
        contains_keyword(&record.name, keyword)
    }
}
