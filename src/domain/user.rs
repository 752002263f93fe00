use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::access::{ActionGates, Gate};
use super::lenient;
use super::resource::{contains_keyword, FormMode, Resource};
use super::sorting::SortValue;
use super::validation::{ValidationErrors, Validator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Staff,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Staff => "staff",
            UserRole::Admin => "admin",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "staff" => Some(UserRole::Staff),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

/// Back-office operator account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, alias = "role", deserialize_with = "lenient::one_or_many")]
    pub roles: Vec<UserRole>,
    #[serde(default, alias = "is_active", deserialize_with = "lenient::flag")]
    pub active: bool,
    #[serde(default, alias = "createdAt", with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "updatedAt", with = "lenient::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserDraft {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    pub active: bool,
    /// Only sent when creating an account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Default for UserDraft {
    fn default() -> Self {
        Self {
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            role: None,
            active: true,
            password: None,
        }
    }
}

pub struct Users;

impl Resource for Users {
    type Record = User;
    type Draft = UserDraft;

    const NAME: &'static str = "users";
    const LABEL: &'static str = "User";
    const PATH: &'static str = "/v1/users";
    const COLLECTION_KEY: &'static str = "users";
    const SORT_PARAMS: Option<(&'static str, &'static str)> = Some(("sortField", "sortOrder"));
    const GATES: ActionGates = ActionGates::uniform(Gate::ADMIN);

    fn record_id(record: &User) -> &str {
        &record.id
    }

    fn draft_from(record: &User) -> UserDraft {
        UserDraft {
            email: record.email.clone(),
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            role: record.roles.first().copied(),
            active: record.active,
            password: None,
        }
    }

    fn normalize(mut draft: UserDraft) -> UserDraft {
        draft.email = draft.email.trim().to_lowercase();
        draft.first_name = draft.first_name.trim().to_string();
        draft.last_name = draft.last_name.trim().to_string();
        draft.password = draft.password.filter(|p| !p.is_empty());
        draft
    }

    fn validate(draft: &UserDraft, mode: FormMode) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.required("email", &draft.email)
            .check(
                "email",
                draft.email.is_empty() || draft.email.contains('@'),
                "Please enter a valid email",
            )
            .required("first_name", &draft.first_name)
            .required("last_name", &draft.last_name)
            .present("role", &draft.role);
        if mode == FormMode::Create {
            v.present("password", &draft.password);
        }
        v.finish()
    }

    fn sort_value(record: &User, field: &str) -> Option<SortValue> {
        match field {
            "email" => Some(SortValue::text(&record.email)),
            "first_name" => Some(SortValue::text(&record.first_name)),
            "last_name" => Some(SortValue::text(&record.last_name)),
            "active" | "is_active" => Some(SortValue::Bool(record.active)),
            "created_at" | "createdAt" => record.created_at.map(SortValue::Date),
            _ => None,
        }
    }

    fn tie_breakers(field: &str) -> &'static [&'static str] {
        match field {
            "last_name" => &["first_name"],
            "first_name" => &["last_name"],
            _ => &[],
        }
    }

    fn matches_keyword(record: &User, keyword: &str) -> bool {
        contains_keyword(&record.first_name, keyword)
            || contains_keyword(&record.last_name, keyword)
            || contains_keyword(&record.email, keyword)
    }

    fn matches_filter(record: &User, key: &str, value: &str) -> bool {
        match key {
            "role" => UserRole::parse(value).map_or(true, |role| record.roles.contains(&role)),
            "active" => value.parse::<bool>().map_or(true, |active| record.active == active),
            _ => true,
        }
    }
}
