use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::access::{ActionGates, Gate};
use super::lenient;
use super::resource::{contains_keyword, FormMode, Resource};
use super::sorting::SortValue;
use super::validation::ValidationErrors;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub city: String,
    #[serde(default, alias = "is_active", deserialize_with = "lenient::flag")]
    pub active: bool,
    #[serde(default, alias = "createdAt", with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Customers are browsed only; the back office never edits them.
pub struct Customers;

impl Resource for Customers {
    type Record = Customer;
    type Draft = ();

    const NAME: &'static str = "customers";
    const LABEL: &'static str = "Customer";
    const PATH: &'static str = "/v1/customers";
    const COLLECTION_KEY: &'static str = "customers";
    const SORT_PARAMS: Option<(&'static str, &'static str)> = Some(("sort_by", "sort_type"));
    const READ_ONLY: bool = true;
    const GATES: ActionGates = ActionGates::uniform(Gate::ADMIN);

    fn record_id(record: &Customer) -> &str {
        &record.id
    }

    fn draft_from(_record: &Customer) {}

    fn validate(_draft: &(), _mode: FormMode) -> Result<(), ValidationErrors> {
        Ok(())
    }

    fn sort_value(record: &Customer, field: &str) -> Option<SortValue> {
        match field {
            "first_name" => Some(SortValue::text(&record.first_name)),
            "last_name" => Some(SortValue::text(&record.last_name)),
            "email" => Some(SortValue::text(&record.email)),
            "phone" => Some(SortValue::text(&record.phone)),
            "city" => Some(SortValue::text(&record.city)),
            "active" => Some(SortValue::Bool(record.active)),
            "createdAt" | "created_at" => record.created_at.map(SortValue::Date),
            _ => None,
        }
    }

    fn tie_breakers(field: &str) -> &'static [&'static str] {
        match field {
            "last_name" => &["first_name"],
            "first_name" => &["last_name"],
            "city" => &["last_name", "first_name"],
            _ => &[],
        }
    }

    fn matches_keyword(record: &Customer, keyword: &str) -> bool {
        contains_keyword(&record.full_name(), keyword)
            || contains_keyword(&record.email, keyword)
            || contains_keyword(&record.phone, keyword)
    }

    fn matches_filter(record: &Customer, key: &str, value: &str) -> bool {
        match key {
            "active" => value.parse::<bool>().map_or(true, |a| record.active == a),
            "city" => record.city.eq_ignore_ascii_case(value),
            _ => true,
        }
    }
}
