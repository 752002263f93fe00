use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::access::{ActionGates, Gate};
use super::lenient;
use super::resource::{contains_keyword, FormMode, Resource};
use super::sorting::SortValue;
use super::validation::{ValidationErrors, Validator};

/// Promotion code. This collection lives under `/v2` and speaks camelCase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "discount_percent", deserialize_with = "lenient::float")]
    pub discount_percent: f64,
    #[serde(default, alias = "start_date", with = "lenient::timestamp")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, alias = "end_date", with = "lenient::timestamp")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default = "active_by_default", alias = "is_active", deserialize_with = "lenient::flag")]
    pub is_active: bool,
    #[serde(default, alias = "created_at", with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "updated_at", with = "lenient::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn active_by_default() -> bool {
    true
}

impl Discount {
    /// Active and inside its validity window at `now`. Open-ended bounds
    /// always pass.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.start_date.map_or(true, |start| start <= now)
            && self.end_date.map_or(true, |end| now <= end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountDraft {
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
}

impl Default for DiscountDraft {
    fn default() -> Self {
        Self {
            code: String::new(),
            name: String::new(),
            description: None,
            discount_percent: None,
            start_date: None,
            end_date: None,
            is_active: true,
        }
    }
}

pub struct Discounts;

impl Resource for Discounts {
    type Record = Discount;
    type Draft = DiscountDraft;

    const NAME: &'static str = "discounts";
    const LABEL: &'static str = "Discount";
    const PATH: &'static str = "/v2/discounts";
    const COLLECTION_KEY: &'static str = "discounts";
    const GATES: ActionGates = ActionGates::uniform(Gate::ADMIN_OR_STAFF);

    fn record_id(record: &Discount) -> &str {
        &record.id
    }

    fn draft_from(record: &Discount) -> DiscountDraft {
        DiscountDraft {
            code: record.code.clone(),
            name: record.name.clone(),
            description: record.description.clone(),
            discount_percent: Some(record.discount_percent),
            start_date: record.start_date.map(|d| d.date_naive()),
            end_date: record.end_date.map(|d| d.date_naive()),
            is_active: record.is_active,
        }
    }

    fn normalize(mut draft: DiscountDraft) -> DiscountDraft {
        draft.code = draft.code.trim().to_uppercase();
        draft.name = draft.name.trim().to_string();
        draft.description = draft.description.filter(|d| !d.trim().is_empty());
        draft
    }

    fn validate(draft: &DiscountDraft, _mode: FormMode) -> Result<(), ValidationErrors> {
        let window_ok = match (draft.start_date, draft.end_date) {
            (Some(start), Some(end)) => end >= start,
            _ => true,
        };
        Validator::new()
            .required("code", &draft.code)
            .max_length("code", &draft.code, 50)
            .required("name", &draft.name)
            .present("discount_percent", &draft.discount_percent)
            .range("discount_percent", draft.discount_percent, 0.0..=100.0)
            .check("end_date", window_ok, "End date must not be before the start date")
            .finish()
    }

    fn sort_value(record: &Discount, field: &str) -> Option<SortValue> {
        match field {
            "code" => Some(SortValue::text(&record.code)),
            "name" => Some(SortValue::text(&record.name)),
            "discountPercent" | "discount_percent" => {
                Some(SortValue::Number(record.discount_percent))
            }
            "startDate" | "start_date" => record.start_date.map(SortValue::Date),
            "endDate" | "end_date" => record.end_date.map(SortValue::Date),
            "isActive" | "is_active" => Some(SortValue::Bool(record.is_active)),
            _ => None,
        }
    }

    fn tie_breakers(field: &str) -> &'static [&'static str] {
        match field {
            "discountPercent" | "discount_percent" | "isActive" | "is_active" => &["code"],
            _ => &[],
        }
    }

    fn matches_keyword(record: &Discount, keyword: &str) -> bool {
        contains_keyword(&record.code, keyword) || contains_keyword(&record.name, keyword)
    }

    fn matches_filter(record: &Discount, key: &str, value: &str) -> bool {
        match key {
            "isActive" | "is_active" => value
                .parse::<bool>()
                .map_or(true, |active| record.is_active == active),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn end_before_start_is_rejected() {
        let draft = Discounts::normalize(DiscountDraft {
            code: "summer10".into(),
            name: "Summer".into(),
            discount_percent: Some(10.0),
            start_date: NaiveDate::from_ymd_opt(2024, 7, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            ..DiscountDraft::default()
        });
        assert_eq!(draft.code, "SUMMER10");
        let errors = Discounts::validate(&draft, FormMode::Create).unwrap_err();
        assert!(errors.for_field("end_date").is_some());
    }

    #[test]
    fn draft_goes_out_in_camel_case() {
        let draft = DiscountDraft {
            code: "VIP".into(),
            name: "VIP".into(),
            discount_percent: Some(15.0),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..DiscountDraft::default()
        };
        let body = serde_json::to_value(&draft).unwrap();
        assert_eq!(body["discountPercent"], json!(15.0));
        assert_eq!(body["startDate"], json!("2024-01-01"));
        assert_eq!(body["isActive"], json!(true));
    }

    #[test]
    fn validity_window_is_inclusive() {
        let discount: Discount = serde_json::from_value(json!({
            "_id": "d1", "code": "VIP", "discountPercent": 5,
            "startDate": "2024-01-01", "endDate": "2024-01-31"
        }))
        .unwrap();
        assert!(discount.is_active);
        let end = lenient::parse_timestamp("2024-01-31").unwrap();
        assert!(discount.is_valid_at(end));
        assert!(!discount.is_valid_at(end + chrono::Duration::days(1)));
    }
}
