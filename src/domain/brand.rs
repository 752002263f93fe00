use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::access::{ActionGates, Gate};
use super::lenient;
use super::resource::{contains_keyword, FormMode, Resource};
use super::slug::derive_slug;
use super::sorting::SortValue;
use super::validation::{ValidationErrors, Validator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub brand_name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, alias = "createdAt", with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "updatedAt", with = "lenient::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BrandDraft {
    pub brand_name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

pub struct Brands;

impl Resource for Brands {
    type Record = Brand;
    type Draft = BrandDraft;

    const NAME: &'static str = "brands";
    const LABEL: &'static str = "Brand";
    const PATH: &'static str = "/v1/brands";
    const COLLECTION_KEY: &'static str = "brands";
    const GATES: ActionGates = ActionGates::uniform(Gate::ADMIN_OR_STAFF);

    fn record_id(record: &Brand) -> &str {
        &record.id
    }

    fn draft_from(record: &Brand) -> BrandDraft {
        BrandDraft {
            brand_name: record.brand_name.clone(),
            slug: record.slug.clone(),
            description: record.description.clone(),
            image: record.image.clone(),
        }
    }

    fn normalize(mut draft: BrandDraft) -> BrandDraft {
        draft.brand_name = draft.brand_name.trim().to_string();
        draft.slug = derive_slug(&draft.slug, &draft.brand_name);
        draft.description = draft.description.filter(|d| !d.trim().is_empty());
        draft
    }

    fn validate(draft: &BrandDraft, _mode: FormMode) -> Result<(), ValidationErrors> {
        Validator::new()
            .required("brand_name", &draft.brand_name)
            .length("brand_name", &draft.brand_name, 3..=50)
            .required("slug", &draft.slug)
            .length("slug", &draft.slug, 3..=255)
            .finish()
    }

    fn sort_value(record: &Brand, field: &str) -> Option<SortValue> {
        match field {
            "brand_name" => Some(SortValue::text(&record.brand_name)),
            "slug" => Some(SortValue::text(&record.slug)),
            "createdAt" | "created_at" => record.created_at.map(SortValue::Date),
            _ => None,
        }
    }

    fn matches_keyword(record: &Brand, keyword: &str) -> bool {
        contains_keyword(&record.brand_name, keyword) || contains_keyword(&record.slug, keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_is_derived_from_the_name() {
        let draft = Brands::normalize(BrandDraft {
            brand_name: "Acme".into(),
            ..BrandDraft::default()
        });
        assert_eq!(draft.slug, "acme");
        assert!(Brands::validate(&draft, FormMode::Create).is_ok());
    }

    #[test]
    fn short_names_are_rejected() {
        let draft = Brands::normalize(BrandDraft {
            brand_name: "Ab".into(),
            ..BrandDraft::default()
        });
        let errors = Brands::validate(&draft, FormMode::Create).unwrap_err();
        assert_eq!(
            errors.for_field("brand_name"),
            Some("Brand name must be at least 3 characters")
        );
        assert_eq!(errors.for_field("slug"), Some("Slug must be at least 3 characters"));
    }
}
