use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::access::{ActionGates, Gate};
use super::lenient;
use super::resource::{contains_keyword, FormMode, Resource};
use super::slug::derive_slug;
use super::sorting::SortValue;
use super::validation::{ValidationErrors, Validator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub category_name: String,
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
pub struct CategoryDraft {
    pub category_name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

pub struct Categories;

impl Resource for Categories {
    type Record = Category;
    type Draft = CategoryDraft;

    const NAME: &'static str = "categories";
    const LABEL: &'static str = "Category";
    const PATH: &'static str = "/v1/categories";
    const COLLECTION_KEY: &'static str = "categories";
    const GATES: ActionGates = ActionGates::uniform(Gate::ADMIN_OR_STAFF);

    fn record_id(record: &Category) -> &str {
        &record.id
    }

    fn draft_from(record: &Category) -> CategoryDraft {
        CategoryDraft {
            category_name: record.category_name.clone(),
            slug: record.slug.clone(),
            description: record.description.clone(),
            image: record.image.clone(),
        }
    }

    fn normalize(mut draft: CategoryDraft) -> CategoryDraft {
        draft.category_name = draft.category_name.trim().to_string();
        draft.slug = derive_slug(&draft.slug, &draft.category_name);
        draft.description = draft.description.filter(|d| !d.trim().is_empty());
        draft
    }

    fn validate(draft: &CategoryDraft, _mode: FormMode) -> Result<(), ValidationErrors> {
        Validator::new()
            .required("category_name", &draft.category_name)
            .max_length("category_name", &draft.category_name, 255)
            .required("slug", &draft.slug)
            .length("slug", &draft.slug, 3..=255)
            .finish()
    }

    fn sort_value(record: &Category, field: &str) -> Option<SortValue> {
        match field {
            "category_name" => Some(SortValue::text(&record.category_name)),
            "slug" => Some(SortValue::text(&record.slug)),
            "createdAt" | "created_at" => record.created_at.map(SortValue::Date),
            _ => None,
        }
    }

    fn matches_keyword(record: &Category, keyword: &str) -> bool {
        contains_keyword(&record.category_name, keyword) || contains_keyword(&record.slug, keyword)
    }
}
