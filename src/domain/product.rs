use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::access::{ActionGates, Gate};
use super::lenient;
use super::ports::{FilePart, MultipartBody, RequestBody};
use super::reference::Reference;
use super::resource::{contains_keyword, FormMode, Resource};
use super::slug::derive_slug;
use super::sorting::SortValue;
use super::validation::{ValidationErrors, Validator};

pub const MAX_DISCOUNT: f64 = 70.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub product_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "lenient::decimal")]
    pub price: BigDecimal,
    /// Percent off the list price.
    #[serde(default, deserialize_with = "lenient::float")]
    pub discount: f64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub stock: i64,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub model_year: Option<i64>,
    #[serde(default, alias = "category")]
    pub category_id: Option<Reference>,
    #[serde(default, alias = "brand")]
    pub brand_id: Option<Reference>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub slug: String,
    #[serde(default, alias = "createdAt", with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "updatedAt", with = "lenient::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// List price with the discount applied, rounded to cents.
    pub fn discounted_price(&self) -> BigDecimal {
        let discount = BigDecimal::try_from(self.discount).unwrap_or_default();
        let factor = (BigDecimal::from(100) - discount) / BigDecimal::from(100);
        (&self.price * factor).round(2)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductDraft {
    pub product_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        serialize_with = "lenient::opt_decimal::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<BigDecimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_year: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<String>,
    pub slug: String,
    /// Upload chosen in the form; required when creating.
    #[serde(skip)]
    pub thumbnail_file: Option<FilePart>,
}

pub struct Products;

impl Resource for Products {
    type Record = Product;
    type Draft = ProductDraft;

    const NAME: &'static str = "products";
    const LABEL: &'static str = "Product";
    const PATH: &'static str = "/v1/products";
    const COLLECTION_KEY: &'static str = "products";
    const GATES: ActionGates = ActionGates {
        create: Gate::ADMIN_OR_STAFF,
        edit: Gate::ADMIN,
        delete: Gate::ADMIN,
    };

    fn record_id(record: &Product) -> &str {
        &record.id
    }

    fn draft_from(record: &Product) -> ProductDraft {
        ProductDraft {
            product_name: record.product_name.clone(),
            description: record.description.clone(),
            price: Some(record.price.clone()),
            discount: Some(record.discount),
            stock: Some(record.stock),
            model_year: record.model_year,
            category_id: record.category_id.as_ref().map(|r| r.id.clone()),
            brand_id: record.brand_id.as_ref().map(|r| r.id.clone()),
            slug: record.slug.clone(),
            thumbnail_file: None,
        }
    }

    fn normalize(mut draft: ProductDraft) -> ProductDraft {
        draft.product_name = draft.product_name.trim().to_string();
        draft.slug = derive_slug(&draft.slug, &draft.product_name);
        draft.description = draft.description.filter(|d| !d.trim().is_empty());
        draft
    }

    fn validate(draft: &ProductDraft, mode: FormMode) -> Result<(), ValidationErrors> {
        let current_year = i64::from(Utc::now().year());
        let zero = BigDecimal::from(0);
        let mut v = Validator::new();
        v.required("product_name", &draft.product_name)
            .length("product_name", &draft.product_name, 3..=255)
            .max_length(
                "description",
                draft.description.as_deref().unwrap_or_default(),
                500,
            )
            .present("price", &draft.price)
            .check(
                "price",
                draft.price.as_ref().map_or(true, |p| *p >= zero),
                "Price cannot be negative",
            )
            .range("discount", draft.discount, 0.0..=MAX_DISCOUNT)
            .check(
                "stock",
                draft.stock.map_or(true, |s| s >= 0),
                "Stock cannot be negative",
            )
            .range("model_year", draft.model_year, 1900..=current_year)
            .required("slug", &draft.slug)
            .length("slug", &draft.slug, 3..=255);
        if mode == FormMode::Create {
            v.present("thumbnail", &draft.thumbnail_file);
        }
        v.finish()
    }

    /// Product creation uploads the thumbnail, so it goes out as multipart.
    fn create_body(draft: &ProductDraft) -> Result<RequestBody, serde_json::Error> {
        let mut body = MultipartBody::default()
            .text("product_name", draft.product_name.as_str())
            .text("slug", draft.slug.as_str());
        if let Some(description) = &draft.description {
            body = body.text("description", description.as_str());
        }
        if let Some(price) = &draft.price {
            body = body.text("price", price.to_string());
        }
        if let Some(discount) = draft.discount {
            body = body.text("discount", discount.to_string());
        }
        if let Some(stock) = draft.stock {
            body = body.text("stock", stock.to_string());
        }
        if let Some(year) = draft.model_year {
            body = body.text("model_year", year.to_string());
        }
        if let Some(category) = &draft.category_id {
            body = body.text("category_id", category.as_str());
        }
        if let Some(brand) = &draft.brand_id {
            body = body.text("brand_id", brand.as_str());
        }
        if let Some(file) = &draft.thumbnail_file {
            body.files.push(FilePart {
                field: "file".to_string(),
                ..file.clone()
            });
        }
        Ok(RequestBody::Multipart(body))
    }

    fn sort_value(record: &Product, field: &str) -> Option<SortValue> {
        match field {
            "product_name" => Some(SortValue::text(&record.product_name)),
            "price" => record.price.to_f64().map(SortValue::Number),
            "discount" => Some(SortValue::Number(record.discount)),
            "stock" => Some(SortValue::Number(record.stock as f64)),
            "model_year" => record.model_year.map(|y| SortValue::Number(y as f64)),
            "createdAt" | "created_at" => record.created_at.map(SortValue::Date),
            _ => None,
        }
    }

    fn tie_breakers(field: &str) -> &'static [&'static str] {
        match field {
            "price" | "stock" | "discount" => &["product_name"],
            _ => &[],
        }
    }

    fn matches_keyword(record: &Product, keyword: &str) -> bool {
        contains_keyword(&record.product_name, keyword)
            || contains_keyword(&record.slug, keyword)
            || record
                .description
                .as_deref()
                .is_some_and(|d| contains_keyword(d, keyword))
    }

    fn matches_filter(record: &Product, key: &str, value: &str) -> bool {
        match key {
            "category_id" => record.category_id.as_ref().is_some_and(|r| r.id == value),
            "brand_id" => record.brand_id.as_ref().is_some_and(|r| r.id == value),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn thumbnail() -> FilePart {
        FilePart {
            field: "thumbnail".into(),
            file_name: "chain.png".into(),
            content_type: "image/png".into(),
            bytes: vec![0x89, 0x50],
        }
    }

    fn valid_draft() -> ProductDraft {
        ProductDraft {
            product_name: "Bike Chain".into(),
            price: Some(BigDecimal::from(25)),
            discount: Some(10.0),
            stock: Some(4),
            model_year: Some(2020),
            thumbnail_file: Some(thumbnail()),
            ..ProductDraft::default()
        }
    }

    #[test]
    fn decodes_embedded_references_and_string_numbers() {
        let product: Product = serde_json::from_value(json!({
            "_id": "p1",
            "product_name": "Bike Chain",
            "price": "19.90",
            "discount": "10",
            "stock": 3,
            "model_year": "2021",
            "brand_id": {"_id": "b1", "brand_name": "Shimano"},
            "category_id": "c1",
            "slug": "bike-chain"
        }))
        .unwrap();
        assert_eq!(product.price, BigDecimal::from_str("19.90").unwrap());
        assert_eq!(product.discount, 10.0);
        assert_eq!(product.model_year, Some(2021));
        assert_eq!(product.brand_id.as_ref().map(Reference::display), Some("Shimano"));
        assert_eq!(product.category_id, Some(Reference::new("c1")));
    }

    #[test]
    fn discounted_price_rounds_to_cents() {
        let product: Product = serde_json::from_value(json!({
            "_id": "p1", "product_name": "Saddle", "price": 19.99, "discount": 15
        }))
        .unwrap();
        assert_eq!(product.discounted_price(), BigDecimal::from_str("16.99").unwrap());
    }

    #[test]
    fn discount_above_seventy_is_rejected() {
        let draft = Products::normalize(ProductDraft {
            discount: Some(75.0),
            ..valid_draft()
        });
        let errors = Products::validate(&draft, FormMode::Create).unwrap_err();
        assert_eq!(
            errors.for_field("discount"),
            Some("Discount must be between 0 and 70")
        );
    }

    #[test]
    fn thumbnail_is_required_only_on_create() {
        let draft = Products::normalize(ProductDraft {
            thumbnail_file: None,
            ..valid_draft()
        });
        assert!(Products::validate(&draft, FormMode::Create).is_err());
        assert!(Products::validate(&draft, FormMode::Edit).is_ok());
    }

    #[test]
    fn create_body_is_multipart_with_a_file_part() {
        let draft = Products::normalize(valid_draft());
        let RequestBody::Multipart(body) = Products::create_body(&draft).unwrap() else {
            panic!("expected multipart");
        };
        assert_eq!(body.field("slug"), Some("bike-chain"));
        assert_eq!(body.field("price"), Some("25"));
        assert_eq!(body.files.len(), 1);
        assert_eq!(body.files[0].field, "file");
        assert_eq!(body.files[0].file_name, "chain.png");
    }

    #[test]
    fn update_body_is_json_without_the_file() {
        let draft = Products::normalize(valid_draft());
        let RequestBody::Json(body) = Products::update_body(&draft).unwrap() else {
            panic!("expected json");
        };
        assert_eq!(body["price"], json!(25));
        assert!(body.get("thumbnail_file").is_none());
    }
}
