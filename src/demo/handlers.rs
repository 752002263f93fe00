use std::collections::HashMap;

use actix_multipart::Multipart;
use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse};
use chrono::Utc;
use futures::future::{ready, Ready};
use futures::StreamExt;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::domain::brand::Brands;
use crate::domain::category::Categories;
use crate::domain::customer::Customers;
use crate::domain::discount::Discounts;
use crate::domain::lenient::format_timestamp;
use crate::domain::listing::{matches_query, ListQuery};
use crate::domain::order::{OrderStatus, Orders};
use crate::domain::product::Products;
use crate::domain::resource::Resource;
use crate::domain::role::Roles;
use crate::domain::sorting::sort_records;
use crate::domain::user::Users;

use super::errors::BackendError;
use super::store::{stamp_new, Account, DemoStore};

const MAX_LIMIT: u32 = 100;

/// How the demo backend serves one collection.
pub trait Served: Resource {
    /// Field that must be unique across the collection.
    const UNIQUE: Option<&'static str> = None;
    /// Answer lists with the whole collection as a bare array.
    const BARE_LIST: bool = false;
    /// Create takes `multipart/form-data` with a `file` part.
    const MULTIPART_CREATE: bool = false;
    /// Multipart text fields stored as numbers.
    const NUMERIC_FIELDS: &'static [&'static str] = &[];

    /// Completes a new row before it is stored.
    fn prepare(_store: &DemoStore, _fields: &mut Map<String, Value>) -> Result<(), BackendError> {
        Ok(())
    }

    fn check_update(_existing: &Value, _patch: &Map<String, Value>) -> Result<(), BackendError> {
        Ok(())
    }
}

impl Served for Users {
    const UNIQUE: Option<&'static str> = Some("email");
    const BARE_LIST: bool = true;
}

impl Served for Customers {}

impl Served for Brands {
    const UNIQUE: Option<&'static str> = Some("slug");
}

impl Served for Categories {
    const UNIQUE: Option<&'static str> = Some("slug");
}

impl Served for Roles {
    const UNIQUE: Option<&'static str> = Some("name");
}

impl Served for Discounts {
    const UNIQUE: Option<&'static str> = Some("code");
}

impl Served for Products {
    const UNIQUE: Option<&'static str> = Some("slug");
    const MULTIPART_CREATE: bool = true;
    const NUMERIC_FIELDS: &'static [&'static str] = &["price", "discount", "stock", "model_year"];
}

impl Served for Orders {
    fn prepare(store: &DemoStore, fields: &mut Map<String, Value>) -> Result<(), BackendError> {
        fields.insert("order_id".into(), json!(store.next_order_id()?));
        fields.insert("order_status".into(), json!(OrderStatus::Pending.code()));
        fields.insert("order_date".into(), json!(format_timestamp(&Utc::now())));

        let customer_id = fields
            .get("customer_id")
            .and_then(Value::as_str)
            .map(str::to_string);
        if let Some(customer_id) = customer_id {
            let customer = store
                .find(Customers::NAME, &customer_id)?
                .ok_or_else(|| BackendError::BadRequest("Unknown customer".to_string()))?;
            for key in ["first_name", "last_name", "email", "phone"] {
                if let Some(value) = customer.get(key) {
                    fields.insert(key.to_string(), value.clone());
                }
            }
        }

        if let Some(Value::Array(lines)) = fields.get_mut("order_details") {
            for line in lines.iter_mut() {
                let Some(product_id) = line.get("product_id").and_then(Value::as_str) else {
                    continue;
                };
                let product = store
                    .find(Products::NAME, product_id)?
                    .ok_or_else(|| BackendError::BadRequest("Unknown product".to_string()))?;
                if let Value::Object(line) = line {
                    line.insert("product_name".into(), product["product_name"].clone());
                    line.insert("price".into(), product["price"].clone());
                }
            }
        }
        Ok(())
    }

    fn check_update(existing: &Value, patch: &Map<String, Value>) -> Result<(), BackendError> {
        if !patch.contains_key("order_status") {
            return Ok(());
        }
        let closed = existing
            .get("order_status")
            .and_then(Value::as_i64)
            .and_then(|code| OrderStatus::from_code(code).ok())
            .is_some_and(|status| status.is_terminal());
        if closed {
            return Err(BackendError::BadRequest(
                "Order is already closed".to_string(),
            ));
        }
        Ok(())
    }
}

/// Operator behind a bearer token issued by [`login`].
#[derive(Debug, Clone)]
pub struct Operator {
    pub user_id: String,
}

impl FromRequest for Operator {
    type Error = BackendError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<Operator, BackendError> {
    let store = req
        .app_data::<web::Data<DemoStore>>()
        .ok_or_else(|| BackendError::Internal("store is not configured".to_string()))?;
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or_else(|| BackendError::Unauthorized("Missing bearer token".to_string()))?;
    let user_id = store
        .authenticate(token)?
        .ok_or_else(|| BackendError::Unauthorized("Invalid or expired token".to_string()))?;
    Ok(Operator { user_id })
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// POST /v1/auth/login
pub async fn login(
    store: web::Data<DemoStore>,
    body: web::Json<Credentials>,
) -> Result<HttpResponse, BackendError> {
    match store.login(&body.email, &body.password)? {
        Some(session) => Ok(HttpResponse::Ok().json(session)),
        None => Err(BackendError::Unauthorized(
            "Invalid email or password".to_string(),
        )),
    }
}

/// GET <collection>
///
/// Filters on `keyword` and the collection's filter params, sorts when the
/// collection takes sort params, then slices `page`/`limit`.
pub async fn list<R: Served>(
    store: web::Data<DemoStore>,
    params: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, BackendError> {
    let rows = store.all(R::NAME)?;
    if R::BARE_LIST {
        return Ok(HttpResponse::Ok().json(rows));
    }

    let query = ListQuery::from_params(&params, R::SORT_PARAMS);
    let page = query.page.max(1);
    let limit = query.limit.clamp(1, MAX_LIMIT);

    let mut matched: Vec<(R::Record, Value)> = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value::<R::Record>(row.clone()) {
            Ok(record) => Some((record, row)),
            Err(e) => {
                log::warn!("Skipping undecodable {} row: {}", R::NAME, e);
                None
            }
        })
        .filter(|(record, _)| matches_query::<R>(record, &query))
        .collect();
    if let (Some(sort), Some(_)) = (&query.sort, R::SORT_PARAMS) {
        sort_records(
            &mut matched,
            sort,
            R::tie_breakers(&sort.field),
            |(record, _), field| R::sort_value(record, field),
        );
    }

    let total = matched.len();
    let offset = (page as usize - 1).saturating_mul(limit as usize);
    let items: Vec<Value> = matched
        .into_iter()
        .skip(offset)
        .take(limit as usize)
        .map(|(_, row)| row)
        .collect();

    let mut body = Map::new();
    body.insert(R::COLLECTION_KEY.to_string(), Value::Array(items));
    body.insert("page".to_string(), json!(page));
    body.insert("limit".to_string(), json!(limit));
    body.insert("totalRecords".to_string(), json!(total));
    Ok(HttpResponse::Ok().json(Value::Object(body)))
}

/// GET <collection>/{id}
pub async fn find<R: Served>(
    store: web::Data<DemoStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, BackendError> {
    let id = path.into_inner();
    store
        .find(R::NAME, &id)?
        .map(|row| HttpResponse::Ok().json(row))
        .ok_or_else(|| BackendError::NotFound(R::LABEL.to_string()))
}

/// POST <collection> with a JSON body.
pub async fn create<R: Served>(
    _operator: Operator,
    store: web::Data<DemoStore>,
    body: web::Json<Value>,
) -> Result<HttpResponse, BackendError> {
    let Value::Object(fields) = body.into_inner() else {
        return Err(BackendError::BadRequest(
            "Expected a JSON object".to_string(),
        ));
    };
    store_new::<R>(&store, fields)
}

/// POST <collection> with `multipart/form-data`; the `file` part becomes the
/// row's `thumbnail`.
pub async fn create_multipart<R: Served>(
    _operator: Operator,
    store: web::Data<DemoStore>,
    mut payload: Multipart,
) -> Result<HttpResponse, BackendError> {
    let mut fields = Map::new();
    let mut upload: Option<String> = None;

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let disposition = field.content_disposition();
        let name = disposition.get_name().unwrap_or_default().to_string();
        let file_name = disposition.get_filename().map(str::to_string);

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            bytes.extend_from_slice(&chunk?);
        }

        if name == "file" {
            if bytes.is_empty() {
                return Err(BackendError::BadRequest("Uploaded file is empty".to_string()));
            }
            upload = Some(file_name.unwrap_or_else(|| "upload.bin".to_string()));
            continue;
        }
        let text = String::from_utf8_lossy(&bytes).trim().to_string();
        fields.insert(name.clone(), text_value::<R>(&name, text));
    }

    let Some(file_name) = upload else {
        return Err(BackendError::BadRequest("Thumbnail is required".to_string()));
    };
    fields.insert("thumbnail".into(), json!(format!("/uploads/{file_name}")));
    store_new::<R>(&store, fields)
}

fn text_value<R: Served>(name: &str, text: String) -> Value {
    if !R::NUMERIC_FIELDS.contains(&name) {
        return Value::String(text);
    }
    if let Ok(int) = text.parse::<i64>() {
        return json!(int);
    }
    match text.parse::<f64>() {
        Ok(float) => json!(float),
        Err(_) => Value::String(text),
    }
}

fn store_new<R: Served>(
    store: &DemoStore,
    mut fields: Map<String, Value>,
) -> Result<HttpResponse, BackendError> {
    let password = fields.remove("password");
    stamp_new(&mut fields);
    R::prepare(store, &mut fields)?;
    let row = Value::Object(fields);
    serde_json::from_value::<R::Record>(row.clone())
        .map_err(|e| BackendError::BadRequest(format!("Invalid {}: {e}", R::LABEL.to_lowercase())))?;

    let created = store.insert(R::NAME, R::UNIQUE, row)?;
    if let (Some(Value::String(password)), Some(id), Some(email)) = (
        password,
        created.get("_id").and_then(Value::as_str),
        created.get("email").and_then(Value::as_str),
    ) {
        store.add_account(Account {
            user_id: id.to_string(),
            email: email.to_string(),
            password,
            permissions: Vec::new(),
        })?;
    }
    log::info!("Demo backend created {} row", R::NAME);
    Ok(HttpResponse::Created().json(created))
}

/// PUT <collection>/{id}
pub async fn update<R: Served>(
    _operator: Operator,
    store: web::Data<DemoStore>,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> Result<HttpResponse, BackendError> {
    let id = path.into_inner();
    let Value::Object(patch) = body.into_inner() else {
        return Err(BackendError::BadRequest(
            "Expected a JSON object".to_string(),
        ));
    };
    let existing = store
        .find(R::NAME, &id)?
        .ok_or_else(|| BackendError::NotFound(R::LABEL.to_string()))?;
    R::check_update(&existing, &patch)?;

    store
        .update(R::NAME, &id, R::UNIQUE, patch)?
        .map(|row| HttpResponse::Ok().json(row))
        .ok_or_else(|| BackendError::NotFound(R::LABEL.to_string()))
}

/// DELETE <collection>/{id}
pub async fn remove<R: Served>(
    operator: Operator,
    store: web::Data<DemoStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, BackendError> {
    let id = path.into_inner();
    if !store.remove(R::NAME, &id)? {
        return Err(BackendError::NotFound(R::LABEL.to_string()));
    }
    log::info!("{} deleted {} {}", operator.user_id, R::NAME, id);
    Ok(HttpResponse::Ok().json(json!({ "message": format!("{} deleted", R::LABEL) })))
}

fn collection<R: Served>(cfg: &mut web::ServiceConfig) {
    let mut rows = web::resource(R::PATH).route(web::get().to(list::<R>));
    let mut item = web::resource(format!("{}/{{id}}", R::PATH)).route(web::get().to(find::<R>));
    if !R::READ_ONLY {
        rows = if R::MULTIPART_CREATE {
            rows.route(web::post().to(create_multipart::<R>))
        } else {
            rows.route(web::post().to(create::<R>))
        };
        item = item
            .route(web::put().to(update::<R>))
            .route(web::delete().to(remove::<R>));
    }
    cfg.service(rows).service(item);
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/v1/auth/login", web::post().to(login));
    collection::<Users>(cfg);
    collection::<Customers>(cfg);
    collection::<Products>(cfg);
    collection::<Brands>(cfg);
    collection::<Categories>(cfg);
    collection::<Roles>(cfg);
    collection::<Discounts>(cfg);
    collection::<Orders>(cfg);
}
