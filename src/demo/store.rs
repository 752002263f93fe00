use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::domain::lenient::format_timestamp;

use super::errors::BackendError;
use super::seed;

/// Login credentials for a row of the `users` table.
#[derive(Debug, Clone)]
pub struct Account {
    pub user_id: String,
    pub email: String,
    pub password: String,
    pub permissions: Vec<String>,
}

#[derive(Debug, Default)]
pub(super) struct Tables {
    rows: HashMap<&'static str, Vec<Value>>,
    accounts: Vec<Account>,
    /// Bearer token -> user id.
    tokens: HashMap<String, String>,
    next_order_id: i64,
}

impl Tables {
    /// Inserts without constraint checks; returns the new id.
    pub(super) fn push(&mut self, table: &'static str, mut fields: Map<String, Value>) -> String {
        let id = stamp_new(&mut fields);
        self.rows.entry(table).or_default().push(Value::Object(fields));
        id
    }

    pub(super) fn add_account(&mut self, account: Account) {
        self.accounts.push(account);
    }

    pub(super) fn next_order_id(&mut self) -> i64 {
        self.next_order_id += 1;
        self.next_order_id
    }
}

/// Assigns `_id` and both timestamps to a new row.
pub fn stamp_new(fields: &mut Map<String, Value>) -> String {
    let id = Uuid::new_v4().to_string();
    let now = json!(format_timestamp(&Utc::now()));
    fields.insert("_id".to_string(), json!(id));
    fields.insert("created_at".to_string(), now.clone());
    fields.insert("updated_at".to_string(), now);
    id
}

fn row_id(row: &Value) -> Option<&str> {
    row.get("_id").and_then(Value::as_str)
}

fn humanize(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => spaced,
    }
}

fn same_text(a: &Value, b: &Value) -> bool {
    match (a.as_str(), b.as_str()) {
        (Some(a), Some(b)) => a.trim().eq_ignore_ascii_case(b.trim()),
        _ => false,
    }
}

/// Shared in-memory state of the demo backend.
#[derive(Debug, Clone, Default)]
pub struct DemoStore {
    inner: Arc<Mutex<Tables>>,
}

impl DemoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded() -> Self {
        let mut tables = Tables::default();
        seed::populate(&mut tables);
        Self {
            inner: Arc::new(Mutex::new(tables)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, BackendError> {
        self.inner
            .lock()
            .map_err(|_| BackendError::Internal("store lock poisoned".to_string()))
    }

    pub fn all(&self, table: &str) -> Result<Vec<Value>, BackendError> {
        Ok(self.lock()?.rows.get(table).cloned().unwrap_or_default())
    }

    pub fn find(&self, table: &str, id: &str) -> Result<Option<Value>, BackendError> {
        Ok(self
            .lock()?
            .rows
            .get(table)
            .and_then(|rows| rows.iter().find(|r| row_id(r) == Some(id)))
            .cloned())
    }

    /// Appends an already stamped row, refusing a duplicate `unique` value.
    pub fn insert(
        &self,
        table: &'static str,
        unique: Option<&str>,
        row: Value,
    ) -> Result<Value, BackendError> {
        let mut tables = self.lock()?;
        let rows = tables.rows.entry(table).or_default();
        if let Some(field) = unique {
            ensure_unique(rows, field, &row, None)?;
        }
        rows.push(row.clone());
        Ok(row)
    }

    /// Merges `patch` into the row; `Ok(None)` when the id is unknown.
    pub fn update(
        &self,
        table: &str,
        id: &str,
        unique: Option<&str>,
        patch: Map<String, Value>,
    ) -> Result<Option<Value>, BackendError> {
        let mut tables = self.lock()?;
        let Some(rows) = tables.rows.get_mut(table) else {
            return Ok(None);
        };
        let Some(index) = rows.iter().position(|r| row_id(r) == Some(id)) else {
            return Ok(None);
        };

        let mut merged = rows[index].clone();
        if let Value::Object(fields) = &mut merged {
            for (key, value) in patch {
                if key != "_id" {
                    fields.insert(key, value);
                }
            }
            fields.insert(
                "updated_at".to_string(),
                json!(format_timestamp(&Utc::now())),
            );
        }
        if let Some(field) = unique {
            ensure_unique(rows, field, &merged, Some(id))?;
        }
        rows[index] = merged.clone();
        Ok(Some(merged))
    }

    pub fn remove(&self, table: &str, id: &str) -> Result<bool, BackendError> {
        let mut tables = self.lock()?;
        let Some(rows) = tables.rows.get_mut(table) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|r| row_id(r) != Some(id));
        Ok(rows.len() < before)
    }

    pub fn next_order_id(&self) -> Result<i64, BackendError> {
        Ok(self.lock()?.next_order_id())
    }

    pub fn add_account(&self, account: Account) -> Result<(), BackendError> {
        self.lock()?.add_account(account);
        Ok(())
    }

    /// Checks credentials and issues a token, answered with the user row
    /// and the account's permissions.
    pub fn login(&self, email: &str, password: &str) -> Result<Option<Value>, BackendError> {
        let mut tables = self.lock()?;
        let Some(account) = tables
            .accounts
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email.trim()) && a.password == password)
            .cloned()
        else {
            return Ok(None);
        };

        let mut user = tables
            .rows
            .get("users")
            .and_then(|rows| rows.iter().find(|r| row_id(r) == Some(account.user_id.as_str())))
            .cloned()
            .unwrap_or_else(|| json!({ "_id": account.user_id, "email": account.email }));
        if let Value::Object(fields) = &mut user {
            fields.insert("permissions".to_string(), json!(account.permissions));
        }

        let token = Uuid::new_v4().to_string();
        tables.tokens.insert(token.clone(), account.user_id.clone());
        log::info!("Issued demo token for {}", account.email);
        Ok(Some(json!({ "access_token": token, "user": user })))
    }

    /// The user id a token was issued to.
    pub fn authenticate(&self, token: &str) -> Result<Option<String>, BackendError> {
        Ok(self.lock()?.tokens.get(token).cloned())
    }
}

fn ensure_unique(
    rows: &[Value],
    field: &str,
    candidate: &Value,
    skip_id: Option<&str>,
) -> Result<(), BackendError> {
    let Some(value) = candidate.get(field) else {
        return Ok(());
    };
    let taken = rows
        .iter()
        .filter(|r| skip_id.is_none() || row_id(r) != skip_id)
        .filter_map(|r| r.get(field))
        .any(|existing| same_text(existing, value));
    if taken {
        return Err(BackendError::BadRequest(format!(
            "{} already exists",
            humanize(field)
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brand(name: &str, slug: &str) -> Value {
        let mut fields = Map::new();
        fields.insert("brand_name".into(), json!(name));
        fields.insert("slug".into(), json!(slug));
        stamp_new(&mut fields);
        Value::Object(fields)
    }

    #[test]
    fn duplicate_slugs_are_refused_case_insensitively() {
        let store = DemoStore::new();
        store.insert("brands", Some("slug"), brand("Acme", "acme")).unwrap();
        let err = store
            .insert("brands", Some("slug"), brand("ACME", "ACME"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Slug already exists");
        assert_eq!(store.all("brands").unwrap().len(), 1);
    }

    #[test]
    fn updating_a_row_keeps_its_own_unique_value() {
        let store = DemoStore::new();
        let row = store.insert("brands", Some("slug"), brand("Acme", "acme")).unwrap();
        let id = row_id(&row).unwrap().to_string();
        let mut patch = Map::new();
        patch.insert("brand_name".into(), json!("Acme Co"));
        patch.insert("slug".into(), json!("acme"));
        patch.insert("_id".into(), json!("hijack"));

        let updated = store.update("brands", &id, Some("slug"), patch).unwrap().unwrap();
        assert_eq!(updated["brand_name"], json!("Acme Co"));
        assert_eq!(updated["_id"], json!(id));
        assert!(store.update("brands", "missing", None, Map::new()).unwrap().is_none());
    }

    #[test]
    fn remove_reports_whether_a_row_went_away() {
        let store = DemoStore::new();
        let row = store.insert("brands", None, brand("Acme", "acme")).unwrap();
        let id = row_id(&row).unwrap().to_string();
        assert!(store.remove("brands", &id).unwrap());
        assert!(!store.remove("brands", &id).unwrap());
    }

    #[test]
    fn login_issues_a_token_that_authenticates() {
        let store = DemoStore::seeded();
        assert!(store.login("admin@gmail.com", "wrong").unwrap().is_none());

        let session = store.login("ADMIN@gmail.com", "!Qaz123456").unwrap().unwrap();
        let token = session["access_token"].as_str().unwrap();
        assert_eq!(session["user"]["email"], json!("admin@gmail.com"));
        assert!(store.authenticate(token).unwrap().is_some());
        assert!(store.authenticate("forged").unwrap().is_none());
    }

    #[test]
    fn field_names_read_as_words() {
        assert_eq!(humanize("slug"), "Slug");
        assert_eq!(humanize("brand_name"), "Brand name");
    }
}
