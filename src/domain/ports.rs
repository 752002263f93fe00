use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::AppError;

use super::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartBody {
    pub fields: Vec<(String, String)>,
    pub files: Vec<FilePart>,
}

impl MultipartBody {
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Multipart(MultipartBody),
}

/// The REST backend as seen by the admin client.
///
/// Paths are absolute from the API root (`/v1/brands/42`). Success bodies
/// are returned as raw JSON (`null` for empty bodies); typed decoding
/// happens in the services.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, AppError>;

    async fn send(&self, method: Method, path: &str, body: RequestBody) -> Result<Value, AppError>;

    async fn delete(&self, path: &str) -> Result<Value, AppError>;

    /// A transport that sends the session's bearer token on every request.
    fn authorized(&self, session: &Session) -> Arc<dyn Transport>;
}
