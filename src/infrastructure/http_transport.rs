use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::domain::ports::{Method, MultipartBody, RequestBody, Transport};
use crate::domain::session::Session;
use crate::errors::AppError;

/// `Transport` over HTTP with reqwest.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, AppError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        log::debug!("{} {}", method, url);
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Value, AppError> {
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = backend_message(&text, status);
            log::warn!("Backend answered {}: {}", status.as_u16(), message);
            return Err(AppError::Backend {
                status: status.as_u16(),
                message,
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

fn multipart_form(body: MultipartBody) -> Result<Form, AppError> {
    let mut form = Form::new();
    for (name, value) in body.fields {
        form = form.text(name, value);
    }
    for file in body.files {
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)?;
        form = form.part(file.field, part);
    }
    Ok(form)
}

/// Error text for a non-2xx response: the JSON `message` or `error` field,
/// else the raw body, else the status reason.
pub fn backend_message(body: &str, status: StatusCode) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        let field = ["message", "error"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str));
        if let Some(message) = field {
            return message.to_string();
        }
    }
    let raw = body.trim();
    if raw.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    } else {
        raw.to_string()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, AppError> {
        let builder = self.request(reqwest::Method::GET, path).query(query);
        self.execute(builder).await
    }

    async fn send(&self, method: Method, path: &str, body: RequestBody) -> Result<Value, AppError> {
        let verb = match method {
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
        };
        let builder = self.request(verb, path);
        let builder = match body {
            RequestBody::Json(json) => builder.json(&json),
            RequestBody::Multipart(parts) => builder.multipart(multipart_form(parts)?),
        };
        self.execute(builder).await
    }

    async fn delete(&self, path: &str) -> Result<Value, AppError> {
        let builder = self.request(reqwest::Method::DELETE, path);
        self.execute(builder).await
    }

    fn authorized(&self, session: &Session) -> Arc<dyn Transport> {
        Arc::new(Self {
            token: Some(session.token.clone()),
            ..self.clone()
        })
    }
}
