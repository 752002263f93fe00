//! In-process `Transport` double shared by the unit tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::ports::{Method, RequestBody, Transport};
use crate::domain::session::Session;
use crate::errors::AppError;

type Handler = dyn Fn(&str, &str) -> Result<Value, AppError> + Send + Sync;

#[derive(Default)]
struct Recorded {
    gets: Vec<(String, Vec<(String, String)>)>,
    sent: Vec<(Method, String, RequestBody)>,
    deletes: Vec<String>,
    tokens: Vec<Option<String>>,
}

/// Records every request and answers through a scripted handler that
/// receives the HTTP method and path.
pub struct FakeTransport {
    handler: Arc<Handler>,
    recorded: Arc<Mutex<Recorded>>,
    token: Option<String>,
    delay: Option<Duration>,
}

impl FakeTransport {
    pub fn replying<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&str, &str) -> Result<Value, AppError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Arc::new(handler),
            recorded: Arc::default(),
            token: None,
            delay: None,
        })
    }

    /// Same handler, but every answer waits `delay` first.
    pub fn delayed<F>(delay: Duration, handler: F) -> Arc<Self>
    where
        F: Fn(&str, &str) -> Result<Value, AppError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Arc::new(handler),
            recorded: Arc::default(),
            token: None,
            delay: Some(delay),
        })
    }

    fn recorded(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap()
    }

    async fn answer(&self, method: &str, path: &str) -> Result<Value, AppError> {
        self.recorded().tokens.push(self.token.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.handler)(method, path)
    }

    pub fn gets(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.recorded().gets.clone()
    }

    pub fn sent(&self) -> Vec<(Method, String, RequestBody)> {
        self.recorded().sent.clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.recorded().deletes.clone()
    }

    pub fn tokens(&self) -> Vec<Option<String>> {
        self.recorded().tokens.clone()
    }

    pub fn request_count(&self) -> usize {
        let recorded = self.recorded();
        recorded.gets.len() + recorded.sent.len() + recorded.deletes.len()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, AppError> {
        self.recorded()
            .gets
            .push((path.to_string(), query.to_vec()));
        self.answer("GET", path).await
    }

    async fn send(&self, method: Method, path: &str, body: RequestBody) -> Result<Value, AppError> {
        self.recorded().sent.push((method, path.to_string(), body));
        self.answer(method.as_str(), path).await
    }

    async fn delete(&self, path: &str) -> Result<Value, AppError> {
        self.recorded().deletes.push(path.to_string());
        self.answer("DELETE", path).await
    }

    fn authorized(&self, session: &Session) -> Arc<dyn Transport> {
        Arc::new(Self {
            handler: self.handler.clone(),
            recorded: self.recorded.clone(),
            token: Some(session.token.clone()),
            delay: self.delay,
        })
    }
}
