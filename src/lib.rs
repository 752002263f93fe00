pub mod application;
pub mod config;
pub mod demo;
pub mod domain;
pub mod errors;
pub mod infrastructure;
pub mod routes;

#[cfg(test)]
mod testing;

pub use application::context::AdminContext;
pub use config::{ClientConfig, ServerConfig};
pub use demo::{build_server, DemoStore};
pub use errors::AppError;
pub use infrastructure::http_transport::HttpTransport;
