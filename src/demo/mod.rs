//! In-memory stand-in for the back-office REST API, used for local demos
//! and the end-to-end tests.

pub mod errors;
pub mod handlers;
pub mod seed;
pub mod store;

use actix_web::{middleware::Logger, web, App, HttpServer};

pub use store::DemoStore;

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    store: DemoStore,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(store.clone()))
            .wrap(Logger::default())
            .configure(handlers::configure)
    })
    .bind((host.to_string(), port))?
    .run())
}
