use backoffice::{build_server, DemoStore, ServerConfig};
use dotenvy::dotenv;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = ServerConfig::from_env()?;
    let store = DemoStore::seeded();

    log::info!(
        "Starting demo back-office API at http://{}:{}",
        config.host,
        config.port
    );

    build_server(store, &config.host, config.port)?.await
}
