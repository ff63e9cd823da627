mod config;
mod doc;
mod dtos;
mod error;
mod routes;
mod utils;

use config::Config;
use database::db::create_connection;
use log::info;
use routes::AppState;
use utils::shutdown::shutdown_signal;

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = Config::from_env().expect("Invalid configuration");
    let db = create_connection(&config.database)
        .await
        .expect("Failed to connect to database");

    let app = routes::app(AppState { db });

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind listener");
    info!("Running axum on http://{}", config.bind_addr);
    info!("API docs at http://{}/swagger-ui", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}
