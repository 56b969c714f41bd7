//! Tracker Service — activity log, blog and todo board over JSON collection files.
//!
//! Reads are open to everyone; writes are gated by `WRITE_ACCESS` (loopback by default).
//! Default: http://0.0.0.0:3001/api

use std::net::SocketAddr;
use std::sync::Arc;
use tracker_service::config::Config;
use tracker_service::gate;
use tracker_service::routes::{self, AppState};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    log::info!("Opening collections in: {}", config.data_dir.display());
    let authorizer = gate::create_authorizer(&config.write_access).expect("Invalid WRITE_ACCESS");
    log::info!("Write access policy: {}", authorizer.name());
    let state = Arc::new(
        AppState::open(&config, authorizer).expect("Failed to initialize collections"),
    );

    let cors = tower_http::cors::CorsLayer::permissive();

    let app = routes::router(state).layer(cors);

    let addr = format!("{}:{}", config.bind_addr, config.port);
    log::info!("Tracker Service listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}
