use std::net::SocketAddr;

use dotenvy::dotenv;
use postboard::{create_app, utils::state::AppState};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let state = match AppState::create_from_env().await {
        Ok(state) => state,
        Err(err) => {
            error!("Failed to create AppState: {}", err);
            return;
        }
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let router = create_app(state);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind {}: {}", addr, err);
            return;
        }
    };
    info!("Server running on port: {}", addr.port());

    if let Err(err) = axum::serve(listener, router).await {
        error!("Server error: {}", err);
    }
}
