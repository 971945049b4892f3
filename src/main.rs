// Vitrina backend server entry point

use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::EnvFilter;

use vitrina_backend::{app, app_config, initialize_app_state};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let state = initialize_app_state().await?;

    let config = app_config::config();
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        environment = ?config.environment,
        "Vitrina backend listening on {}",
        addr
    );

    let router = app::build_router(state);
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
