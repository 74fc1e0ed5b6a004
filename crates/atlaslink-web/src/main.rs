use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use atlaslink_web::{router, AppState, ServiceConfig, ServiceError};

#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = ServiceConfig::from_env()?;
    info!(
        bind_addr = %config.bind_addr,
        rate_store = ?config.rate_store,
        rate_limit = config.governor.limit,
        window_secs = config.governor.window.as_secs(),
        allowed_origins = config.allowed_origins.len(),
        "starting atlaslink web service"
    );

    let state = AppState::from_config(&config)?;
    let app = router(state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
