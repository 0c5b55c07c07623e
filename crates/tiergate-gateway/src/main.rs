//! tierGate gateway binary.
//!
//! - Access introspection: /api/v1/access/{me,tiers,field-access/*,demo/:tier}
//! - Filtered sample upstream: /api/v1/hotels/search, /api/v1/itineraries/optimize
//! - Liveness: /healthz

use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};

use tiergate_gateway::{app_state, config, router, sample};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::var(config::CONFIG_ENV).unwrap_or_else(|_| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::load_or_default(&path).expect("config load failed");
    let listen: SocketAddr = cfg
        .gateway
        .listen
        .parse()
        .expect("gateway.listen must be a valid SocketAddr");

    let state = app_state::AppState::new(cfg).expect("app state init failed");
    let app = router::build_router(state, sample::routes());

    tracing::info!(%listen, config = %path, "tiergate-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen).await.expect("failed to bind");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .expect("server failed");
}
