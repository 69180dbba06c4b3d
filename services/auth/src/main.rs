use sea_orm::Database;
use tracing::info;

use parcelbox_auth::config::AuthConfig;
use parcelbox_auth::router::build_router;
use parcelbox_auth::state::AppState;

#[tokio::main]
async fn main() {
    parcelbox_core::tracing::init_tracing();

    let config = AuthConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let state = AppState::new(
        db,
        config.jwt_secret,
        config.cookie_domain,
        config.session_ttl_secs,
    );

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.auth_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("account service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
