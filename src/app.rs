/*
 * Responsibility
 * - Load Config -> install tracing -> build the gate -> assemble the Router
 * - Apply middleware (keystone gate inside, HTTP concerns outside)
 * - Start axum::serve()
 */
use anyhow::Result;
use axum::Router;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::{AppEnv, Config},
    middleware,
    services::identity::build_keystone_auth,
    state::AppState,
};

pub async fn run() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.app_env);

    let auth = build_keystone_auth(&config).await?;
    tracing::info!(
        endpoint = %config.keystone_endpoint,
        token_cache = auth.cache_backend().unwrap_or("none"),
        cache_time = ?auth.cache_time(),
        "keystone gate ready"
    );

    let state = AppState::new(auth);
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let v1 = middleware::auth::keystone::apply(api::v1::routes(), state.auth.clone());

    let router = Router::new().nest("/api/v1", v1).with_state(state);

    middleware::http::apply(router, config)
}

fn init_tracing(app_env: AppEnv) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_ansi(!app_env.is_production()))
        .init();
}
