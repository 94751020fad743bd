use axum::{
    Router,
    handler::Handler,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{TokenStore, UserStore};
use crate::config::Config;
use crate::db::Store;
use crate::services::AuthGate;

pub mod auth;
mod chirps;
mod error;
mod extractors;
mod observability;
mod system;
mod types;
mod users;
mod validation;
mod webhooks;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth: Arc<AuthGate>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let users: Arc<dyn UserStore> = Arc::new(store.clone());
    let tokens: Arc<dyn TokenStore> = Arc::new(store.clone());
    let auth = Arc::new(AuthGate::new(users, tokens, &config.auth, &config.security)?);

    Ok(Arc::new(AppState {
        config: Arc::new(config),
        store,
        auth,
        prometheus_handle,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    let access_token = middleware::from_fn_with_state(state.clone(), auth::require_access_token);
    let service_key = middleware::from_fn_with_state(state.clone(), auth::require_service_key);

    let api_router = Router::new()
        .route("/healthz", get(system::healthz))
        .route(
            "/users",
            post(users::create_user).put(users::update_user.layer(access_token.clone())),
        )
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/revoke", post(auth::revoke))
        .route(
            "/chirps",
            post(chirps::create_chirp.layer(access_token.clone())).get(chirps::list_chirps),
        )
        .route(
            "/chirps/{chirp_id}",
            get(chirps::get_chirp).delete(chirps::delete_chirp.layer(access_token)),
        )
        .route("/validate_chirp", post(chirps::validate))
        .route(
            "/polka/webhooks",
            post(webhooks::polka_webhook.layer(service_key)),
        )
        // Route layer so the span sees MatchedPath and wraps the auth layers.
        .route_layer(middleware::from_fn(observability::logging_middleware));

    let admin_router = Router::new()
        .route("/metrics", get(observability::get_metrics))
        .route("/reset", post(system::reset))
        .route_layer(middleware::from_fn(observability::logging_middleware));

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .nest("/admin", admin_router)
        .with_state(state)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

