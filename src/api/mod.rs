use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::state::SharedState;

mod assets;
pub mod auth;
mod billing;
mod claims;
mod error;
pub mod events;
mod hunts;
mod observability;
mod offensives;
mod system;
mod types;
mod validation;
mod vaults;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn event_bus(&self) -> &tokio::sync::broadcast::Sender<crate::domain::NotificationEvent> {
        &self.shared.event_bus
    }

    #[must_use]
    pub fn offensives(&self) -> &Arc<crate::services::OffensiveService> {
        &self.shared.offensives
    }

    #[must_use]
    pub fn hunts(&self) -> &Arc<crate::services::HuntService> {
        &self.shared.hunts
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, secure_cookies, session_minutes) = {
        let config = state.config().read().await;
        (
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
            config.server.session_minutes,
        )
    };

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            session_minutes,
        )));

    // The vault-discovery CRUD is deliberately public; everything else
    // sits behind the auth middleware.
    let discovery_routes = Router::new()
        .route(
            "/vaults",
            get(vaults::list_vaults).post(vaults::create_vault),
        )
        .route(
            "/vaults/{id}",
            get(vaults::get_vault).patch(vaults::patch_vault),
        );

    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(discovery_routes)
        .merge(protected_routes)
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/system/health", get(system::get_health))
        .layer(session_layer)
        .with_state(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .fallback(assets::serve_asset)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::get_current_user))
        .route("/auth/password", put(auth::change_password))
        .route("/auth/api-key", get(auth::get_api_key))
        .route("/auth/api-key/regenerate", post(auth::regenerate_api_key))
        .route("/vaults/{id}/items", get(vaults::list_vault_items))
        .route("/vaults/{id}/offensives", post(offensives::start_offensive))
        .route(
            "/vaults/{id}/items/{item_id}/claim",
            post(claims::claim_item),
        )
        .route("/offensives", get(offensives::list_my_offensives))
        .route("/offensives/{id}", get(offensives::get_offensive))
        .route(
            "/offensives/{id}/messages",
            get(offensives::list_messages).post(offensives::post_message),
        )
        .route(
            "/offensives/{id}/forfeit",
            post(offensives::forfeit_offensive),
        )
        .route("/hunts", get(hunts::list_hunts).post(hunts::start_hunt))
        .route("/hunts/{id}", get(hunts::get_hunt))
        .route("/billing/time", post(billing::purchase_time))
        .route("/system/status", get(system::get_status))
        .route("/metrics", get(observability::get_metrics))
        .merge(events::router())
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
