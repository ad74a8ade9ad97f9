pub mod auth;
pub mod error;
pub mod handlers;


use std::{sync::Arc, time::Instant};

use axum::{
    extract::Request,
    http::{HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use url::Url;

use crate::{catalog::AllCatalogStores, config::Config, utils::token::TokenCodec};
use auth::AuthKeys;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<AllCatalogStores>,
    pub codec: TokenCodec,
    pub auth: Arc<AuthKeys>,
}

impl AppState {
    pub fn new(store: AllCatalogStores, codec: TokenCodec, auth: AuthKeys) -> Self {
        Self {
            store: Arc::new(store),
            codec,
            auth: Arc::new(auth),
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(
            config.build_store()?,
            TokenCodec::new(config.video_token_ttl_minutes),
            AuthKeys::new(config.jwt_secret.as_bytes(), config.session_ttl_minutes),
        ))
    }
}

pub fn create_router(state: AppState) -> Router {
    let gated = Router::new()
        .route("/catalog/{server}/{entry}", get(handlers::preview_entry))
        .route("/me", get(handlers::me))
        .route_layer(from_fn_with_state(state.clone(), auth::require_auth));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/episodes/{server}/{entry}", get(handlers::list_episodes))
        // path kept from the first public version of the api
        .route("/traslink/{server}/{entry}", get(handlers::list_episodes))
        .route("/catalog/{server}", get(handlers::list_catalog))
        .route("/login", post(handlers::login))
        .merge(gated)
        .layer(from_fn(log_requests))
        .with_state(state)
}

async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let start = Instant::now();
    let response = next.run(req).await;

    log::info!(
        "{method} {path} -> {} in {}ms",
        response.status().as_u16(),
        start.elapsed().as_millis()
    );

    response
}

pub fn build_cors_layer(allowed_origins: &[String]) -> anyhow::Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let origins = allowed_origins
        .iter()
        .map(|origin| origin.trim())
        .filter(|origin| !origin.is_empty())
        .map(|origin| -> anyhow::Result<HeaderValue> {
            let normalized = Url::parse(origin)?.origin().ascii_serialization();
            Ok(HeaderValue::from_str(&normalized)?)
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    if origins.is_empty() {
        log::warn!("ALLOWED_ORIGINS not set, accepting requests from any origin");
        return Ok(cors.allow_origin(Any));
    }

    log::info!("CORS allow-list has {} origin(s)", origins.len());
    Ok(cors.allow_origin(AllowOrigin::list(origins)))
}

pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)?;
    let app = create_router(state).layer(build_cors_layer(&config.allowed_origins)?);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;

    log::info!("traslink listening on http://{addr} ({} store)", config.store_kind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("cannot listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    log::info!("shutting down");
}
