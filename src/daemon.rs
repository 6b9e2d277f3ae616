use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};

use crate::auth;
use crate::config::Config;
use crate::error::{GatewayError, Result};
use crate::handlers;
use crate::response;
use crate::store::{SqliteStore, Store};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/plans",
            get(handlers::list_plans).post(handlers::create_plan),
        )
        .route("/plans/{id}/steps", get(handlers::list_steps))
        .route("/steps", post(handlers::create_step))
        .route("/steps/{id}", put(handlers::update_step))
        .fallback(handlers::route_not_found)
        .method_not_allowed_fallback(handlers::route_not_found)
        .layer(middleware::from_fn_with_state(state.clone(), gateway))
        .with_state(state)
}

/// Runs in front of routing: preflight short-circuit, API key check, then
/// CORS headers on whatever comes back.
async fn gateway(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = if method == Method::OPTIONS {
        response::preflight()
    } else if let Err(err) = auth::authorize(request.headers(), &state.config.api_key) {
        tracing::warn!(%method, %path, "Rejected request without a valid API key");
        err.into_response()
    } else {
        next.run(request).await
    };

    response::apply_cors(response.headers_mut(), state.config.cors_origin());
    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Handled request"
    );
    response
}

pub async fn run(config: Config) -> Result<()> {
    run_with_shutdown(config, async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!("Could not listen for shutdown signal: {}", err);
            futures::future::pending::<()>().await;
        }
    })
    .await
}

pub async fn run_with_shutdown<F>(config: Config, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    config.validate()?;
    tracing::info!(?config, version = env!("CARGO_PKG_VERSION"), "Starting plan gateway");

    let store = SqliteStore::open(&config.database_url, config.max_connections).await?;
    let addr = config.bind_addr();
    let app = build_router(AppState::new(config, Arc::new(store)));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| GatewayError::Runtime(e.to_string()))?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| GatewayError::Runtime(e.to_string()))?;

    tracing::info!("Plan gateway stopped");
    Ok(())
}
