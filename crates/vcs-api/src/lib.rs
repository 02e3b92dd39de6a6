//! # vcs-api: Axum HTTP Service for the Credential Server
//!
//! Exposes the `vcs-vc` credential engine over HTTP. Every credential route
//! is scoped to the caller's wallet, identified by the `walletId` cookie.
//!
//! ## API Surface
//!
//! | Prefix           | Module                     | Purpose                    |
//! |------------------|----------------------------|----------------------------|
//! | `/`              | this module                | liveness text              |
//! | `/health/*`      | this module                | liveness and readiness     |
//! | `/credential/*`  | [`routes::credentials`]    | issue, list, verify, delete|
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! CorsLayer → TraceLayer → WalletMiddleware → Handler
//! ```
//!
//! ## Crate Policy
//!
//! - No business logic in route handlers; they delegate to `CredentialEngine`.
//! - All errors map to structured HTTP responses via `AppError`.

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::AppError;
pub use state::{AppConfig, AppState, ConfigError};

/// Request bodies above this size are rejected before deserialization.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes are mounted outside the wallet middleware so they never
/// set a cookie.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origin);

    let api = Router::new()
        .merge(routes::credentials::router())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(from_fn(middleware::wallet::wallet_middleware))
        .with_state(state.clone());

    let probes = Router::new()
        .route("/", get(root))
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .with_state(state);

    Router::new()
        .merge(probes)
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// CORS for the single configured browser origin, with cookies.
fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);
    match HeaderValue::from_str(origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            tracing::warn!(
                origin,
                "CORS origin is not a valid header value; cross-origin requests disabled"
            );
            layer
        }
    }
}

/// GET / : plain-text liveness.
async fn root() -> &'static str {
    "ok"
}

/// Liveness probe: 200 while the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: the key store still holds the issuer record in use.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let engine = state.engine.clone();
    let persisted = tokio::task::spawn_blocking(move || engine.custodian().is_persisted())
        .await
        .unwrap_or(false);
    if !persisted {
        tracing::warn!("issuer key record missing or replaced; not ready");
        return (StatusCode::SERVICE_UNAVAILABLE, "issuer key unavailable").into_response();
    }
    (StatusCode::OK, "ready").into_response()
}
