//! # Credential Routes
//!
//! Wallet-scoped credential operations. The wallet comes from the
//! `walletId` cookie (see [`crate::middleware::wallet`]); handlers never
//! accept a wallet id from the path or body.
//!
//! | Method | Path                      | Response                       |
//! |--------|---------------------------|--------------------------------|
//! | POST   | `/credential/issue`       | 201, the signed credential     |
//! | GET    | `/credential/list`        | every credential in the wallet |
//! | GET    | `/credential/{id}`        | one credential, or 404         |
//! | GET    | `/credential/{id}/verify` | `VerificationResult`           |
//! | POST   | `/credential/verify`      | `VerificationResult`           |
//! | DELETE | `/credential/{id}`        | `{"deleted": true, "id"}`, or 404 |
//!
//! Wallet storage is file I/O, so engine calls run on the blocking pool.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::Value;
use vcs_core::WalletId;
use vcs_vc::{Credential, Deleted, IssueRequest, VerificationResult};

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

/// Build the credential router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/credential/issue", post(issue_credential))
        .route("/credential/list", get(list_credentials))
        .route("/credential/verify", post(verify_presented))
        .route(
            "/credential/{id}",
            get(get_credential).delete(delete_credential),
        )
        .route("/credential/{id}/verify", get(verify_stored))
}

/// Body of `POST /credential/verify`.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    /// The presented credential, verified exactly as received.
    #[serde(default)]
    pub credential: Option<Value>,
}

/// Run a synchronous engine call on the blocking thread pool.
async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("blocking task failed: {e}")))?
}

/// POST /credential/issue
async fn issue_credential(
    State(state): State<AppState>,
    Extension(wallet): Extension<WalletId>,
    body: Result<Json<IssueRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Credential>), AppError> {
    let req = extract_json(body)?;
    let credential = blocking(move || Ok(state.engine.issue(&wallet, &req)?)).await?;
    Ok((StatusCode::CREATED, Json(credential)))
}

/// GET /credential/list
async fn list_credentials(
    State(state): State<AppState>,
    Extension(wallet): Extension<WalletId>,
) -> Result<Json<Vec<Credential>>, AppError> {
    let credentials = blocking(move || Ok(state.engine.list(&wallet)?)).await?;
    Ok(Json(credentials))
}

/// GET /credential/{id}
async fn get_credential(
    State(state): State<AppState>,
    Extension(wallet): Extension<WalletId>,
    Path(id): Path<String>,
) -> Result<Json<Credential>, AppError> {
    let credential = blocking(move || Ok(state.engine.get(&wallet, &id)?)).await?;
    Ok(Json(credential))
}

/// GET /credential/{id}/verify
async fn verify_stored(
    State(state): State<AppState>,
    Extension(wallet): Extension<WalletId>,
    Path(id): Path<String>,
) -> Result<Json<VerificationResult>, AppError> {
    let result = blocking(move || Ok(state.engine.verify_by_id(&wallet, &id))).await?;
    Ok(Json(result))
}

/// POST /credential/verify
///
/// Pure computation over the presented document; no wallet access.
async fn verify_presented(
    State(state): State<AppState>,
    body: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<VerificationResult>, AppError> {
    let req = extract_json(body)?;
    Ok(Json(state.engine.verify_credential(req.credential.as_ref())))
}

/// DELETE /credential/{id}
async fn delete_credential(
    State(state): State<AppState>,
    Extension(wallet): Extension<WalletId>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, AppError> {
    let deleted = blocking(move || Ok(state.engine.delete(&wallet, &id)?)).await?;
    Ok(Json(deleted))
}
