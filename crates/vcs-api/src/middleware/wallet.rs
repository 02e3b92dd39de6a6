//! # Wallet Identity Middleware
//!
//! Every request is bound to a wallet through the `walletId` cookie. A
//! first-time visitor, or one presenting a value that is not a valid
//! [`WalletId`], is assigned a fresh UUID and the cookie is set on the
//! response (`HttpOnly; SameSite=None; Secure`).
//!
//! The resolved id is inserted into request extensions, so handlers read it
//! with `Extension<WalletId>`.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use vcs_core::WalletId;

/// Name of the wallet identity cookie.
pub const WALLET_COOKIE: &str = "walletId";

/// Resolve the caller's wallet and make it available to handlers.
pub async fn wallet_middleware(jar: CookieJar, mut request: Request, next: Next) -> Response {
    let presented = jar.get(WALLET_COOKIE).map(|c| c.value().to_string());
    let existing = presented.as_deref().and_then(|v| WalletId::new(v).ok());

    let (wallet, assigned) = match existing {
        Some(wallet) => (wallet, false),
        None => {
            let wallet = WalletId::generate();
            if presented.is_some() {
                tracing::debug!(wallet_id = %wallet, "replacing invalid wallet cookie");
            } else {
                tracing::debug!(wallet_id = %wallet, "assigned new wallet");
            }
            (wallet, true)
        }
    };

    request.extensions_mut().insert(wallet.clone());
    let response = next.run(request).await;
    if !assigned {
        return response;
    }

    let cookie = Cookie::build((WALLET_COOKIE, wallet.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::None)
        .secure(true);
    (jar.add(cookie), response).into_response()
}
