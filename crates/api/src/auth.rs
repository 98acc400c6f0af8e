//! Bearer-token authentication middleware
//!
//! Token issuance is an external concern; the server is handed a fixed
//! token table at startup and only checks membership. Requests that
//! present no token, or one outside the table, are rejected with 401
//! before any handler runs. Valid requests get a `CurrentUser` injected
//! into their extensions for handlers to consume.

use axum::Json;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use taskboard_db::UserId;

use crate::AppState;

/// The authenticated caller of the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub UserId);

impl CurrentUser {
    /// The caller's user id.
    pub fn id(&self) -> UserId {
        self.0
    }
}

/// Reject the request with a 401 JSON body.
fn unauthorized() -> Response {
    let body = json!({
        "error": "unauthorized",
        "detail": "Authentication credentials were missing or invalid.",
    });
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

/// Middleware requiring a valid bearer token on every request.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    let Some(token) = token else {
        return unauthorized();
    };

    match state.tokens.get(token) {
        Some(&user_id) => {
            request.extensions_mut().insert(CurrentUser(user_id));
            next.run(request).await
        }
        None => unauthorized(),
    }
}
