pub mod booking;
pub mod health;
pub mod listing;

use axum::http::HeaderMap;

use crate::errors::AppError;
use crate::state::AppState;

/// Resolve the caller's bearer token to a user id through the configured
/// verifier.
pub(crate) async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<String, AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token.is_empty() {
        return Err(AppError::Unauthorized);
    }

    match state.tokens.verify(token).await? {
        Some(user_id) => Ok(user_id),
        None => Err(AppError::Unauthorized),
    }
}
