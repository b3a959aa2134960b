use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::jwt::Claims;
use crate::error::AppError;
use crate::state::AppState;

/// Extractor for admin-only handlers. Rejects with 401 unless the request
/// carries a valid `Authorization: Bearer` token.
pub struct AdminClaims(pub Claims);

impl FromRequestParts<AppState> for AdminClaims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let outcome = state.tokens.guard(&parts.headers);
        match outcome.claims {
            Some(claims) if outcome.authorized => Ok(AdminClaims(claims)),
            _ => {
                tracing::debug!("Rejected unauthenticated request to {}", parts.uri.path());
                Err(AppError::Unauthorized)
            }
        }
    }
}
