use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::auth::jwt::Identity;
use crate::auth::middleware::AdminClaims;
use crate::auth::password::verify_password;
use crate::dto::{ApiResponse, LoginRequest, LoginResponse, SessionResponse};
use crate::error::AppError;
use crate::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    let Json(body) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let admin = &state.config.admin;

    let email_matches = body.email.trim().eq_ignore_ascii_case(admin.email.trim());

    // Always run the hash check so a wrong email costs the same as a wrong password.
    let hash = admin.password_hash.clone();
    let password = body.password;
    let password_matches =
        tokio::task::spawn_blocking(move || verify_password(&hash, &password))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))??;

    if !(email_matches && password_matches) {
        tracing::warn!("Failed admin login attempt for: {}", body.email);
        return Err(AppError::InvalidCredentials);
    }

    let identity = Identity {
        id: admin.id.clone(),
        name: admin.name.clone(),
        email: admin.email.clone(),
    };
    let issued = state.tokens.issue(&identity)?;
    tracing::info!("Admin {} logged in", identity.email);

    Ok(Json(ApiResponse::ok(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        user: identity,
    })))
}

/// Lets the admin panel check whether its stored token is still good.
pub async fn verify(AdminClaims(claims): AdminClaims) -> Json<ApiResponse<SessionResponse>> {
    Json(ApiResponse::ok(SessionResponse {
        user: claims.identity(),
        issued_at: claims.iat,
        expires_at: claims.exp,
    }))
}
