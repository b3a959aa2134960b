use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use folio_core::content::describe;
use serde_json::{json, Value};
use validator::Validate;

use crate::dto::{ApiResponse, ContactRequest};
use crate::error::AppError;
use crate::services::mailer::ContactMessage;
use crate::state::AppState;

pub async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let Json(body) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    body.validate()
        .map_err(|errors| AppError::BadRequest(describe(&errors)))?;

    let message = ContactMessage {
        name: body.name.trim().to_string(),
        email: body.email.trim().to_string(),
        subject: body.subject,
        message: body.message,
    };

    state
        .mailer
        .send_contact(&message)
        .await
        .map_err(|e| AppError::Upstream(format!("contact mail: {e:#}")))?;

    Ok(Json(ApiResponse::ok(
        json!({ "message": "Thanks for reaching out! I'll get back to you soon." }),
    )))
}
