//! Per-class rate limit layers.
//!
//! Attach with `axum::middleware::from_fn_with_state(state, rate_limit::login)` etc.
//! Login and contact responses carry `X-RateLimit-*` headers; every class
//! answers refusals with 429 and the class's message.

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;
use crate::limiter::{client_key, LimitClass, RateDecision};
use crate::state::AppState;

fn header_value(value: impl std::fmt::Display) -> HeaderValue {
    HeaderValue::try_from(value.to_string()).unwrap_or_else(|_| HeaderValue::from_static("0"))
}

fn apply_headers(response: &mut Response, decision: &RateDecision) {
    let headers = response.headers_mut();
    headers.insert("x-ratelimit-limit", header_value(decision.limit));
    headers.insert("x-ratelimit-remaining", header_value(decision.remaining));
    headers.insert("x-ratelimit-reset", header_value(decision.reset_at));
}

async fn enforce(state: &AppState, class: LimitClass, req: Request, next: Next) -> Response {
    let key = client_key(req.headers());
    let decision = state
        .limiter
        .check(class, &key, jsonwebtoken::get_current_timestamp());

    let mut response = if decision.allowed {
        next.run(req).await
    } else {
        tracing::warn!(
            "Rate limit hit: class={} client={key} reset_at={}",
            class.name(),
            decision.reset_at
        );
        let message = decision.error.clone().unwrap_or_default();
        AppError::RateLimited(message).into_response()
    };

    if class.exposes_headers() {
        apply_headers(&mut response, &decision);
    }
    response
}

pub async fn login(State(state): State<AppState>, req: Request, next: Next) -> Response {
    enforce(&state, LimitClass::Login, req, next).await
}

pub async fn contact(State(state): State<AppState>, req: Request, next: Next) -> Response {
    enforce(&state, LimitClass::Contact, req, next).await
}

pub async fn upload(State(state): State<AppState>, req: Request, next: Next) -> Response {
    enforce(&state, LimitClass::Upload, req, next).await
}

pub async fn api(State(state): State<AppState>, req: Request, next: Next) -> Response {
    enforce(&state, LimitClass::Api, req, next).await
}

pub async fn public_read(State(state): State<AppState>, req: Request, next: Next) -> Response {
    enforce(&state, LimitClass::PublicRead, req, next).await
}
