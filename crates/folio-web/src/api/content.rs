//! CRUD handlers shared by every content collection.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use folio_core::{Document, Record};
use serde::Serialize;

use crate::auth::middleware::AdminClaims;
use crate::dto::ApiResponse;
use crate::error::AppError;
use crate::middleware::rate_limit;
use crate::state::AppState;

type Reply<T> = Result<Json<ApiResponse<T>>, AppError>;

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: String,
}

/// Mounts `/api/<collection>` and `/api/<collection>/{id}` for `T`.
///
/// Reads are public under the `public_read` budget; writes need an admin
/// token and count against the `api` budget.
pub fn routes<T: Document>(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    let read_limit = from_fn_with_state(state.clone(), rate_limit::public_read);
    let write_limit = from_fn_with_state(state.clone(), rate_limit::api);

    let base = format!("/api/{}", T::COLLECTION);
    let item = format!("{base}/{{id}}");

    router
        .route(
            &base,
            get(list::<T>)
                .route_layer(read_limit.clone())
                .merge(post(create::<T>).route_layer(write_limit.clone())),
        )
        .route(
            &item,
            get(get_one::<T>)
                .route_layer(read_limit)
                .merge(put(update::<T>).delete(remove::<T>).route_layer(write_limit)),
        )
}

fn parse_body<T: Document>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(doc)| doc)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

async fn list<T: Document>(State(state): State<AppState>) -> Reply<Vec<Record<T>>> {
    let records = state.collection::<T>().list().await?;
    Ok(Json(ApiResponse::ok(records)))
}

async fn get_one<T: Document>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Reply<Record<T>> {
    let record = state.collection::<T>().get(&id).await?;
    Ok(Json(ApiResponse::ok(record)))
}

async fn create<T: Document>(
    AdminClaims(claims): AdminClaims,
    State(state): State<AppState>,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Record<T>>>), AppError> {
    let doc = parse_body(payload)?;
    let record = state.collection::<T>().create(doc).await?;
    tracing::info!("{} created {}/{}", claims.sub, T::COLLECTION, record.id);
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(record))))
}

async fn update<T: Document>(
    AdminClaims(claims): AdminClaims,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<T>, JsonRejection>,
) -> Reply<Record<T>> {
    let doc = parse_body(payload)?;
    let record = state.collection::<T>().update(&id, doc).await?;
    tracing::info!("{} updated {}/{}", claims.sub, T::COLLECTION, id);
    Ok(Json(ApiResponse::ok(record)))
}

async fn remove<T: Document>(
    AdminClaims(claims): AdminClaims,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Reply<Deleted> {
    state.collection::<T>().delete(&id).await?;
    tracing::info!("{} deleted {}/{}", claims.sub, T::COLLECTION, id);
    Ok(Json(ApiResponse::ok(Deleted { id })))
}
