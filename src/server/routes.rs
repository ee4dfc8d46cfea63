use axum::body::Bytes;
use axum::extract::{OriginalUri, Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use std::sync::Arc;

use super::error::ApiError;
use crate::entity::{Entity, Log};
use crate::repository::Repository;
use crate::store::Datastore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
  pub logs: Arc<Repository<Log>>,
}

impl AppState {
  pub fn new(store: Datastore) -> Self {
    Self {
      logs: Arc::new(Repository::new(store)),
    }
  }
}

pub fn build_router(state: AppState) -> Router {
  Router::new()
    .route("/health", get(health_check))
    .route("/logs", get(list_logs).post(create_log))
    .route(
      "/logs/{id}",
      get(get_log).put(replace_log).delete(delete_log),
    )
    .fallback(route_not_found)
    .method_not_allowed_fallback(route_not_found)
    .with_state(state)
}

async fn health_check() -> StatusCode {
  StatusCode::OK
}

async fn route_not_found(OriginalUri(uri): OriginalUri) -> ApiError {
  ApiError::NotFound(format!("Router with Path '{}' Not Found", uri))
}

fn id_from_path(id: String) -> Result<String, ApiError> {
  if id.trim().is_empty() {
    return Err(ApiError::BadRequest(format!(
      "'id' path parameter must be a valid string. Received: '{}'",
      id
    )));
  }
  Ok(id)
}

/// Decode a request body; an empty body reads as `null` and fails validation
fn parse_body(body: &Bytes) -> Result<Value, ApiError> {
  if body.is_empty() {
    return Ok(Value::Null);
  }
  serde_json::from_slice(body)
    .map_err(|e| ApiError::BadRequest(format!("Malformed JSON body: {}", e)))
}

async fn list_logs(State(state): State<AppState>) -> Result<Json<Vec<Value>>, ApiError> {
  let logs = state.logs.get_all().await?;
  tracing::debug!("Listing {} logs", logs.len());
  Ok(Json(logs))
}

async fn get_log(
  State(state): State<AppState>,
  Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
  let id = id_from_path(id)?;
  Ok(Json(state.logs.get(&id).await?))
}

async fn create_log(
  State(state): State<AppState>,
  body: Bytes,
) -> Result<(StatusCode, Json<Log>), ApiError> {
  let dto = Log::assert_valid_dto(&parse_body(&body)?)
    .map_err(|errors| ApiError::invalid_dto(Log::KIND, errors))?;
  let log = state.logs.add(dto).await?;
  Ok((StatusCode::CREATED, Json(log)))
}

async fn replace_log(
  State(state): State<AppState>,
  Path(id): Path<String>,
  body: Bytes,
) -> Result<Json<Log>, ApiError> {
  let id = id_from_path(id)?;
  let dto = Log::assert_valid_dto(&parse_body(&body)?)
    .map_err(|errors| ApiError::invalid_dto(Log::KIND, errors))?;
  Ok(Json(state.logs.put(&id, dto).await?))
}

async fn delete_log(
  State(state): State<AppState>,
  Path(id): Path<String>,
) -> Result<Json<Log>, ApiError> {
  let id = id_from_path(id)?;
  Ok(Json(state.logs.remove(&id).await?))
}
