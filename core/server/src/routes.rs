//! REST handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;
use passvault_common::{OwnerId, PlainFields, RecordId, StoredRecord, VaultRecord};

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Raw `Authorization` header value. Non-UTF-8 values count as absent.
fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
}

#[derive(Serialize)]
pub struct CreatedResponse {
    pub message: &'static str,
    pub item: StoredRecord,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub message: &'static str,
    pub user_id: OwnerId,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// POST /vault
pub async fn create_record(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<PlainFields>, JsonRejection>,
) -> ApiResult<CreatedResponse> {
    let auth = authorization(&headers);
    // Anonymous callers get 401 even when the body is malformed.
    let Json(fields) = match body {
        Ok(body) => body,
        Err(rejection) => {
            state.engine.vault.authorize(auth)?;
            return Err(rejection.into());
        }
    };

    let item = state.engine.vault.create(auth, fields).await?;
    Ok(Json(CreatedResponse {
        message: "Item added",
        item,
    }))
}

/// GET /vault
pub async fn list_records(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Vec<VaultRecord>> {
    let records = state.engine.vault.list(authorization(&headers)).await?;
    Ok(Json(records))
}

/// PATCH /vault/{id}
pub async fn update_record(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Result<Json<PlainFields>, JsonRejection>,
) -> ApiResult<VaultRecord> {
    let auth = authorization(&headers);
    let Json(patch) = match body {
        Ok(body) => body,
        Err(rejection) => {
            state.engine.vault.authorize(auth)?;
            return Err(rejection.into());
        }
    };

    let id = RecordId::new(id)?;
    let record = state.engine.vault.update(auth, &id, patch).await?;
    Ok(Json(record))
}

/// DELETE /vault/{id}
pub async fn delete_record(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    let id = RecordId::new(id)?;
    state.engine.vault.delete(authorization(&headers), &id).await?;
    Ok(Json(MessageResponse {
        message: "Deleted successfully",
    }))
}

/// POST /auth/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<SignupResponse> {
    let Json(req) = body?;
    let account = state.engine.accounts.signup(&req.email, &req.password).await?;
    Ok(Json(SignupResponse {
        message: "User created successfully",
        user_id: account.id,
    }))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(req) = body?;
    let token = state.engine.accounts.login(&req.email, &req.password).await?;
    Ok(Json(LoginResponse { token }))
}
