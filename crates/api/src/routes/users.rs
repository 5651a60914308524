//! Account registration and lookup endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use common::UserId;
use domain::{Address, RegisterUser, User};
use record_store::RecordStore;
use serde::Serialize;

use crate::auth::{AuthUser, session_cookie};
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::routes::AppState;

// -- Response types --

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub addresses: Vec<Address>,
}

impl UserResponse {
    fn new(user_id: UserId, user: User) -> Self {
        Self {
            id: user_id.to_string(),
            addresses: user.addresses().to_vec(),
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Serialize)]
pub struct RegisteredResponse {
    pub user: UserResponse,
    pub token: String,
}

// -- Handlers --

/// POST /users: register an account and start a session.
///
/// The token is returned in the body and set as an HTTP-only cookie.
#[tracing::instrument(skip(state, req))]
pub async fn register<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    JsonBody(req): JsonBody<RegisterUser>,
) -> Result<Response, ApiError> {
    let (user_id, user) = state.user_service.register(req).await?;
    metrics::counter!("users_registered_total").increment(1);
    let token = state.identity.issue(user_id)?;

    let cookie = HeaderValue::from_str(&session_cookie(&token, state.identity.ttl_secs()))
        .map_err(|e| ApiError::Internal(format!("invalid session cookie: {e}")))?;

    let body = RegisteredResponse {
        user: UserResponse::new(user_id, user),
        token,
    };

    Ok((StatusCode::CREATED, [(SET_COOKIE, cookie)], Json(body)).into_response())
}

/// GET /users/me: the caller's account.
#[tracing::instrument(skip(state))]
pub async fn me<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.user_service.get(user_id).await?;
    Ok(Json(UserResponse::new(user_id, user)))
}
