//! Address book endpoints. Every response is the caller's full address list.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::AddressId;
use domain::{Address, AddressInput};
use record_store::RecordStore;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::routes::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDefaultRequest {
    pub address_id: Option<String>,
}

fn parse_address_id(id: &str) -> Result<AddressId, ApiError> {
    id.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid address id: {e}")))
}

/// GET /addresses
#[tracing::instrument(skip(state))]
pub async fn list<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Address>>, ApiError> {
    Ok(Json(state.address_service.list(user_id).await?))
}

/// POST /addresses
#[tracing::instrument(skip(state, input))]
pub async fn add<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
    JsonBody(input): JsonBody<AddressInput>,
) -> Result<Json<Vec<Address>>, ApiError> {
    Ok(Json(state.address_service.add(user_id, input).await?))
}

/// DELETE /addresses/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Address>>, ApiError> {
    let address_id = parse_address_id(&id)?;
    Ok(Json(state.address_service.delete(user_id, address_id).await?))
}

/// PUT /addresses/{id}/default
#[tracing::instrument(skip(state))]
pub async fn set_default<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Address>>, ApiError> {
    let address_id = parse_address_id(&id)?;
    Ok(Json(
        state.address_service.set_default(user_id, address_id).await?,
    ))
}

/// PATCH /addresses/default with `{ "addressId": ... }`
#[tracing::instrument(skip(state, req))]
pub async fn set_default_from_body<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
    JsonBody(req): JsonBody<SetDefaultRequest>,
) -> Result<Json<Vec<Address>>, ApiError> {
    let address_id = req
        .address_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .map(parse_address_id)
        .transpose()?;
    Ok(Json(
        state
            .address_service
            .set_default_from(user_id, address_id)
            .await?,
    ))
}
