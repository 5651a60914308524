//! Cart endpoints. Every response carries the full item list.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use domain::{CartItem, ItemKey};
use record_store::RecordStore;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::routes::AppState;

// -- Request types --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    #[serde(flatten)]
    pub key: ItemKey,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct SyncRequest {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

// -- Response types --

#[derive(Serialize)]
pub struct CartResponse {
    pub items: Vec<CartItem>,
}

impl From<Vec<CartItem>> for CartResponse {
    fn from(items: Vec<CartItem>) -> Self {
        Self { items }
    }
}

// -- Handlers --

/// GET /cart
#[tracing::instrument(skip(state))]
pub async fn get<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<CartResponse>, ApiError> {
    let items = state.cart_service.get(user_id).await?;
    Ok(Json(items.into()))
}

/// POST /cart: add one item, merging with an existing line.
#[tracing::instrument(skip(state, item))]
pub async fn add<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
    JsonBody(item): JsonBody<CartItem>,
) -> Result<Json<CartResponse>, ApiError> {
    let items = state.cart_service.add(user_id, item).await?;
    Ok(Json(items.into()))
}

/// PUT /cart: set the quantity of an existing line.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
    JsonBody(req): JsonBody<UpdateItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let items = state
        .cart_service
        .update(user_id, req.key, req.quantity)
        .await?;
    Ok(Json(items.into()))
}

/// DELETE /cart/item
#[tracing::instrument(skip(state, key))]
pub async fn remove<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
    JsonBody(key): JsonBody<ItemKey>,
) -> Result<Json<CartResponse>, ApiError> {
    let items = state.cart_service.remove(user_id, key).await?;
    Ok(Json(items.into()))
}

/// DELETE /cart
#[tracing::instrument(skip(state))]
pub async fn clear<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<CartResponse>, ApiError> {
    let items = state.cart_service.clear(user_id).await?;
    Ok(Json(items.into()))
}

/// POST /cart/sync: merge a client-held batch into the stored cart.
#[tracing::instrument(skip(state, req), fields(batch = req.items.len()))]
pub async fn sync<S: RecordStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
    JsonBody(req): JsonBody<SyncRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let items = state.cart_service.sync(user_id, req.items).await?;
    Ok(Json(items.into()))
}
