//! HTTP API server for the storefront cart and address book.
//!
//! Provides REST endpoints for users, carts, and addresses, with
//! token-based identity, structured logging (tracing), and Prometheus metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, patch, post, put};
use domain::{AddressService, CartService, UserService};
use metrics_exporter_prometheus::PrometheusHandle;
use record_store::RecordStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::JwtIdentity;
use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: RecordStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/users", post(routes::users::register::<S>))
        .route("/users/me", get(routes::users::me::<S>))
        .route(
            "/cart",
            get(routes::cart::get::<S>)
                .post(routes::cart::add::<S>)
                .put(routes::cart::update::<S>)
                .delete(routes::cart::clear::<S>),
        )
        .route("/cart/item", delete(routes::cart::remove::<S>))
        .route("/cart/sync", post(routes::cart::sync::<S>))
        .route(
            "/addresses",
            get(routes::addresses::list::<S>).post(routes::addresses::add::<S>),
        )
        .route(
            "/addresses/default",
            patch(routes::addresses::set_default_from_body::<S>),
        )
        .route("/addresses/{id}", delete(routes::addresses::delete::<S>))
        .route(
            "/addresses/{id}/default",
            put(routes::addresses::set_default::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state with services sharing one store.
pub fn create_default_state<S: RecordStore + Clone + 'static>(
    store: S,
    identity: JwtIdentity,
) -> Arc<AppState<S>> {
    Arc::new(AppState {
        cart_service: CartService::new(store.clone()),
        address_service: AddressService::new(store.clone()),
        user_service: UserService::new(store),
        identity,
    })
}
