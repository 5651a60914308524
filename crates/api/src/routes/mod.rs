//! HTTP route handlers and the state they share.

pub mod addresses;
pub mod cart;
pub mod health;
pub mod metrics;
pub mod users;

use domain::{AddressService, CartService, UserService};
use record_store::RecordStore;

use crate::auth::JwtIdentity;

/// Shared application state accessible from all handlers.
pub struct AppState<S: RecordStore> {
    pub cart_service: CartService<S>,
    pub address_service: AddressService<S>,
    pub user_service: UserService<S>,
    pub identity: JwtIdentity,
}
