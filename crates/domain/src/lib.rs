//! Domain layer for the storefront.
//!
//! This crate provides:
//! - `DocumentHandler` for the load, mutate, persist cycle over one document
//! - Cart document with identity-key merging and `CartService`
//! - User document with its address book, `AddressService` and `UserService`

pub mod address;
pub mod cart;
pub mod error;
pub mod handler;
pub mod user;

use record_store::CollectionRegistry;

pub use address::{Address, AddressError, AddressInput, AddressService};
pub use cart::{Cart, CartError, CartItem, CartService, ItemKey};
pub use error::DomainError;
pub use handler::{DocumentHandler, MutationResult};
pub use user::{RegisterUser, User, UserError, UserService};

/// Builds the registry of every collection the domain stores documents in.
pub fn collection_registry() -> CollectionRegistry {
    CollectionRegistry::new().with::<Cart>().with::<User>()
}
