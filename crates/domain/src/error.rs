//! Domain error types.

use common::UserId;
use record_store::RecordStoreError;
use thiserror::Error;

use crate::address::AddressError;
use crate::cart::CartError;
use crate::user::UserError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the record store.
    #[error("Record store error: {0}")]
    Store(#[from] RecordStoreError),

    /// A cart operation was rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// An address operation was rejected.
    #[error("Address error: {0}")]
    Address(#[from] AddressError),

    /// A user operation was rejected.
    #[error("User error: {0}")]
    User(#[from] UserError),

    /// The user record does not exist.
    #[error("User not found: {user_id}")]
    UserNotFound { user_id: UserId },
}
