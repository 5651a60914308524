//! Shipping addresses and the single-default rule.

mod service;
mod value_objects;

pub use service::AddressService;
pub use value_objects::{Address, AddressInput};

use common::AddressId;
use thiserror::Error;

/// Errors that can occur during address operations.
#[derive(Debug, Error)]
pub enum AddressError {
    /// No address in the user's list has this id.
    #[error("Address not found: {address_id}")]
    AddressNotFound { address_id: AddressId },

    /// A required field was missing or blank.
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },
}
