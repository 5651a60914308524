//! Cart document and related types.

mod aggregate;
mod item;
mod service;

pub use aggregate::Cart;
pub use item::{CartItem, ItemKey};
pub use service::CartService;

use common::UserId;
use thiserror::Error;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The user has no cart yet.
    #[error("Cart not found for user {user_id}")]
    CartNotFound { user_id: UserId },

    /// No line in the cart matches the identity key.
    #[error("Item not found in cart: {key}")]
    LineNotFound { key: ItemKey },

    /// Quantities must be at least 1.
    #[error("Invalid quantity: {quantity} (must be at least 1)")]
    InvalidQuantity { quantity: u32 },

    /// Prices must be finite and not negative.
    #[error("Invalid price: {price}")]
    InvalidPrice { price: f64 },

    /// Every line needs a product.
    #[error("Product ID is required")]
    ProductIdRequired,
}
