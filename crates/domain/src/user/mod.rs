//! User document and account operations.

mod aggregate;
mod service;

pub use aggregate::User;
pub use service::{RegisterUser, UserService};
pub(crate) use service::load_user;

use thiserror::Error;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// Name is required.
    #[error("Name is required")]
    NameRequired,

    /// Email is missing or malformed.
    #[error("Invalid email: {email:?}")]
    InvalidEmail { email: String },

    /// Another account already uses this email.
    #[error("Email already registered: {email}")]
    EmailTaken { email: String },
}
