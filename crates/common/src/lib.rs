//! Identifier types shared by the storefront crates.

mod types;

pub use types::{AddressId, IdParseError, RecordId, UserId};
