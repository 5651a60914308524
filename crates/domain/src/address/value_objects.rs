//! Value objects for the address book.

use common::AddressId;
use serde::{Deserialize, Serialize};

use super::AddressError;

const DEFAULT_COUNTRY: &str = "India";
const DEFAULT_LABEL: &str = "Home";

/// A shipping address owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Identifier, unique within the owner's list.
    pub id: AddressId,

    /// Recipient name.
    pub name: String,

    pub phone: String,

    /// Street address.
    pub address: String,

    pub city: String,

    pub state: String,

    pub pincode: String,

    pub country: String,

    /// Free-form label such as "Home" or "Work".
    pub label: String,

    /// Pre-selected at checkout. At most one address per user has it set.
    pub is_default: bool,
}

/// Address data supplied by a caller.
///
/// Every field is optional at the parsing stage so that a missing field is
/// reported as a validation error rather than a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub country: Option<String>,
    pub label: Option<String>,

    /// Accepted for compatibility and ignored; the default flag is decided
    /// by the address book.
    pub is_default: Option<bool>,
}

impl AddressInput {
    /// Builds the address, failing on the first missing required field.
    pub fn into_address(self, id: AddressId, is_default: bool) -> Result<Address, AddressError> {
        Ok(Address {
            id,
            name: required(self.name, "name")?,
            phone: required(self.phone, "phone")?,
            address: required(self.address, "address")?,
            city: required(self.city, "city")?,
            state: required(self.state, "state")?,
            pincode: required(self.pincode, "pincode")?,
            country: optional(self.country).unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
            label: optional(self.label).unwrap_or_else(|| DEFAULT_LABEL.to_string()),
            is_default,
        })
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, field: &'static str) -> Result<String, AddressError> {
    optional(value).ok_or(AddressError::MissingField { field })
}
