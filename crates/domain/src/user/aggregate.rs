//! User aggregate root.

use common::AddressId;
use record_store::Document;
use serde::{Deserialize, Serialize};

use crate::address::{Address, AddressError, AddressInput};

/// A user account and its address book.
///
/// The user's id is the id of the stored record. The address list upholds
/// one rule: at most one entry has `is_default` set, and the first address
/// added to an empty list is the default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,

    /// Lowercased login email, unique across users.
    pub email: String,

    #[serde(default)]
    addresses: Vec<Address>,
}

impl Document for User {
    const COLLECTION: &'static str = "users";

    fn unique_fields() -> &'static [&'static str] {
        &["email"]
    }
}

// Query methods
impl User {
    /// Creates a user with an empty address book.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            addresses: Vec::new(),
        }
    }

    /// Returns the addresses in insertion order.
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    /// Returns an address by id.
    pub fn get_address(&self, address_id: AddressId) -> Option<&Address> {
        self.addresses.iter().find(|a| a.id == address_id)
    }

    /// Returns the default address, if any.
    pub fn default_address(&self) -> Option<&Address> {
        self.addresses.iter().find(|a| a.is_default)
    }
}

// Address book mutations
impl User {
    /// Appends an address built from caller input.
    ///
    /// Whatever default flag the caller sent is ignored: the new address is
    /// the default exactly when the list was empty.
    pub fn add_address(&mut self, input: AddressInput) -> Result<&Address, AddressError> {
        let is_default = self.addresses.is_empty();
        let address = input.into_address(AddressId::new(), is_default)?;
        self.addresses.push(address);
        Ok(&self.addresses[self.addresses.len() - 1])
    }

    /// Removes an address by id and returns it.
    ///
    /// Removing the default address leaves the user with no default.
    pub fn remove_address(&mut self, address_id: AddressId) -> Result<Address, AddressError> {
        let position = self
            .addresses
            .iter()
            .position(|a| a.id == address_id)
            .ok_or(AddressError::AddressNotFound { address_id })?;
        Ok(self.addresses.remove(position))
    }

    /// Makes `address_id` the only default address.
    ///
    /// The id is checked before any flag changes, so a failed call leaves
    /// the list as it was.
    pub fn set_default_address(&mut self, address_id: AddressId) -> Result<(), AddressError> {
        if self.get_address(address_id).is_none() {
            return Err(AddressError::AddressNotFound { address_id });
        }

        for address in &mut self.addresses {
            address.is_default = address.id == address_id;
        }
        Ok(())
    }
}
