//! Address service operating on a user's address book.

use common::{AddressId, UserId};
use record_store::RecordStore;

use crate::error::DomainError;
use crate::handler::DocumentHandler;
use crate::user::{User, load_user};

use super::{Address, AddressError, AddressInput};

/// Service for managing the addresses stored on a user record.
pub struct AddressService<S: RecordStore> {
    handler: DocumentHandler<S, User>,
}

impl<S: RecordStore> AddressService<S> {
    /// Creates a new address service with the given record store.
    pub fn new(store: S) -> Self {
        Self {
            handler: DocumentHandler::new(store),
        }
    }

    /// Returns the user's addresses as stored.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Address>, DomainError> {
        let user = load_user(&self.handler, user_id).await?;
        Ok(user.doc.addresses().to_vec())
    }

    /// Appends an address and returns the full list.
    #[tracing::instrument(skip(self, input))]
    pub async fn add(
        &self,
        user_id: UserId,
        input: AddressInput,
    ) -> Result<Vec<Address>, DomainError> {
        metrics::counter!("address_operations_total", "operation" => "add").increment(1);

        let user = load_user(&self.handler, user_id).await?;
        let result = self
            .handler
            .execute(user, |user| user.add_address(input).map(|a| a.id))
            .await?;

        tracing::debug!(address_id = %result.output, "address added");
        Ok(result.document.doc.addresses().to_vec())
    }

    /// Deletes an address and returns the remaining list.
    ///
    /// An id that matches no address is `AddressNotFound`.
    #[tracing::instrument(skip(self))]
    pub async fn delete(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<Vec<Address>, DomainError> {
        metrics::counter!("address_operations_total", "operation" => "delete").increment(1);

        let user = load_user(&self.handler, user_id).await?;
        let result = self
            .handler
            .execute(user, |user| user.remove_address(address_id))
            .await?;

        Ok(result.document.doc.addresses().to_vec())
    }

    /// Makes one address the default and returns the full list.
    #[tracing::instrument(skip(self))]
    pub async fn set_default(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<Vec<Address>, DomainError> {
        metrics::counter!("address_operations_total", "operation" => "set_default").increment(1);

        let user = load_user(&self.handler, user_id).await?;
        let result = self
            .handler
            .execute(user, |user| user.set_default_address(address_id))
            .await?;

        Ok(result.document.doc.addresses().to_vec())
    }

    /// Body-parameterized variant of [`set_default`](Self::set_default).
    ///
    /// A missing id is reported as `MissingField` before the user is loaded.
    pub async fn set_default_from(
        &self,
        user_id: UserId,
        address_id: Option<AddressId>,
    ) -> Result<Vec<Address>, DomainError> {
        let address_id = address_id.ok_or(AddressError::MissingField { field: "addressId" })?;
        self.set_default(user_id, address_id).await
    }
}
