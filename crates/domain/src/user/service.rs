//! User account service.

use common::{RecordId, UserId};
use record_store::{RecordStore, RecordStoreError, RecordStoreExt, Stored};
use serde::Deserialize;

use crate::error::DomainError;
use crate::handler::DocumentHandler;

use super::{User, UserError};

/// Request to open a new account.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
}

impl RegisterUser {
    /// Creates a registration request.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    fn validated(self) -> Result<User, UserError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(UserError::NameRequired);
        }

        let email = self.email.trim().to_lowercase();
        let valid = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !valid {
            return Err(UserError::InvalidEmail { email: self.email });
        }

        Ok(User::new(name, email))
    }
}

/// Service for user accounts.
pub struct UserService<S: RecordStore> {
    handler: DocumentHandler<S, User>,
}

impl<S: RecordStore> UserService<S> {
    /// Creates a new user service with the given record store.
    pub fn new(store: S) -> Self {
        Self {
            handler: DocumentHandler::new(store),
        }
    }

    /// Opens an account and returns the new user with its id.
    #[tracing::instrument(skip(self))]
    pub async fn register(&self, cmd: RegisterUser) -> Result<(UserId, User), DomainError> {
        let user = cmd.validated()?;
        let user_id = UserId::new();

        let stored = self
            .handler
            .store()
            .create_as_with_id(RecordId::from(user_id), &user)
            .await
            .map_err(|err| match err {
                RecordStoreError::DuplicateKey { .. } => DomainError::User(UserError::EmailTaken {
                    email: user.email.clone(),
                }),
                other => other.into(),
            })?;

        tracing::info!(%user_id, "user registered");
        Ok((user_id, stored.doc))
    }

    /// Loads a user, failing if the account does not exist.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, user_id: UserId) -> Result<User, DomainError> {
        Ok(load_user(&self.handler, user_id).await?.doc)
    }
}

/// Loads the user record for `user_id` or fails with `UserNotFound`.
pub(crate) async fn load_user<S: RecordStore>(
    handler: &DocumentHandler<S, User>,
    user_id: UserId,
) -> Result<Stored<User>, DomainError> {
    handler
        .load_by_id(RecordId::from(user_id))
        .await?
        .ok_or(DomainError::UserNotFound { user_id })
}
