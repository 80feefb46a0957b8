//! User manager implementation.

use std::sync::Arc;

use log::info;
use validator::ValidateEmail;

use super::{
    errors::{UserError, UserResult},
    models::{ProfileUpdate, UserStats},
};
use crate::auth::{
    Account, AccountId, AuthError, NewAccount, PasswordHasher, Role, validate_strength,
};
use crate::db::CredentialStore;

/// User manager
#[derive(Clone)]
pub struct UserManager {
    store: Arc<dyn CredentialStore>,
}

impl UserManager {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// List accounts newest first, optionally filtered by name or email substring
    pub async fn list(&self, search: Option<&str>) -> UserResult<Vec<Account>> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        Ok(self.store.list(search).await?)
    }

    pub async fn get(&self, id: AccountId) -> UserResult<Account> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    /// Apply a partial profile update
    pub async fn update_profile(&self, id: AccountId, update: ProfileUpdate) -> UserResult<Account> {
        let mut account = self.get(id).await?;

        if let Some(name) = update.name {
            account.name = Some(name);
        }
        if let Some(bio) = update.bio {
            account.bio = Some(bio);
        }
        if let Some(image) = update.image {
            account.image = Some(image);
        }

        self.store.save(&account).await?;
        Ok(account)
    }

    /// Change an account's role
    ///
    /// # Errors
    ///
    /// * `UserError::NotFound` - No such account
    /// * `UserError::LastAdmin` - Would demote the only administrator
    pub async fn update_role(&self, id: AccountId, role: Role) -> UserResult<Account> {
        let mut account = self.get(id).await?;

        if account.role == role {
            return Ok(account);
        }

        if account.role == Role::Admin && self.store.count_by_role(Role::Admin).await? <= 1 {
            return Err(UserError::LastAdmin);
        }

        account.role = role;
        self.store.save(&account).await?;

        info!("Account {} role changed to {}", account.email, role);
        Ok(account)
    }

    /// Delete an account on behalf of `acting_id`
    ///
    /// # Errors
    ///
    /// * `UserError::NotFound` - No such account
    /// * `UserError::SelfDeletion` - `id` is the acting account
    /// * `UserError::LastAdmin` - Would delete the only administrator
    pub async fn delete(&self, id: AccountId, acting_id: AccountId) -> UserResult<()> {
        let account = self.get(id).await?;

        if account.id == acting_id {
            return Err(UserError::SelfDeletion);
        }

        if account.role == Role::Admin && self.store.count_by_role(Role::Admin).await? <= 1 {
            return Err(UserError::LastAdmin);
        }

        if !self.store.delete(id).await? {
            return Err(UserError::NotFound(id));
        }

        info!("Account {} deleted by account {}", account.email, acting_id);
        Ok(())
    }

    pub async fn stats(&self) -> UserResult<UserStats> {
        let total = self.store.count().await?;
        let admins = self.store.count_by_role(Role::Admin).await?;

        Ok(UserStats {
            total,
            admins,
            regular_users: total - admins,
        })
    }

    /// Make sure an administrator exists.
    ///
    /// Does nothing when any admin is already present. Otherwise promotes the
    /// account registered under `email`, or creates it with `password`.
    /// Returns the account that was created or promoted.
    pub async fn ensure_admin(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
        hasher: &PasswordHasher,
    ) -> UserResult<Option<Account>> {
        if self.store.count_by_role(Role::Admin).await? > 0 {
            return Ok(None);
        }

        if let Some(mut account) = self.store.find_by_email(email).await? {
            account.role = Role::Admin;
            self.store.save(&account).await?;
            info!("Promoted existing account {} to administrator", account.email);
            return Ok(Some(account));
        }

        if !email.validate_email() {
            return Err(AuthError::InvalidEmail.into());
        }
        validate_strength(password)?;

        let account = self
            .store
            .insert(NewAccount {
                email: email.to_string(),
                password_hash: hasher.hash(password)?,
                name: name.map(str::to_string),
                role: Role::Admin,
            })
            .await?;

        info!("Created bootstrap administrator {}", account.email);
        Ok(Some(account))
    }
}
