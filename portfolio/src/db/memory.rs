//! In-process credential store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{CredentialStore, StoreError, StoreResult};
use crate::auth::{Account, AccountId, NewAccount, Role};

#[derive(Default)]
struct Inner {
    accounts: HashMap<AccountId, Account>,
    next_id: AccountId,
}

/// `CredentialStore` kept in memory. Used by tests and `pf_server --memory`.
#[derive(Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Inner>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let inner = self.inner.read().await;
        Ok(inner
            .accounts
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: AccountId) -> StoreResult<Option<Account>> {
        Ok(self.inner.read().await.accounts.get(&id).cloned())
    }

    async fn insert(&self, account: NewAccount) -> StoreResult<Account> {
        let mut inner = self.inner.write().await;

        if inner.accounts.values().any(|a| a.email == account.email) {
            return Err(StoreError::DuplicateEmail);
        }

        inner.next_id += 1;
        let created = Account {
            id: inner.next_id,
            email: account.email,
            password_hash: account.password_hash,
            name: account.name,
            bio: None,
            image: None,
            role: account.role,
            failed_attempts: 0,
            locked_until: None,
            created_at: Utc::now(),
        };

        inner.accounts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn save(&self, account: &Account) -> StoreResult<()> {
        let mut inner = self.inner.write().await;

        if inner
            .accounts
            .values()
            .any(|a| a.id != account.id && a.email == account.email)
        {
            return Err(StoreError::DuplicateEmail);
        }

        // UPDATE semantics: saving a deleted account is a no-op
        if let Some(existing) = inner.accounts.get_mut(&account.id) {
            *existing = account.clone();
        }
        Ok(())
    }

    async fn count_by_role(&self, role: Role) -> StoreResult<i64> {
        let inner = self.inner.read().await;
        Ok(inner.accounts.values().filter(|a| a.role == role).count() as i64)
    }

    async fn count(&self) -> StoreResult<i64> {
        Ok(self.inner.read().await.accounts.len() as i64)
    }

    async fn list(&self, search: Option<&str>) -> StoreResult<Vec<Account>> {
        let inner = self.inner.read().await;

        let mut accounts: Vec<Account> = inner
            .accounts
            .values()
            .filter(|a| match search {
                Some(term) => {
                    a.email.contains(term)
                        || a.name.as_deref().is_some_and(|name| name.contains(term))
                }
                None => true,
            })
            .cloned()
            .collect();

        accounts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(accounts)
    }

    async fn delete(&self, id: AccountId) -> StoreResult<bool> {
        Ok(self.inner.write().await.accounts.remove(&id).is_some())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
