//! services/api/src/adapters/memory.rs
//!
//! An in-memory implementation of the `CredentialStore` port, used when no
//! DATABASE_URL is configured and throughout the test suites. The write
//! lock around the map is what makes `conditional_update` atomic here:
//! predicate evaluation and mutation happen under one critical section, the
//! same guarantee the Postgres adapter gets from its row lock.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use newswatcher_core::domain::{NewAccount, UserAccount, UserId};
use newswatcher_core::ports::{CredentialStore, Mutation, Predicate, StoreError, StoreResult};

/// In-memory credential store. Keeps nothing across restarts.
#[derive(Default)]
pub struct MemoryStore {
    accounts: RwLock<HashMap<UserId, UserAccount>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>> {
        let accounts = self.accounts.read().unwrap();
        Ok(accounts
            .values()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<UserAccount>> {
        Ok(self.accounts.read().unwrap().get(&id).cloned())
    }

    async fn insert(&self, account: NewAccount) -> StoreResult<UserAccount> {
        let mut accounts = self.accounts.write().unwrap();
        // Uniqueness check and insert share the write lock, so two racing
        // registrations of the same email cannot both pass.
        if accounts
            .values()
            .any(|a| a.email.eq_ignore_ascii_case(&account.email))
        {
            return Err(StoreError::DuplicateKey);
        }
        let created = account.into_account(UserId::new(), Utc::now());
        accounts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn conditional_update(
        &self,
        id: UserId,
        predicate: &Predicate,
        mutation: &Mutation,
    ) -> StoreResult<Option<UserAccount>> {
        let mut accounts = self.accounts.write().unwrap();
        let Some(account) = accounts.get_mut(&id) else {
            return Ok(None);
        };
        if !predicate(account) {
            return Ok(None);
        }
        let before = account.clone();
        mutation(account);
        Ok(Some(before))
    }

    async fn delete_by_id(&self, id: UserId) -> StoreResult<bool> {
        Ok(self.accounts.write().unwrap().remove(&id).is_some())
    }
}
