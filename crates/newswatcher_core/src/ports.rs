//! crates/newswatcher_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of the concrete document store behind it.

use async_trait::async_trait;

use crate::domain::{NewAccount, UserAccount, UserId};

//=========================================================================================
// Store Error and Result Types
//=========================================================================================

/// Errors surfaced by the credential store.
///
/// The core never retries these internally; retry policy is a caller
/// decision, because a blind retry of a non-idempotent mutation could mask
/// a legitimate rejection as a transient fault.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An insert collided with an already-registered email.
    #[error("Email account already registered")]
    DuplicateKey,
    /// The store could not be reached or the operation was not acknowledged.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    /// A catch-all for anything else the backend reports.
    #[error("An unexpected store error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

//=========================================================================================
// Credential Store Port
//=========================================================================================

/// Predicate evaluated against the current document by `conditional_update`.
pub type Predicate = dyn Fn(&UserAccount) -> bool + Send + Sync;

/// Mutation applied by `conditional_update` when the predicate holds.
pub type Mutation = dyn Fn(&mut UserAccount) + Send + Sync;

/// A key-addressed repository of account documents with a single atomic
/// read-modify-write primitive. All cross-request mutable state lives behind
/// this trait; the core holds no locks of its own.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up an account by email, compared case-insensitively.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>>;

    /// Look up an account by id.
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<UserAccount>>;

    /// Create an account, assigning its id. Fails with
    /// [`StoreError::DuplicateKey`] when the email is already registered.
    async fn insert(&self, account: NewAccount) -> StoreResult<UserAccount>;

    /// Atomically apply `mutation` to the document under `id` if `predicate`
    /// holds against its current state.
    ///
    /// Returns the pre-mutation document on success, or `None` when the
    /// document is missing or the predicate failed. Concurrent calls against
    /// the same document are serialized by the store; this is the single
    /// point of concurrency control.
    async fn conditional_update(
        &self,
        id: UserId,
        predicate: &Predicate,
        mutation: &Mutation,
    ) -> StoreResult<Option<UserAccount>>;

    /// Permanently delete the account. Returns `false` when no document
    /// matched, so a delete racing a concurrent delete is observable rather
    /// than an error.
    async fn delete_by_id(&self, id: UserId) -> StoreResult<bool>;
}
