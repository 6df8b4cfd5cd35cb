//! crates/newswatcher_core/src/mutator.rs
//!
//! Translates high-level account operations into predicate+mutation pairs
//! for the store's atomic conditional update, and translates a no-match
//! result back into the right domain error. This is compare-and-swap at
//! document granularity: the store serializes concurrent writers, the
//! mutator never holds a lock and never retries on its own.

use std::sync::Arc;

use crate::domain::{Profile, StoryRef, UserAccount, UserId, SAVED_STORY_LIMIT};
use crate::ports::{CredentialStore, StoreError};

/// Errors produced by account mutations.
#[derive(Debug, thiserror::Error)]
pub enum MutateError {
    /// The story was already saved, or the saved folder is at capacity.
    /// The two causes are deliberately not distinguished here; doing so
    /// would take a second read, and callers that care can re-fetch.
    #[error("Over the save limit, or story already saved")]
    SaveRejected,
    /// The account no longer exists.
    #[error("Account not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The two successful endings of a delete, distinguished so a racing second
/// delete reports "already gone" instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    AlreadyDeleted,
}

/// Performs conditional, idempotent-safe mutations on a user's account
/// document through the [`CredentialStore`] port.
#[derive(Clone)]
pub struct ResourceMutator {
    store: Arc<dyn CredentialStore>,
}

impl ResourceMutator {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Save a story into the user's folder.
    ///
    /// The predicate requires the story to be absent and the folder below
    /// its capacity; both checks and the append happen inside one atomic
    /// store operation, so two racing saves of the same story can never
    /// both succeed and the folder can never exceed its bound.
    ///
    /// Returns the pre-update document. A no-match becomes
    /// [`MutateError::SaveRejected`]; retrying an identical request is safe
    /// for the duplicate case but will never succeed for the capacity case
    /// without a removal first.
    pub async fn add_saved_story(
        &self,
        user_id: UserId,
        story: StoryRef,
    ) -> Result<UserAccount, MutateError> {
        let story_id = story.story_id.clone();
        let before = self
            .store
            .conditional_update(
                user_id,
                &move |acct| {
                    !acct.has_saved_story(&story_id)
                        && acct.saved_stories.len() < SAVED_STORY_LIMIT
                },
                &move |acct| acct.saved_stories.push(story.clone()),
            )
            .await?;
        before.ok_or(MutateError::SaveRejected)
    }

    /// Remove a story from the user's folder.
    ///
    /// Removal is idempotent: the mutation drops any entry with a matching
    /// id and removing an absent story is a successful no-op. Only a missing
    /// account is an error.
    pub async fn remove_saved_story(
        &self,
        user_id: UserId,
        story_id: &str,
    ) -> Result<UserAccount, MutateError> {
        let story_id = story_id.to_string();
        let before = self
            .store
            .conditional_update(
                user_id,
                &|_acct| true,
                &move |acct| acct.saved_stories.retain(|s| s.story_id != story_id),
            )
            .await?;
        before.ok_or(MutateError::NotFound)
    }

    /// Permanently delete the account.
    ///
    /// Not retried: a delete racing a concurrent delete sees no match the
    /// second time and reports [`DeleteOutcome::AlreadyDeleted`].
    pub async fn delete_account(&self, user_id: UserId) -> Result<DeleteOutcome, MutateError> {
        let deleted = self.store.delete_by_id(user_id).await?;
        Ok(if deleted {
            DeleteOutcome::Deleted
        } else {
            DeleteOutcome::AlreadyDeleted
        })
    }

    /// Fetch the account's non-sensitive projection.
    pub async fn fetch_profile(&self, user_id: UserId) -> Result<Profile, MutateError> {
        let account = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(MutateError::NotFound)?;
        Ok(account.profile())
    }
}
