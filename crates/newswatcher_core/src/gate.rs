//! crates/newswatcher_core/src/gate.rs
//!
//! The authorization checkpoint for identity-scoped requests. Binds the
//! identity a request claims (its path parameter) to the identity its token
//! actually proves, before any store access happens.

use std::sync::Arc;

use crate::domain::UserId;
use crate::session::{AuthError, SessionManager};

/// Cross-cutting authorization check run ahead of every identity-scoped
/// operation, reads and mutations alike.
#[derive(Clone)]
pub struct RequestGate {
    sessions: Arc<SessionManager>,
}

impl RequestGate {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self { sessions }
    }

    /// Verify `token` and require its subject to equal `claimed`.
    ///
    /// A valid token for user A replayed against user B's resource path
    /// fails with [`AuthError::Forbidden`]; the mismatch is never silently
    /// corrected to the token's subject.
    pub fn authorize(&self, claimed: UserId, token: &str) -> Result<UserId, AuthError> {
        let subject = self.sessions.verify(token)?;
        if subject != claimed {
            return Err(AuthError::Forbidden);
        }
        Ok(subject)
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }
}
