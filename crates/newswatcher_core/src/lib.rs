pub mod domain;
pub mod gate;
pub mod mutator;
pub mod ports;
pub mod session;

pub use domain::{
    NewAccount, NewsFilter, Profile, Settings, StoryRef, UserAccount, UserId, SAVED_STORY_LIMIT,
};
pub use gate::RequestGate;
pub use mutator::{DeleteOutcome, MutateError, ResourceMutator};
pub use ports::{CredentialStore, StoreError, StoreResult};
pub use session::{AuthError, SessionManager};
