//! crates/newswatcher_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format
//! beyond the serde derives needed to persist an account as one document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The number of stories a user may keep in their saved folder.
pub const SAVED_STORY_LIMIT: usize = 30;

/// Opaque account identity, assigned by the store at insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Per-account boolean preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub require_wifi: bool,
    pub enable_alerts: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            require_wifi: true,
            enable_alerts: false,
        }
    }
}

/// A reference to an external news story, saved into a user's folder.
///
/// `story_id` is the uniqueness key within the saved set; the descriptive
/// fields are immutable once saved. `date` is epoch milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryRef {
    #[serde(rename = "storyID")]
    pub story_id: String,
    pub title: String,
    pub source: String,
    pub link: String,
    pub image_url: String,
    pub content_snippet: String,
    pub date: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<String>,
    pub keep: bool,
}

/// A keyword filter a user subscribes to, with its matched stories.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsFilter {
    pub name: String,
    pub key_words: Vec<String>,
    pub enable_alert: bool,
    pub alert_frequency: u32,
    pub enable_auto_delete: bool,
    pub delete_time: i64,
    pub time_of_last_scan: i64,
    pub news_stories: Vec<StoryRef>,
}

impl NewsFilter {
    /// The filter every new account starts with.
    pub fn default_technology_filter() -> Self {
        Self {
            name: "Technology Companies".to_string(),
            key_words: ["Apple", "Microsoft", "IBM", "Amazon", "Google", "Intel"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            enable_alert: false,
            alert_frequency: 0,
            enable_auto_delete: false,
            delete_time: 0,
            time_of_last_scan: 0,
            news_stories: Vec::new(),
        }
    }
}

/// A user account, stored whole as a single document under its id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub settings: Settings,
    pub news_filters: Vec<NewsFilter>,
    pub saved_stories: Vec<StoryRef>,
}

impl UserAccount {
    pub fn has_saved_story(&self, story_id: &str) -> bool {
        self.saved_stories.iter().any(|s| s.story_id == story_id)
    }

    /// The non-sensitive projection returned to clients.
    pub fn profile(&self) -> Profile {
        Profile {
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            date: self.created_at,
            settings: self.settings.clone(),
            news_filters: self.news_filters.clone(),
            saved_stories: self.saved_stories.clone(),
        }
    }
}

/// The fields a registration provides; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
}

impl NewAccount {
    /// Builds the full account document a fresh registration produces:
    /// default settings, the seeded technology filter, empty saved folder.
    pub fn into_account(self, id: UserId, created_at: DateTime<Utc>) -> UserAccount {
        UserAccount {
            id,
            email: self.email,
            display_name: self.display_name,
            password_hash: self.password_hash,
            created_at,
            settings: Settings::default(),
            news_filters: vec![NewsFilter::default_technology_filter()],
            saved_stories: Vec::new(),
        }
    }
}

/// What a profile fetch returns. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub email: String,
    pub display_name: String,
    pub date: DateTime<Utc>,
    pub settings: Settings,
    pub news_filters: Vec<NewsFilter>,
    pub saved_stories: Vec<StoryRef>,
}
