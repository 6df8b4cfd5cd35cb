//! services/api/src/validate.rs
//!
//! Boundary validation for request payloads. Runs before the core engine is
//! invoked; a request that fails here never touches the store.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::ApiError;
use crate::web::users::{RegisterRequest, SaveStoryRequest};

const PASSWORD_SPECIALS: &str = "!@#$%^&*";

fn email_re() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles")
    })
}

/// Validate a registration payload: display name 3 to 50 alphanumeric
/// characters, a plausible email of 7 to 50 characters, and a password of
/// 7 to 15 characters over `[a-zA-Z0-9!@#$%^&*]` containing at least one
/// digit and one special character.
pub fn registration(req: &RegisterRequest) -> Result<(), ApiError> {
    let name_ok = (3..=50).contains(&req.display_name.chars().count())
        && req.display_name.chars().all(|c| c.is_ascii_alphanumeric());
    let email_ok =
        (7..=50).contains(&req.email.chars().count()) && email_re().is_match(&req.email);
    if name_ok && email_ok && password_ok(&req.password) {
        Ok(())
    } else {
        Err(ApiError::Validation(
            "Invalid field: display name 3 to 50 alphanumeric, valid email, \
             password 7 to 15 (one number, one special character)"
                .to_string(),
        ))
    }
}

fn password_ok(password: &str) -> bool {
    let allowed = |c: char| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c);
    (7..=15).contains(&password.chars().count())
        && password.chars().all(allowed)
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(c))
}

/// Validate a save-story payload against the story field bounds.
pub fn story(req: &SaveStoryRequest) -> Result<(), ApiError> {
    let required = [
        (&req.story_id, 100usize, "storyID"),
        (&req.title, 200, "title"),
        (&req.source, 50, "source"),
        (&req.link, 300, "link"),
        (&req.image_url, 300, "imageUrl"),
        (&req.content_snippet, 300, "contentSnippet"),
    ];
    for (value, max, field) in required {
        if value.is_empty() || value.chars().count() > max {
            return Err(ApiError::Validation(format!(
                "Invalid field: {} must be 1 to {} characters",
                field, max
            )));
        }
    }
    if let Some(hours) = &req.hours {
        if hours.chars().count() > 20 {
            return Err(ApiError::Validation(
                "Invalid field: hours must be at most 20 characters".to_string(),
            ));
        }
    }
    Ok(())
}
