//! Input normalization.
//!
//! Runs before any provider or judgment call; a request that fails here never
//! starts a workflow.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{NormalizedInput, ScanRequest, ValidationError};

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
            .expect("email pattern is a valid regex")
    })
}

fn username_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]{0,38}$").expect("username pattern is a valid regex")
    })
}

/// Whether a bare username is safe to use as a single URL path segment or
/// query value: starts alphanumeric, at most 39 characters of
/// `[A-Za-z0-9_.-]`, never a `..` run.
pub fn is_valid_username(username: &str) -> bool {
    username_pattern().is_match(username) && !username.contains("..")
}

fn validate_username(username: String) -> Result<String, ValidationError> {
    if is_valid_username(&username) {
        Ok(username)
    } else {
        Err(ValidationError::InvalidUsername { value: username })
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Reduce a handle to a bare username.
///
/// `" @octocat "` → `octocat`; `https://github.com/octocat/` → `octocat`.
/// Returns `None` when nothing usable remains.
pub fn normalize_username(raw: &str) -> Option<String> {
    let mut handle = raw.trim();
    if handle.contains('/') {
        handle = handle
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default();
    }
    let handle = handle.trim().trim_start_matches('@').trim();
    if handle.is_empty() {
        None
    } else {
        Some(handle.to_string())
    }
}

/// Validate and trim an email address.
pub fn normalize_email(raw: &str) -> Result<String, ValidationError> {
    let email = raw.trim();
    if email_pattern().is_match(email) {
        Ok(email.to_string())
    } else {
        Err(ValidationError::InvalidEmail {
            value: email.to_string(),
        })
    }
}

/// Sanitize raw request fields into [`NormalizedInput`].
///
/// The first comma-separated social handle stands in for the username only
/// when no explicit GitHub username was supplied.
pub fn normalize_request(request: &ScanRequest) -> Result<NormalizedInput, ValidationError> {
    if request.is_empty() {
        return Err(ValidationError::NoIdentityHints);
    }

    let username = match non_blank(request.github_username.as_deref()) {
        Some(explicit) => normalize_username(explicit),
        None => non_blank(request.social_handles.as_deref()).and_then(|handles| {
            handles
                .split(',')
                .map(str::trim)
                .find(|h| !h.is_empty())
                .and_then(normalize_username)
        }),
    }
    .map(validate_username)
    .transpose()?;

    let email = non_blank(request.email.as_deref())
        .map(normalize_email)
        .transpose()?;

    let name = non_blank(request.full_name.as_deref()).map(str::to_string);

    NormalizedInput::new(username, email, name)
}
