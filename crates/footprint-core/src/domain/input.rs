//! Inbound scan request and its normalized form.

use serde::{Deserialize, Serialize};

use crate::domain::error::ValidationError;

/// Raw identity hints as received from a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    #[serde(default)]
    pub github_username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Comma-separated handles, e.g. `"@octo, octo_dev"`.
    #[serde(default)]
    pub social_handles: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl ScanRequest {
    /// True when every hint is absent or blank.
    pub fn is_empty(&self) -> bool {
        [
            &self.github_username,
            &self.email,
            &self.social_handles,
            &self.full_name,
        ]
        .iter()
        .all(|field| field.as_deref().map(str::trim).unwrap_or("").is_empty())
    }
}

/// Canonical identity hints. At least one field is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl NormalizedInput {
    /// Build from already-sanitized fields.
    ///
    /// Returns [`ValidationError::NoIdentityHints`] when all three are `None`.
    pub fn new(
        username: Option<String>,
        email: Option<String>,
        name: Option<String>,
    ) -> Result<Self, ValidationError> {
        if username.is_none() && email.is_none() && name.is_none() {
            return Err(ValidationError::NoIdentityHints);
        }
        Ok(Self {
            username,
            email,
            name,
        })
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
