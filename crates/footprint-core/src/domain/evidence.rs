//! Evidence records produced by the gatherer.
//!
//! Every selected task yields a record, even when its provider failed. A
//! failed record carries null/zero business fields and an `error` annotation,
//! so downstream stages always see the same shape.

use serde::{Deserialize, Serialize};

/// Domain key under which a record is stored in the bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceDomain {
    Email,
    Github,
    Username,
}

impl std::fmt::Display for EvidenceDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EvidenceDomain::Email => "email",
            EvidenceDomain::Github => "github",
            EvidenceDomain::Username => "username",
        };
        write!(f, "{s}")
    }
}

/// Breach-database outcome for an email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailEvidence {
    pub value: String,
    pub found_in_breaches: Option<bool>,
    #[serde(default)]
    pub breach_sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EmailEvidence {
    pub fn failed(value: &str, error: impl std::fmt::Display) -> Self {
        Self {
            value: value.to_string(),
            found_in_breaches: None,
            breach_sources: Vec::new(),
            error: Some(error.to_string()),
        }
    }

    /// Number of distinct breaches, or zero when not found.
    pub fn breach_count(&self) -> usize {
        if self.found_in_breaches == Some(true) {
            self.breach_sources.len()
        } else {
            0
        }
    }
}

/// Public GitHub profile outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubEvidence {
    pub username: String,
    pub public_repos: Option<u32>,
    pub commit_email_exposed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GithubEvidence {
    pub fn failed(username: &str, error: impl std::fmt::Display) -> Self {
        Self {
            username: username.to_string(),
            public_repos: None,
            commit_email_exposed: None,
            error: Some(error.to_string()),
        }
    }
}

/// Cross-platform username reuse outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsernameEvidence {
    pub value: String,
    #[serde(default)]
    pub reuse_count: u32,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UsernameEvidence {
    pub fn failed(value: &str, error: impl std::fmt::Display) -> Self {
        Self {
            value: value.to_string(),
            reuse_count: 0,
            platforms: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

/// Outcome of one capability-provider task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvidenceRecord {
    Email(EmailEvidence),
    Github(GithubEvidence),
    Username(UsernameEvidence),
}

impl EvidenceRecord {
    pub fn domain(&self) -> EvidenceDomain {
        match self {
            EvidenceRecord::Email(_) => EvidenceDomain::Email,
            EvidenceRecord::Github(_) => EvidenceDomain::Github,
            EvidenceRecord::Username(_) => EvidenceDomain::Username,
        }
    }

    /// Provider error annotation, if the call failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            EvidenceRecord::Email(e) => e.error.as_deref(),
            EvidenceRecord::Github(g) => g.error.as_deref(),
            EvidenceRecord::Username(u) => u.error.as_deref(),
        }
    }
}

/// Evidence keyed by domain. Serializes as `{"email": …, "github": …, "username": …}`
/// with absent domains omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceBundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailEvidence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<GithubEvidence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<UsernameEvidence>,
}

impl EvidenceBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `record` under its domain, replacing any previous entry.
    pub fn insert(&mut self, record: EvidenceRecord) {
        match record {
            EvidenceRecord::Email(e) => self.email = Some(e),
            EvidenceRecord::Github(g) => self.github = Some(g),
            EvidenceRecord::Username(u) => self.username = Some(u),
        }
    }

    pub fn contains(&self, domain: EvidenceDomain) -> bool {
        match domain {
            EvidenceDomain::Email => self.email.is_some(),
            EvidenceDomain::Github => self.github.is_some(),
            EvidenceDomain::Username => self.username.is_some(),
        }
    }

    /// Domains present, in canonical order.
    pub fn domains(&self) -> Vec<EvidenceDomain> {
        [
            EvidenceDomain::Email,
            EvidenceDomain::Github,
            EvidenceDomain::Username,
        ]
        .into_iter()
        .filter(|d| self.contains(*d))
        .collect()
    }

    pub fn len(&self) -> usize {
        self.domains().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Domains whose provider call failed, with the error annotation.
    pub fn failures(&self) -> Vec<(EvidenceDomain, &str)> {
        let mut out = Vec::new();
        if let Some(err) = self.email.as_ref().and_then(|e| e.error.as_deref()) {
            out.push((EvidenceDomain::Email, err));
        }
        if let Some(err) = self.github.as_ref().and_then(|g| g.error.as_deref()) {
            out.push((EvidenceDomain::Github, err));
        }
        if let Some(err) = self.username.as_ref().and_then(|u| u.error.as_deref()) {
            out.push((EvidenceDomain::Username, err));
        }
        out
    }
}
