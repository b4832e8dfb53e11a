//! Capability-provider contracts.
//!
//! Each provider answers one question about one identity hint. Providers may
//! fail independently; the gatherer turns any failure into an annotated
//! evidence record.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::ProviderError;

/// Result type for provider calls.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Breach-database hit summary for an email address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreachFindings {
    pub found: bool,
    pub sources: Vec<String>,
}

/// Public profile summary for a username.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub public_repo_count: u32,
    pub commit_email_exposed: bool,
}

/// Platforms on which a username is registered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReuseFindings {
    pub reuse_count: u32,
    pub platforms: Vec<String>,
}

#[async_trait]
pub trait BreachLookup: Send + Sync {
    async fn lookup(&self, email: &str) -> ProviderResult<BreachFindings>;
}

#[async_trait]
pub trait ProfileFetch: Send + Sync {
    async fn fetch(&self, username: &str) -> ProviderResult<ProfileSummary>;
}

#[async_trait]
pub trait UsernameReuseCheck: Send + Sync {
    async fn check(&self, username: &str) -> ProviderResult<ReuseFindings>;
}

/// Human-readable descriptor for the tools-status surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub status: &'static str,
    pub description: &'static str,
}

/// Static list of capability providers known to the service.
pub fn tool_catalog() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "GitHub API",
            status: "operational",
            description: "Fetches public GitHub profile data",
        },
        ToolDescriptor {
            name: "LeakCheck",
            status: "operational",
            description: "Checks email addresses against breach databases",
        },
        ToolDescriptor {
            name: "Username Reuse Detection",
            status: "operational",
            description: "Checks username presence across multiple platforms",
        },
    ]
}
