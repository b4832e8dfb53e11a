//! Username reuse detection by probing public profile URLs.

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::StatusCode;
use tracing::debug;

use footprint_core::{
    is_valid_username, ProviderError, ProviderResult, ReuseFindings, UsernameReuseCheck,
};
use url::form_urlencoded::byte_serialize;
use url::Url;

use crate::config::ProviderConfig;
use crate::error::{build_client, ClientError};

/// A platform and its public profile URL template (`{}` is the username).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub name: String,
    pub url_template: String,
}

impl Platform {
    pub fn new(name: &str, url_template: &str) -> Self {
        Self {
            name: name.to_string(),
            url_template: url_template.to_string(),
        }
    }

    /// Profile URL for a valid username, percent-encoded into the template.
    pub fn profile_url(&self, username: &str) -> Option<Url> {
        if !is_valid_username(username) {
            return None;
        }
        let encoded: String = byte_serialize(username.as_bytes()).collect();
        Url::parse(&self.url_template.replace("{}", &encoded)).ok()
    }
}

pub fn default_platforms() -> Vec<Platform> {
    vec![
        Platform::new("GitHub", "https://github.com/{}"),
        Platform::new("GitLab", "https://gitlab.com/{}"),
        Platform::new("Reddit", "https://www.reddit.com/user/{}"),
        Platform::new("Dev.to", "https://dev.to/{}"),
        Platform::new("Medium", "https://medium.com/@{}"),
        Platform::new("Keybase", "https://keybase.io/{}"),
        Platform::new("Hacker News", "https://news.ycombinator.com/user?id={}"),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    Present,
    Absent,
    Failed,
}

#[derive(Debug, Clone)]
pub struct ProfileProbe {
    client: reqwest::Client,
    platforms: Vec<Platform>,
}

impl ProfileProbe {
    pub fn new(config: &ProviderConfig) -> Result<Self, ClientError> {
        Ok(Self {
            client: build_client(config.timeout, &config.user_agent)?,
            platforms: default_platforms(),
        })
    }

    pub fn with_platforms(mut self, platforms: Vec<Platform>) -> Self {
        self.platforms = platforms;
        self
    }

    async fn probe(&self, platform: &Platform, username: &str) -> Probe {
        let Some(url) = platform.profile_url(username) else {
            debug!(platform = %platform.name, "unusable profile URL template");
            return Probe::Failed;
        };
        match self.client.get(url).send().await {
            Ok(response) => classify(response.status()),
            Err(e) => {
                debug!(platform = %platform.name, error = %e, "profile probe failed");
                Probe::Failed
            }
        }
    }
}

fn classify(status: StatusCode) -> Probe {
    if status.is_success() {
        Probe::Present
    } else if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
        Probe::Absent
    } else {
        Probe::Failed
    }
}

/// Fold probe results into findings; fails only when no probe answered.
fn tally(results: Vec<(&Platform, Probe)>) -> ProviderResult<ReuseFindings> {
    if !results.is_empty() && results.iter().all(|(_, p)| *p == Probe::Failed) {
        return Err(ProviderError::Transport(
            "no platform could be probed".to_string(),
        ));
    }
    let platforms: Vec<String> = results
        .into_iter()
        .filter(|(_, p)| *p == Probe::Present)
        .map(|(platform, _)| platform.name.clone())
        .collect();
    Ok(ReuseFindings {
        reuse_count: platforms.len() as u32,
        platforms,
    })
}

#[async_trait]
impl UsernameReuseCheck for ProfileProbe {
    async fn check(&self, username: &str) -> ProviderResult<ReuseFindings> {
        if !is_valid_username(username) {
            return Err(ProviderError::InvalidInput(format!(
                "unsupported username: {username:?}"
            )));
        }
        let probes = self
            .platforms
            .iter()
            .map(|platform| async move { (platform, self.probe(platform, username).await) });
        tally(join_all(probes).await)
    }
}
