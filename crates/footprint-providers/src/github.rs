//! Public GitHub profile lookups.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use footprint_core::{is_valid_username, ProfileFetch, ProfileSummary, ProviderError, ProviderResult};
use url::Url;

use crate::config::ProviderConfig;
use crate::error::{base_url, build_client, provider_transport, ClientError};

const NOREPLY_SUFFIX: &str = "noreply.github.com";

#[derive(Debug, Deserialize)]
struct UserResponse {
    #[serde(default)]
    public_repos: u32,
}

/// [`ProfileFetch`] over the GitHub REST API.
///
/// Repository count comes from `/users/{name}`; commit-email exposure is
/// inferred from author emails in the user's recent public push events.
#[derive(Debug, Clone)]
pub struct GithubProfiles {
    client: reqwest::Client,
    api_url: Url,
    token: Option<String>,
}

impl GithubProfiles {
    pub fn new(config: &ProviderConfig) -> Result<Self, ClientError> {
        Ok(Self {
            client: build_client(config.timeout, &config.user_agent)?,
            api_url: base_url("GITHUB_API_URL", &config.github_api_url)?,
            token: config.github_token.clone(),
        })
    }

    /// `{api}/users/{username}/{tail..}` with the username as one encoded
    /// path segment.
    fn user_url(&self, username: &str, tail: &[&str]) -> ProviderResult<Url> {
        if !is_valid_username(username) {
            return Err(ProviderError::InvalidInput(format!(
                "not a GitHub username: {username:?}"
            )));
        }
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProviderError::InvalidInput("GitHub API URL has no path".to_string()))?
            .pop_if_empty()
            .push("users")
            .push(username)
            .extend(tail);
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> ProviderResult<reqwest::Response> {
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(provider_transport)?;
        if !response.status().is_success() {
            return Err(ProviderError::Status {
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl ProfileFetch for GithubProfiles {
    async fn fetch(&self, username: &str) -> ProviderResult<ProfileSummary> {
        let profile_url = self.user_url(username, &[])?;
        let mut events_url = self.user_url(username, &["events", "public"])?;
        events_url.query_pairs_mut().append_pair("per_page", "100");

        let user: UserResponse = self
            .get_json(profile_url)
            .await?
            .json()
            .await
            .map_err(provider_transport)?;

        // Event history is best-effort; the profile alone is still evidence.
        let commit_email_exposed = match self.get_json(events_url).await {
            Ok(response) => match response.json::<Vec<Value>>().await {
                Ok(events) => commit_email_exposed(&events),
                Err(e) => {
                    debug!(error = %e, "unreadable GitHub event feed");
                    false
                }
            },
            Err(e) => {
                debug!(error = %e, "GitHub event feed unavailable");
                false
            }
        };

        Ok(ProfileSummary {
            public_repo_count: user.public_repos,
            commit_email_exposed,
        })
    }
}

/// Whether any push event carries a commit authored with a real address.
pub fn commit_email_exposed(events: &[Value]) -> bool {
    events
        .iter()
        .filter(|e| e["type"] == "PushEvent")
        .flat_map(|e| {
            e["payload"]["commits"]
                .as_array()
                .map(|c| c.as_slice())
                .unwrap_or_default()
        })
        .filter_map(|commit| commit["author"]["email"].as_str())
        .any(|email| email.contains('@') && !email.ends_with(NOREPLY_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_real_commit_email_is_exposed() {
        let events = vec![
            json!({"type": "WatchEvent"}),
            json!({"type": "PushEvent", "payload": {"commits": [
                {"author": {"email": "12345+octo@users.noreply.github.com"}},
                {"author": {"email": "octo@example.com"}}
            ]}}),
        ];
        assert!(commit_email_exposed(&events));
    }

    #[test]
    fn test_noreply_only_is_not_exposed() {
        let events = vec![json!({"type": "PushEvent", "payload": {"commits": [
            {"author": {"email": "octo@users.noreply.github.com"}}
        ]}})];
        assert!(!commit_email_exposed(&events));
        assert!(!commit_email_exposed(&[]));
    }

    fn profiles(api_url: &str) -> GithubProfiles {
        GithubProfiles::new(&ProviderConfig {
            github_api_url: api_url.to_string(),
            ..ProviderConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_user_url_keeps_base_path() {
        let github = profiles("https://ghe.example.com/api/v3/");
        let url = github.user_url("mona-lisa", &["events", "public"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://ghe.example.com/api/v3/users/mona-lisa/events/public"
        );
    }

    #[test]
    fn test_user_url_refuses_path_and_query_escapes() {
        let github = profiles("https://api.github.com");
        for bad in ["..", "a?b", "a#b", "a/b", "x&per_page=1"] {
            assert!(
                matches!(github.user_url(bad, &[]), Err(ProviderError::InvalidInput(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let err = GithubProfiles::new(&ProviderConfig {
            github_api_url: "not a url".to_string(),
            ..ProviderConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl { key: "GITHUB_API_URL", .. }));
    }

    #[test]
    fn test_user_response_defaults_repos() {
        let user: UserResponse = serde_json::from_str(r#"{"login": "octo"}"#).unwrap();
        assert_eq!(user.public_repos, 0);
    }
}
