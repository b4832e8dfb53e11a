use footprint_core::{EngineError, ProviderError};
use url::Url;

/// Errors raised while constructing HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),

    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),

    #[error("invalid base URL in {key}: {value}")]
    InvalidUrl { key: &'static str, value: String },
}

impl From<ClientError> for EngineError {
    fn from(err: ClientError) -> Self {
        EngineError::NotConfigured(err.to_string())
    }
}

pub(crate) fn provider_transport(err: reqwest::Error) -> ProviderError {
    if err.is_decode() {
        ProviderError::Malformed(err.to_string())
    } else {
        ProviderError::Transport(err.to_string())
    }
}

pub(crate) fn engine_transport(err: reqwest::Error) -> EngineError {
    EngineError::Transport(err.to_string())
}

/// Parse a configured base URL that paths will be appended to.
pub(crate) fn base_url(key: &'static str, value: &str) -> Result<Url, ClientError> {
    Url::parse(value)
        .ok()
        .filter(|url| !url.cannot_be_a_base())
        .ok_or_else(|| ClientError::InvalidUrl {
            key,
            value: value.to_string(),
        })
}

pub(crate) fn build_client(
    timeout: std::time::Duration,
    user_agent: &str,
) -> Result<reqwest::Client, ClientError> {
    Ok(reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()?)
}
