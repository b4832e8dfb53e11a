//! Breach lookups against the LeakCheck public API.

use async_trait::async_trait;
use serde::Deserialize;

use footprint_core::{BreachFindings, BreachLookup, ProviderError, ProviderResult};

use crate::config::ProviderConfig;
use crate::error::{build_client, provider_transport, ClientError};

#[derive(Debug, Deserialize)]
struct Source {
    name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LeakcheckResponse {
    success: bool,
    #[serde(default)]
    found: u32,
    #[serde(default)]
    sources: Vec<Source>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LeakcheckBreaches {
    client: reqwest::Client,
    api_url: String,
}

impl LeakcheckBreaches {
    pub fn new(config: &ProviderConfig) -> Result<Self, ClientError> {
        Ok(Self {
            client: build_client(config.timeout, &config.user_agent)?,
            api_url: config.leakcheck_api_url.clone(),
        })
    }
}

#[async_trait]
impl BreachLookup for LeakcheckBreaches {
    async fn lookup(&self, email: &str) -> ProviderResult<BreachFindings> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[("check", email)])
            .send()
            .await
            .map_err(provider_transport)?;

        let status = response.status();
        // The public endpoint reports "not found" with a non-2xx status too.
        if !status.is_success() && status.as_u16() != 404 {
            return Err(ProviderError::Status {
                status: status.as_u16(),
            });
        }

        let body: LeakcheckResponse = response.json().await.map_err(provider_transport)?;
        findings_from(body)
    }
}

pub(crate) fn findings_from(body: LeakcheckResponse) -> ProviderResult<BreachFindings> {
    if !body.success {
        return match body.error.as_deref() {
            Some(e) if e.eq_ignore_ascii_case("not found") => Ok(BreachFindings::default()),
            Some(e) => Err(ProviderError::Malformed(e.to_string())),
            None => Err(ProviderError::Malformed("unsuccessful response".to_string())),
        };
    }

    let mut sources: Vec<String> = Vec::new();
    for source in body.sources {
        let name = source.name.trim();
        if !name.is_empty() && !sources.iter().any(|s| s == name) {
            sources.push(name.to_string());
        }
    }

    Ok(BreachFindings {
        found: body.found > 0 || !sources.is_empty(),
        sources,
    })
}
