//! HTTP-backed capability providers and the Gemini judgment engine.
//!
//! - `GithubProfiles`: [`footprint_core::ProfileFetch`] over the GitHub REST API
//! - `LeakcheckBreaches`: [`footprint_core::BreachLookup`] over LeakCheck
//! - `ProfileProbe`: [`footprint_core::UsernameReuseCheck`] by URL probing
//! - `GeminiClient`: [`footprint_core::JudgmentEngine`]

pub mod config;
pub mod error;
pub mod gemini;
pub mod github;
pub mod leakcheck;
pub mod username_reuse;

use std::sync::Arc;

use footprint_core::{EngineError, JudgmentEngine, LazyEngine, ProviderSet};

pub use config::ProviderConfig;
pub use error::ClientError;
pub use gemini::GeminiClient;
pub use github::GithubProfiles;
pub use leakcheck::LeakcheckBreaches;
pub use username_reuse::{default_platforms, Platform, ProfileProbe};

/// Build the production provider set.
pub fn http_provider_set(config: &ProviderConfig) -> Result<ProviderSet, ClientError> {
    Ok(ProviderSet {
        breach: Arc::new(LeakcheckBreaches::new(config)?),
        profile: Arc::new(GithubProfiles::new(config)?),
        reuse: Arc::new(ProfileProbe::new(config)?),
    })
}

/// A Gemini engine built on first use, or `None` without an API key.
pub fn lazy_gemini(config: &ProviderConfig) -> Option<Arc<dyn JudgmentEngine>> {
    if !config.has_engine_credentials() {
        return None;
    }
    let config = config.clone();
    let engine = LazyEngine::new(move || GeminiClient::new(&config).map_err(EngineError::from));
    Some(Arc::new(engine))
}
