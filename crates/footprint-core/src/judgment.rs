//! Judgment-engine contract.
//!
//! The engine is a remote, non-deterministic text-in / text-out service. Its
//! replies are expected to be JSON, possibly wrapped in markdown fences. Every
//! caller parses through [`parse_judgment`] and owns a deterministic fallback.

use std::sync::OnceLock;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::domain::{EngineError, JudgmentParseError};

/// Shared, stateless judgment-engine handle.
///
/// Implementations must be safe to call concurrently from many requests.
#[async_trait]
pub trait JudgmentEngine: Send + Sync {
    /// Send one instruction (with embedded context) and return the raw reply.
    async fn complete(&self, prompt: &str) -> Result<String, EngineError>;
}

/// Remove a surrounding ```` ``` ```` / ```` ```json ```` fence, if any.
pub fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an info string such as `json` on the opening line.
    let body = match rest.find('\n') {
        Some(idx) if rest[..idx].trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
            &rest[idx + 1..]
        }
        _ => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Strip fences and deserialize the engine reply into `T`.
pub fn parse_judgment<T: DeserializeOwned>(raw: &str) -> Result<T, JudgmentParseError> {
    Ok(serde_json::from_str(strip_fences(raw))?)
}

/// Engine handle constructed on first use and shared afterwards.
///
/// Construction failures are not cached: the next call retries the factory.
pub struct LazyEngine<E, F>
where
    F: Fn() -> Result<E, EngineError> + Send + Sync,
{
    cell: OnceLock<E>,
    factory: F,
}

impl<E, F> LazyEngine<E, F>
where
    E: JudgmentEngine,
    F: Fn() -> Result<E, EngineError> + Send + Sync,
{
    pub fn new(factory: F) -> Self {
        Self {
            cell: OnceLock::new(),
            factory,
        }
    }

    fn get(&self) -> Result<&E, EngineError> {
        if let Some(engine) = self.cell.get() {
            return Ok(engine);
        }
        let engine = (self.factory)()?;
        // A concurrent initializer may have won; either value is equivalent.
        let _ = self.cell.set(engine);
        self.cell
            .get()
            .ok_or_else(|| EngineError::NotConfigured("engine initialization raced".to_string()))
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

#[async_trait]
impl<E, F> JudgmentEngine for LazyEngine<E, F>
where
    E: JudgmentEngine,
    F: Fn() -> Result<E, EngineError> + Send + Sync,
{
    async fn complete(&self, prompt: &str) -> Result<String, EngineError> {
        self.get()?.complete(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::ScriptedEngine;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(serde::Deserialize, Debug, PartialEq)]
    struct Probe {
        ok: bool,
    }

    #[test]
    fn test_strip_fences_variants() {
        assert_eq!(strip_fences("{\"ok\":true}"), "{\"ok\":true}");
        assert_eq!(strip_fences("```\n{\"ok\":true}\n```"), "{\"ok\":true}");
        assert_eq!(strip_fences("```json\n{\"ok\":true}\n```\n"), "{\"ok\":true}");
        assert_eq!(strip_fences("  ```{\"ok\":true}```  "), "{\"ok\":true}");
    }

    #[test]
    fn test_parse_judgment_accepts_fenced_json() {
        let parsed: Probe = parse_judgment("```json\n{\"ok\": true}\n```").unwrap();
        assert_eq!(parsed, Probe { ok: true });
    }

    #[test]
    fn test_parse_judgment_rejects_prose() {
        let parsed: Result<Probe, _> = parse_judgment("Sure! Here is the JSON you asked for.");
        assert!(matches!(parsed, Err(JudgmentParseError::Json(_))));
    }

    #[tokio::test]
    async fn test_lazy_engine_builds_once() {
        let builds = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&builds);
        let engine = LazyEngine::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(ScriptedEngine::repeating("{}"))
        });

        assert!(!engine.is_initialized());
        engine.complete("a").await.unwrap();
        engine.complete("b").await.unwrap();
        assert!(engine.is_initialized());
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_lazy_engine_surfaces_factory_error() {
        let engine: LazyEngine<ScriptedEngine, _> =
            LazyEngine::new(|| Err(EngineError::NotConfigured("GEMINI_API_KEY".to_string())));
        let err = engine.complete("x").await.unwrap_err();
        assert!(matches!(err, EngineError::NotConfigured(_)));
        assert!(!engine.is_initialized());
    }
}
