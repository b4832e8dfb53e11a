//! In-memory fakes for the engine, provider and stage traits (testing only)
//!
//! Provides a scripted judgment engine, static/failing/slow/panicking
//! providers, and counting generator/evaluator stubs that satisfy the trait
//! contracts without any network access.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::capability::{
    BreachFindings, BreachLookup, ProfileFetch, ProfileSummary, ProviderResult, ReuseFindings,
    UsernameReuseCheck,
};
use crate::domain::{
    DraftReport, EngineError, EvaluationVerdict, EvidenceBundle, ProviderError, SuggestedChanges,
    Verdict,
};
use crate::evaluator::Evaluator;
use crate::gatherer::ProviderSet;
use crate::generator::DraftGenerator;
use crate::judgment::JudgmentEngine;

// ---------------------------------------------------------------------------
// ScriptedEngine
// ---------------------------------------------------------------------------

/// Judgment engine that replays canned replies and records every prompt.
///
/// Scripted replies are consumed in order; once they run out the engine
/// answers with its repeat reply, or `EngineError::EmptyResponse` if none.
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    script: Mutex<VecDeque<Result<String, EngineError>>>,
    repeat: Option<Result<String, EngineError>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedEngine {
    /// Always answer `reply`.
    pub fn repeating(reply: &str) -> Self {
        Self {
            repeat: Some(Ok(reply.to_string())),
            ..Self::default()
        }
    }

    /// Always fail with a transport error.
    pub fn failing() -> Self {
        Self {
            repeat: Some(Err(EngineError::Transport("connection refused".to_string()))),
            ..Self::default()
        }
    }

    /// Answer `replies` in order, then fail.
    pub fn sequence<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            ..Self::default()
        }
    }

    /// Number of `complete` calls so far.
    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Every prompt received, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl JudgmentEngine for ScriptedEngine {
    async fn complete(&self, prompt: &str) -> Result<String, EngineError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(reply) => reply,
            None => self
                .repeat
                .clone()
                .unwrap_or(Err(EngineError::EmptyResponse)),
        }
    }
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

/// Providers answering fixed findings.
#[derive(Debug, Clone, Default)]
pub struct StaticProviders {
    pub breach: BreachFindings,
    pub profile: ProfileSummary,
    pub reuse: ReuseFindings,
}

impl StaticProviders {
    /// Nothing found anywhere.
    pub fn quiet() -> Self {
        Self::default()
    }

    pub fn into_provider_set(self) -> ProviderSet {
        let shared = Arc::new(self);
        ProviderSet {
            breach: shared.clone(),
            profile: shared.clone(),
            reuse: shared,
        }
    }
}

#[async_trait]
impl BreachLookup for StaticProviders {
    async fn lookup(&self, _email: &str) -> ProviderResult<BreachFindings> {
        Ok(self.breach.clone())
    }
}

#[async_trait]
impl ProfileFetch for StaticProviders {
    async fn fetch(&self, _username: &str) -> ProviderResult<ProfileSummary> {
        Ok(self.profile.clone())
    }
}

#[async_trait]
impl UsernameReuseCheck for StaticProviders {
    async fn check(&self, _username: &str) -> ProviderResult<ReuseFindings> {
        Ok(self.reuse.clone())
    }
}

/// Providers that always fail with a transport error.
#[derive(Debug, Clone)]
pub struct FailingProvider {
    message: String,
}

impl FailingProvider {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    fn error(&self) -> ProviderError {
        ProviderError::Transport(self.message.clone())
    }
}

#[async_trait]
impl BreachLookup for FailingProvider {
    async fn lookup(&self, _email: &str) -> ProviderResult<BreachFindings> {
        Err(self.error())
    }
}

#[async_trait]
impl ProfileFetch for FailingProvider {
    async fn fetch(&self, _username: &str) -> ProviderResult<ProfileSummary> {
        Err(self.error())
    }
}

#[async_trait]
impl UsernameReuseCheck for FailingProvider {
    async fn check(&self, _username: &str) -> ProviderResult<ReuseFindings> {
        Err(self.error())
    }
}

/// Providers that panic when called.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanickingProvider;

#[async_trait]
impl BreachLookup for PanickingProvider {
    async fn lookup(&self, _email: &str) -> ProviderResult<BreachFindings> {
        panic!("breach provider exploded")
    }
}

#[async_trait]
impl ProfileFetch for PanickingProvider {
    async fn fetch(&self, _username: &str) -> ProviderResult<ProfileSummary> {
        panic!("profile provider exploded")
    }
}

#[async_trait]
impl UsernameReuseCheck for PanickingProvider {
    async fn check(&self, _username: &str) -> ProviderResult<ReuseFindings> {
        panic!("reuse provider exploded")
    }
}

/// Providers that sleep before answering empty findings.
#[derive(Debug, Clone, Copy)]
pub struct SlowProvider {
    delay: Duration,
}

impl SlowProvider {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl BreachLookup for SlowProvider {
    async fn lookup(&self, _email: &str) -> ProviderResult<BreachFindings> {
        tokio::time::sleep(self.delay).await;
        Ok(BreachFindings::default())
    }
}

#[async_trait]
impl ProfileFetch for SlowProvider {
    async fn fetch(&self, _username: &str) -> ProviderResult<ProfileSummary> {
        tokio::time::sleep(self.delay).await;
        Ok(ProfileSummary::default())
    }
}

#[async_trait]
impl UsernameReuseCheck for SlowProvider {
    async fn check(&self, _username: &str) -> ProviderResult<ReuseFindings> {
        tokio::time::sleep(self.delay).await;
        Ok(ReuseFindings::default())
    }
}

/// Wraps a [`ProviderSet`] and counts every call that reaches it.
pub struct CountingProviders {
    inner: ProviderSet,
    calls: AtomicUsize,
}

impl CountingProviders {
    pub fn new(inner: ProviderSet) -> Arc<Self> {
        Arc::new(Self {
            inner,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn provider_set(self: &Arc<Self>) -> ProviderSet {
        ProviderSet {
            breach: self.clone(),
            profile: self.clone(),
            reuse: self.clone(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BreachLookup for CountingProviders {
    async fn lookup(&self, email: &str) -> ProviderResult<BreachFindings> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.breach.lookup(email).await
    }
}

#[async_trait]
impl ProfileFetch for CountingProviders {
    async fn fetch(&self, username: &str) -> ProviderResult<ProfileSummary> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.profile.fetch(username).await
    }
}

#[async_trait]
impl UsernameReuseCheck for CountingProviders {
    async fn check(&self, username: &str) -> ProviderResult<ReuseFindings> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.reuse.check(username).await
    }
}

// ---------------------------------------------------------------------------
// Stage stubs
// ---------------------------------------------------------------------------

/// Generator returning a fixed draft and recording whether feedback arrived.
#[derive(Debug)]
pub struct CountingGenerator {
    draft: DraftReport,
    feedback_seen: Mutex<Vec<bool>>,
}

impl CountingGenerator {
    pub fn new(draft: DraftReport) -> Self {
        Self {
            draft,
            feedback_seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> u32 {
        self.feedback_seen.lock().unwrap().len() as u32
    }

    /// One entry per call: whether that call received evaluator feedback.
    pub fn feedback_seen(&self) -> Vec<bool> {
        self.feedback_seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl DraftGenerator for CountingGenerator {
    async fn generate(
        &self,
        _evidence: &EvidenceBundle,
        feedback: Option<&EvaluationVerdict>,
    ) -> DraftReport {
        self.feedback_seen.lock().unwrap().push(feedback.is_some());
        match feedback {
            Some(verdict) => self.draft.apply_changes(&verdict.suggested_changes),
            None => self.draft.clone(),
        }
    }
}

/// Generator that panics.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanickingGenerator;

#[async_trait]
impl DraftGenerator for PanickingGenerator {
    async fn generate(
        &self,
        _evidence: &EvidenceBundle,
        _feedback: Option<&EvaluationVerdict>,
    ) -> DraftReport {
        panic!("generator exploded")
    }
}

/// Evaluator that never accepts.
#[derive(Debug, Default)]
pub struct AlwaysReviseEvaluator {
    changes: SuggestedChanges,
    calls: AtomicU32,
}

impl AlwaysReviseEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_changes(changes: SuggestedChanges) -> Self {
        Self {
            changes,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Evaluator for AlwaysReviseEvaluator {
    async fn evaluate(&self, _evidence: &EvidenceBundle, _draft: &DraftReport) -> EvaluationVerdict {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        EvaluationVerdict {
            verdict: Verdict::Revise,
            issues: vec![format!("revision {n} still not good enough")],
            suggested_changes: self.changes.clone(),
            summary: "revise".to_string(),
        }
    }
}
