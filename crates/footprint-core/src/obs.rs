//! Structured observability hooks for the scan lifecycle.
//!
//! - `ScanSpan`: request-scoped span carrying the scan id
//! - `emit_*`: one function per lifecycle event, so field names stay stable

use tracing::{info, warn};

use crate::domain::{EvidenceDomain, Verdict};
use crate::revision::RevisionState;

/// Build the request-scoped span for `scan_id`.
///
/// Returned un-entered so async callers can attach it with
/// `tracing::Instrument::instrument`.
pub fn scan_span(scan_id: &str) -> tracing::Span {
    tracing::info_span!("footprint.scan", scan_id = %scan_id)
}

/// RAII guard that enters the scan span for synchronous code.
pub struct ScanSpan {
    _span: tracing::span::EnteredSpan,
}

impl ScanSpan {
    pub fn enter(scan_id: &str) -> Self {
        Self {
            _span: scan_span(scan_id).entered(),
        }
    }
}

/// Emit event: scan started with the hint kinds that were supplied.
pub fn emit_scan_started(scan_id: &str, has_username: bool, has_email: bool, has_name: bool) {
    info!(
        event = "scan.started",
        scan_id = %scan_id,
        has_username = has_username,
        has_email = has_email,
        has_name = has_name,
    );
}

/// Emit event: a pipeline stage completed.
pub fn emit_stage_completed(stage: &str, duration_ms: u64) {
    info!(event = "stage.completed", stage = %stage, duration_ms = duration_ms);
}

/// Emit event: a provider call failed and was absorbed into evidence.
pub fn emit_provider_failed(domain: EvidenceDomain, error: &dyn std::fmt::Display) {
    warn!(event = "provider.failed", domain = %domain, error = %error);
}

/// Emit event: a judgment stage fell back to its deterministic default.
pub fn emit_judgment_fallback(stage: &str, error: &dyn std::fmt::Display) {
    warn!(event = "judgment.fallback", stage = %stage, error = %error);
}

/// Emit event: evaluator verdict for a draft.
pub fn emit_verdict(revision: u32, verdict: Verdict, issues: usize) {
    info!(
        event = "evaluation.verdict",
        revision = revision,
        verdict = ?verdict,
        issues = issues,
    );
}

/// Emit event: revision state machine transition.
pub fn emit_transition(from: RevisionState, to: RevisionState, revision: u32) {
    info!(
        event = "revision.transition",
        from = ?from,
        to = ?to,
        revision = revision,
    );
}

/// Emit event: scan finished.
pub fn emit_scan_finished(scan_id: &str, duration_ms: u64, risk_score: u8, revisions: u32) {
    info!(
        event = "scan.finished",
        scan_id = %scan_id,
        duration_ms = duration_ms,
        risk_score = risk_score,
        revisions = revisions,
    );
}

/// Emit event: scan aborted by an unexpected failure.
pub fn emit_scan_failed(scan_id: &str, error: &dyn std::fmt::Display) {
    tracing::error!(event = "scan.failed", scan_id = %scan_id, error = %error);
}
