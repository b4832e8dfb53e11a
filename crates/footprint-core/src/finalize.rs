//! Final report selection.

use uuid::Uuid;

use crate::domain::{DraftReport, ScanReport};
use crate::workflow::WorkflowState;

/// Pick the draft to publish.
///
/// The latest draft, with any unconsumed suggested changes merged in, wins
/// unless it is missing or scores zero. In that case the earliest prior draft
/// with a non-zero score is used, so a late failure cannot discard a good
/// earlier result. If no draft ever scored, the latest one stands.
pub fn select_draft(state: &WorkflowState) -> DraftReport {
    let latest = state.draft.as_ref().map(|draft| match &state.pending_changes {
        Some(changes) => draft.apply_changes(changes),
        None => draft.clone(),
    });

    match latest {
        Some(draft) if draft.is_substantive() => draft,
        latest => state
            .drafts
            .iter()
            .find(|d| d.is_substantive())
            .cloned()
            .or(latest)
            .unwrap_or_else(DraftReport::fallback),
    }
}

/// Build the outbound report and store it on `state`.
pub fn finalize(state: &mut WorkflowState, scan_id: Uuid) -> ScanReport {
    let draft = select_draft(state);
    let report = ScanReport::from_draft(scan_id, draft, state.evidence.clone());
    state.final_report = Some(report.clone());
    report
}
