//! Bounded generate → evaluate → revise loop.
//!
//! The controller is an explicit state machine driven by a counter:
//!
//! ```text
//! Drafting ──► Evaluating ──► Accepted
//!    ▲             │
//!    │             ├──► Exhausted   (revision_count >= max_revisions)
//!    │             ▼
//!    └──────── Revising            (revision_count += 1)
//! ```
//!
//! An exhausted loop does not evaluate the last draft, since no verdict
//! could change it. With an evaluator that always asks for a revision this
//! caps a request at `max_revisions + 1` generator calls and `max_revisions`
//! evaluator calls.

use serde::Serialize;
use tracing::instrument;

use crate::evaluator::Evaluator;
use crate::generator::DraftGenerator;
use crate::metrics::METRICS;
use crate::obs;
use crate::workflow::WorkflowState;

/// Default bound on revision rounds per request.
pub const DEFAULT_MAX_REVISIONS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionState {
    Drafting,
    Evaluating,
    Revising,
    Accepted,
    Exhausted,
}

impl RevisionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RevisionState::Accepted | RevisionState::Exhausted)
    }
}

/// What one run of the loop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevisionOutcome {
    pub terminal: RevisionState,
    pub generator_calls: u32,
    pub evaluator_calls: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct RevisionController {
    max_revisions: u32,
}

impl Default for RevisionController {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REVISIONS)
    }
}

impl RevisionController {
    pub fn new(max_revisions: u32) -> Self {
        Self { max_revisions }
    }

    pub fn max_revisions(&self) -> u32 {
        self.max_revisions
    }

    /// Drive the loop to a terminal state, recording drafts, verdicts and
    /// transitions on `state`.
    #[instrument(skip_all, fields(max_revisions = self.max_revisions))]
    pub async fn run(
        &self,
        state: &mut WorkflowState,
        generator: &dyn DraftGenerator,
        evaluator: &dyn Evaluator,
    ) -> RevisionOutcome {
        let mut current = RevisionState::Drafting;
        let mut generator_calls = 0u32;
        let mut evaluator_calls = 0u32;

        loop {
            let next = match current {
                RevisionState::Drafting => {
                    // Feedback is consumed by this generation; nothing stays pending.
                    let feedback = state.pending_changes.take().and(state.verdict.as_ref());
                    let draft = generator.generate(&state.evidence, feedback).await;
                    generator_calls += 1;
                    state.record_draft(draft);
                    RevisionState::Evaluating
                }
                RevisionState::Evaluating => {
                    if state.revision_count >= self.max_revisions {
                        RevisionState::Exhausted
                    } else {
                        match state.draft.as_ref() {
                            Some(draft) => {
                                let verdict = evaluator.evaluate(&state.evidence, draft).await;
                                evaluator_calls += 1;
                                obs::emit_verdict(
                                    state.revision_count,
                                    verdict.verdict,
                                    verdict.issues.len(),
                                );
                                let accepted = verdict.is_accept();
                                state.pending_changes = Some(verdict.suggested_changes.clone());
                                state.verdict = Some(verdict);
                                if accepted {
                                    RevisionState::Accepted
                                } else {
                                    RevisionState::Revising
                                }
                            }
                            None => RevisionState::Drafting,
                        }
                    }
                }
                RevisionState::Revising => {
                    state.revision_count += 1;
                    METRICS.inc_revisions();
                    RevisionState::Drafting
                }
                RevisionState::Accepted | RevisionState::Exhausted => break,
            };

            obs::emit_transition(current, next, state.revision_count);
            state.transitions.push((current, next));
            current = next;
        }

        RevisionOutcome {
            terminal: current,
            generator_calls,
            evaluator_calls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DraftReport, NormalizedInput, SuggestedChanges, Verdict};
    use crate::evaluator::EvidenceEvaluator;
    use crate::fakes::{AlwaysReviseEvaluator, CountingGenerator};
    use crate::generator::RuleDraftGenerator;

    fn state() -> WorkflowState {
        WorkflowState::new(NormalizedInput::new(None, Some("a@b.io".to_string()), None).unwrap())
    }

    #[tokio::test]
    async fn test_accept_on_first_pass() {
        let mut state = state();
        let outcome = RevisionController::new(2)
            .run(&mut state, &RuleDraftGenerator, &EvidenceEvaluator)
            .await;

        assert_eq!(outcome.terminal, RevisionState::Accepted);
        assert_eq!(outcome.generator_calls, 1);
        assert_eq!(outcome.evaluator_calls, 1);
        assert_eq!(state.revision_count, 0);
        assert_eq!(
            state.transitions,
            vec![
                (RevisionState::Drafting, RevisionState::Evaluating),
                (RevisionState::Evaluating, RevisionState::Accepted),
            ]
        );
    }

    #[tokio::test]
    async fn test_always_revise_is_bounded() {
        for max in 0..5 {
            let mut state = state();
            let generator = CountingGenerator::new(DraftReport::new(
                40,
                vec!["f".to_string()],
                vec!["m".to_string()],
            ));
            let evaluator = AlwaysReviseEvaluator::new();

            let outcome = RevisionController::new(max)
                .run(&mut state, &generator, &evaluator)
                .await;

            assert_eq!(outcome.terminal, RevisionState::Exhausted);
            assert_eq!(outcome.generator_calls, max + 1);
            assert_eq!(outcome.evaluator_calls, max);
            assert_eq!(generator.calls(), max + 1);
            assert_eq!(evaluator.calls(), max);
            assert_eq!(state.revision_count, max);
            assert_eq!(state.drafts.len(), (max + 1) as usize);
        }
    }

    #[tokio::test]
    async fn test_feedback_passed_to_next_draft() {
        let mut state = state();
        let generator = CountingGenerator::new(DraftReport::new(50, vec![], vec![]));
        let evaluator = AlwaysReviseEvaluator::with_changes(SuggestedChanges {
            risk_score: Some(35),
            ..Default::default()
        });

        RevisionController::new(1)
            .run(&mut state, &generator, &evaluator)
            .await;

        assert_eq!(generator.feedback_seen(), vec![false, true]);
        assert_eq!(state.verdict.as_ref().unwrap().verdict, Verdict::Revise);
        assert!(state.pending_changes.is_none());
    }
}
