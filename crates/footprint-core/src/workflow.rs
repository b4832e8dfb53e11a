//! Per-request scan pipeline.
//!
//! normalize → plan → gather → revision loop → finalize
//!
//! [`WorkflowState`] is built fresh for every request and threaded through
//! the stages by `&mut`; [`ScanWorkflow`] itself holds only shared, stateless
//! handles and is cheap to clone.

use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;
use uuid::Uuid;

use crate::config::{EngineMode, WorkflowConfig};
use crate::domain::{
    DraftReport, EvaluationVerdict, EvidenceBundle, FootprintError, NormalizedInput,
    PlannerOutput, Result, ScanReport, ScanRequest, SuggestedChanges,
};
use crate::evaluator::{Evaluator, EvidenceEvaluator, JudgmentEvaluator};
use crate::finalize;
use crate::gatherer::{EvidenceGatherer, ProviderSet};
use crate::generator::{DraftGenerator, JudgmentDraftGenerator, RuleDraftGenerator};
use crate::judgment::JudgmentEngine;
use crate::metrics::METRICS;
use crate::normalize::normalize_request;
use crate::obs;
use crate::planner::{PlannerStrategy, TaskPlanner};
use crate::revision::{RevisionController, RevisionOutcome, RevisionState};

/// Everything one request accumulates on its way to a report.
#[derive(Debug, Clone)]
pub struct WorkflowState {
    pub input: NormalizedInput,
    pub plan: PlannerOutput,
    pub evidence: EvidenceBundle,
    /// Most recent draft.
    pub draft: Option<DraftReport>,
    /// Every draft produced, oldest first.
    pub drafts: Vec<DraftReport>,
    pub verdict: Option<EvaluationVerdict>,
    /// Suggested changes of the latest verdict not yet fed to the generator.
    pub pending_changes: Option<SuggestedChanges>,
    pub revision_count: u32,
    pub transitions: Vec<(RevisionState, RevisionState)>,
    pub final_report: Option<ScanReport>,
}

impl WorkflowState {
    pub fn new(input: NormalizedInput) -> Self {
        Self {
            input,
            plan: PlannerOutput::default(),
            evidence: EvidenceBundle::new(),
            draft: None,
            drafts: Vec::new(),
            verdict: None,
            pending_changes: None,
            revision_count: 0,
            transitions: Vec::new(),
            final_report: None,
        }
    }

    pub fn record_draft(&mut self, draft: DraftReport) {
        self.drafts.push(draft.clone());
        self.draft = Some(draft);
    }
}

/// A completed run: the report plus the state that produced it.
#[derive(Debug, Clone)]
pub struct ScanRun {
    pub scan_id: Uuid,
    pub report: ScanReport,
    pub state: WorkflowState,
    pub outcome: RevisionOutcome,
}

#[derive(Clone)]
pub struct ScanWorkflow {
    planner: TaskPlanner,
    gatherer: EvidenceGatherer,
    generator: Arc<dyn DraftGenerator>,
    evaluator: Arc<dyn Evaluator>,
    controller: RevisionController,
}

impl ScanWorkflow {
    pub fn new(
        planner: TaskPlanner,
        gatherer: EvidenceGatherer,
        generator: Arc<dyn DraftGenerator>,
        evaluator: Arc<dyn Evaluator>,
        controller: RevisionController,
    ) -> Self {
        Self {
            planner,
            gatherer,
            generator,
            evaluator,
            controller,
        }
    }

    /// Deterministic pipeline: field-presence planning, rule-based drafts and
    /// evidence checks. Makes no judgment-engine calls.
    pub fn rule_based(providers: ProviderSet, max_revisions: u32) -> Self {
        Self::new(
            TaskPlanner::Deterministic,
            EvidenceGatherer::new(providers),
            Arc::new(RuleDraftGenerator),
            Arc::new(EvidenceEvaluator),
            RevisionController::new(max_revisions),
        )
    }

    /// Wire the stages from configuration.
    ///
    /// `engine` is required when the configuration asks for judgment
    /// planning or `EngineMode::Judgment`; `EngineMode::Auto` uses it when
    /// present and falls back to the rule-based stages otherwise.
    pub fn from_config(
        config: &WorkflowConfig,
        providers: ProviderSet,
        engine: Option<Arc<dyn JudgmentEngine>>,
    ) -> Result<Self> {
        let planner = match (config.planner, &engine) {
            (PlannerStrategy::Deterministic, _) => TaskPlanner::Deterministic,
            (PlannerStrategy::Judgment, Some(engine)) => TaskPlanner::Judgment(Arc::clone(engine)),
            (PlannerStrategy::Judgment, None) => {
                return Err(FootprintError::Config(
                    "judgment planner requires a judgment engine".to_string(),
                ))
            }
        };

        let (generator, evaluator): (Arc<dyn DraftGenerator>, Arc<dyn Evaluator>) =
            match (config.engine_mode, engine) {
                (EngineMode::Rules, _) | (EngineMode::Auto, None) => {
                    (Arc::new(RuleDraftGenerator), Arc::new(EvidenceEvaluator))
                }
                (EngineMode::Judgment | EngineMode::Auto, Some(engine)) => (
                    Arc::new(JudgmentDraftGenerator::new(Arc::clone(&engine))),
                    Arc::new(JudgmentEvaluator::new(engine)),
                ),
                (EngineMode::Judgment, None) => {
                    return Err(FootprintError::Config(
                        "judgment engine mode requires a judgment engine".to_string(),
                    ))
                }
            };

        let mut gatherer = EvidenceGatherer::new(providers);
        if let Some(timeout) = config.task_timeout {
            gatherer = gatherer.with_task_timeout(timeout);
        }

        Ok(Self::new(
            planner,
            gatherer,
            generator,
            evaluator,
            RevisionController::new(config.max_revisions),
        ))
    }

    pub fn max_revisions(&self) -> u32 {
        self.controller.max_revisions()
    }

    /// Run one scan and return the report.
    pub async fn scan(&self, request: &ScanRequest) -> Result<ScanReport> {
        Ok(self.run(request).await?.report)
    }

    /// Run one scan and keep the full request state.
    ///
    /// Validation happens before any provider or judgment call. The
    /// pipeline runs on its own task so an unexpected panic surfaces as
    /// [`FootprintError::Workflow`] instead of taking down the caller.
    pub async fn run(&self, request: &ScanRequest) -> Result<ScanRun> {
        let input = normalize_request(request)?;

        let scan_id = Uuid::new_v4();
        let id = scan_id.to_string();
        let span = obs::scan_span(&id);
        let this = self.clone();

        let handle = tokio::spawn(async move { this.execute(scan_id, input).await }.instrument(span));
        match handle.await {
            Ok(run) => Ok(run),
            Err(join_err) => {
                obs::emit_scan_failed(&id, &join_err);
                Err(FootprintError::Workflow(format!("scan {id} aborted: {join_err}")))
            }
        }
    }

    async fn execute(&self, scan_id: Uuid, input: NormalizedInput) -> ScanRun {
        let started = Instant::now();
        let id = scan_id.to_string();
        obs::emit_scan_started(
            &id,
            input.username().is_some(),
            input.email().is_some(),
            input.name().is_some(),
        );

        let mut state = WorkflowState::new(input);

        let stage = Instant::now();
        state.plan = self.planner.plan(&state.input).await;
        obs::emit_stage_completed("plan", stage.elapsed().as_millis() as u64);

        state.evidence = self.gatherer.gather(&state.plan, &state.input).await;

        let stage = Instant::now();
        let outcome = self
            .controller
            .run(&mut state, self.generator.as_ref(), self.evaluator.as_ref())
            .await;
        obs::emit_stage_completed("revision", stage.elapsed().as_millis() as u64);

        let report = finalize::finalize(&mut state, scan_id);

        METRICS.inc_scans_completed();
        obs::emit_scan_finished(
            &id,
            started.elapsed().as_millis() as u64,
            report.risk_score,
            state.revision_count,
        );
        METRICS.flush();

        ScanRun {
            scan_id,
            report,
            state,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RiskLevel, Task};
    use crate::fakes::{PanickingGenerator, ScriptedEngine, StaticProviders};

    fn request(email: Option<&str>, github: Option<&str>) -> ScanRequest {
        ScanRequest {
            email: email.map(str::to_string),
            github_username: github.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_rule_based_scan_accepts_first_draft() {
        let workflow = ScanWorkflow::rule_based(StaticProviders::quiet().into_provider_set(), 2);
        let run = workflow
            .run(&request(Some("a@b.io"), Some("octo")))
            .await
            .unwrap();

        assert_eq!(run.outcome.terminal, RevisionState::Accepted);
        assert_eq!(run.state.plan.tasks.len(), 3);
        assert!(run.state.plan.contains(Task::CheckBreachExposure));
        assert_eq!(run.report.scan_id, run.scan_id);
        assert_eq!(run.report.risk_level, RiskLevel::Low);
        assert_eq!(run.state.final_report.as_ref(), Some(&run.report));
    }

    #[tokio::test]
    async fn test_empty_request_is_rejected() {
        let workflow = ScanWorkflow::rule_based(StaticProviders::quiet().into_provider_set(), 2);
        let err = workflow.scan(&ScanRequest::default()).await.unwrap_err();
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_panic_in_pipeline_is_workflow_failure() {
        let workflow = ScanWorkflow::new(
            TaskPlanner::Deterministic,
            EvidenceGatherer::new(StaticProviders::quiet().into_provider_set()),
            Arc::new(PanickingGenerator),
            Arc::new(EvidenceEvaluator),
            RevisionController::default(),
        );
        let err = workflow
            .scan(&request(Some("a@b.io"), None))
            .await
            .unwrap_err();
        assert!(matches!(err, FootprintError::Workflow(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_from_config_requires_engine_for_judgment() {
        let providers = StaticProviders::quiet().into_provider_set();
        let config = WorkflowConfig {
            engine_mode: EngineMode::Judgment,
            ..Default::default()
        };
        assert!(matches!(
            ScanWorkflow::from_config(&config, providers.clone(), None),
            Err(FootprintError::Config(_))
        ));

        let engine: Arc<dyn JudgmentEngine> = Arc::new(ScriptedEngine::repeating("{}"));
        let workflow = ScanWorkflow::from_config(&config, providers, Some(engine)).unwrap();
        assert_eq!(workflow.max_revisions(), config.max_revisions);
    }
}
