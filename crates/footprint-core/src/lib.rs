//! FootprintGuard Core Library
//!
//! Turns sparse identity hints into an exposure-risk report: whitelisted task
//! planning, failure-isolated evidence gathering, and a bounded
//! generate → evaluate → revise loop over a judgment engine.

pub mod artifact;
pub mod capability;
pub mod config;
pub mod domain;
pub mod evaluator;
pub mod fakes;
pub mod finalize;
pub mod gatherer;
pub mod generator;
pub mod judgment;
pub mod metrics;
pub mod normalize;
pub mod obs;
pub mod planner;
pub mod revision;
pub mod scoring;
pub mod telemetry;
pub mod workflow;

pub use artifact::{content_digest, read_report_artifact, write_report_artifact};
pub use capability::{
    tool_catalog, BreachFindings, BreachLookup, ProfileFetch, ProfileSummary, ProviderResult,
    ReuseFindings, ToolDescriptor, UsernameReuseCheck,
};
pub use config::{EngineMode, WorkflowConfig};
pub use domain::{
    DraftReport, EngineError, EvaluationVerdict, EvidenceBundle, EvidenceDomain, EvidenceRecord,
    FootprintError, JudgmentParseError, NormalizedInput, PlannerOutput, ProviderError, Result,
    RiskLevel, ScanReport, ScanRequest, SuggestedChanges, Task, ValidationError, Verdict,
};
pub use evaluator::{Evaluator, EvidenceEvaluator, JudgmentEvaluator};
pub use gatherer::{EvidenceGatherer, ProviderSet};
pub use generator::{DraftGenerator, JudgmentDraftGenerator, RuleDraftGenerator};
pub use judgment::{parse_judgment, strip_fences, JudgmentEngine, LazyEngine};
pub use normalize::{is_valid_username, normalize_request};
pub use planner::{whitelist_tasks, PlannerStrategy, TaskPlanner};
pub use revision::{RevisionController, RevisionOutcome, RevisionState, DEFAULT_MAX_REVISIONS};
pub use workflow::{ScanRun, ScanWorkflow, WorkflowState};

/// FootprintGuard version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
