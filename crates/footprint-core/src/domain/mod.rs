//! Domain models for FootprintGuard.
//!
//! - `ScanRequest` / `NormalizedInput`: identity hints before and after sanitizing
//! - `Task` / `PlannerOutput`: the closed task whitelist and the plan
//! - `EvidenceRecord` / `EvidenceBundle`: per-task provider outcomes
//! - `DraftReport` / `EvaluationVerdict` / `ScanReport`: judgment artifacts

pub mod error;
pub mod evidence;
pub mod input;
pub mod report;
pub mod task;

pub use error::{
    EngineError, FootprintError, JudgmentParseError, ProviderError, Result, ValidationError,
};
pub use evidence::{
    EmailEvidence, EvidenceBundle, EvidenceDomain, EvidenceRecord, GithubEvidence,
    UsernameEvidence,
};
pub use input::{NormalizedInput, ScanRequest};
pub use report::{
    clamp_score, DraftReport, EvaluationVerdict, RiskLevel, ScanReport, SuggestedChanges, Verdict,
};
pub use task::{PlannerOutput, Task};
