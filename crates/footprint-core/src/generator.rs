//! Draft generation.
//!
//! A generator never fails: an unusable judgment reply degrades to
//! [`DraftReport::fallback`], so the revision loop always has a well-formed
//! draft to evaluate.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use crate::domain::{DraftReport, EvaluationVerdict, EvidenceBundle, JudgmentParseError};
use crate::judgment::{parse_judgment, JudgmentEngine};
use crate::metrics::METRICS;
use crate::obs;
use crate::scoring;

/// Produces a draft from evidence and optional evaluator feedback.
#[async_trait]
pub trait DraftGenerator: Send + Sync {
    async fn generate(
        &self,
        evidence: &EvidenceBundle,
        feedback: Option<&EvaluationVerdict>,
    ) -> DraftReport;
}

/// Scores drafts from the deterministic finding catalogue.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleDraftGenerator;

#[async_trait]
impl DraftGenerator for RuleDraftGenerator {
    async fn generate(
        &self,
        evidence: &EvidenceBundle,
        feedback: Option<&EvaluationVerdict>,
    ) -> DraftReport {
        let draft = scoring::assess(evidence);
        match feedback {
            Some(verdict) => draft.apply_changes(&verdict.suggested_changes),
            None => draft,
        }
    }
}

/// Asks the judgment engine for a draft.
#[derive(Clone)]
pub struct JudgmentDraftGenerator {
    engine: Arc<dyn JudgmentEngine>,
}

#[derive(Debug, Deserialize)]
struct RawDraft {
    risk_score: f64,
    #[serde(default)]
    risk_factors: Vec<String>,
    #[serde(default)]
    mitigations: Vec<String>,
}

impl RawDraft {
    fn into_draft(self) -> Result<DraftReport, JudgmentParseError> {
        if !self.risk_score.is_finite() {
            return Err(JudgmentParseError::UnexpectedValue {
                field: "risk_score",
                value: self.risk_score.to_string(),
            });
        }
        // Any level the engine reported is ignored; DraftReport derives it.
        Ok(DraftReport::new(
            self.risk_score.round() as i64,
            self.risk_factors,
            self.mitigations,
        ))
    }
}

impl JudgmentDraftGenerator {
    pub fn new(engine: Arc<dyn JudgmentEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl DraftGenerator for JudgmentDraftGenerator {
    #[instrument(skip_all, fields(revision = feedback.is_some()))]
    async fn generate(
        &self,
        evidence: &EvidenceBundle,
        feedback: Option<&EvaluationVerdict>,
    ) -> DraftReport {
        let prompt = generator_prompt(evidence, feedback);
        METRICS.inc_judgment_calls();

        let raw = match self.engine.complete(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                obs::emit_judgment_fallback("generator", &e);
                METRICS.inc_judgment_fallbacks();
                return DraftReport::fallback();
            }
        };

        let parsed = parse_judgment::<RawDraft>(&raw).and_then(RawDraft::into_draft);
        match parsed {
            Ok(draft) => match feedback {
                Some(verdict) => draft.apply_changes(&verdict.suggested_changes),
                None => draft,
            },
            Err(e) => {
                obs::emit_judgment_fallback("generator", &e);
                METRICS.inc_judgment_fallbacks();
                DraftReport::fallback()
            }
        }
    }
}

fn generator_prompt(evidence: &EvidenceBundle, feedback: Option<&EvaluationVerdict>) -> String {
    let evidence_json = serde_json::to_string_pretty(evidence).unwrap_or_else(|_| "{}".to_string());

    let revision_instruction = match feedback {
        Some(verdict) => {
            let issues =
                serde_json::to_string_pretty(&verdict.issues).unwrap_or_else(|_| "[]".to_string());
            let changes = serde_json::to_string_pretty(&verdict.suggested_changes)
                .unwrap_or_else(|_| "{}".to_string());
            format!(
                r#"
You have received evaluator feedback indicating issues with the previous output.

Issues identified:
{issues}

Suggested changes:
{changes}

Revise the output to strictly address these issues.
Do NOT introduce new claims.
"#
            )
        }
        None => String::new(),
    };

    format!(
        r#"You are a cyber risk analysis agent.

Your job:
- Analyze the provided evidence
- Compute a cyber risk score between 0 and 100
- Assign a risk level (Low, Medium, High)
- List the main risk factors
- Suggest concrete mitigation steps
{revision_instruction}
STRICT RULES:
- Use ONLY the evidence provided
- Do NOT invent facts
- Do NOT mention tools or APIs
- Do NOT output explanations outside JSON
- Output MUST be valid JSON
- Do NOT use markdown or code blocks

Risk level thresholds:
- 0-30: Low
- 31-60: Medium
- 61-100: High

Evidence:
{evidence_json}

Return JSON in EXACTLY this format:
{{
  "risk_score": number,
  "risk_level": "Low|Medium|High",
  "risk_factors": [string],
  "mitigations": [string]
}}
"#
    )
}
