//! Draft evaluation.
//!
//! Evaluators may flag issues and propose a bounded patch, never new claims.
//! A judgment evaluator whose output cannot be trusted fails open: the draft
//! is accepted with a diagnostic issue so the request never stalls.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use crate::domain::{
    DraftReport, EvaluationVerdict, EvidenceBundle, JudgmentParseError, SuggestedChanges, Verdict,
};
use crate::judgment::{parse_judgment, JudgmentEngine};
use crate::metrics::METRICS;
use crate::obs;
use crate::scoring;

/// Largest gap between a draft score and the evidence-derived score that
/// the evidence evaluator tolerates.
pub const SCORE_TOLERANCE: i64 = 10;

#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(&self, evidence: &EvidenceBundle, draft: &DraftReport) -> EvaluationVerdict;
}

/// Checks drafts against the deterministic finding catalogue.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvidenceEvaluator;

impl EvidenceEvaluator {
    pub fn check(evidence: &EvidenceBundle, draft: &DraftReport) -> EvaluationVerdict {
        let findings = scoring::findings(evidence);
        let supported: Vec<&str> = if findings.is_empty() {
            vec![scoring::NO_SIGNIFICANT_RISKS]
        } else {
            findings.iter().map(|f| f.factor.as_str()).collect()
        };

        let mut issues = Vec::new();
        let mut changes = SuggestedChanges::default();

        let unsupported: Vec<&String> = draft
            .risk_factors()
            .iter()
            .filter(|f| !supported.contains(&f.as_str()))
            .collect();
        if !unsupported.is_empty() {
            for factor in &unsupported {
                issues.push(format!("Risk factor not supported by evidence: {factor}"));
            }
            changes.risk_factors = Some(
                draft
                    .risk_factors()
                    .iter()
                    .filter(|f| supported.contains(&f.as_str()))
                    .cloned()
                    .collect(),
            );
        }

        let expected = i64::from(scoring::assess(evidence).risk_score());
        let actual = i64::from(draft.risk_score());
        if (expected - actual).abs() > SCORE_TOLERANCE {
            issues.push(format!(
                "Risk score {actual} is not proportionate to the evidence (expected about {expected})"
            ));
            changes.risk_score = Some(expected);
        }

        if draft.mitigations().is_empty() {
            issues.push("Draft lists no mitigations".to_string());
        }

        // Flagged only: a patch may not add mitigations.
        for finding in &findings {
            if !draft.risk_factors().contains(&finding.factor) {
                continue;
            }
            for required in &finding.mitigations {
                if !draft.mitigations().iter().any(|m| m == required) {
                    issues.push(format!(
                        "Missing mitigation for \"{}\": {required}",
                        finding.factor
                    ));
                }
            }
        }

        if issues.is_empty() {
            EvaluationVerdict::accept("All risk factors are supported by the evidence")
        } else {
            let summary = format!("{} issue(s) found against the evidence", issues.len());
            EvaluationVerdict {
                verdict: Verdict::Revise,
                issues,
                suggested_changes: changes,
                summary,
            }
        }
    }
}

#[async_trait]
impl Evaluator for EvidenceEvaluator {
    async fn evaluate(&self, evidence: &EvidenceBundle, draft: &DraftReport) -> EvaluationVerdict {
        Self::check(evidence, draft)
    }
}

/// Asks the judgment engine to verify a draft.
#[derive(Clone)]
pub struct JudgmentEvaluator {
    engine: Arc<dyn JudgmentEngine>,
}

#[derive(Debug, Default, Deserialize)]
struct RawChanges {
    #[serde(default)]
    risk_score: Option<f64>,
    #[serde(default)]
    risk_factors: Option<Vec<String>>,
    #[serde(default)]
    mitigations: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    verdict: String,
    #[serde(default)]
    issues: Vec<String>,
    #[serde(default)]
    suggested_changes: Option<RawChanges>,
    #[serde(default)]
    summary: String,
}

impl RawVerdict {
    fn into_verdict(self) -> Result<EvaluationVerdict, JudgmentParseError> {
        let verdict =
            Verdict::parse(&self.verdict).ok_or_else(|| JudgmentParseError::UnexpectedValue {
                field: "verdict",
                value: self.verdict.clone(),
            })?;
        let raw = self.suggested_changes.unwrap_or_default();
        let suggested_changes = SuggestedChanges {
            risk_score: raw
                .risk_score
                .filter(|s| s.is_finite())
                .map(|s| s.round() as i64),
            risk_factors: raw.risk_factors,
            mitigations: raw.mitigations,
        };
        Ok(EvaluationVerdict {
            verdict,
            issues: self.issues,
            suggested_changes,
            summary: self.summary,
        })
    }
}

impl JudgmentEvaluator {
    pub fn new(engine: Arc<dyn JudgmentEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl Evaluator for JudgmentEvaluator {
    #[instrument(skip_all)]
    async fn evaluate(&self, evidence: &EvidenceBundle, draft: &DraftReport) -> EvaluationVerdict {
        let prompt = evaluator_prompt(evidence, draft);
        METRICS.inc_judgment_calls();

        let raw = match self.engine.complete(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                obs::emit_judgment_fallback("evaluator", &e);
                METRICS.inc_judgment_fallbacks();
                return EvaluationVerdict::fail_open();
            }
        };

        match parse_judgment::<RawVerdict>(&raw).and_then(RawVerdict::into_verdict) {
            Ok(verdict) => verdict,
            Err(e) => {
                obs::emit_judgment_fallback("evaluator", &e);
                METRICS.inc_judgment_fallbacks();
                EvaluationVerdict::fail_open()
            }
        }
    }
}

fn evaluator_prompt(evidence: &EvidenceBundle, draft: &DraftReport) -> String {
    let evidence_json = serde_json::to_string_pretty(evidence).unwrap_or_else(|_| "{}".to_string());
    let draft_json = serde_json::to_string_pretty(draft).unwrap_or_else(|_| "{}".to_string());
    format!(
        r#"You are a STRICT evaluator agent for a cyber risk analysis system.

Your job:
- Verify that EACH risk factor is clearly supported by the provided evidence
- Identify exaggerations, missing nuance, or unsupported claims
- Decide whether the draft output is acceptable or needs revision

STRICT EVALUATION RULES:
- Be conservative and strict
- Use ONLY the provided evidence
- Do NOT invent new risk factors
- Do NOT introduce new mitigation ideas
- If a claim is even slightly unsupported, flag it
- Do NOT rewrite the output yourself
- Output MUST be valid JSON
- Do NOT use markdown or code blocks
- If multiple independent risk factors are clearly supported by evidence,
you MUST allow a numeric risk_score and corresponding risk_level.

Evidence:
{evidence_json}

Draft Output:
{draft_json}

Return JSON in EXACTLY this format:
{{
  "verdict": "accept" or "revise",
  "issues": [string],
  "suggested_changes": {{
    "risk_score": number or null,
    "risk_factors": [string] or null,
    "mitigations": [string] or null
  }},
  "summary": string
}}
"#
    )
}
