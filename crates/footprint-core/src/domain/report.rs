//! Draft reports, evaluation verdicts and the final scan report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::evidence::EvidenceBundle;

/// Upper bound of the `Low` band (inclusive).
pub const LOW_MAX: u8 = 30;
/// Upper bound of the `Medium` band (inclusive).
pub const MEDIUM_MAX: u8 = 60;

/// Coarse risk band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// The one mapping from score to band: 0–30 Low, 31–60 Medium, 61–100 High.
    pub fn from_score(score: u8) -> RiskLevel {
        if score <= LOW_MAX {
            RiskLevel::Low
        } else if score <= MEDIUM_MAX {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Clamp any integer into the `[0, 100]` score range.
pub fn clamp_score(raw: i64) -> u8 {
    raw.clamp(0, 100) as u8
}

/// A candidate report.
///
/// Fields are private so the score can only be set through [`DraftReport::new`]
/// or a patch, both of which clamp it and re-derive the level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftReport {
    risk_score: u8,
    risk_level: RiskLevel,
    risk_factors: Vec<String>,
    mitigations: Vec<String>,
}

impl DraftReport {
    pub fn new(score: i64, risk_factors: Vec<String>, mitigations: Vec<String>) -> Self {
        let risk_score = clamp_score(score);
        Self {
            risk_score,
            risk_level: RiskLevel::from_score(risk_score),
            risk_factors,
            mitigations,
        }
    }

    /// Well-formed stand-in used when the generator cannot produce a draft.
    pub fn fallback() -> Self {
        Self::new(
            0,
            Vec::new(),
            vec!["Unable to generate risk assessment due to parsing error".to_string()],
        )
    }

    pub fn risk_score(&self) -> u8 {
        self.risk_score
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    pub fn risk_factors(&self) -> &[String] {
        &self.risk_factors
    }

    pub fn mitigations(&self) -> &[String] {
        &self.mitigations
    }

    /// A draft that carries a non-zero score.
    pub fn is_substantive(&self) -> bool {
        self.risk_score > 0
    }

    /// Apply a bounded patch.
    ///
    /// The score is clamped. A replacement list may only select and reorder
    /// entries the draft already carries; anything else is dropped. A
    /// non-empty replacement with no known entry leaves the list untouched.
    /// `None` fields leave the draft untouched.
    pub fn apply_changes(&self, changes: &SuggestedChanges) -> DraftReport {
        let score = changes
            .risk_score
            .unwrap_or(i64::from(self.risk_score));
        let risk_factors = bounded_replace(&self.risk_factors, changes.risk_factors.as_ref());
        let mitigations = bounded_replace(&self.mitigations, changes.mitigations.as_ref());
        DraftReport::new(score, risk_factors, mitigations)
    }
}

fn bounded_replace(current: &[String], replacement: Option<&Vec<String>>) -> Vec<String> {
    let Some(items) = replacement else {
        return current.to_vec();
    };
    let mut kept: Vec<String> = Vec::new();
    for item in items.iter().map(|s| s.trim()) {
        if current.iter().any(|c| c == item) && !kept.iter().any(|k| k == item) {
            kept.push(item.to_string());
        }
    }
    if kept.is_empty() && !items.is_empty() {
        return current.to_vec();
    }
    kept
}

/// Partial patch over [`DraftReport`] fields proposed by an evaluator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedChanges {
    #[serde(default)]
    pub risk_score: Option<i64>,
    #[serde(default)]
    pub risk_factors: Option<Vec<String>>,
    #[serde(default)]
    pub mitigations: Option<Vec<String>>,
}

impl SuggestedChanges {
    pub fn is_empty(&self) -> bool {
        self.risk_score.is_none() && self.risk_factors.is_none() && self.mitigations.is_none()
    }
}

/// Evaluator decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accept,
    Revise,
}

impl Verdict {
    pub fn parse(raw: &str) -> Option<Verdict> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "accept" => Some(Verdict::Accept),
            "revise" => Some(Verdict::Revise),
            _ => None,
        }
    }
}

/// Evaluator output for one draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationVerdict {
    pub verdict: Verdict,
    pub issues: Vec<String>,
    pub suggested_changes: SuggestedChanges,
    pub summary: String,
}

impl EvaluationVerdict {
    pub fn accept(summary: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Accept,
            issues: Vec::new(),
            suggested_changes: SuggestedChanges::default(),
            summary: summary.into(),
        }
    }

    /// Fail-open verdict used when evaluation output cannot be trusted.
    pub fn fail_open() -> Self {
        Self {
            verdict: Verdict::Accept,
            issues: vec!["Evaluator failed to parse output; accepting draft by default".to_string()],
            suggested_changes: SuggestedChanges::default(),
            summary: "Evaluation could not be completed reliably".to_string(),
        }
    }

    pub fn is_accept(&self) -> bool {
        self.verdict == Verdict::Accept
    }
}

/// The response returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub scan_id: Uuid,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<String>,
    pub mitigations: Vec<String>,
    pub evidence: EvidenceBundle,
    pub timestamp: DateTime<Utc>,
}

impl ScanReport {
    pub fn from_draft(scan_id: Uuid, draft: DraftReport, evidence: EvidenceBundle) -> Self {
        Self {
            scan_id,
            risk_score: draft.risk_score,
            risk_level: draft.risk_level,
            risk_factors: draft.risk_factors,
            mitigations: draft.mitigations,
            evidence,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_boundaries() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(30), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(31), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(60), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(61), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(100), RiskLevel::High);
    }

    #[test]
    fn test_new_clamps_score_and_derives_level() {
        let high = DraftReport::new(250, vec![], vec![]);
        assert_eq!(high.risk_score(), 100);
        assert_eq!(high.risk_level(), RiskLevel::High);

        let low = DraftReport::new(-7, vec![], vec![]);
        assert_eq!(low.risk_score(), 0);
        assert_eq!(low.risk_level(), RiskLevel::Low);
    }

    #[test]
    fn test_fallback_shape() {
        let draft = DraftReport::fallback();
        assert_eq!(draft.risk_score(), 0);
        assert_eq!(draft.risk_level(), RiskLevel::Low);
        assert!(draft.risk_factors().is_empty());
        assert_eq!(draft.mitigations().len(), 1);
        assert!(!draft.is_substantive());
    }

    #[test]
    fn test_apply_changes_only_selects_existing_entries() {
        let draft = DraftReport::new(
            40,
            vec![
                "Email found in 2 data breach(es)".to_string(),
                "Public GitHub profile with 3 repositories".to_string(),
            ],
            vec!["Rotate passwords".to_string()],
        );
        let patched = draft.apply_changes(&SuggestedChanges {
            risk_score: Some(25),
            risk_factors: Some(vec![
                "Invented factor".to_string(),
                " Public GitHub profile with 3 repositories ".to_string(),
                "Email found in 2 data breach(es)".to_string(),
                "Email found in 2 data breach(es)".to_string(),
            ]),
            mitigations: None,
        });

        assert_eq!(patched.risk_score(), 25);
        assert_eq!(patched.risk_level(), RiskLevel::Low);
        assert_eq!(
            patched.risk_factors(),
            [
                "Public GitHub profile with 3 repositories",
                "Email found in 2 data breach(es)"
            ]
        );
        assert_eq!(patched.mitigations(), ["Rotate passwords"]);
    }

    #[test]
    fn test_apply_changes_ignores_wholly_foreign_lists() {
        let draft = DraftReport::new(
            20,
            vec!["Email found in 2 data breach(es)".to_string()],
            vec![
                "Change passwords on affected accounts immediately".to_string(),
                "Enable two-factor authentication on all accounts".to_string(),
            ],
        );
        let patched = draft.apply_changes(&SuggestedChanges {
            risk_score: None,
            risk_factors: Some(vec!["Home address and SSN leaked on dark web".to_string()]),
            mitigations: Some(vec!["Wire funds to safe account".to_string()]),
        });

        assert_eq!(patched, draft);
    }

    #[test]
    fn test_apply_changes_empty_list_drops_all() {
        let draft = DraftReport::new(20, vec!["unsupported".to_string()], vec![]);
        let patched = draft.apply_changes(&SuggestedChanges {
            risk_factors: Some(Vec::new()),
            ..Default::default()
        });
        assert!(patched.risk_factors().is_empty());
    }

    #[test]
    fn test_apply_changes_clamps_patched_score() {
        let draft = DraftReport::new(10, vec![], vec![]);
        let patched = draft.apply_changes(&SuggestedChanges {
            risk_score: Some(900),
            ..Default::default()
        });
        assert_eq!(patched.risk_score(), 100);
    }

    #[test]
    fn test_verdict_parse_is_closed() {
        assert_eq!(Verdict::parse("accept"), Some(Verdict::Accept));
        assert_eq!(Verdict::parse(" Revise "), Some(Verdict::Revise));
        assert_eq!(Verdict::parse("maybe"), None);
    }

    #[test]
    fn test_scan_report_wire_names() {
        let report = ScanReport::from_draft(
            Uuid::new_v4(),
            DraftReport::new(45, vec!["x".to_string()], vec!["y".to_string()]),
            EvidenceBundle::new(),
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["riskScore"], 45);
        assert_eq!(json["riskLevel"], "Medium");
        assert_eq!(json["riskFactors"][0], "x");
        assert!(json.get("timestamp").is_some());
        assert!(json.get("evidence").is_some());
    }
}
