//! Deterministic, evidence-backed risk findings.
//!
//! The catalogue below is the single source of which risk factors the
//! evidence supports. The rule-based generator scores from it and the
//! evidence evaluator checks drafts against it.

use crate::domain::{DraftReport, EvidenceBundle};

/// Points per breach, capped at [`BREACH_CAP`].
pub const BREACH_POINTS: i64 = 10;
pub const BREACH_CAP: i64 = 30;
pub const COMMIT_EMAIL_POINTS: i64 = 20;
/// One point per public repository, capped at [`REPO_CAP`].
pub const REPO_CAP: i64 = 15;
/// Points per reuse platform, capped at [`REUSE_CAP`].
pub const REUSE_POINTS: i64 = 5;
pub const REUSE_CAP: i64 = 25;

pub const MITIGATION_CHANGE_PASSWORDS: &str = "Change passwords on affected accounts immediately";
pub const MITIGATION_ENABLE_2FA: &str = "Enable two-factor authentication on all accounts";
pub const MITIGATION_NOREPLY_EMAIL: &str = "Use GitHub's noreply email for future commits";
pub const MITIGATION_SEPARATE_IDENTITIES: &str =
    "Consider using different usernames for professional vs personal accounts";
pub const MITIGATION_GENERAL_HYGIENE: &str =
    "Maintain good security hygiene across all online accounts";
pub const NO_SIGNIFICANT_RISKS: &str = "No significant risks detected";

/// One evidence-backed risk factor with its score contribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub factor: String,
    pub points: i64,
    pub mitigations: Vec<&'static str>,
}

/// Every risk factor the evidence supports, in canonical order.
pub fn findings(evidence: &EvidenceBundle) -> Vec<Finding> {
    let mut out = Vec::new();

    if let Some(email) = &evidence.email {
        let count = email.breach_count();
        if email.found_in_breaches == Some(true) {
            out.push(Finding {
                factor: format!("Email found in {count} data breach(es)"),
                points: (count as i64 * BREACH_POINTS).min(BREACH_CAP),
                mitigations: vec![MITIGATION_CHANGE_PASSWORDS, MITIGATION_ENABLE_2FA],
            });
        }
    }

    if let Some(github) = &evidence.github {
        if github.commit_email_exposed == Some(true) {
            out.push(Finding {
                factor: "Email address exposed in public GitHub commits".to_string(),
                points: COMMIT_EMAIL_POINTS,
                mitigations: vec![MITIGATION_NOREPLY_EMAIL],
            });
        }
        if let Some(repos) = github.public_repos.filter(|r| *r > 0) {
            out.push(Finding {
                factor: format!("Public GitHub profile with {repos} repositories"),
                points: i64::from(repos).min(REPO_CAP),
                mitigations: Vec::new(),
            });
        }
    }

    if let Some(username) = &evidence.username {
        if username.reuse_count > 0 {
            out.push(Finding {
                factor: format!(
                    "Username reused across {} platforms: {}",
                    username.reuse_count,
                    username.platforms.join(", ")
                ),
                points: (i64::from(username.reuse_count) * REUSE_POINTS).min(REUSE_CAP),
                mitigations: vec![MITIGATION_SEPARATE_IDENTITIES],
            });
        }
    }

    out
}

/// Build a complete draft from the evidence alone.
pub fn assess(evidence: &EvidenceBundle) -> DraftReport {
    let found = findings(evidence);
    let score: i64 = found.iter().map(|f| f.points).sum();

    let mut factors: Vec<String> = found.iter().map(|f| f.factor.clone()).collect();
    let mut mitigations: Vec<String> = Vec::new();
    for m in found.iter().flat_map(|f| f.mitigations.iter()) {
        if !mitigations.iter().any(|existing| existing == m) {
            mitigations.push((*m).to_string());
        }
    }

    if factors.is_empty() {
        factors.push(NO_SIGNIFICANT_RISKS.to_string());
    }
    if mitigations.is_empty() {
        mitigations.push(MITIGATION_GENERAL_HYGIENE.to_string());
    }

    DraftReport::new(score, factors, mitigations)
}
