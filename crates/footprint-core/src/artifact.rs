//! Persisted scan reports with a SHA-256 integrity digest.
//!
//! Layout: `<dir>/<scan_id>/report.json` plus `<dir>/<scan_id>/report.digest`.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::{FootprintError, Result, ScanReport};

pub const REPORT_FILE: &str = "report.json";
pub const DIGEST_FILE: &str = "report.digest";

/// Lowercase hex SHA-256 of `bytes`.
pub fn content_digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Write the report and its digest; returns the report path.
pub fn write_report_artifact(report: &ScanReport, dir: &Path) -> Result<PathBuf> {
    let scan_dir = dir.join(report.scan_id.to_string());
    std::fs::create_dir_all(&scan_dir)?;

    let report_path = scan_dir.join(REPORT_FILE);
    let json = serde_json::to_vec_pretty(report)?;
    std::fs::write(&report_path, &json)?;
    std::fs::write(scan_dir.join(DIGEST_FILE), content_digest(&json).as_bytes())?;

    tracing::debug!(path = %report_path.display(), "report artifact written");
    Ok(report_path)
}

/// Read `<dir>/<scan_id>/report.json` and verify it against its digest.
///
/// `scan_id` must be a UUID; anything else is rejected before touching the
/// filesystem.
pub fn read_report_artifact(scan_id: &str, dir: &Path) -> Result<ScanReport> {
    let scan_id = Uuid::parse_str(scan_id.trim()).map_err(|_| FootprintError::InvalidScanId {
        value: scan_id.to_string(),
    })?;
    let scan_dir = dir.join(scan_id.to_string());
    let json = std::fs::read(scan_dir.join(REPORT_FILE))?;
    let expected = std::fs::read_to_string(scan_dir.join(DIGEST_FILE))?;

    let actual = content_digest(&json);
    if expected.trim() != actual {
        return Err(FootprintError::DigestMismatch {
            expected: expected.trim().to_string(),
            actual,
        });
    }

    Ok(serde_json::from_slice(&json)?)
}
