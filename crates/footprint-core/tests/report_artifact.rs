//! Report artifact persistence and tamper detection.

use footprint_core::fakes::StaticProviders;
use footprint_core::{
    read_report_artifact, write_report_artifact, BreachFindings, FootprintError, ScanRequest,
    ScanWorkflow,
};

async fn sample_report() -> footprint_core::ScanReport {
    let providers = StaticProviders {
        breach: BreachFindings {
            found: true,
            sources: vec!["Adobe".to_string()],
        },
        ..Default::default()
    };
    ScanWorkflow::rule_based(providers.into_provider_set(), 2)
        .scan(&ScanRequest {
            email: Some("victim@example.com".to_string()),
            ..Default::default()
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn artifact_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let report = sample_report().await;

    let path = write_report_artifact(&report, dir.path()).unwrap();
    assert!(path.ends_with("report.json"));
    assert!(path
        .parent()
        .unwrap()
        .ends_with(report.scan_id.to_string()));

    let loaded = read_report_artifact(&report.scan_id.to_string(), dir.path()).unwrap();
    assert_eq!(loaded, report);
}

#[tokio::test]
async fn tampered_artifact_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let report = sample_report().await;
    let path = write_report_artifact(&report, dir.path()).unwrap();

    let json = std::fs::read_to_string(&path).unwrap();
    std::fs::write(&path, json.replace("\"riskScore\": 10", "\"riskScore\": 0")).unwrap();

    let err = read_report_artifact(&report.scan_id.to_string(), dir.path()).unwrap_err();
    assert!(matches!(err, FootprintError::DigestMismatch { .. }));
}

#[tokio::test]
async fn scan_id_must_be_a_uuid() {
    let root = tempfile::tempdir().unwrap();
    let artifacts = root.path().join("artifacts");
    let report = sample_report().await;

    // A valid artifact sitting next to the artifact directory.
    let outside = write_report_artifact(&report, root.path()).unwrap();
    std::fs::rename(outside.parent().unwrap(), root.path().join("x")).unwrap();

    for scan_id in ["../x", "..", "x/../../x", ""] {
        let err = read_report_artifact(scan_id, &artifacts).unwrap_err();
        assert!(
            matches!(err, FootprintError::InvalidScanId { .. }),
            "{scan_id}: {err}"
        );
        assert!(err.is_client_error());
    }
}
