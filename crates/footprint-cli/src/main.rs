//! FootprintGuard CLI
//!
//! The `footprint` command runs exposure scans from the terminal.
//!
//! ## Commands
//!
//! - `scan`: Run one scan and print the report
//! - `show`: Print a recorded report after verifying its digest
//! - `tools`: List the evidence tools and their status

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};

use footprint_core::telemetry::{init_tracing, LogFormat};
use footprint_core::{
    read_report_artifact, tool_catalog, write_report_artifact, ScanReport, ScanRequest,
    ScanWorkflow, WorkflowConfig,
};
use footprint_providers::{http_provider_set, lazy_gemini, ProviderConfig};

const DEFAULT_ARTIFACTS_DIR: &str = ".footprint/scans";

#[derive(Parser)]
#[command(name = "footprint")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "FootprintGuard digital footprint scanner", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan an identity and print its risk report
    Scan {
        /// GitHub username
        #[arg(long)]
        github: Option<String>,

        /// Email address
        #[arg(long)]
        email: Option<String>,

        /// Comma-separated social handles
        #[arg(long)]
        handles: Option<String>,

        /// Full name
        #[arg(long)]
        name: Option<String>,

        /// Report format on stdout
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,

        /// Record the report as a digest-checked artifact
        #[arg(long)]
        record: bool,

        /// Artifact directory (default: .footprint/scans)
        #[arg(long)]
        artifacts_dir: Option<PathBuf>,
    },

    /// Print a recorded report by scan ID
    Show {
        /// Scan ID
        scan_id: String,

        /// Artifact directory (default: .footprint/scans)
        #[arg(long)]
        artifacts_dir: Option<PathBuf>,

        /// Report format on stdout
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },

    /// List evidence tools
    Tools,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    init_tracing(LogFormat::resolve(cli.json), level);

    match cli.command {
        Commands::Scan {
            github,
            email,
            handles,
            name,
            format,
            record,
            artifacts_dir,
        } => {
            let request = ScanRequest {
                github_username: github,
                email,
                social_handles: handles,
                full_name: name,
            };
            let workflow = build_workflow()?;
            let artifacts = record.then(|| artifacts_root(artifacts_dir.as_deref()));
            let report = cmd_scan(&workflow, &request, artifacts.as_deref()).await?;
            println!("{}", render(&report, format)?);
            Ok(())
        }
        Commands::Show {
            scan_id,
            artifacts_dir,
            format,
        } => {
            let report = cmd_show(&scan_id, &artifacts_root(artifacts_dir.as_deref()))?;
            println!("{}", render(&report, format)?);
            Ok(())
        }
        Commands::Tools => {
            println!("{}", render_tools());
            Ok(())
        }
    }
}

fn build_workflow() -> Result<ScanWorkflow> {
    let workflow_config = WorkflowConfig::from_env().context("Invalid workflow configuration")?;
    let provider_config = ProviderConfig::from_env();
    let providers =
        http_provider_set(&provider_config).context("Failed to build provider clients")?;
    ScanWorkflow::from_config(&workflow_config, providers, lazy_gemini(&provider_config))
        .context("Failed to assemble scan workflow")
}

fn artifacts_root(dir: Option<&Path>) -> PathBuf {
    dir.map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACTS_DIR))
}

async fn cmd_scan(
    workflow: &ScanWorkflow,
    request: &ScanRequest,
    artifacts_dir: Option<&Path>,
) -> Result<ScanReport> {
    let report = workflow.scan(request).await.context("Scan failed")?;

    if let Some(dir) = artifacts_dir {
        let path = write_report_artifact(&report, dir)
            .with_context(|| format!("Failed to record report under {:?}", dir))?;
        info!(scan_id = %report.scan_id, path = %path.display(), "report recorded");
    }
    Ok(report)
}

fn cmd_show(scan_id: &str, artifacts_dir: &Path) -> Result<ScanReport> {
    read_report_artifact(scan_id, artifacts_dir)
        .with_context(|| format!("Failed to load recorded scan {}", scan_id))
}

fn render(report: &ScanReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Json => {
            serde_json::to_string_pretty(report).context("Failed to serialize report")
        }
        ReportFormat::Text => Ok(render_text(report)),
    }
}

fn render_text(report: &ScanReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("Scan:       {}\n", report.scan_id));
    out.push_str(&format!(
        "Risk:       {} ({}/100)\n",
        report.risk_level.as_str(),
        report.risk_score
    ));
    out.push_str(&format!("Timestamp:  {}\n", report.timestamp.to_rfc3339()));

    out.push_str("\nRisk factors:\n");
    for factor in &report.risk_factors {
        out.push_str(&format!("  - {}\n", factor));
    }

    out.push_str("\nMitigations:\n");
    for mitigation in &report.mitigations {
        out.push_str(&format!("  - {}\n", mitigation));
    }
    out.trim_end().to_string()
}

fn render_tools() -> String {
    tool_catalog()
        .iter()
        .map(|tool| format!("{:<26} {:<12} {}", tool.name, tool.status, tool.description))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use footprint_core::fakes::StaticProviders;
    use footprint_core::{ProfileSummary, RiskLevel};

    fn workflow() -> ScanWorkflow {
        let providers = StaticProviders {
            profile: ProfileSummary {
                public_repo_count: 4,
                commit_email_exposed: true,
            },
            ..Default::default()
        };
        ScanWorkflow::rule_based(providers.into_provider_set(), 2)
    }

    fn octocat() -> ScanRequest {
        ScanRequest {
            github_username: Some("octocat".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_scan_records_and_show_replays() {
        let dir = tempfile::tempdir().unwrap();

        let report = cmd_scan(&workflow(), &octocat(), Some(dir.path()))
            .await
            .unwrap();
        assert_eq!(report.risk_score, 24);
        assert_eq!(report.risk_level, RiskLevel::Low);

        let replayed = cmd_show(&report.scan_id.to_string(), dir.path()).unwrap();
        assert_eq!(replayed, report);
    }

    #[tokio::test]
    async fn test_scan_without_record_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        cmd_scan(&workflow(), &octocat(), None).await.unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_empty_scan_is_rejected() {
        let err = cmd_scan(&workflow(), &ScanRequest::default(), None)
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("must be provided"));
    }

    #[test]
    fn test_show_unknown_scan_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(cmd_show("no-such-scan", dir.path()).is_err());
    }

    #[tokio::test]
    async fn test_show_refuses_paths_outside_artifacts_dir() {
        let root = tempfile::tempdir().unwrap();
        let report = cmd_scan(&workflow(), &octocat(), Some(root.path()))
            .await
            .unwrap();
        let artifacts = root.path().join("scans");

        let escaped = format!("../{}", report.scan_id);
        let err = cmd_show(&escaped, &artifacts).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid scan id"));
    }

    #[tokio::test]
    async fn test_render_formats() {
        let report = cmd_scan(&workflow(), &octocat(), None).await.unwrap();

        let text = render(&report, ReportFormat::Text).unwrap();
        assert!(text.contains("Risk:       Low (24/100)"));
        assert!(text.contains("exposed in public GitHub commits"));

        let json: serde_json::Value =
            serde_json::from_str(&render(&report, ReportFormat::Json).unwrap()).unwrap();
        assert_eq!(json["riskScore"], 24);
    }

    #[test]
    fn test_tools_listing() {
        let listing = render_tools();
        assert_eq!(listing.lines().count(), 3);
        assert!(listing.contains("LeakCheck"));
    }

    #[test]
    fn test_cli_parses_scan_flags() {
        let cli = Cli::try_parse_from([
            "footprint", "scan", "--github", "octo", "--format", "json", "--record",
        ])
        .unwrap();
        match cli.command {
            Commands::Scan {
                github,
                format,
                record,
                ..
            } => {
                assert_eq!(github.as_deref(), Some("octo"));
                assert_eq!(format, ReportFormat::Json);
                assert!(record);
            }
            _ => panic!("expected scan"),
        }
    }
}
