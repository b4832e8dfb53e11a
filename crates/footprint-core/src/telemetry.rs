//! Tracing setup for the FootprintGuard binaries.
//!
//! `RUST_LOG` wins when set. Otherwise FootprintGuard's own crates log at the
//! requested level and dependencies (hyper, reqwest, axum) only at `warn`.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// `FOOTPRINT_LOG_FORMAT=json` selects JSON log lines.
pub const LOG_FORMAT_ENV: &str = "FOOTPRINT_LOG_FORMAT";

const OWN_TARGETS: [&str; 4] = ["footprint_core", "footprint_providers", "footprintd", "footprint"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// `Json` if the flag is set or the environment asks for it.
    pub fn resolve(json_flag: bool) -> Self {
        let from_env = std::env::var(LOG_FORMAT_ENV)
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if json_flag || from_env {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

fn default_directives(level: Level) -> String {
    let mut directives: Vec<String> = OWN_TARGETS
        .iter()
        .map(|target| format!("{target}={}", level.as_str().to_ascii_lowercase()))
        .collect();
    directives.push("warn".to_string());
    directives.join(",")
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_tracing(format: LogFormat, level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Json => registry
            .with(fmt::layer().with_target(false).json())
            .try_init(),
        LogFormat::Text => registry.with(fmt::layer().with_target(false)).try_init(),
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
