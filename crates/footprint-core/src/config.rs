//! Workflow configuration.
//!
//! Read from the environment once at startup; binaries may override
//! individual fields from command-line flags.

use std::time::Duration;

use crate::domain::{FootprintError, Result};
use crate::planner::PlannerStrategy;
use crate::revision::DEFAULT_MAX_REVISIONS;

pub const MAX_REVISIONS_ENV: &str = "FOOTPRINT_MAX_REVISIONS";
pub const PLANNER_ENV: &str = "FOOTPRINT_PLANNER";
pub const ENGINE_MODE_ENV: &str = "FOOTPRINT_ENGINE";
pub const TASK_TIMEOUT_ENV: &str = "FOOTPRINT_TASK_TIMEOUT_SECS";

/// Which generator/evaluator pair the workflow uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineMode {
    /// Judgment stages when an engine is available, rule-based otherwise.
    #[default]
    Auto,
    Rules,
    Judgment,
}

impl std::str::FromStr for EngineMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(EngineMode::Auto),
            "rules" | "deterministic" => Ok(EngineMode::Rules),
            "judgment" | "llm" => Ok(EngineMode::Judgment),
            other => Err(format!("unknown engine mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
    pub max_revisions: u32,
    pub planner: PlannerStrategy,
    pub engine_mode: EngineMode,
    /// Per-provider-call bound enforced by the gatherer.
    pub task_timeout: Option<Duration>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_revisions: DEFAULT_MAX_REVISIONS,
            planner: PlannerStrategy::default(),
            engine_mode: EngineMode::default(),
            task_timeout: None,
        }
    }
}

impl WorkflowConfig {
    /// Load from `FOOTPRINT_*` environment variables; unset keys keep defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(MAX_REVISIONS_ENV) {
            config.max_revisions = raw.trim().parse().map_err(|_| {
                FootprintError::Config(format!("{MAX_REVISIONS_ENV} must be a non-negative integer, got {raw:?}"))
            })?;
        }
        if let Some(raw) = lookup(PLANNER_ENV) {
            config.planner = raw.parse().map_err(FootprintError::Config)?;
        }
        if let Some(raw) = lookup(ENGINE_MODE_ENV) {
            config.engine_mode = raw.parse().map_err(FootprintError::Config)?;
        }
        if let Some(raw) = lookup(TASK_TIMEOUT_ENV) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                FootprintError::Config(format!("{TASK_TIMEOUT_ENV} must be whole seconds, got {raw:?}"))
            })?;
            config.task_timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }
}
