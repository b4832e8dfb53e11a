//! Task planning.
//!
//! Both strategies end in [`whitelist_tasks`]: whatever the selection source,
//! only members of the closed [`Task`] set survive, and an empty plan is
//! reported through a note instead of an error.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::domain::{NormalizedInput, PlannerOutput, Task};
use crate::judgment::{parse_judgment, JudgmentEngine};
use crate::metrics::METRICS;
use crate::obs;

/// Note appended when no valid task survives filtering.
pub const NO_VALID_TASKS_NOTE: &str = "No valid tasks selected by planner";

/// Task selection source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlannerStrategy {
    /// Field presence determines the tasks.
    #[default]
    Deterministic,
    /// The judgment engine proposes tasks; the whitelist filters them.
    Judgment,
}

impl std::str::FromStr for PlannerStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deterministic" | "rules" => Ok(PlannerStrategy::Deterministic),
            "judgment" | "llm" => Ok(PlannerStrategy::Judgment),
            other => Err(format!("unknown planner strategy: {other}")),
        }
    }
}

/// Selects evidence-gathering tasks for one request.
#[derive(Clone)]
pub enum TaskPlanner {
    Deterministic,
    Judgment(Arc<dyn JudgmentEngine>),
}

#[derive(Debug, Deserialize)]
struct RawPlan {
    #[serde(default)]
    tasks: Vec<serde_json::Value>,
    #[serde(default)]
    notes: Vec<serde_json::Value>,
}

impl TaskPlanner {
    pub async fn plan(&self, input: &NormalizedInput) -> PlannerOutput {
        match self {
            TaskPlanner::Deterministic => plan_deterministic(input),
            TaskPlanner::Judgment(engine) => plan_with_judgment(engine.as_ref(), input).await,
        }
    }
}

/// Email implies a breach check; a username implies profile and reuse checks.
pub fn plan_deterministic(input: &NormalizedInput) -> PlannerOutput {
    let mut names = Vec::new();
    if input.email().is_some() {
        names.push(Task::CheckBreachExposure.as_str().to_string());
    }
    if input.username().is_some() {
        names.push(Task::AnalyzeGithubPublicData.as_str().to_string());
        names.push(Task::CheckUsernameReuse.as_str().to_string());
    }
    whitelist_tasks(names, Vec::new())
}

/// Keep only whitelisted, de-duplicated tasks in first-seen order.
pub fn whitelist_tasks<I>(raw: I, mut notes: Vec<String>) -> PlannerOutput
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut tasks: Vec<Task> = Vec::new();
    for name in raw {
        match Task::parse(name.as_ref()) {
            Some(task) if !tasks.contains(&task) => tasks.push(task),
            Some(_) => {}
            None => debug!(task = %name.as_ref(), "dropping task outside whitelist"),
        }
    }
    if tasks.is_empty() {
        notes.push(NO_VALID_TASKS_NOTE.to_string());
    }
    PlannerOutput { tasks, notes }
}

#[instrument(skip_all)]
async fn plan_with_judgment(engine: &dyn JudgmentEngine, input: &NormalizedInput) -> PlannerOutput {
    let prompt = planner_prompt(input);
    METRICS.inc_judgment_calls();

    let raw = match engine.complete(&prompt).await {
        Ok(raw) => raw,
        Err(e) => {
            obs::emit_judgment_fallback("planner", &e);
            METRICS.inc_judgment_fallbacks();
            return PlannerOutput {
                tasks: Vec::new(),
                notes: vec![format!("Planner judgment call failed: {e}")],
            };
        }
    };

    match parse_judgment::<RawPlan>(&raw) {
        Ok(plan) => {
            let names: Vec<String> = plan
                .tasks
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
            let notes = plan
                .notes
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
            whitelist_tasks(names, notes)
        }
        Err(e) => {
            obs::emit_judgment_fallback("planner", &e);
            METRICS.inc_judgment_fallbacks();
            PlannerOutput {
                tasks: Vec::new(),
                notes: vec!["Planner LLM returned invalid JSON".to_string()],
            }
        }
    }
}

fn planner_prompt(input: &NormalizedInput) -> String {
    let allowed: Vec<&str> = Task::ALL.iter().map(Task::as_str).collect();
    let input_json = serde_json::to_string_pretty(input).unwrap_or_else(|_| "{}".to_string());
    format!(
        r#"You are a planner agent for a cyber risk analysis system.

Your ONLY job:
- Look at the user input
- Decide which analysis tasks apply

STRICT RULES:
- You may ONLY select tasks from the allowed list below
- Do NOT invent new tasks
- Do NOT explain your reasoning
- Do NOT use markdown or code blocks
- Output MUST be valid JSON and nothing else

Allowed tasks:
{allowed:?}

User input:
{input_json}

Return JSON in EXACTLY this format:
{{
  "tasks": [string],
  "notes": [string]
}}
"#
    )
}
