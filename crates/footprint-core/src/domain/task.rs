//! The closed task vocabulary and the planner's output.

use serde::{Deserialize, Serialize};

/// Evidence-gathering tasks. This enum is the whitelist: nothing outside it
/// can be dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    CheckBreachExposure,
    AnalyzeGithubPublicData,
    CheckUsernameReuse,
    /// Reserved; accepted by the whitelist but has no provider yet.
    AnalyzeBioExposure,
}

impl Task {
    /// Every whitelisted task, in dispatch order.
    pub const ALL: [Task; 4] = [
        Task::CheckBreachExposure,
        Task::AnalyzeGithubPublicData,
        Task::CheckUsernameReuse,
        Task::AnalyzeBioExposure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Task::CheckBreachExposure => "check_breach_exposure",
            Task::AnalyzeGithubPublicData => "analyze_github_public_data",
            Task::CheckUsernameReuse => "check_username_reuse",
            Task::AnalyzeBioExposure => "analyze_bio_exposure",
        }
    }

    /// Whitelist lookup. Anything that is not an exact task name is `None`.
    pub fn parse(raw: &str) -> Option<Task> {
        Task::ALL.into_iter().find(|t| t.as_str() == raw)
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tasks selected for one request plus diagnostic notes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerOutput {
    pub tasks: Vec<Task>,
    pub notes: Vec<String>,
}

impl PlannerOutput {
    pub fn contains(&self, task: Task) -> bool {
        self.tasks.contains(&task)
    }
}
