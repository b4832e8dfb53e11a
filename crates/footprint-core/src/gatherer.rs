//! Evidence gathering with per-task failure isolation.
//!
//! Each selected task runs on its own tokio task. Provider errors, timeouts
//! and panics are converted into annotated [`EvidenceRecord`]s at this
//! boundary; the bundle returned to the caller has one record per dispatched
//! task and is only returned once every dispatched task has finished.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

use crate::capability::{BreachLookup, ProfileFetch, UsernameReuseCheck};
use crate::domain::{
    EmailEvidence, EvidenceBundle, EvidenceRecord, GithubEvidence, NormalizedInput,
    PlannerOutput, Task, UsernameEvidence,
};
use crate::metrics::METRICS;
use crate::obs;

/// The three capability providers used by the gatherer.
#[derive(Clone)]
pub struct ProviderSet {
    pub breach: Arc<dyn BreachLookup>,
    pub profile: Arc<dyn ProfileFetch>,
    pub reuse: Arc<dyn UsernameReuseCheck>,
}

/// Dispatches planned tasks to providers.
#[derive(Clone)]
pub struct EvidenceGatherer {
    providers: ProviderSet,
    task_timeout: Option<Duration>,
}

/// One spawned provider call plus the record to use if the task itself dies.
struct Dispatched {
    handle: JoinHandle<EvidenceRecord>,
    on_abort: Box<dyn FnOnce(String) -> EvidenceRecord + Send>,
}

impl EvidenceGatherer {
    pub fn new(providers: ProviderSet) -> Self {
        Self {
            providers,
            task_timeout: None,
        }
    }

    /// Bound each provider call; an elapsed call becomes an annotated record.
    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = Some(timeout);
        self
    }

    #[instrument(skip_all, fields(tasks = plan.tasks.len()))]
    pub async fn gather(&self, plan: &PlannerOutput, input: &NormalizedInput) -> EvidenceBundle {
        let started = Instant::now();
        let mut dispatched = Vec::new();

        for task in &plan.tasks {
            match self.dispatch(*task, input) {
                Some(d) => dispatched.push(d),
                None => debug!(task = %task, "task has no provider or missing input; skipped"),
            }
        }

        let (handles, on_aborts): (Vec<_>, Vec<_>) = dispatched
            .into_iter()
            .map(|d| (d.handle, d.on_abort))
            .unzip();
        let joined = join_all(handles).await;

        let mut bundle = EvidenceBundle::new();
        for (joined, on_abort) in joined.into_iter().zip(on_aborts) {
            let record = match joined {
                Ok(record) => record,
                Err(join_err) => on_abort(format!("provider task aborted: {join_err}")),
            };
            if let Some(err) = record.error() {
                obs::emit_provider_failed(record.domain(), &err);
                METRICS.inc_provider_failures();
            }
            bundle.insert(record);
        }

        obs::emit_stage_completed("gather", started.elapsed().as_millis() as u64);
        bundle
    }

    fn dispatch(&self, task: Task, input: &NormalizedInput) -> Option<Dispatched> {
        match task {
            Task::CheckBreachExposure => {
                let email = input.email()?.to_string();
                let provider = Arc::clone(&self.providers.breach);
                let value = email.clone();
                Some(self.spawn(
                    async move {
                        let result = provider.lookup(&email).await;
                        match result {
                            Ok(found) => EvidenceRecord::Email(EmailEvidence {
                                value: email,
                                found_in_breaches: Some(found.found),
                                breach_sources: found.sources,
                                error: None,
                            }),
                            Err(e) => EvidenceRecord::Email(EmailEvidence::failed(&email, e)),
                        }
                    },
                    move |err| EvidenceRecord::Email(EmailEvidence::failed(&value, err)),
                ))
            }
            Task::AnalyzeGithubPublicData => {
                let username = input.username()?.to_string();
                let provider = Arc::clone(&self.providers.profile);
                let value = username.clone();
                Some(self.spawn(
                    async move {
                        let result = provider.fetch(&username).await;
                        match result {
                            Ok(profile) => EvidenceRecord::Github(GithubEvidence {
                                username,
                                public_repos: Some(profile.public_repo_count),
                                commit_email_exposed: Some(profile.commit_email_exposed),
                                error: None,
                            }),
                            Err(e) => EvidenceRecord::Github(GithubEvidence::failed(&username, e)),
                        }
                    },
                    move |err| EvidenceRecord::Github(GithubEvidence::failed(&value, err)),
                ))
            }
            Task::CheckUsernameReuse => {
                let username = input.username()?.to_string();
                let provider = Arc::clone(&self.providers.reuse);
                let value = username.clone();
                Some(self.spawn(
                    async move {
                        let result = provider.check(&username).await;
                        match result {
                            Ok(reuse) => EvidenceRecord::Username(UsernameEvidence {
                                value: username,
                                reuse_count: reuse.reuse_count,
                                platforms: reuse.platforms,
                                error: None,
                            }),
                            Err(e) => {
                                EvidenceRecord::Username(UsernameEvidence::failed(&username, e))
                            }
                        }
                    },
                    move |err| EvidenceRecord::Username(UsernameEvidence::failed(&value, err)),
                ))
            }
            Task::AnalyzeBioExposure => None,
        }
    }

    fn spawn<Fut, A>(&self, call: Fut, on_abort: A) -> Dispatched
    where
        Fut: Future<Output = EvidenceRecord> + Send + 'static,
        A: FnOnce(String) -> EvidenceRecord + Send + Clone + 'static,
    {
        let timeout = self.task_timeout;
        let on_timeout = on_abort.clone();
        let handle = tokio::spawn(async move {
            match timeout {
                Some(limit) => match tokio::time::timeout(limit, call).await {
                    Ok(record) => record,
                    Err(_) => on_timeout(format!(
                        "provider call timed out after {}ms",
                        limit.as_millis()
                    )),
                },
                None => call.await,
            }
        });
        Dispatched {
            handle,
            on_abort: Box::new(on_abort),
        }
    }
}
