//! Ordered step executor with per-step failure policy.
//!
//! A [`Workflow`] runs its steps strictly in sequence against a shared context.
//! A failing `Abort` step stops the run and its error is returned; a failing
//! `LogAndContinue` step is logged and recorded, and the run goes on. The
//! result is a [`SyncReport`] naming what happened to every step.

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::error::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// The operation cannot produce a result without this step.
    Abort,
    /// Best effort: record the failure and keep going.
    LogAndContinue,
}

#[async_trait::async_trait]
pub trait Step<C: Send>: Send + Sync {
    fn name(&self) -> &'static str;

    fn policy(&self) -> FailurePolicy;

    /// `Some(reason)` when the step has nothing to do for this context.
    fn skip_reason(&self, _ctx: &C) -> Option<String> {
        None
    }

    async fn execute(&self, ctx: &mut C) -> Result<(), SyncError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum StepOutcome {
    Succeeded,
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub name: &'static str,
    pub outcome: StepOutcome,
}

/// What happened to each step of one run, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub steps: Vec<StepRecord>,
}

impl SyncReport {
    pub fn outcome(&self, name: &str) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|record| record.name == name)
            .map(|record| &record.outcome)
    }

    /// Names of the steps that failed.
    pub fn failed(&self) -> Vec<&'static str> {
        self.steps
            .iter()
            .filter(|record| matches!(record.outcome, StepOutcome::Failed(_)))
            .map(|record| record.name)
            .collect()
    }

    /// Whether any best-effort step failed, i.e. the remote record may be only
    /// partially configured.
    pub fn is_degraded(&self) -> bool {
        !self.failed().is_empty()
    }

    fn record(&mut self, name: &'static str, outcome: StepOutcome) {
        self.steps.push(StepRecord { name, outcome });
    }
}

pub struct Workflow<C: Send> {
    steps: Vec<Box<dyn Step<C>>>,
}

impl<C: Send> Default for Workflow<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Send> Workflow<C> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn then(mut self, step: impl Step<C> + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub async fn run(&self, ctx: &mut C) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::default();

        for step in &self.steps {
            let name = step.name();

            if let Some(reason) = step.skip_reason(ctx) {
                debug!(step = name, reason = %reason, "step skipped");
                report.record(name, StepOutcome::Skipped(reason));
                continue;
            }

            match step.execute(ctx).await {
                Ok(()) => {
                    debug!(step = name, "step succeeded");
                    report.record(name, StepOutcome::Succeeded);
                }
                Err(e) => match step.policy() {
                    FailurePolicy::Abort => {
                        error!(step = name, error = %e, "step failed; aborting");
                        return Err(e);
                    }
                    FailurePolicy::LogAndContinue => {
                        warn!(step = name, error = %e, "step failed; continuing");
                        report.record(name, StepOutcome::Failed(e.to_string()));
                    }
                },
            }
        }

        Ok(report)
    }
}
