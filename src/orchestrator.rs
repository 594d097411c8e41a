use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tracing::{error, info, warn};

use crate::cleaner::{Remover, SweepResult};
use crate::error::{NotifyError, SweepError};
use crate::notify::NotifyAdapter;
use crate::sweeper::Sweeper;
use crate::target::Targets;
use crate::utils;

/// Errors listed in the notification before the rest are summarised.
const MAX_LISTED_ERRORS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    DryRun,
    Real,
}

impl RunMode {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            RunMode::DryRun
        } else {
            RunMode::Real
        }
    }

    pub fn is_dry_run(&self) -> bool {
        matches!(self, RunMode::DryRun)
    }
}

/// Everything a run needs from the outside world.
pub struct RunContext {
    pub mode: RunMode,
    /// Reference time for age cutoffs.
    pub now: SystemTime,
    /// `None` when no notification transport is configured.
    pub notifier: Option<Arc<dyn NotifyAdapter>>,
    pub notify_timeout: Duration,
    pub remover: Box<dyn Remover>,
}

#[derive(Debug, Clone)]
pub struct TargetOutcome {
    pub label: String,
    pub root: PathBuf,
    pub result: SweepResult,
}

/// Aggregate outcome of one run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub mode: RunMode,
    pub total_freed: u64,
    pub total_planned: u64,
    pub errors: Vec<SweepError>,
    pub outcomes: Vec<TargetOutcome>,
}

impl RunSummary {
    fn new(mode: RunMode) -> Self {
        Self {
            mode,
            total_freed: 0,
            total_planned: 0,
            errors: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    /// Text of the end-of-run notification.
    pub fn message(&self) -> String {
        let mut message = format!(
            "Cleanup finished. Freed: {:.2} MB.",
            utils::to_mb(self.total_freed)
        );
        if !self.errors.is_empty() {
            let mut listed: Vec<String> = self
                .errors
                .iter()
                .take(MAX_LISTED_ERRORS)
                .map(ToString::to_string)
                .collect();
            if self.errors.len() > MAX_LISTED_ERRORS {
                listed.push(format!("and {} more", self.errors.len() - MAX_LISTED_ERRORS));
            }
            message.push_str(&format!("\nErrors: {}", listed.join(", ")));
        }
        message
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    SkippedDryRun,
    Unconfigured,
    Failed(String),
}

/// Sweeps every target in order and reports the result.
pub struct Orchestrator {
    ctx: RunContext,
}

impl Orchestrator {
    pub fn new(ctx: RunContext) -> Self {
        Self { ctx }
    }

    pub fn mode(&self) -> RunMode {
        self.ctx.mode
    }

    /// Sweep all targets sequentially. Never stops early: a target that
    /// fails as a whole is recorded and the next one is processed.
    pub fn run(&self, targets: &Targets) -> RunSummary {
        let dry_run = self.ctx.mode.is_dry_run();
        let sweeper = Sweeper::new(self.ctx.remover.as_ref(), self.ctx.now);
        let mut summary = RunSummary::new(self.ctx.mode);

        info!(dry_run, targets = targets.ordered().len(), "cleanup started");

        for target in targets.ordered() {
            let result = match sweeper.sweep(target, dry_run) {
                Ok(result) => result,
                Err(e) => {
                    error!(target = %target.label, error = %e, "sweep failed");
                    summary.errors.push(e.into());
                    continue;
                }
            };

            summary.total_freed += result.bytes_freed;
            summary.total_planned += result.planned_bytes;
            summary.errors.extend(result.errors.iter().cloned());
            summary.outcomes.push(TargetOutcome {
                label: target.label.clone(),
                root: target.root.clone(),
                result,
            });
        }

        info!(
            freed_mb = %format!("{:.2}", utils::to_mb(summary.total_freed)),
            planned = %utils::format_size(summary.total_planned),
            errors = summary.errors.len(),
            "cleanup finished"
        );
        summary
    }

    /// Deliver the summary message once. Failures are logged, never raised.
    pub async fn notify(&self, summary: &RunSummary) -> NotifyOutcome {
        if self.ctx.mode.is_dry_run() {
            info!("dry run, notification skipped");
            return NotifyOutcome::SkippedDryRun;
        }
        let Some(notifier) = &self.ctx.notifier else {
            warn!("notification not sent: bot token or chat id missing");
            return NotifyOutcome::Unconfigured;
        };

        let message = summary.message();
        let timeout = self.ctx.notify_timeout;
        let sent = match tokio::time::timeout(timeout, notifier.notify(&message)).await {
            Ok(sent) => sent,
            Err(_) => Err(NotifyError::Timeout(timeout)),
        };

        match sent {
            Ok(()) => {
                info!("notification sent");
                NotifyOutcome::Sent
            }
            Err(e) => {
                error!(error = %e, "notification failed");
                NotifyOutcome::Failed(e.to_string())
            }
        }
    }
}
