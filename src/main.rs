mod classify;
mod cleaner;
mod cli;
mod config;
mod disk_info;
mod error;
mod logging;
mod notify;
mod orchestrator;
mod output;
mod paths;
mod sweeper;
mod target;
mod utils;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info, warn};

use crate::cleaner::FsRemover;
use crate::cli::Cli;
use crate::config::{Config, NotifyConfig};
use crate::notify::{NotifyAdapter, TelegramNotifier};
use crate::orchestrator::{Orchestrator, RunContext, RunMode};
use crate::paths::PlatformPaths;
use crate::target::Targets;

fn build_notifier(config: &NotifyConfig) -> Option<Arc<dyn NotifyAdapter>> {
    let (token, chat_id) = config.credentials()?;
    let timeout = Duration::from_secs(config.timeout_secs);
    match TelegramNotifier::new(&config.api_base, token, chat_id, timeout) {
        Ok(notifier) => Some(Arc::new(notifier)),
        Err(e) => {
            warn!(error = %e, "cannot build telegram client, notifications disabled");
            None
        }
    }
}

/// A path on the volume most targets live on, for the free-space report.
fn space_path(targets: &Targets) -> PathBuf {
    targets
        .ordered()
        .into_iter()
        .map(|t| t.root.clone())
        .find(|root| root.exists())
        .unwrap_or_else(std::env::temp_dir)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Variables already set in the environment win over the file.
    let env_file = dotenvy::dotenv();

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env(|key| std::env::var(key).ok());
    cli.apply(&mut config);

    let _guard = logging::init_logging(&config.logging)?;
    if let Ok(path) = &env_file {
        debug!(path = %path.display(), "loaded environment file");
    }

    let mode = RunMode::from_dry_run(cli.dry_run);
    let targets = config.targets(&PlatformPaths::detect());
    let notifier = if cli.no_notify {
        None
    } else {
        build_notifier(&config.notify)
    };

    let orchestrator = Orchestrator::new(RunContext {
        mode,
        now: SystemTime::now(),
        notifier,
        notify_timeout: Duration::from_secs(config.notify.timeout_secs),
        remover: Box::new(FsRemover),
    });

    output::print_banner(orchestrator.mode());

    let space_root = space_path(&targets);
    if let Some(info) = disk_info::disk_info_for(&space_root) {
        info!(available = %utils::format_size(info.available), "free space before cleanup");
        output::print_disk("Before:", &info);
    }

    let summary = orchestrator.run(&targets);

    if let Some(info) = disk_info::disk_info_for(&space_root) {
        info!(available = %utils::format_size(info.available), "free space after cleanup");
        output::print_disk("After:", &info);
    }
    println!();

    output::print_summary(&summary);

    if cli.no_notify {
        info!("notification disabled by --no-notify");
    } else {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to start async runtime")?;
        let outcome = runtime.block_on(orchestrator.notify(&summary));
        output::print_notify_outcome(&outcome);
    }

    info!(
        freed_mb = %format!("{:.2}", utils::to_mb(summary.total_freed)),
        "Cleanup finished"
    );
    Ok(())
}
