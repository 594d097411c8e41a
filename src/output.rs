use colored::Colorize;

use crate::disk_info::DiskInfo;
use crate::orchestrator::{NotifyOutcome, RunMode, RunSummary, TargetOutcome};
use crate::utils;

pub fn print_banner(mode: RunMode) {
    println!("{}", "reclaim - disk cleanup".bold().cyan());
    if mode.is_dry_run() {
        println!(
            "{}",
            "Dry run: nothing will be deleted.".yellow().bold()
        );
    }
    println!();
}

pub fn print_disk(label: &str, info: &DiskInfo) {
    println!(
        "  {:<12} {} free of {} ({:.0}% used)",
        label,
        utils::format_size(info.available).green(),
        utils::format_size(info.total),
        info.usage_percent() * 100.0
    );
}

fn print_target_row(outcome: &TargetOutcome, mode: RunMode) {
    let result = &outcome.result;
    let size = if mode.is_dry_run() {
        format!("{} reclaimable", utils::format_size(result.planned_bytes))
    } else {
        format!("{} freed", utils::format_size(result.bytes_freed))
    };
    let errors = if result.errors.is_empty() {
        String::new()
    } else {
        format!("  {} error(s)", result.errors.len()).red().to_string()
    };
    println!(
        "  {:<30} {}{}",
        outcome.label,
        size.green(),
        errors
    );
    println!("  {}", utils::display_path(&outcome.root).dimmed());
}

pub fn print_summary(summary: &RunSummary) {
    println!("{}", "=== Summary ===".bold().white());
    for outcome in &summary.outcomes {
        print_target_row(outcome, summary.mode);
    }
    println!("  {}", "─".repeat(45).dimmed());

    if summary.mode.is_dry_run() {
        println!(
            "  {:<30} {}",
            "Total reclaimable:".bold(),
            utils::format_size(summary.total_planned).green().bold()
        );
    } else {
        println!(
            "  {:<30} {}",
            "Total freed:".bold(),
            utils::format_size(summary.total_freed).green().bold()
        );
    }
    println!();

    if !summary.errors.is_empty() {
        println!("{}", "Errors:".red().bold());
        for err in &summary.errors {
            println!("  {} {}", "Failed".red().bold(), err.to_string().dimmed());
        }
        println!();
    }

    if summary.mode.is_dry_run() {
        println!(
            "{}",
            "This was a dry run. Run without --dry-run to delete."
                .yellow()
                .bold()
        );
    }
}

pub fn print_notify_outcome(outcome: &NotifyOutcome) {
    match outcome {
        NotifyOutcome::Sent => println!("{} notification sent", "Info:".cyan().bold()),
        NotifyOutcome::SkippedDryRun => {}
        NotifyOutcome::Unconfigured => println!(
            "{} notification not sent: bot token or chat id missing",
            "Warning:".red().bold()
        ),
        NotifyOutcome::Failed(reason) => println!(
            "{} notification failed: {}",
            "Warning:".red().bold(),
            reason.red()
        ),
    }
}
