//! Job command handlers
//!
//! Starting, observing and stopping the server's sending job.

use anyhow::{Context, Result};
use chrono::Local;
use colored::*;
use courier_client::CourierClient;
use courier_core::domain::job::{JobPhase, JobProgress};
use courier_core::domain::log::{LogEntry, LogLevel};
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

use crate::config::Config;

/// Upload recipients and start a job
pub async fn send(
    config: &Config,
    recipients: &Path,
    attachment: Option<&Path>,
    follow: bool,
) -> Result<()> {
    let client = CourierClient::new(&config.server_url);
    let accepted = client
        .send_recipients(recipients, attachment)
        .await
        .context("Failed to start sending process")?;

    println!("{} {}", "✓".green(), accepted.message);
    println!("  Job:        {}", accepted.job_id.to_string().cyan());
    println!("  Recipients: {}", accepted.total_recipients);

    if follow {
        println!();
        follow_logs(&client, Duration::from_secs(2)).await?;
    }

    Ok(())
}

/// Print the live progress snapshot
pub async fn progress(config: &Config) -> Result<()> {
    let client = CourierClient::new(&config.server_url);
    let progress = client.progress().await?;

    print_progress(&progress);

    Ok(())
}

/// Print the end-of-run summary
pub async fn status(config: &Config) -> Result<()> {
    let client = CourierClient::new(&config.server_url);
    let status = client.status().await?;

    println!("{}", "Status:".bold());
    println!(
        "  Active:     {}",
        if status.is_active {
            "yes".cyan()
        } else {
            "no".dimmed()
        }
    );
    println!(
        "  Completed:  {}",
        if status.completed {
            "✓".green()
        } else {
            "✗".dimmed()
        }
    );
    println!("  Processed:  {}", status.total_processed);
    println!("  Succeeded:  {}", status.success_count.to_string().green());
    println!("  Failed:     {}", status.failure_count.to_string().red());

    if !status.logs.is_empty() {
        println!();
        print_logs(&status.logs);
    }

    Ok(())
}

/// Follow the job log until the job is no longer active
pub async fn watch(config: &Config, interval: u64) -> Result<()> {
    let client = CourierClient::new(&config.server_url);
    follow_logs(&client, Duration::from_secs(interval.max(1))).await
}

/// Request the job to stop
pub async fn stop(config: &Config) -> Result<()> {
    let client = CourierClient::new(&config.server_url);
    let response = client.stop().await?;

    println!("{} {}", "■".yellow(), response.message);

    Ok(())
}

async fn follow_logs(client: &CourierClient, interval: Duration) -> Result<()> {
    let mut cursor = LogCursor::default();

    loop {
        let progress = client.progress().await?;

        for entry in cursor.advance(&progress) {
            print_log_entry(entry);
        }

        if !progress.is_active {
            println!();
            print_progress_summary(&progress);
            return Ok(());
        }

        tokio::time::sleep(interval).await;
    }
}

/// Tracks which log entries of which job were already printed
#[derive(Debug, Default)]
struct LogCursor {
    job_id: Option<Uuid>,
    seen: usize,
}

impl LogCursor {
    /// Returns entries not printed yet; starts over when a new job appears
    fn advance<'a>(&mut self, progress: &'a JobProgress) -> &'a [LogEntry] {
        if progress.job_id != self.job_id || progress.logs.len() < self.seen {
            self.job_id = progress.job_id;
            self.seen = 0;
        }

        let fresh = &progress.logs[self.seen..];
        self.seen = progress.logs.len();
        fresh
    }
}

fn print_progress(progress: &JobProgress) {
    println!("{}", "Progress:".bold());
    if let Some(job_id) = progress.job_id {
        println!("  Job:        {}", job_id.to_string().cyan());
    }
    println!("  Phase:      {}", colorize_phase(progress.phase));
    println!("  Position:   {}/{}", progress.current, progress.total);
    println!(
        "  Succeeded:  {}",
        progress.success_count.to_string().green()
    );
    println!("  Failed:     {}", progress.failure_count.to_string().red());
    if let Some(started) = progress.started_at {
        println!(
            "  Started:    {}",
            started
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
        );
    }

    if !progress.logs.is_empty() {
        println!();
        print_logs(&progress.logs);
    }
}

fn print_progress_summary(progress: &JobProgress) {
    println!(
        "{} {}: {} sent, {} failed, {} of {} processed",
        "▸".cyan(),
        colorize_phase(progress.phase),
        progress.success_count.to_string().green(),
        progress.failure_count.to_string().red(),
        progress.current,
        progress.total
    );
}

fn print_logs(logs: &[LogEntry]) {
    println!("{}", "─".repeat(80).dimmed());
    for log in logs {
        print_log_entry(log);
    }
    println!("{}", "─".repeat(80).dimmed());
}

/// Print a log entry
fn print_log_entry(log: &LogEntry) {
    let level_str = format!("{:?}", log.level).to_uppercase();
    let level_colored = match log.level {
        LogLevel::Debug => level_str.dimmed(),
        LogLevel::Info => level_str.cyan(),
        LogLevel::Warning => level_str.yellow(),
        LogLevel::Error => level_str.red(),
    };

    println!(
        "{} [{}] {}",
        log.timestamp
            .with_timezone(&Local)
            .format("%H:%M:%S")
            .to_string()
            .dimmed(),
        level_colored,
        log.message
    );
}

fn colorize_phase(phase: JobPhase) -> ColoredString {
    let phase_str = format!("{:?}", phase);
    match phase {
        JobPhase::Idle => phase_str.dimmed(),
        JobPhase::Running => phase_str.cyan(),
        JobPhase::Completed => phase_str.green(),
        JobPhase::Stopped => phase_str.yellow(),
        JobPhase::Failed => phase_str.red(),
    }
}
