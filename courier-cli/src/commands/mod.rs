//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod job;
mod system;

use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Upload a recipients spreadsheet and start sending
    Send {
        /// Excel file (.xlsx or .xls) with a contact column and an optional Message column
        recipients: PathBuf,

        /// File sent to every recipient, with the message as caption
        #[arg(short, long)]
        attachment: Option<PathBuf>,

        /// Keep printing the job log until it finishes
        #[arg(short, long)]
        follow: bool,
    },
    /// Show live progress of the current job
    Progress,
    /// Show the end-of-run summary of the latest job
    Status,
    /// Follow the job log until the job finishes
    Watch {
        /// Seconds between polls
        #[arg(long, default_value_t = 2)]
        interval: u64,
    },
    /// Stop the current job
    Stop,
    /// Check that the server is up
    Health,
}

/// Handle a CLI command
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Send {
            recipients,
            attachment,
            follow,
        } => job::send(config, &recipients, attachment.as_deref(), follow).await,
        Commands::Progress => job::progress(config).await,
        Commands::Status => job::status(config).await,
        Commands::Watch { interval } => job::watch(config, interval).await,
        Commands::Stop => job::stop(config).await,
        Commands::Health => system::health(config).await,
    }
}
