//! Service-level commands

use anyhow::{Context, Result};
use colored::*;
use courier_client::CourierClient;

use crate::config::Config;

/// Check server health
pub async fn health(config: &Config) -> Result<()> {
    let client = CourierClient::new(&config.server_url);
    let health = client
        .health()
        .await
        .with_context(|| format!("Server at {} is unreachable", config.server_url))?;

    println!(
        "{} {} ({})",
        "✓".green(),
        config.server_url.bold(),
        health.status
    );
    if health.is_active {
        println!("  A sending process is {}", "active".cyan());
    } else {
        println!("  {}", "No active sending process".dimmed());
    }

    Ok(())
}
