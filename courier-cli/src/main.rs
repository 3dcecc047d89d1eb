//! Courier CLI
//!
//! Command-line interface for the Courier bulk-messaging server.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "courier")]
#[command(about = "Bulk WhatsApp messaging CLI", long_about = None)]
struct Cli {
    /// Courier server URL
    #[arg(long, env = "COURIER_SERVER_URL", default_value = "http://localhost:5000")]
    server_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        server_url: cli.server_url,
    };

    handle_command(cli.command, &config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_send() {
        let cli = Cli::try_parse_from([
            "courier",
            "--server-url",
            "http://box:5000",
            "send",
            "contacts.xlsx",
            "--attachment",
            "flyer.pdf",
            "--follow",
        ])
        .unwrap();

        assert_eq!(cli.server_url, "http://box:5000");
        match cli.command {
            Commands::Send {
                recipients,
                attachment,
                follow,
            } => {
                assert_eq!(recipients, PathBuf::from("contacts.xlsx"));
                assert_eq!(attachment, Some(PathBuf::from("flyer.pdf")));
                assert!(follow);
            }
            _ => panic!("expected send"),
        }
    }

    #[test]
    fn test_send_requires_recipients() {
        assert!(Cli::try_parse_from(["courier", "send"]).is_err());
    }

    #[test]
    fn test_watch_interval() {
        let cli = Cli::try_parse_from(["courier", "watch", "--interval", "5"]).unwrap();
        assert!(matches!(cli.command, Commands::Watch { interval: 5 }));
    }
}
