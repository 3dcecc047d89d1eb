//! Courier HTTP Client
//!
//! A type-safe HTTP client for the Courier server API, used by the CLI.
//!
//! # Example
//!
//! ```no_run
//! use courier_client::CourierClient;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = CourierClient::new("http://localhost:5000");
//!
//!     let accepted = client
//!         .send_recipients(Path::new("contacts.xlsx"), None)
//!         .await?;
//!
//!     println!("Started job {} for {} recipients", accepted.job_id, accepted.total_recipients);
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;

pub use error::{ClientError, Result};

use courier_core::dto::system::{ErrorBody, HealthResponse};
use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the Courier server API
///
/// Endpoints are grouped as:
/// - Job control (send, stop)
/// - Job observation (progress, status)
/// - Service health
#[derive(Debug, Clone)]
pub struct CourierClient {
    /// Base URL of the server (e.g., "http://localhost:5000")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl CourierClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the server (e.g., "http://localhost:5000")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check server health and whether a job is running
    pub async fn health(&self) -> Result<HealthResponse> {
        let url = format!("{}/api/health", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Non-2xx responses become [`ClientError::ApiError`] carrying the
    /// server's `error` message when the body has one.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = serde_json::from_str::<ErrorBody>(&error_text)
                .map(|body| body.error)
                .unwrap_or(error_text);
            return Err(ClientError::api_error(status.as_u16(), message));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
