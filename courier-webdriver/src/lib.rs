//! Courier WebDriver Client
//!
//! A small, typed client for the W3C WebDriver HTTP protocol, covering what
//! is needed to script a browser tab: sessions, navigation, element lookup
//! and waits, clicks and keystrokes.
//!
//! # Example
//!
//! ```no_run
//! use courier_webdriver::{ChromeOptions, Locator, WebDriver};
//! use std::time::Duration;
//!
//! # async fn example() -> courier_webdriver::Result<()> {
//! let options = ChromeOptions::new().arg("--no-sandbox");
//! let driver = WebDriver::connect("http://localhost:9515", &options).await?;
//!
//! driver.goto("https://example.com").await?;
//! let (_, heading) = driver
//!     .wait_for_any(&[Locator::css("h1")], Duration::from_secs(10))
//!     .await?;
//! driver.click(&heading).await?;
//!
//! driver.quit().await?;
//! # Ok(())
//! # }
//! ```

mod capabilities;
mod element;
pub mod error;
pub mod keys;

pub use capabilities::ChromeOptions;
pub use element::{Element, Locator};
pub use error::{Result, WebDriverError};

use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Default interval between polls in [`WebDriver::wait_for_any`]
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Readiness report from `GET /status`
#[derive(Debug, Clone, Deserialize)]
pub struct DriverStatus {
    pub ready: bool,
    #[serde(default)]
    pub message: String,
}

/// A WebDriver session
///
/// The session id is dropped on [`quit`](WebDriver::quit), after which every
/// command fails with [`WebDriverError::NoSession`] and further quits are
/// no-ops. The type is `Sync`, so one task may quit while another is
/// mid-command.
#[derive(Debug)]
pub struct WebDriver {
    /// Base URL of the driver (e.g., "http://localhost:9515")
    base_url: String,
    /// HTTP client instance
    client: Client,
    session_id: Mutex<Option<String>>,
    poll_interval: Duration,
}

#[derive(Deserialize)]
struct Envelope<T> {
    value: T,
}

#[derive(Deserialize)]
struct ErrorValue {
    error: String,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewSession {
    session_id: String,
}

impl WebDriver {
    /// Starts a new browser session
    ///
    /// # Arguments
    /// * `base_url` - The driver's base URL
    /// * `options` - Chrome options for the session
    pub async fn connect(base_url: impl Into<String>, options: &ChromeOptions) -> Result<Self> {
        Self::connect_with_client(base_url, options, Client::new()).await
    }

    /// Starts a new browser session with a custom HTTP client
    pub async fn connect_with_client(
        base_url: impl Into<String>,
        options: &ChromeOptions,
        client: Client,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let url = format!("{}/session", base_url);
        let response = client
            .post(&url)
            .json(&options.to_capabilities())
            .send()
            .await?;
        let session: NewSession = handle_response(response).await?;

        debug!("Started WebDriver session {}", session.session_id);

        Ok(Self {
            base_url,
            client,
            session_id: Mutex::new(Some(session.session_id)),
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Overrides the interval used by waits
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Get the base URL of the driver
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Id of the open session, `None` once quit
    pub fn session_id(&self) -> Option<String> {
        self.session_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Ends the session
    ///
    /// Calling this more than once is a no-op.
    pub async fn quit(&self) -> Result<()> {
        let taken = self
            .session_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(session_id) = taken else {
            debug!("WebDriver session already closed");
            return Ok(());
        };

        let url = format!("{}/session/{}", self.base_url, session_id);
        let response = self.client.delete(&url).send().await?;
        handle_response::<serde_json::Value>(response).await?;

        debug!("Closed WebDriver session {}", session_id);
        Ok(())
    }

    /// Navigates the current tab
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.post::<serde_json::Value>("url", &serde_json::json!({ "url": url }))
            .await?;
        Ok(())
    }

    // =============================================================================
    // Request Helpers
    // =============================================================================

    fn session_url(&self, path: &str) -> Result<String> {
        let session_id = self.session_id().ok_or(WebDriverError::NoSession)?;
        Ok(format!("{}/session/{}/{}", self.base_url, session_id, path))
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &serde_json::Value) -> Result<T> {
        let url = self.session_url(path)?;
        let response = self.client.post(&url).json(body).send().await?;

        handle_response(response).await
    }
}

/// Queries a driver's readiness without opening a session
pub async fn driver_status(base_url: &str) -> Result<DriverStatus> {
    let url = format!("{}/status", base_url.trim_end_matches('/'));
    let response = Client::new().get(&url).send().await?;

    handle_response(response).await
}

/// Unwraps the `{"value": ...}` envelope or maps a W3C error payload
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(match serde_json::from_str::<Envelope<ErrorValue>>(&text) {
            Ok(envelope) => {
                WebDriverError::protocol(status.as_u16(), envelope.value.error, envelope.value.message)
            }
            Err(_) => WebDriverError::protocol(status.as_u16(), "unknown error", text),
        });
    }

    serde_json::from_str::<Envelope<T>>(&text)
        .map(|envelope| envelope.value)
        .map_err(|e| WebDriverError::ParseError(format!("Failed to parse JSON response: {}", e)))
}
