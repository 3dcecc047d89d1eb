//! Server configuration
//!
//! Every setting can be overridden with an environment variable; unset or
//! unparsable values fall back to the defaults below.

use courier_runner::{RunnerSettings, WhatsAppSettings};
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP API listens on
    pub bind_addr: String,

    /// Directory uploaded files are written to
    pub upload_dir: PathBuf,

    /// Maximum request body size, in bytes
    pub max_upload_bytes: usize,

    /// chromedriver base URL
    pub webdriver_url: String,

    /// Chrome user data directory holding a logged-in WhatsApp profile
    pub chrome_user_data_dir: Option<PathBuf>,

    /// Profile name inside the user data directory
    pub chrome_profile_name: String,

    /// Delivery attempts per recipient
    pub max_retries: u32,

    pub retry_backoff: Duration,
    pub recipient_delay: Duration,
    pub message_delay: Duration,
    pub chat_load_timeout: Duration,
    pub upload_timeout: Duration,
    pub login_timeout: Duration,

    /// How long shutdown waits for a running job to wind down
    pub shutdown_grace: Duration,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Recognized variables:
    /// - COURIER_BIND_ADDR (default: 0.0.0.0:5000)
    /// - UPLOAD_DIR (default: uploads)
    /// - MAX_UPLOAD_BYTES (default: 16 MiB)
    /// - WEBDRIVER_URL (default: http://localhost:9515)
    /// - CHROME_USER_DATA_DIR (default: none)
    /// - CHROME_PROFILE_NAME (default: Default)
    /// - MAX_RETRIES (default: 3)
    /// - RETRY_BACKOFF, RECIPIENT_DELAY, MESSAGE_DELAY (seconds; 2, 1, 30)
    /// - CHAT_LOAD_TIMEOUT, UPLOAD_TIMEOUT, LOGIN_TIMEOUT (seconds; 45, 60, 120)
    /// - SHUTDOWN_GRACE (seconds, default: 5)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let text = |key: &str, default: String| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or(default)
        };
        let number = |key: &str| lookup(key).and_then(|value| value.trim().parse::<u64>().ok());
        let seconds = |key: &str, default: Duration| {
            number(key).map(Duration::from_secs).unwrap_or(default)
        };

        Self {
            bind_addr: text("COURIER_BIND_ADDR", defaults.bind_addr),
            upload_dir: PathBuf::from(text(
                "UPLOAD_DIR",
                defaults.upload_dir.to_string_lossy().into_owned(),
            )),
            max_upload_bytes: number("MAX_UPLOAD_BYTES")
                .and_then(|bytes| usize::try_from(bytes).ok())
                .unwrap_or(defaults.max_upload_bytes),
            webdriver_url: text("WEBDRIVER_URL", defaults.webdriver_url),
            chrome_user_data_dir: lookup("CHROME_USER_DATA_DIR")
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .map(PathBuf::from),
            chrome_profile_name: text("CHROME_PROFILE_NAME", defaults.chrome_profile_name),
            max_retries: number("MAX_RETRIES")
                .and_then(|retries| u32::try_from(retries).ok())
                .unwrap_or(defaults.max_retries),
            retry_backoff: seconds("RETRY_BACKOFF", defaults.retry_backoff),
            recipient_delay: seconds("RECIPIENT_DELAY", defaults.recipient_delay),
            message_delay: seconds("MESSAGE_DELAY", defaults.message_delay),
            chat_load_timeout: seconds("CHAT_LOAD_TIMEOUT", defaults.chat_load_timeout),
            upload_timeout: seconds("UPLOAD_TIMEOUT", defaults.upload_timeout),
            login_timeout: seconds("LOGIN_TIMEOUT", defaults.login_timeout),
            shutdown_grace: seconds("SHUTDOWN_GRACE", defaults.shutdown_grace),
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        if self.upload_dir.as_os_str().is_empty() {
            anyhow::bail!("upload_dir cannot be empty");
        }

        if self.max_upload_bytes == 0 {
            anyhow::bail!("max_upload_bytes must be greater than 0");
        }

        if !self.webdriver_url.starts_with("http://") && !self.webdriver_url.starts_with("https://")
        {
            anyhow::bail!("webdriver_url must start with http:// or https://");
        }

        self.runner_settings()
            .validate()
            .map_err(|e| anyhow::anyhow!(e))?;

        Ok(())
    }

    /// Pacing and retry settings for the job runner
    pub fn runner_settings(&self) -> RunnerSettings {
        RunnerSettings {
            max_retries: self.max_retries,
            retry_backoff: self.retry_backoff,
            recipient_delay: self.recipient_delay,
            message_delay: self.message_delay,
            shutdown_grace: self.shutdown_grace,
        }
    }

    /// Browser settings for the WhatsApp Web client
    pub fn whatsapp_settings(&self) -> WhatsAppSettings {
        WhatsAppSettings {
            webdriver_url: self.webdriver_url.clone(),
            user_data_dir: self.chrome_user_data_dir.clone(),
            profile_name: self.chrome_profile_name.clone(),
            chat_load_timeout: self.chat_load_timeout,
            upload_timeout: self.upload_timeout,
            login_timeout: self.login_timeout,
            ..WhatsAppSettings::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let runner = RunnerSettings::default();
        let browser = WhatsAppSettings::default();

        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 16 * 1024 * 1024,
            webdriver_url: browser.webdriver_url,
            chrome_user_data_dir: None,
            chrome_profile_name: browser.profile_name,
            max_retries: runner.max_retries,
            retry_backoff: runner.retry_backoff,
            recipient_delay: runner.recipient_delay,
            message_delay: runner.message_delay,
            chat_load_timeout: browser.chat_load_timeout,
            upload_timeout: browser.upload_timeout,
            login_timeout: browser.login_timeout,
            shutdown_grace: runner.shutdown_grace,
        }
    }
}
