//! WhatsApp Web messaging client
//!
//! Drives a Chrome tab through chromedriver:
//! - Launching Chrome, optionally with an existing profile
//! - Reusing a logged-in session or waiting for a QR scan
//! - Opening a chat per contact and sending text or an attachment
//! - Closing the browser when the job ends
//!
//! Selectors track the current WhatsApp Web markup and are expected to
//! drift; they live in [`selectors`] so they can be updated in one place.

use async_trait::async_trait;
use courier_webdriver::{ChromeOptions, WebDriver, WebDriverError, keys};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::{DeliveryError, SessionError};
use crate::messaging::{ActivityLog, MessagingClient, MessagingSession};

const WHATSAPP_URL: &str = "https://web.whatsapp.com";

/// Wait for buttons and inputs that should already be on screen
const ELEMENT_TIMEOUT: Duration = Duration::from_secs(10);

mod selectors {
    use courier_webdriver::Locator;

    pub fn chat_list() -> Locator {
        Locator::css("#pane-side")
    }

    pub fn compose_box() -> Locator {
        Locator::xpath(r#"//div[@role="textbox" and @contenteditable="true"]"#)
    }

    pub fn not_registered() -> Locator {
        Locator::xpath(r#"//div[contains(text(), "not on WhatsApp")]"#)
    }

    pub fn attach_button() -> Locator {
        Locator::xpath(r#"//div[@title="Attach"]"#)
    }

    pub fn file_input() -> Locator {
        Locator::xpath(r#"//input[@accept="*"]"#)
    }

    pub fn send_button() -> Locator {
        Locator::xpath(r#"//span[@data-icon="send"]"#)
    }

    pub fn caption_box() -> Locator {
        Locator::xpath(r#"//div[@contenteditable="true" and @data-tab="10"]"#)
    }

    pub fn delivered_tick() -> Locator {
        Locator::xpath(r#"//span[@data-icon="msg-dblcheck"]"#)
    }
}

/// Browser and page-wait settings
#[derive(Debug, Clone)]
pub struct WhatsAppSettings {
    /// chromedriver base URL
    pub webdriver_url: String,

    /// Chrome user data directory to reuse a logged-in profile
    pub user_data_dir: Option<PathBuf>,

    /// Profile inside `user_data_dir`; `Default` uses the directory itself
    pub profile_name: String,

    /// How long to look for an already logged-in session
    pub session_probe_timeout: Duration,

    /// How long to wait for a QR scan
    pub login_timeout: Duration,

    /// How long a chat may take to open
    pub chat_load_timeout: Duration,

    /// How long an attachment may take to upload
    pub upload_timeout: Duration,

    /// How long to wait for the delivered tick; not waiting for it is not a failure
    pub delivery_confirm_timeout: Duration,

    /// Interval between element polls
    pub poll_interval: Duration,
}

impl Default for WhatsAppSettings {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            user_data_dir: None,
            profile_name: "Default".to_string(),
            session_probe_timeout: Duration::from_secs(15),
            login_timeout: Duration::from_secs(120),
            chat_load_timeout: Duration::from_secs(45),
            upload_timeout: Duration::from_secs(60),
            delivery_confirm_timeout: Duration::from_secs(10),
            poll_interval: courier_webdriver::DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Builds Chrome options; also returns the profile directory in use, if any
///
/// A configured user data directory that does not exist is ignored.
pub fn chrome_options(settings: &WhatsAppSettings) -> (ChromeOptions, Option<PathBuf>) {
    let profile = settings
        .user_data_dir
        .as_ref()
        .filter(|dir| dir.exists())
        .map(|dir| {
            let name = settings.profile_name.trim();
            if name.is_empty() || name == "Default" {
                dir.clone()
            } else {
                dir.join(name)
            }
        });

    let mut options = ChromeOptions::new();
    if let Some(profile) = &profile {
        options = options.user_data_dir(profile.to_string_lossy());
    }

    let options = options
        .arg("--disable-dev-shm-usage")
        .arg("--disable-infobars")
        .arg("--disable-notifications")
        .arg("--start-maximized")
        .arg("--disable-gpu")
        .arg("--no-sandbox")
        .arg("--log-level=3")
        .exclude_switch("enable-logging");

    (options, profile)
}

/// Keystrokes that type `message` into a compose box and send it
///
/// Line breaks become Shift+Enter so a multi-line message goes out as one.
pub fn compose_keystrokes(message: &str) -> String {
    let mut keystrokes = message
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .collect::<Vec<_>>()
        .join(keys::soft_newline().as_str());
    keystrokes.push(keys::ENTER);
    keystrokes
}

/// [`MessagingClient`] backed by WhatsApp Web in Chrome
pub struct WhatsAppWebClient {
    settings: WhatsAppSettings,
}

impl WhatsAppWebClient {
    pub fn new(settings: WhatsAppSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl MessagingClient for WhatsAppWebClient {
    async fn open_session(
        &self,
        log: Arc<dyn ActivityLog>,
    ) -> Result<Arc<dyn MessagingSession>, SessionError> {
        log.log_info("Initializing Chrome WebDriver...".to_string());

        let (options, profile) = chrome_options(&self.settings);
        if let Some(profile) = profile {
            log.log_info(format!("Using Chrome profile: {}", profile.display()));
        }

        let driver = WebDriver::connect(&self.settings.webdriver_url, &options)
            .await
            .map_err(SessionError::Launch)?
            .with_poll_interval(self.settings.poll_interval);
        log.log_info("Chrome WebDriver initialized successfully".to_string());

        let session = WhatsAppSession {
            driver,
            settings: self.settings.clone(),
            log,
        };

        if let Err(e) = session.login().await {
            if let Err(quit_err) = session.driver.quit().await {
                debug!("Failed to quit browser after login failure: {}", quit_err);
            }
            return Err(e);
        }

        Ok(Arc::new(session))
    }
}

/// A logged-in WhatsApp Web tab
pub struct WhatsAppSession {
    driver: WebDriver,
    settings: WhatsAppSettings,
    log: Arc<dyn ActivityLog>,
}

impl WhatsAppSession {
    async fn login(&self) -> Result<(), SessionError> {
        self.log.log_info("Connecting to WhatsApp Web...".to_string());
        self.driver.goto(WHATSAPP_URL).await?;

        match self
            .driver
            .wait_for(&selectors::chat_list(), self.settings.session_probe_timeout)
            .await
        {
            Ok(_) => {
                self.log
                    .log_info("Using existing WhatsApp session".to_string());
                return Ok(());
            }
            Err(e) if e.is_timeout() => {
                self.log
                    .log_info("No existing session found - QR scan required".to_string());
            }
            Err(e) => return Err(e.into()),
        }

        self.log
            .log_info("Please scan QR code in the browser window...".to_string());

        match self
            .driver
            .wait_for(&selectors::chat_list(), self.settings.login_timeout)
            .await
        {
            Ok(_) => {
                self.log.log_info("Login successful!".to_string());
                Ok(())
            }
            Err(e) if e.is_timeout() => {
                self.log
                    .log_error("Login timed out. Please try again.".to_string());
                Err(SessionError::LoginTimeout(self.settings.login_timeout.as_secs()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn send_attachment(&self, path: &Path, caption: &str) -> Result<(), DeliveryError> {
        let attach = self
            .driver
            .wait_for(&selectors::attach_button(), ELEMENT_TIMEOUT)
            .await
            .map_err(|e| waited("attach button", e))?;
        self.driver.click(&attach).await?;

        let input = self.driver.find(&selectors::file_input()).await?;
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        self.driver
            .send_keys(&input, &absolute.to_string_lossy())
            .await?;

        let send = self
            .driver
            .wait_for(&selectors::send_button(), self.settings.upload_timeout)
            .await
            .map_err(|e| waited("attachment upload", e))?;

        if !caption.is_empty() {
            // Not every file type offers a caption box.
            match self.driver.find(&selectors::caption_box()).await {
                Ok(caption_box) => self.driver.send_keys(&caption_box, caption).await?,
                Err(e) => debug!("Skipping caption: {}", e),
            }
        }

        self.driver.click(&send).await?;
        Ok(())
    }

    async fn send_text(&self, message: &str) -> Result<(), DeliveryError> {
        let compose = self
            .driver
            .wait_for(&selectors::compose_box(), ELEMENT_TIMEOUT)
            .await
            .map_err(|e| waited("compose box", e))?;

        let clear: String = [keys::chord_control('a'), keys::DELETE.to_string()].concat();
        self.driver.send_keys(&compose, &clear).await?;
        self.driver
            .send_keys(&compose, &compose_keystrokes(message))
            .await?;
        Ok(())
    }
}

fn waited(what: &str, error: WebDriverError) -> DeliveryError {
    if error.is_timeout() {
        DeliveryError::Timeout(what.to_string())
    } else {
        DeliveryError::Browser(error)
    }
}

#[async_trait]
impl MessagingSession for WhatsAppSession {
    async fn send(
        &self,
        contact: &str,
        message: &str,
        attachment: Option<&Path>,
    ) -> Result<(), DeliveryError> {
        self.driver
            .goto(&format!("{}/send?phone={}", WHATSAPP_URL, contact))
            .await?;

        let (matched, _) = self
            .driver
            .wait_for_any(
                &[selectors::compose_box(), selectors::not_registered()],
                self.settings.chat_load_timeout,
            )
            .await
            .map_err(|e| waited(&format!("chat with {}", contact), e))?;

        if matched == 1
            || !self
                .driver
                .find_all(&selectors::not_registered())
                .await?
                .is_empty()
        {
            return Err(DeliveryError::NotRegistered(contact.to_string()));
        }

        match attachment.filter(|path| path.exists()) {
            Some(path) => self.send_attachment(path, message).await?,
            None if !message.is_empty() => self.send_text(message).await?,
            None => debug!("Nothing to send to {}", contact),
        }

        match self
            .driver
            .wait_for(
                &selectors::delivered_tick(),
                self.settings.delivery_confirm_timeout,
            )
            .await
        {
            Ok(_) => {}
            Err(e) if e.is_timeout() => {
                debug!("No delivery confirmation for {} yet", contact);
            }
            Err(e) => return Err(e.into()),
        }

        Ok(())
    }

    async fn close(&self) -> Result<(), SessionError> {
        self.driver.quit().await?;
        Ok(())
    }
}
