//! Runner configuration
//!
//! Pacing and retry parameters for the processing loop.

use std::time::Duration;

/// Settings for the processing loop
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    /// Delivery attempts per recipient, including the first
    pub max_retries: u32,

    /// Wait between two attempts for the same recipient
    pub retry_backoff: Duration,

    /// Wait after every recipient
    pub recipient_delay: Duration,

    /// Extra wait after every delivered message, to stay under the
    /// remote service's rate limits
    pub message_delay: Duration,

    /// How long shutdown waits for the runner task to wind down
    pub shutdown_grace: Duration,
}

impl RunnerSettings {
    /// Settings with no waits, for tests and dry runs
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            retry_backoff: Duration::ZERO,
            recipient_delay: Duration::ZERO,
            message_delay: Duration::ZERO,
            shutdown_grace: Duration::from_secs(1),
        }
    }

    /// Validates the settings
    pub fn validate(&self) -> Result<(), String> {
        if self.max_retries == 0 {
            return Err("max_retries must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_backoff: Duration::from_secs(2),
            recipient_delay: Duration::from_secs(1),
            message_delay: Duration::from_secs(30),
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = RunnerSettings::default();
        assert_eq!(settings.max_retries, 3);
        assert_eq!(settings.retry_backoff, Duration::from_secs(2));
        assert_eq!(settings.message_delay, Duration::from_secs(30));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_zero_retries_rejected() {
        let settings = RunnerSettings::immediate(0);
        assert!(settings.validate().is_err());
    }
}
