//! Chrome session capabilities

use serde_json::{Value, json};

/// Options passed to chromedriver under `goog:chromeOptions`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChromeOptions {
    args: Vec<String>,
    exclude_switches: Vec<String>,
}

impl ChromeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a command-line switch, e.g. `--no-sandbox`
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Reuses a browser profile directory
    pub fn user_data_dir(self, dir: impl AsRef<str>) -> Self {
        self.arg(format!("--user-data-dir={}", dir.as_ref()))
    }

    /// Removes a default chromedriver switch, e.g. `enable-logging`
    pub fn exclude_switch(mut self, switch: impl Into<String>) -> Self {
        self.exclude_switches.push(switch.into());
        self
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Builds the body of a W3C New Session request
    pub fn to_capabilities(&self) -> Value {
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": {
                        "args": self.args,
                        "excludeSwitches": self.exclude_switches,
                    }
                }
            }
        })
    }
}
