//! Element lookup, waits and interaction

use serde_json::{Value, json};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::WebDriver;
use crate::error::{Result, WebDriverError};

/// W3C web element identifier key
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Strategy and selector used to find elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    XPath(String),
    Css(String),
}

impl Locator {
    pub fn xpath(selector: impl Into<String>) -> Self {
        Self::XPath(selector.into())
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    fn to_json(&self) -> Value {
        match self {
            Locator::XPath(value) => json!({ "using": "xpath", "value": value }),
            Locator::Css(value) => json!({ "using": "css selector", "value": value }),
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::XPath(value) => write!(f, "xpath {}", value),
            Locator::Css(value) => write!(f, "css {}", value),
        }
    }
}

/// Reference to an element in the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    id: String,
}

impl Element {
    fn from_json(value: &Value) -> Result<Self> {
        value
            .get(ELEMENT_KEY)
            .and_then(Value::as_str)
            .map(|id| Element { id: id.to_string() })
            .ok_or_else(|| WebDriverError::ParseError(format!("Not an element reference: {}", value)))
    }
}

impl WebDriver {
    /// Finds every element matching a locator (possibly none)
    pub async fn find_all(&self, locator: &Locator) -> Result<Vec<Element>> {
        let values: Vec<Value> = self.post("elements", &locator.to_json()).await?;
        values.iter().map(Element::from_json).collect()
    }

    /// Finds the first element matching a locator
    pub async fn find(&self, locator: &Locator) -> Result<Element> {
        self.find_all(locator)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| WebDriverError::NoSuchElement(locator.to_string()))
    }

    /// Polls until any of the locators matches
    ///
    /// Locators are tried in order on each poll. Returns the index of the
    /// locator that matched together with its first element.
    pub async fn wait_for_any(
        &self,
        locators: &[Locator],
        timeout: Duration,
    ) -> Result<(usize, Element)> {
        let deadline = Instant::now() + timeout;

        loop {
            for (index, locator) in locators.iter().enumerate() {
                if let Some(element) = self.find_all(locator).await?.into_iter().next() {
                    debug!("Wait satisfied by {}", locator);
                    return Ok((index, element));
                }
            }

            if Instant::now() >= deadline {
                let wanted: Vec<String> = locators.iter().map(Locator::to_string).collect();
                return Err(WebDriverError::Timeout(wanted.join(" or ")));
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Waits for a single locator
    pub async fn wait_for(&self, locator: &Locator, timeout: Duration) -> Result<Element> {
        self.wait_for_any(std::slice::from_ref(locator), timeout)
            .await
            .map(|(_, element)| element)
    }

    pub async fn click(&self, element: &Element) -> Result<()> {
        let path = format!("element/{}/click", element.id);
        self.post::<Value>(&path, &json!({})).await?;
        Ok(())
    }

    /// Types text into an element
    ///
    /// Special keys from [`crate::keys`] may be embedded in `text`. For a
    /// file input, `text` is the absolute path of the file to upload.
    pub async fn send_keys(&self, element: &Element, text: &str) -> Result<()> {
        let path = format!("element/{}/value", element.id);
        self.post::<Value>(&path, &json!({ "text": text })).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChromeOptions;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn connected(server: &MockServer) -> WebDriver {
        Mock::given(method("POST"))
            .and(path("/session"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "value": { "sessionId": "s1" } })),
            )
            .mount(server)
            .await;

        WebDriver::connect(server.uri(), &ChromeOptions::new())
            .await
            .unwrap()
            .with_poll_interval(Duration::from_millis(10))
    }

    fn elements(ids: &[&str]) -> Value {
        let refs: Vec<Value> = ids.iter().map(|id| json!({ ELEMENT_KEY: id })).collect();
        json!({ "value": refs })
    }

    #[tokio::test]
    async fn test_find_all_parses_element_references() {
        let server = MockServer::start().await;
        let driver = connected(&server).await;
        Mock::given(method("POST"))
            .and(path("/session/s1/elements"))
            .and(body_partial_json(json!({ "using": "xpath" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(elements(&["e1", "e2"])))
            .mount(&server)
            .await;

        let found = driver.find_all(&Locator::xpath("//div")).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].id, "e2");
    }

    #[tokio::test]
    async fn test_find_with_no_match_is_no_such_element() {
        let server = MockServer::start().await;
        let driver = connected(&server).await;
        Mock::given(method("POST"))
            .and(path("/session/s1/elements"))
            .respond_with(ResponseTemplate::new(200).set_body_json(elements(&[])))
            .mount(&server)
            .await;

        let err = driver.find(&Locator::css("#missing")).await.unwrap_err();
        assert!(matches!(err, WebDriverError::NoSuchElement(_)));
    }

    #[tokio::test]
    async fn test_wait_for_any_reports_matching_locator() {
        let server = MockServer::start().await;
        let driver = connected(&server).await;
        Mock::given(method("POST"))
            .and(path("/session/s1/elements"))
            .and(body_partial_json(json!({ "value": "#first" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(elements(&[])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/session/s1/elements"))
            .and(body_partial_json(json!({ "value": "#second" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(elements(&["e9"])))
            .mount(&server)
            .await;

        let (index, element) = driver
            .wait_for_any(
                &[Locator::css("#first"), Locator::css("#second")],
                Duration::from_secs(1),
            )
            .await
            .unwrap();

        assert_eq!(index, 1);
        assert_eq!(element.id, "e9");
    }

    #[tokio::test]
    async fn test_wait_times_out() {
        let server = MockServer::start().await;
        let driver = connected(&server).await;
        Mock::given(method("POST"))
            .and(path("/session/s1/elements"))
            .respond_with(ResponseTemplate::new(200).set_body_json(elements(&[])))
            .mount(&server)
            .await;

        let err = driver
            .wait_for(&Locator::css("#pane-side"), Duration::from_millis(50))
            .await
            .unwrap_err();

        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_send_keys_posts_text() {
        let server = MockServer::start().await;
        let driver = connected(&server).await;
        Mock::given(method("POST"))
            .and(path("/session/s1/element/e1/value"))
            .and(body_partial_json(json!({ "text": "hello" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": null })))
            .expect(1)
            .mount(&server)
            .await;

        let element = Element { id: "e1".to_string() };
        driver.send_keys(&element, "hello").await.unwrap();
    }
}
