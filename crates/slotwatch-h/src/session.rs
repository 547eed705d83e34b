use crate::cdp::CdpClient;
use async_trait::async_trait;
use chromiumoxide::element::Element;
use slotwatch_engine::session::{ElementHandle, Session, SessionError};
use std::time::Duration;
use tracing::{debug, info};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// [`Session`] implementation driving one chromiumoxide page.
///
/// Element handles index into the elements of the most recent `query_all`;
/// a new query invalidates older handles.
pub struct HeadlessSession {
    client: CdpClient,
    last_query: Vec<Element>,
}

impl HeadlessSession {
    pub fn new(client: CdpClient) -> Self {
        Self {
            client,
            last_query: Vec::new(),
        }
    }

    /// Navigate the page to the reservation site.
    pub async fn open(&mut self, url: &str) -> Result<(), SessionError> {
        info!("Opening {}", url);
        self.client
            .page
            .goto(url)
            .await
            .map_err(|e| SessionError::Interaction(e.to_string()))?;
        Ok(())
    }

    /// Bounded wait for the logged-in marker element. Login itself is
    /// manual; this only observes whether it happened.
    pub async fn verify_login(
        &mut self,
        marker: &str,
        timeout: Duration,
    ) -> Result<bool, SessionError> {
        self.wait_for_visible(marker, timeout).await
    }

    pub async fn close(self) -> Result<(), SessionError> {
        self.client
            .close()
            .await
            .map_err(|e| SessionError::Other(e.to_string()))
    }

    async fn find(&self, selector: &str) -> Result<Element, SessionError> {
        self.client
            .page
            .find_element(selector)
            .await
            .map_err(|e| SessionError::Interaction(format!("{selector}: {e}")))
    }

    async fn is_disabled(element: &Element) -> bool {
        if let Ok(Some(_)) = element.attribute("disabled").await {
            return true;
        }
        // The booking UI marks unavailable options with a class instead.
        matches!(
            element.attribute("class").await,
            Ok(Some(classes)) if classes.split_whitespace().any(|c| c == "disabled")
        )
    }
}

#[async_trait]
impl Session for HeadlessSession {
    async fn is_ready(&self) -> bool {
        self.client.page.url().await.is_ok()
    }

    async fn current_text(&mut self, selector: &str) -> Result<Option<String>, SessionError> {
        let Ok(element) = self.client.page.find_element(selector).await else {
            return Ok(None);
        };
        let text = element
            .inner_text()
            .await
            .map_err(|e| SessionError::Interaction(e.to_string()))?;
        Ok(text.map(|t| t.trim().to_string()))
    }

    async fn wait_for_visible(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, SessionError> {
        // Presence stands in for visibility: the booking flow removes
        // hidden steps from the DOM rather than hiding them.
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.client.page.find_element(selector).await.is_ok() {
                return Ok(true);
            }
            if tokio::time::Instant::now() >= deadline {
                debug!("wait for {} timed out after {:?}", selector, timeout);
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn click(&mut self, selector: &str) -> Result<(), SessionError> {
        let element = self.find(selector).await?;
        element
            .click()
            .await
            .map_err(|e| SessionError::Interaction(format!("click {selector}: {e}")))?;
        Ok(())
    }

    async fn fill(&mut self, selector: &str, value: &str) -> Result<(), SessionError> {
        let element = self.find(selector).await?;
        element
            .click()
            .await
            .map_err(|e| SessionError::Interaction(format!("focus {selector}: {e}")))?;
        element
            .type_str(value)
            .await
            .map_err(|e| SessionError::Interaction(format!("type into {selector}: {e}")))?;
        Ok(())
    }

    async fn query_all(&mut self, selector: &str) -> Result<Vec<ElementHandle>, SessionError> {
        let elements = self
            .client
            .page
            .find_elements(selector)
            .await
            .unwrap_or_default();

        let mut handles = Vec::with_capacity(elements.len());
        let mut kept = Vec::with_capacity(elements.len());
        for element in elements {
            let text = element
                .inner_text()
                .await
                .ok()
                .flatten()
                .unwrap_or_default()
                .trim()
                .to_string();
            let disabled = Self::is_disabled(&element).await;
            handles.push(ElementHandle {
                id: kept.len() as u64,
                text,
                disabled,
            });
            kept.push(element);
        }
        self.last_query = kept;
        Ok(handles)
    }

    async fn click_element(&mut self, handle: &ElementHandle) -> Result<(), SessionError> {
        let element = self
            .last_query
            .get(handle.id as usize)
            .ok_or(SessionError::StaleElement(handle.id))?;
        element
            .click()
            .await
            .map_err(|e| SessionError::Interaction(format!("click element {}: {e}", handle.id)))?;
        Ok(())
    }
}
