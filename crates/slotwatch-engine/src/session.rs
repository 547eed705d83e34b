use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session is not ready")]
    NotReady,

    #[error("stale element handle {0}, re-query before clicking")]
    StaleElement(u64),

    #[error("interaction failed: {0}")]
    Interaction(String),

    #[error("not supported: {0}")]
    NotSupported(String),

    #[error("session error: {0}")]
    Other(String),
}

/// An element observed by [`Session::query_all`]. Plain data: `id` refers
/// into the session's last query result and stays valid only until the next
/// `query_all` on the same session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    pub id: u64,
    pub text: String,
    pub disabled: bool,
}

/// The shared, externally-owned, already-authenticated browsing context.
///
/// The core reads rendered state and issues interaction commands through
/// this capability; it never creates, logs in, or tears down the session.
/// Implementations are not safe to drive concurrently — callers must
/// serialize access (the scheduler owns the only handle).
#[async_trait]
pub trait Session: Send + Sync {
    /// Whether the session can currently accept commands.
    async fn is_ready(&self) -> bool;

    /// Text content of the first element matching `selector`, if present.
    async fn current_text(&mut self, selector: &str) -> Result<Option<String>, SessionError>;

    /// Wait up to `timeout` for `selector` to become visible. A timeout is
    /// an observation (`Ok(false)`), not a transport failure.
    async fn wait_for_visible(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, SessionError>;

    /// Click the first element matching `selector`.
    async fn click(&mut self, selector: &str) -> Result<(), SessionError>;

    /// Type `value` into the first element matching `selector`.
    async fn fill(&mut self, selector: &str, value: &str) -> Result<(), SessionError> {
        let _ = value;
        Err(SessionError::NotSupported(format!("fill {selector}")))
    }

    /// All elements matching `selector`, in document order.
    async fn query_all(&mut self, selector: &str) -> Result<Vec<ElementHandle>, SessionError>;

    /// Click an element returned by the most recent `query_all`.
    async fn click_element(&mut self, handle: &ElementHandle) -> Result<(), SessionError>;
}
