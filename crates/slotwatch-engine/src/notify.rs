use async_trait::async_trait;
use serde_json::json;
use slotwatch_common::calendar::format_iso_date;
use slotwatch_common::job::TimeWindow;
use slotwatch_common::slots::{AvailabilityResult, Slot};
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime};
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no webhook URL configured")]
    MissingWebhook,

    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook returned status {0}")]
    Status(u16),
}

/// Outbound notification capability. `send` reports success or failure
/// only; transport details stay behind the trait.
#[async_trait]
pub trait Notify: Send + Sync {
    async fn send(
        &self,
        date: Date,
        window: TimeWindow,
        party_size: u32,
        slots: &[Slot],
    ) -> Result<(), DispatchError>;
}

#[derive(Debug)]
pub enum NotificationOutcome {
    Sent,
    Skipped,
    Failed(DispatchError),
}

/// The notifier gate: dispatch only when slots exist. A dispatch failure is
/// reported, not propagated, so the scheduler can leave the job unnotified
/// and retry on the next eligible tick. At-most-once is enforced upstream
/// by the eligibility check, not here.
pub async fn maybe_notify(
    notifier: &dyn Notify,
    date: Date,
    window: TimeWindow,
    party_size: u32,
    result: &AvailabilityResult,
) -> NotificationOutcome {
    if !result.available || result.slots.is_empty() {
        return NotificationOutcome::Skipped;
    }
    match notifier.send(date, window, party_size, &result.slots).await {
        Ok(()) => NotificationOutcome::Sent,
        Err(e) => NotificationOutcome::Failed(e),
    }
}

/// Posts a Discord-compatible embed to a webhook URL.
pub struct WebhookNotifier {
    url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Notify for WebhookNotifier {
    async fn send(
        &self,
        date: Date,
        window: TimeWindow,
        party_size: u32,
        slots: &[Slot],
    ) -> Result<(), DispatchError> {
        let payload = build_payload(date, window, party_size, slots, OffsetDateTime::now_utc());
        let response = self.client.post(&self.url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Status(status.as_u16()));
        }
        info!(date = %format_iso_date(date), %window, "webhook notification sent");
        Ok(())
    }
}

/// Stand-in when no webhook URL is configured. Always fails, which leaves
/// jobs unnotified and retrying — the same behavior the original flow has
/// when its webhook env var is missing.
pub struct UnconfiguredNotifier;

#[async_trait]
impl Notify for UnconfiguredNotifier {
    async fn send(
        &self,
        date: Date,
        window: TimeWindow,
        _party_size: u32,
        slots: &[Slot],
    ) -> Result<(), DispatchError> {
        warn!(
            date = %format_iso_date(date),
            %window,
            open = slots.len(),
            "slots found but no webhook URL is configured"
        );
        Err(DispatchError::MissingWebhook)
    }
}

fn build_payload(
    date: Date,
    window: TimeWindow,
    party_size: u32,
    slots: &[Slot],
    now: OffsetDateTime,
) -> serde_json::Value {
    let times: Vec<&str> = slots.iter().map(|s| s.time.as_str()).collect();
    let mut embed = json!({
        "title": format!(
            "Booking open: {} {} ({} guests)",
            format_iso_date(date), window, party_size
        ),
        "description": "A matching reservation slot just opened up.",
        "color": 0x00aaff,
        "fields": [
            { "name": "Date", "value": format_iso_date(date), "inline": true },
            { "name": "Window", "value": window.to_string(), "inline": true },
            { "name": "Guests", "value": party_size.to_string(), "inline": true },
            { "name": "Open times", "value": times.join(", ") },
        ],
        "footer": { "text": "slotwatch" },
        "timestamp": now.format(&Rfc3339).unwrap_or_default(),
    });
    if let Some(first) = slots.first() {
        embed["url"] = json!(first.link);
    }
    json!({ "embeds": [embed] })
}
