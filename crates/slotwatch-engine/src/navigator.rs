use crate::session::{Session, SessionError};
use serde::{Deserialize, Serialize};
use slotwatch_common::calendar::MonthCaption;
use std::time::Duration;
use thiserror::Error;
use time::Date;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("calendar navigation failed: {0}")]
    CalendarNavigation(String),

    #[error("day selection failed: {0}")]
    DaySelection(String),

    #[error("no selectable party-size option for {0} guests")]
    PartySizeUnavailable(u32),

    #[error("continue control not found after party-size selection")]
    ContinueControlNotFound,

    #[error("time-slot options did not render: {0}")]
    SlotOptionsNotRendered(String),

    #[error("no active session")]
    SessionUnavailable,

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// CSS selectors for the reservation UI, overridable from the config file.
///
/// The caption selector is a styled-components hash and changes whenever
/// the target site redeploys its design system; it is the first thing to
/// update when month resolution starts failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selectors {
    #[serde(default = "default_calendar_caption")]
    pub calendar_caption: String,
    #[serde(default = "default_advance_month")]
    pub advance_month: String,
    #[serde(default = "default_day_cell")]
    pub day_cell: String,
    #[serde(default = "default_confirm_date")]
    pub confirm_date: String,
    #[serde(default = "default_option_group")]
    pub option_group: String,
    #[serde(default = "default_option_button")]
    pub option_button: String,
    #[serde(default = "default_continue_primary")]
    pub continue_primary: String,
    #[serde(default = "default_continue_fallback")]
    pub continue_fallback: String,
    #[serde(default = "default_continue_label")]
    pub continue_label: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            calendar_caption: default_calendar_caption(),
            advance_month: default_advance_month(),
            day_cell: default_day_cell(),
            confirm_date: default_confirm_date(),
            option_group: default_option_group(),
            option_button: default_option_button(),
            continue_primary: default_continue_primary(),
            continue_fallback: default_continue_fallback(),
            continue_label: default_continue_label(),
        }
    }
}

fn default_calendar_caption() -> String {
    ".style__TypographyBase-sc-9d50454a-0.kouJey".into()
}

fn default_advance_month() -> String {
    ".custom-calendar-caption:nth-of-type(2) .custom-calendar-caption__button".into()
}

fn default_day_cell() -> String {
    ".rdp-day[role=\"gridcell\"]:not([disabled]) .date".into()
}

fn default_confirm_date() -> String {
    ".confirm-button".into()
}

fn default_option_group() -> String {
    ".radio-as-button-group__wrapper".into()
}

fn default_option_button() -> String {
    ".radio-as-button".into()
}

fn default_continue_primary() -> String {
    "button[aria-label=\"Continue\"]".into()
}

fn default_continue_fallback() -> String {
    "button[role=\"button\"][data-fantasia-ds=\"Button\"]".into()
}

fn default_continue_label() -> String {
    "Continue".into()
}

/// Bounded waits for each navigation step, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitConfig {
    #[serde(default = "default_step_timeout_ms")]
    pub step_timeout_ms: u64,
    #[serde(default = "default_advance_button_timeout_ms")]
    pub advance_button_timeout_ms: u64,
    #[serde(default = "default_advance_settle_ms")]
    pub advance_settle_ms: u64,
    #[serde(default = "default_continue_timeout_ms")]
    pub continue_timeout_ms: u64,
    #[serde(default = "default_slot_panel_timeout_ms")]
    pub slot_panel_timeout_ms: u64,
    #[serde(default = "default_login_timeout_ms")]
    pub login_timeout_ms: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            step_timeout_ms: default_step_timeout_ms(),
            advance_button_timeout_ms: default_advance_button_timeout_ms(),
            advance_settle_ms: default_advance_settle_ms(),
            continue_timeout_ms: default_continue_timeout_ms(),
            slot_panel_timeout_ms: default_slot_panel_timeout_ms(),
            login_timeout_ms: default_login_timeout_ms(),
        }
    }
}

fn default_step_timeout_ms() -> u64 {
    10_000
}

fn default_advance_button_timeout_ms() -> u64 {
    5_000
}

fn default_advance_settle_ms() -> u64 {
    500
}

fn default_continue_timeout_ms() -> u64 {
    10_000
}

fn default_slot_panel_timeout_ms() -> u64 {
    15_000
}

fn default_login_timeout_ms() -> u64 {
    120_000
}

impl WaitConfig {
    fn step(&self) -> Duration {
        Duration::from_millis(self.step_timeout_ms)
    }

    fn advance_button(&self) -> Duration {
        Duration::from_millis(self.advance_button_timeout_ms)
    }

    fn advance_settle(&self) -> Duration {
        Duration::from_millis(self.advance_settle_ms)
    }

    fn continue_control(&self) -> Duration {
        Duration::from_millis(self.continue_timeout_ms)
    }

    fn slot_panel(&self) -> Duration {
        Duration::from_millis(self.slot_panel_timeout_ms)
    }
}

/// Drives the booking UI from its current state to the slot-selection
/// screen. Pure step logic over [`Session`] observations; no internal
/// retry — the scheduler's poll interval is the retry mechanism.
pub struct Navigator {
    selectors: Selectors,
    waits: WaitConfig,
}

impl Navigator {
    pub fn new(selectors: Selectors, waits: WaitConfig) -> Self {
        Self { selectors, waits }
    }

    /// Month → day → party size → slot panel, each step wait-then-act-then-
    /// verify. Returns the enabled time labels in UI order.
    pub async fn navigate_to_slot_selection(
        &self,
        session: &mut dyn Session,
        date: Date,
        party_size: u32,
    ) -> Result<Vec<String>, NavigationError> {
        if !session.is_ready().await {
            return Err(NavigationError::SessionUnavailable);
        }
        self.resolve_month(session, date).await?;
        self.select_day(session, date).await?;
        self.select_party_size(session, party_size).await?;
        self.read_slot_labels(session).await
    }

    async fn read_captions(
        &self,
        session: &mut dyn Session,
    ) -> Result<Vec<Option<MonthCaption>>, NavigationError> {
        let handles = session.query_all(&self.selectors.calendar_caption).await?;
        // The widget renders two months side by side; anything past the
        // second caption is unrelated text matching the same class.
        Ok(handles
            .iter()
            .take(2)
            .map(|h| MonthCaption::parse(&h.text))
            .collect())
    }

    /// Bring the target month on screen. Auto-navigation is limited to a
    /// single forward step: the calendar is never paged arbitrarily far.
    async fn resolve_month(
        &self,
        session: &mut dyn Session,
        date: Date,
    ) -> Result<(), NavigationError> {
        let target = MonthCaption::of(date);

        if !session
            .wait_for_visible(&self.selectors.calendar_caption, self.waits.step())
            .await?
        {
            return Err(NavigationError::CalendarNavigation(
                "calendar captions never became visible".into(),
            ));
        }

        let captions = self.read_captions(session).await?;
        if captions.iter().flatten().any(|c| *c == target) {
            debug!(%target, "target month already displayed");
            return Ok(());
        }

        let current = captions.first().copied().flatten().ok_or_else(|| {
            NavigationError::CalendarNavigation("could not parse the displayed captions".into())
        })?;
        if current.succ() != target {
            return Err(NavigationError::CalendarNavigation(format!(
                "{target} is not displayed and is not the month after {current}"
            )));
        }

        if !session
            .wait_for_visible(&self.selectors.advance_month, self.waits.advance_button())
            .await?
        {
            return Err(NavigationError::CalendarNavigation(
                "advance-month control not found".into(),
            ));
        }
        session.click(&self.selectors.advance_month).await?;
        tokio::time::sleep(self.waits.advance_settle()).await;

        let captions = self.read_captions(session).await?;
        if captions.iter().flatten().any(|c| *c == target) {
            info!(%target, "advanced calendar one month");
            Ok(())
        } else {
            Err(NavigationError::CalendarNavigation(format!(
                "{target} still not displayed after advancing"
            )))
        }
    }

    async fn select_day(
        &self,
        session: &mut dyn Session,
        date: Date,
    ) -> Result<(), NavigationError> {
        if let Some(caption) = session.current_text(&self.selectors.calendar_caption).await? {
            debug!(month = %caption.trim(), day = date.day(), "selecting day");
        }

        let day = date.day().to_string();
        let cells = session.query_all(&self.selectors.day_cell).await?;
        let cell = cells
            .iter()
            .find(|h| !h.disabled && h.text.trim() == day)
            .ok_or_else(|| {
                NavigationError::DaySelection(format!(
                    "day {day} is not selectable in the displayed month"
                ))
            })?;
        session.click_element(cell).await?;

        if !session
            .wait_for_visible(&self.selectors.confirm_date, self.waits.step())
            .await?
        {
            return Err(NavigationError::DaySelection(
                "confirm control never appeared after picking the day".into(),
            ));
        }
        session.click(&self.selectors.confirm_date).await?;
        Ok(())
    }

    async fn select_party_size(
        &self,
        session: &mut dyn Session,
        party_size: u32,
    ) -> Result<(), NavigationError> {
        if !session
            .wait_for_visible(&self.selectors.option_group, self.waits.step())
            .await?
        {
            return Err(NavigationError::PartySizeUnavailable(party_size));
        }

        let label = party_size.to_string();
        let options = session.query_all(&self.selectors.option_button).await?;
        let option = options
            .iter()
            .find(|h| !h.disabled && h.text.trim() == label)
            .ok_or(NavigationError::PartySizeUnavailable(party_size))?;
        session.click_element(option).await?;

        // Two-tier continue lookup: the UI framework renders equivalent
        // controls with varying attributes, so a miss on the primary
        // selector falls back to scanning candidates by visible text.
        if session
            .wait_for_visible(&self.selectors.continue_primary, self.waits.continue_control())
            .await?
        {
            session.click(&self.selectors.continue_primary).await?;
            return Ok(());
        }

        debug!("primary continue selector missed, scanning candidates by text");
        let candidates = session.query_all(&self.selectors.continue_fallback).await?;
        let control = candidates
            .iter()
            .find(|h| h.text.contains(&self.selectors.continue_label))
            .ok_or(NavigationError::ContinueControlNotFound)?;
        session.click_element(control).await?;
        Ok(())
    }

    /// Terminal step: the single place disabled filtering is enforced for
    /// slot candidates.
    async fn read_slot_labels(
        &self,
        session: &mut dyn Session,
    ) -> Result<Vec<String>, NavigationError> {
        if !session
            .wait_for_visible(&self.selectors.option_group, self.waits.slot_panel())
            .await?
        {
            return Err(NavigationError::SlotOptionsNotRendered(
                "slot panel never appeared after continue".into(),
            ));
        }

        let options = session.query_all(&self.selectors.option_button).await?;
        let labels: Vec<String> = options
            .into_iter()
            .filter(|h| !h.disabled)
            .map(|h| h.text.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        info!(open = labels.len(), "slot options read");
        Ok(labels)
    }
}
