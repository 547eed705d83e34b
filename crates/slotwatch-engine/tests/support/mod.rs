#![allow(dead_code)]

use async_trait::async_trait;
use slotwatch_engine::navigator::Selectors;
use slotwatch_engine::notify::{DispatchError, Notify};
use slotwatch_engine::session::{ElementHandle, Session, SessionError};
use slotwatch_common::job::TimeWindow;
use slotwatch_common::slots::Slot;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use time::Date;

/// Scripted reservation UI: selector lookups answer from fixed state and
/// every interaction is recorded. Cloning shares the state, so tests can
/// keep a handle after moving a clone into the scheduler.
#[derive(Clone)]
pub struct FakeSession {
    state: Arc<Mutex<FakeState>>,
}

pub struct FakeState {
    pub selectors: Selectors,
    /// Caption sets the calendar cycles through; an advance click moves to
    /// the next set (and sticks at the last one).
    pub caption_sets: Vec<Vec<String>>,
    pub caption_idx: usize,
    pub days: Vec<(String, bool)>,
    pub party_options: Vec<(String, bool)>,
    pub slot_options: Vec<(String, bool)>,
    pub continue_candidates: Vec<(String, bool)>,
    pub continue_primary_visible: bool,
    pub ready: bool,
    pub clicks: Vec<String>,
    pub element_clicks: Vec<(String, u64)>,
    continue_clicked: bool,
    last_query: String,
}

impl FakeState {
    /// A fully working flow for June 15 2025, dinner for 2: one open slot
    /// at 18:30.
    pub fn happy() -> Self {
        Self {
            selectors: Selectors::default(),
            caption_sets: vec![vec!["June 2025".into(), "July 2025".into()]],
            caption_idx: 0,
            days: vec![
                ("14".into(), true),
                ("15".into(), false),
                ("16".into(), false),
            ],
            party_options: vec![("2".into(), false), ("3".into(), false)],
            slot_options: vec![("18:30".into(), false)],
            continue_candidates: vec![("Back".into(), false), ("Continue".into(), false)],
            continue_primary_visible: true,
            ready: true,
            clicks: Vec::new(),
            element_clicks: Vec::new(),
            continue_clicked: false,
            last_query: String::new(),
        }
    }
}

impl FakeSession {
    pub fn new(state: FakeState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn happy() -> Self {
        Self::new(FakeState::happy())
    }

    pub fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn advance_clicks(&self) -> usize {
        let st = self.lock();
        let advance = st.selectors.advance_month.clone();
        st.clicks.iter().filter(|c| **c == advance).count()
    }
}

#[async_trait]
impl Session for FakeSession {
    async fn is_ready(&self) -> bool {
        self.lock().ready
    }

    async fn current_text(&mut self, selector: &str) -> Result<Option<String>, SessionError> {
        let st = self.lock();
        if selector == st.selectors.calendar_caption {
            Ok(st.caption_sets[st.caption_idx].first().cloned())
        } else {
            Ok(None)
        }
    }

    async fn wait_for_visible(
        &mut self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<bool, SessionError> {
        let st = self.lock();
        if selector == st.selectors.continue_primary {
            Ok(st.continue_primary_visible)
        } else {
            Ok(true)
        }
    }

    async fn click(&mut self, selector: &str) -> Result<(), SessionError> {
        let mut st = self.lock();
        st.clicks.push(selector.to_string());
        if selector == st.selectors.advance_month && st.caption_idx + 1 < st.caption_sets.len() {
            st.caption_idx += 1;
        }
        if selector == st.selectors.continue_primary {
            st.continue_clicked = true;
        }
        Ok(())
    }

    async fn query_all(&mut self, selector: &str) -> Result<Vec<ElementHandle>, SessionError> {
        let mut st = self.lock();
        st.last_query = selector.to_string();
        let items: Vec<(String, bool)> = if selector == st.selectors.calendar_caption {
            // A fresh navigation pass always starts at the calendar.
            st.continue_clicked = false;
            st.caption_sets[st.caption_idx]
                .iter()
                .map(|c| (c.clone(), false))
                .collect()
        } else if selector == st.selectors.day_cell {
            st.days.clone()
        } else if selector == st.selectors.option_button {
            if st.continue_clicked {
                st.slot_options.clone()
            } else {
                st.party_options.clone()
            }
        } else if selector == st.selectors.continue_fallback {
            st.continue_candidates.clone()
        } else {
            Vec::new()
        };
        Ok(items
            .into_iter()
            .enumerate()
            .map(|(i, (text, disabled))| ElementHandle {
                id: i as u64,
                text,
                disabled,
            })
            .collect())
    }

    async fn click_element(&mut self, handle: &ElementHandle) -> Result<(), SessionError> {
        let mut st = self.lock();
        let selector = st.last_query.clone();
        st.element_clicks.push((selector.clone(), handle.id));
        if selector == st.selectors.continue_fallback {
            st.continue_clicked = true;
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct FakeNotifier {
    inner: Arc<Mutex<NotifierState>>,
}

#[derive(Default)]
struct NotifierState {
    attempts: Vec<(Date, TimeWindow, u32, Vec<Slot>)>,
    fail: bool,
}

impl FakeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail(&self, fail: bool) {
        self.inner.lock().unwrap().fail = fail;
    }

    pub fn attempts(&self) -> usize {
        self.inner.lock().unwrap().attempts.len()
    }

    pub fn last(&self) -> Option<(Date, TimeWindow, u32, Vec<Slot>)> {
        self.inner.lock().unwrap().attempts.last().cloned()
    }
}

#[async_trait]
impl Notify for FakeNotifier {
    async fn send(
        &self,
        date: Date,
        window: TimeWindow,
        party_size: u32,
        slots: &[Slot],
    ) -> Result<(), DispatchError> {
        let mut st = self.inner.lock().unwrap();
        st.attempts.push((date, window, party_size, slots.to_vec()));
        if st.fail {
            Err(DispatchError::Status(500))
        } else {
            Ok(())
        }
    }
}
