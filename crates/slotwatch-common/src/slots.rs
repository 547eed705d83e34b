use serde::{Deserialize, Serialize};

/// A single bookable time label paired with a booking link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub time: String,
    pub link: String,
}

/// Outcome of one availability check. Immutable once produced; slot order
/// is the order the UI rendered them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityResult {
    pub available: bool,
    pub slots: Vec<Slot>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl AvailabilityResult {
    /// "No slots" is a normal outcome, not an error.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            slots: Vec::new(),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            available: false,
            slots: Vec::new(),
            error: Some(error.into()),
        }
    }
}
