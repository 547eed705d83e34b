use crate::calendar::format_iso_date;
use crate::job::TimeWindow;
use crate::slots::{AvailabilityResult, Slot};
use time::Date;
use url::Url;

/// Convert the raw time labels read from the slot-selection screen into a
/// normalized [`AvailabilityResult`] for one requested window.
///
/// Pure: callers pass the labels the navigator already filtered down to
/// enabled controls (disabled filtering is enforced there, once). Label
/// order is preserved. An empty partition yields `available: false` with
/// no error.
pub fn extract(
    raw_time_labels: &[String],
    window: TimeWindow,
    date: Date,
    party_size: u32,
    base_url: &Url,
) -> AvailabilityResult {
    let matching: Vec<&str> = raw_time_labels
        .iter()
        .map(|l| l.as_str())
        .filter(|l| in_window(l, window))
        .collect();

    if matching.is_empty() {
        return AvailabilityResult::unavailable();
    }

    let date_str = format_iso_date(date);
    let slots = matching
        .into_iter()
        .map(|time| Slot {
            time: time.to_string(),
            link: booking_link(base_url, &date_str, time, party_size),
        })
        .collect();

    AvailabilityResult {
        available: true,
        slots,
        error: None,
    }
}

/// Hour from the `HH:MM` prefix of a label. Labels that don't start with a
/// number drop out of the lunch/dinner partitions but survive `Any`.
fn hour_of(label: &str) -> Option<u8> {
    label.split(':').next()?.trim().parse().ok()
}

fn in_window(label: &str, window: TimeWindow) -> bool {
    match window {
        TimeWindow::Any => true,
        TimeWindow::Lunch => matches!(hour_of(label), Some(h) if (11..15).contains(&h)),
        TimeWindow::Dinner => matches!(hour_of(label), Some(h) if h >= 15),
    }
}

/// Booking deep link synthesized from the request parameters. The live UI
/// does not render per-slot links; see DESIGN.md for the trade-off.
fn booking_link(base: &Url, date: &str, time: &str, guests: u32) -> String {
    let mut link = base.clone();
    link.query_pairs_mut()
        .append_pair("date", date)
        .append_pair("time", time)
        .append_pair("guests", &guests.to_string());
    link.to_string()
}
