pub mod calendar;
pub mod extract;
pub mod job;
pub mod slots;

pub use extract::extract;
pub use job::{MonitorJob, TimeWindow};
pub use slots::{AvailabilityResult, Slot};
