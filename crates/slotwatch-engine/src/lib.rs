pub mod config;
pub mod navigator;
pub mod notify;
pub mod scheduler;
pub mod session;

pub use slotwatch_common::extract;
pub use slotwatch_common::job::{MonitorJob, TimeWindow};
pub use slotwatch_common::slots::{AvailabilityResult, Slot};
