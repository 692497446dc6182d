//! Shared utilities: logging initialization and retry scheduling.

mod logging;
mod schedule;

pub use logging::init_logging;
pub use schedule::RetrySchedule;
