//! The time when the application started, fixed at process start.
use std::time::SystemTime;

lazy_static! {
    /// The time at the start of the application.
    pub static ref TIME_AT_APP_START: SystemTime = SystemTime::now();
}
