//! Shared utilities for the Strato registry binaries.

pub mod logging;
pub mod time;

pub use logging::{init_logging, LogFormat, LoggingError};
pub use time::{format_duration, format_until};
