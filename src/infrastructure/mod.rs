pub mod error_logging;
pub mod logging;

pub use error_logging::ErrorLogger;
pub use logging::{format_duration, Logger, LoggerTrait};
