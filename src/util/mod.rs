//! Utility modules for mixpath

pub mod logging;

pub use logging::{init_from_config, init_logging, LoggingConfig};
