//! Keel Telemetry - logging setup for keel tools.
//!
//! # Example
//!
//! ```rust,no_run
//! use keel_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), keel_telemetry::TelemetryError> {
//! let config = LogConfig::new("debug")
//!     .with_format(LogFormat::Pretty)
//!     .with_directive("keel_config=trace");
//!
//! setup_logging(&config)?;
//! tracing::info!("merging overrides");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, LogTarget, setup_logging};
