#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Typed configuration records with type-safe overrides from files.
//!
//! A [`Record`] holds a fixed set of named fields, each starting at a default
//! value. A [`Merger`] applies an untyped override map (usually loaded from a
//! YAML file) onto the record, checking every replacement against the
//! field's current value with a [`Coercer`].
//!
//! # Usage
//!
//! ```rust,no_run
//! use keel_config::{ConfigRecord, Merger, Record};
//!
//! let mut conf = Record::base();
//! let report = Merger::default()
//!     .merge_file(std::path::Path::new("experiment.yaml"), &mut conf)
//!     .unwrap();
//! println!("{conf}");
//! println!("ignored: {:?}", report.ignored);
//! println!("name: {}", conf.get("NAME").unwrap());
//! ```
//!
//! # Coercion
//!
//! A replacement is accepted when its type equals the original's, when
//! exactly one of the two is null, or when a cast rule converts it
//! (by default list ↔ tuple). Everything else is a
//! [`ConfigError::TypeMismatch`]. Override keys the record does not declare
//! are skipped.

/// The base configuration schema.
pub mod base;
/// Configuration error types.
pub mod error;
/// Override file discovery and parsing.
pub mod loader;
/// Type-checked merging with coercion.
pub mod merge;
/// Record types, schemas, and the accessor trait.
pub mod record;
/// Record rendering.
pub mod show;
/// The closed configuration value model.
pub mod value;

// Re-export primary types at the crate root.
pub use base::BASE_SCHEMA;
pub use error::{ConfigError, ConfigResult, TypeMismatch};
pub use loader::{Overrides, SourceFormat, load_overrides, parse_overrides};
pub use merge::{CastRule, Coercer, MergePolicy, MergeReport, Merger};
pub use record::{AfterMergeHook, ConfigRecord, FieldSpec, Record, Schema};
pub use show::ShowFormat;
pub use value::{ConfValue, MapKey, TypeTag};
