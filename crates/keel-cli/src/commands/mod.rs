//! CLI command handlers.

pub(crate) mod merge;
