//! Handler for merging an override file into the base record.

use std::path::Path;

use anyhow::{Context, Result};
use keel_config::{MergePolicy, Merger, Record, ShowFormat};
use tracing::info;

/// Build the base record, merge `conf` into it if given, and render it.
///
/// Without a path the defaults are rendered unchanged.
pub(crate) fn run(conf: Option<&Path>, policy: MergePolicy, format: ShowFormat) -> Result<String> {
    let mut record = Record::base();

    if let Some(path) = conf {
        let report = Merger::with_policy(policy)
            .merge_file(path, &mut record)
            .with_context(|| format!("failed to apply {}", path.display()))?;
        info!(path = %path.display(), summary = %report.summary(), "applied overrides");
    }

    record
        .show(format)
        .map_err(|e| anyhow::anyhow!("failed to format config: {e}"))
}
