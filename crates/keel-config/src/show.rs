//! Rendering a record for display.

use std::fmt;

use crate::merge::MergeReport;
use crate::record::Record;

/// Output format for printing a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShowFormat {
    /// The `Configurations:` listing.
    #[default]
    Text,
    /// JSON object in field order (for programmatic consumption).
    Json,
    /// YAML mapping in field order.
    Yaml,
}

impl Record {
    /// Render the record in the requested format. Every format ends with a
    /// newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn show(&self, format: ShowFormat) -> Result<String, fmt::Error> {
        match format {
            ShowFormat::Text => Ok(self.to_string()),
            ShowFormat::Json => serde_json::to_string_pretty(self)
                .map(|json| json + "\n")
                .map_err(|_| fmt::Error),
            ShowFormat::Yaml => serde_yaml::to_string(self).map_err(|_| fmt::Error),
        }
    }
}

impl MergeReport {
    /// One-line summary, e.g. `2 applied, 1 ignored (EXTRA)`.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.ignored.is_empty() {
            format!("{} applied, 0 ignored", self.applied.len())
        } else {
            format!(
                "{} applied, {} ignored ({})",
                self.applied.len(),
                self.ignored.len(),
                self.ignored.join(", ")
            )
        }
    }
}
