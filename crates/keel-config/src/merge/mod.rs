//! Type-checked merging of override data into a configuration record.
//!
//! The merge is single-level: each override key replaces a whole field. The
//! record's current values define the expected shape, and every replacement
//! goes through the [`Coercer`] before it is written.

mod coerce;
mod types;

use std::path::Path;

use tracing::debug;

pub use coerce::Coercer;
pub use types::{CastRule, MergePolicy, MergeReport};

use crate::error::{ConfigError, ConfigResult};
use crate::loader::{Overrides, load_overrides};
use crate::record::ConfigRecord;
use crate::value::ConfValue;

/// Applies override mappings to records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Merger {
    /// Coercion rule applied to every override.
    pub coercer: Coercer,
    /// Behaviour when a key fails to coerce.
    pub policy: MergePolicy,
}

impl Merger {
    /// A merger with the default coercer and the given policy.
    #[must_use]
    pub fn with_policy(policy: MergePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Merge `overrides` into `target`.
    ///
    /// Keys the record does not declare are skipped. Values are cloned out of
    /// `overrides`, so the record never shares data with the caller's map.
    /// After every key has been applied, [`ConfigRecord::after_merge`] runs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TypeMismatch`] for the first override that
    /// cannot be coerced. Under [`MergePolicy::Atomic`] nothing has been
    /// written at that point; under [`MergePolicy::Sequential`] earlier keys
    /// stay written. Errors from the post-merge hook are returned as-is;
    /// under [`MergePolicy::Atomic`] every field is first restored to the
    /// value it had before the merge.
    pub fn merge<R>(&self, overrides: &Overrides, target: &mut R) -> ConfigResult<MergeReport>
    where
        R: ConfigRecord + ?Sized,
    {
        let mut report = MergeReport::default();
        let mut staged: Vec<(&str, ConfValue)> = Vec::new();

        for (key, value) in overrides {
            if !target.contains(key) {
                debug!(key = %key, "ignoring override for undeclared field");
                report.ignored.push(key.clone());
                continue;
            }

            let coerced = self.coerce_field(key, value.clone(), &*target)?;
            match self.policy {
                MergePolicy::Atomic => staged.push((key.as_str(), coerced)),
                MergePolicy::Sequential => target.set(key, coerced)?,
            }
            report.applied.push(key.clone());
        }

        let rollback = match self.policy {
            MergePolicy::Atomic => Some(snapshot(&*target)?),
            MergePolicy::Sequential => None,
        };

        for (key, value) in staged {
            target.set(key, value)?;
        }

        if let Err(err) = target.after_merge() {
            if let Some(previous) = rollback {
                debug!(error = %err, "post-merge hook failed, restoring previous values");
                for (field, value) in previous {
                    target.set(&field, value)?;
                }
            }
            return Err(err);
        }

        debug!(
            applied = report.applied.len(),
            ignored = report.ignored.len(),
            "merge complete"
        );
        Ok(report)
    }

    /// Load an override file and merge it into `target`.
    ///
    /// A file that cannot be read or parsed is reported before any merge
    /// work starts, leaving `target` untouched.
    ///
    /// # Errors
    ///
    /// Returns loader errors ([`ConfigError::ReadError`],
    /// [`ConfigError::ParseError`], [`ConfigError::ValidationError`]) or any
    /// error from [`Merger::merge`].
    pub fn merge_file<R>(&self, path: &Path, target: &mut R) -> ConfigResult<MergeReport>
    where
        R: ConfigRecord + ?Sized,
    {
        let overrides = load_overrides(path)?;
        self.merge(&overrides, target)
    }

    fn coerce_field<R>(&self, key: &str, value: ConfValue, target: &R) -> ConfigResult<ConfValue>
    where
        R: ConfigRecord + ?Sized,
    {
        let original = target.get(key)?;
        self.coercer
            .coerce(value, original)
            .map_err(|source| ConfigError::TypeMismatch {
                field: key.to_owned(),
                source,
            })
    }
}

/// Owned copy of every declared field, in declaration order.
fn snapshot<R>(target: &R) -> ConfigResult<Vec<(String, ConfValue)>>
where
    R: ConfigRecord + ?Sized,
{
    target
        .field_names()
        .into_iter()
        .map(|field| Ok((field.to_owned(), target.get(field)?.clone())))
        .collect()
}
