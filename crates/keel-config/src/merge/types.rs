use crate::value::TypeTag;

/// A sanctioned conversion from one value shape into another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastRule {
    /// Type of the replacement value.
    pub from: TypeTag,
    /// Type of the value being replaced.
    pub to: TypeTag,
}

impl CastRule {
    /// Build a rule allowing `from` replacements to stand in for `to` originals.
    #[must_use]
    pub const fn new(from: TypeTag, to: TypeTag) -> Self {
        Self { from, to }
    }
}

/// How a merge behaves when a later key fails to coerce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// Validate every key before writing any. A failure, including one from
    /// the post-merge hook, leaves the record untouched.
    #[default]
    Atomic,
    /// Coerce and write key by key. A failure leaves earlier keys written.
    Sequential,
}

/// Outcome of a successful merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Fields that received an override, in override order.
    pub applied: Vec<String>,
    /// Override keys the record does not declare, in override order.
    pub ignored: Vec<String>,
}
