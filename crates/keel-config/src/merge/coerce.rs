use super::CastRule;
use crate::error::TypeMismatch;
use crate::value::{ConfValue, TypeTag};

/// Decides whether a replacement may stand in for an original value.
///
/// The rule, in order:
/// 1. identical types: accept unchanged;
/// 2. exactly one side null and the other's type in `nullable`: accept unchanged;
/// 3. the first cast rule matching `(replacement type, original type)` whose
///    conversion is defined: accept the converted value;
/// 4. otherwise reject with [`TypeMismatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coercer {
    /// Ordered cast rules consulted after the exact and null checks.
    pub casts: Vec<CastRule>,
    /// Types that accept null, and that null accepts.
    pub nullable: Vec<TypeTag>,
}

impl Default for Coercer {
    fn default() -> Self {
        Self {
            casts: vec![
                CastRule::new(TypeTag::Tuple, TypeTag::List),
                CastRule::new(TypeTag::List, TypeTag::Tuple),
            ],
            nullable: TypeTag::ALL.to_vec(),
        }
    }
}

impl Coercer {
    /// A coercer with no cast rules: only exact and null matches pass.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            casts: Vec::new(),
            ..Self::default()
        }
    }

    /// Append a cast rule. Earlier rules win.
    #[must_use]
    pub fn with_cast(mut self, rule: CastRule) -> Self {
        self.casts.push(rule);
        self
    }

    /// Coerce `replacement` against `original`.
    ///
    /// # Errors
    ///
    /// Returns [`TypeMismatch`] when no step of the rule accepts the pair.
    pub fn coerce(
        &self,
        replacement: ConfValue,
        original: &ConfValue,
    ) -> Result<ConfValue, TypeMismatch> {
        let original_type = original.type_tag();
        let replacement_type = replacement.type_tag();

        if replacement_type == original_type {
            return Ok(replacement);
        }

        let null_compatible = (replacement_type == TypeTag::Null
            && self.nullable.contains(&original_type))
            || (original_type == TypeTag::Null && self.nullable.contains(&replacement_type));
        if null_compatible {
            return Ok(replacement);
        }

        let mut candidate = replacement;
        for rule in &self.casts {
            if rule.from != replacement_type || rule.to != original_type {
                continue;
            }
            match candidate.cast_to(rule.to) {
                Ok(converted) => return Ok(converted),
                Err(unchanged) => candidate = unchanged,
            }
        }

        Err(TypeMismatch {
            original_type,
            replacement_type,
            original: Box::new(original.clone()),
            replacement: Box::new(candidate),
        })
    }
}
