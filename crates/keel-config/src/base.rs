//! The base configuration schema.
//!
//! Projects declare their own [`Schema`] statics the same way; this one is
//! the starting point and what the `keel` binary merges into.

use crate::record::{FieldSpec, Record, Schema};
use crate::value::ConfValue;

fn generic_dict() -> ConfValue {
    ConfValue::map([(0_i64, "generic")])
}

fn generic_list() -> ConfValue {
    ConfValue::list([4, 8, 16, 32, 64])
}

fn generic_tuple() -> ConfValue {
    ConfValue::tuple([32, 64, 128, 256, 512])
}

/// Base configuration schema.
pub static BASE_SCHEMA: Schema = Schema {
    name: "Conf",
    doc: "Base configuration class.",
    fields: &[
        FieldSpec {
            name: "NAME",
            doc: "Name the configurations. Useful if your code needs to do things \
                  differently depending on which experiment is running.",
            default: ConfValue::default,
        },
        FieldSpec {
            name: "GENERIC_DICT",
            doc: "",
            default: generic_dict,
        },
        FieldSpec {
            name: "GENERIC_LIST",
            doc: "",
            default: generic_list,
        },
        FieldSpec {
            name: "GENERIC_TUPLE",
            doc: "",
            default: generic_tuple,
        },
    ],
    after_merge: None,
};

impl Record {
    /// Build a record from [`BASE_SCHEMA`].
    #[must_use]
    pub fn base() -> Self {
        Self::new(&BASE_SCHEMA)
    }
}
