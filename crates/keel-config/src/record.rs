//! Configuration records: a fixed set of named fields with default values.
//!
//! A [`Schema`] is a plain static describing field names, documentation, and
//! default factories. [`Record`] owns one value per schema field and exposes
//! them through the [`ConfigRecord`] accessor trait, which is what the merger
//! works against. Unknown names are always an error; fields are never
//! created on the fly.

use std::fmt::{self, Write as _};

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{ConfigError, ConfigResult};
use crate::value::{ConfValue, TypeTag};

/// Key-based access to a record with a fixed field set.
pub trait ConfigRecord {
    /// Current value of `field`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownField`] if `field` was never declared.
    fn get(&self, field: &str) -> ConfigResult<&ConfValue>;

    /// Overwrite the value of `field`. No type check happens here.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownField`] if `field` was never declared.
    fn set(&mut self, field: &str, value: ConfValue) -> ConfigResult<()>;

    /// Declared field names, in declaration order.
    fn field_names(&self) -> Vec<&str>;

    /// Whether `field` is declared.
    fn contains(&self, field: &str) -> bool {
        self.get(field).is_ok()
    }

    /// Type category of the field's current value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownField`] if `field` was never declared.
    fn declared_type(&self, field: &str) -> ConfigResult<TypeTag> {
        self.get(field).map(ConfValue::type_tag)
    }

    /// Called once after a successful merge to derive computed fields.
    ///
    /// # Errors
    ///
    /// Implementations may reject the merged values.
    fn after_merge(&mut self) -> ConfigResult<()> {
        Ok(())
    }
}

/// One declared field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Field name, unique within its schema.
    pub name: &'static str,
    /// One-line documentation shown in help output.
    pub doc: &'static str,
    /// Produces a fresh, owned default value.
    pub default: fn() -> ConfValue,
}

/// Post-merge normalization supplied by a schema.
pub type AfterMergeHook = fn(&mut Record) -> ConfigResult<()>;

/// Static description of a record's shape.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    /// Schema name used in diagnostics.
    pub name: &'static str,
    /// Schema-level documentation.
    pub doc: &'static str,
    /// Declared fields, in order.
    pub fields: &'static [FieldSpec],
    /// Optional hook run after each successful merge.
    pub after_merge: Option<AfterMergeHook>,
}

impl Schema {
    fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == field)
    }
}

/// A configuration record built from a [`Schema`].
#[derive(Debug, Clone)]
pub struct Record {
    schema: &'static Schema,
    values: Vec<ConfValue>,
}

impl Record {
    /// Build a record holding each field's default.
    #[must_use]
    pub fn new(schema: &'static Schema) -> Self {
        let values = schema.fields.iter().map(|f| (f.default)()).collect();
        Self { schema, values }
    }

    /// The schema this record was built from.
    #[must_use]
    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Iterate `(name, value)` pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &ConfValue)> + '_ {
        self.schema
            .fields
            .iter()
            .map(|f| f.name)
            .zip(self.values.iter())
    }

    /// Render the schema documentation with one `:param` line per field.
    #[must_use]
    pub fn doc(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.schema.doc.trim());
        let documented: Vec<&FieldSpec> = self
            .schema
            .fields
            .iter()
            .filter(|f| !f.doc.is_empty())
            .collect();
        if !documented.is_empty() {
            out.push('\n');
            for field in documented {
                let _ = writeln!(out, ":param {}: {}", field.name, field.doc);
            }
        }
        out
    }

    /// Restore every field to its default.
    pub fn reset(&mut self) {
        for (slot, spec) in self.values.iter_mut().zip(self.schema.fields) {
            *slot = (spec.default)();
        }
    }

    fn unknown(field: &str) -> ConfigError {
        ConfigError::UnknownField {
            field: field.to_owned(),
        }
    }
}

impl ConfigRecord for Record {
    fn get(&self, field: &str) -> ConfigResult<&ConfValue> {
        self.schema
            .position(field)
            .and_then(|i| self.values.get(i))
            .ok_or_else(|| Self::unknown(field))
    }

    fn set(&mut self, field: &str, value: ConfValue) -> ConfigResult<()> {
        let slot = self
            .schema
            .position(field)
            .and_then(|i| self.values.get_mut(i))
            .ok_or_else(|| Self::unknown(field))?;
        *slot = value;
        Ok(())
    }

    fn field_names(&self) -> Vec<&str> {
        self.schema.fields.iter().map(|f| f.name).collect()
    }

    fn contains(&self, field: &str) -> bool {
        self.schema.position(field).is_some()
    }

    fn after_merge(&mut self) -> ConfigResult<()> {
        match self.schema.after_merge {
            Some(hook) => hook(self),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Configurations:")?;
        for (name, value) in self.fields() {
            writeln!(f, "  {name}: {value}")?;
        }
        Ok(())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.fields() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port_default() -> ConfValue {
        ConfValue::Int(8080)
    }

    fn hosts_default() -> ConfValue {
        ConfValue::list(["a", "b"])
    }

    fn derive_url(record: &mut Record) -> ConfigResult<()> {
        let port = record.get("PORT")?.as_int().unwrap_or_default();
        record.set("URL", ConfValue::Str(format!("http://localhost:{port}")))
    }

    static SCHEMA: Schema = Schema {
        name: "Server",
        doc: "Server settings.",
        fields: &[
            FieldSpec {
                name: "PORT",
                doc: "Listening port.",
                default: port_default,
            },
            FieldSpec {
                name: "HOSTS",
                doc: "",
                default: hosts_default,
            },
            FieldSpec {
                name: "URL",
                doc: "Derived after merge.",
                default: ConfValue::default,
            },
        ],
        after_merge: Some(derive_url),
    };

    #[test]
    fn test_get_and_set() {
        let mut record = Record::new(&SCHEMA);
        assert_eq!(record.get("PORT").unwrap(), &ConfValue::Int(8080));

        record.set("PORT", ConfValue::Int(9000)).unwrap();
        assert_eq!(record.get("PORT").unwrap(), &ConfValue::Int(9000));
    }

    #[test]
    fn test_unknown_field_is_error() {
        let mut record = Record::new(&SCHEMA);
        assert!(matches!(
            record.get("MISSING"),
            Err(ConfigError::UnknownField { field }) if field == "MISSING"
        ));
        assert!(record.set("MISSING", ConfValue::Null).is_err());
        assert!(!record.contains("MISSING"));
        assert_eq!(record.field_names(), vec!["PORT", "HOSTS", "URL"]);
    }

    #[test]
    fn test_set_does_not_type_check() {
        let mut record = Record::new(&SCHEMA);
        record.set("PORT", ConfValue::from("not a port")).unwrap();
        assert_eq!(record.declared_type("PORT").unwrap(), TypeTag::Str);
    }

    #[test]
    fn test_defaults_are_not_shared() {
        let mut first = Record::new(&SCHEMA);
        let second = Record::new(&SCHEMA);

        if let ConfValue::List(items) = &mut first.values[1] {
            items.push(ConfValue::from("c"));
        }

        assert_eq!(first.get("HOSTS").unwrap().as_seq().unwrap().len(), 3);
        assert_eq!(second.get("HOSTS").unwrap().as_seq().unwrap().len(), 2);
    }

    #[test]
    fn test_after_merge_runs_schema_hook() {
        let mut record = Record::new(&SCHEMA);
        record.after_merge().unwrap();
        assert_eq!(
            record.get("URL").unwrap().as_str(),
            Some("http://localhost:8080")
        );
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut record = Record::new(&SCHEMA);
        record.set("PORT", ConfValue::Int(1)).unwrap();
        record.reset();
        assert_eq!(record.get("PORT").unwrap(), &ConfValue::Int(8080));
    }

    #[test]
    fn test_doc_lists_documented_fields() {
        let doc = Record::new(&SCHEMA).doc();
        assert!(doc.starts_with("Server settings."));
        assert!(doc.contains(":param PORT: Listening port."));
        assert!(!doc.contains(":param HOSTS"));
    }

    #[test]
    fn test_display_and_serialize_keep_field_order() {
        let record = Record::new(&SCHEMA);
        assert_eq!(
            record.to_string(),
            "Configurations:\n  PORT: 8080\n  HOSTS: [\"a\", \"b\"]\n  URL: null\n"
        );

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"PORT":8080,"HOSTS":["a","b"],"URL":null}"#);
    }
}
