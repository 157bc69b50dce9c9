//! Reading declarative override files.
//!
//! The loader turns a YAML, TOML, or JSON file into an untyped [`Overrides`]
//! map. It knows nothing about records; parse failures are reported here and
//! never reach the merger.

use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::value::{ConfValue, MapKey};

/// Untyped override data: field name → value, in file order.
pub type Overrides = IndexMap<String, ConfValue>;

/// Maximum allowed override file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Markup an override file is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// YAML (`.yaml`, `.yml`, and the fallback for unknown extensions).
    Yaml,
    /// TOML (`.toml`).
    Toml,
    /// JSON (`.json`).
    Json,
}

impl SourceFormat {
    /// Pick the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("toml") => Self::Toml,
            Some("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => write!(f, "YAML"),
            Self::Toml => write!(f, "TOML"),
            Self::Json => write!(f, "JSON"),
        }
    }
}

/// Read and parse an override file.
///
/// # Errors
///
/// Returns [`ConfigError::ReadError`] if the file cannot be read,
/// [`ConfigError::ParseError`] if it is not valid markup, and
/// [`ConfigError::ValidationError`] if it is too large or its top level is
/// not a mapping.
pub fn load_overrides(path: &Path) -> ConfigResult<Overrides> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    // Check size after reading to avoid TOCTOU between stat and read.
    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {} byte limit",
                content.len(),
                MAX_CONFIG_FILE_SIZE
            ),
        });
    }

    let format = SourceFormat::from_path(path);
    let overrides = parse_overrides(&content, format).map_err(|e| match e {
        ConfigError::ParseError {
            format, message, ..
        } => ConfigError::ParseError {
            path: path.display().to_string(),
            format,
            message,
        },
        ConfigError::ValidationError { message, .. } => ConfigError::ValidationError {
            field: path.display().to_string(),
            message,
        },
        other => other,
    })?;

    info!(path = %path.display(), %format, keys = overrides.len(), "loaded override file");
    Ok(overrides)
}

/// Parse override text in the given format.
///
/// An empty document (or an explicit null) yields no overrides.
///
/// # Errors
///
/// Returns [`ConfigError::ParseError`] for invalid markup and
/// [`ConfigError::ValidationError`] if the top level is not a mapping.
pub fn parse_overrides(content: &str, format: SourceFormat) -> ConfigResult<Overrides> {
    let parse_err = |message: String| ConfigError::ParseError {
        path: "<inline>".to_owned(),
        format,
        message,
    };

    let value: ConfValue = match format {
        SourceFormat::Yaml if content.trim().is_empty() => ConfValue::Null,
        SourceFormat::Yaml => {
            let mut doc: serde_yaml::Value =
                serde_yaml::from_str(content).map_err(|e| parse_err(e.to_string()))?;
            // Expand `<<: *anchor` merge keys before converting.
            doc.apply_merge().map_err(|e| parse_err(e.to_string()))?;
            ConfValue::deserialize(doc).map_err(|e| parse_err(e.to_string()))?
        },
        SourceFormat::Toml => {
            let table: toml::Table =
                toml::from_str(content).map_err(|e| parse_err(e.to_string()))?;
            from_toml(toml::Value::Table(table))
        },
        SourceFormat::Json => {
            serde_json::from_str(content).map_err(|e| parse_err(e.to_string()))?
        },
    };

    match value {
        ConfValue::Null => {
            debug!("override document is empty");
            Ok(Overrides::new())
        },
        ConfValue::Map(entries) => Ok(entries
            .into_iter()
            .map(|(key, value)| (key_to_field(key), value))
            .collect()),
        other => Err(ConfigError::ValidationError {
            field: "<inline>".to_owned(),
            message: format!(
                "top level must be a mapping of field names, found {}",
                other.type_tag()
            ),
        }),
    }
}

/// Field names are strings; scalar keys of other types keep their spelling.
///
/// `1:` and `"1":` therefore name the same field, and the later one in the
/// document wins.
fn key_to_field(key: MapKey) -> String {
    match key {
        MapKey::Str(s) => s,
        MapKey::Int(i) => i.to_string(),
        MapKey::Bool(b) => b.to_string(),
    }
}

/// Convert a TOML value. Datetimes become their RFC 3339 text.
fn from_toml(value: toml::Value) -> ConfValue {
    match value {
        toml::Value::String(s) => ConfValue::Str(s),
        toml::Value::Integer(i) => ConfValue::Int(i),
        toml::Value::Float(f) => ConfValue::Float(f),
        toml::Value::Boolean(b) => ConfValue::Bool(b),
        toml::Value::Datetime(dt) => ConfValue::Str(dt.to_string()),
        toml::Value::Array(items) => {
            ConfValue::List(items.into_iter().map(from_toml).collect())
        },
        toml::Value::Table(table) => ConfValue::Map(
            table
                .into_iter()
                .map(|(key, value)| (MapKey::Str(key), from_toml(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SourceFormat::from_path(Path::new("a.yaml")), SourceFormat::Yaml);
        assert_eq!(SourceFormat::from_path(Path::new("a.YML")), SourceFormat::Yaml);
        assert_eq!(SourceFormat::from_path(Path::new("a.toml")), SourceFormat::Toml);
        assert_eq!(SourceFormat::from_path(Path::new("a.json")), SourceFormat::Json);
        assert_eq!(SourceFormat::from_path(Path::new("conf")), SourceFormat::Yaml);
    }

    #[test]
    fn test_parse_yaml_keeps_file_order() {
        let overrides = parse_overrides(
            "GENERIC_TUPLE: [1, 2, 3]\nNAME: exp-1\nGENERIC_DICT:\n  0: zero\n",
            SourceFormat::Yaml,
        )
        .unwrap();

        let keys: Vec<&str> = overrides.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["GENERIC_TUPLE", "NAME", "GENERIC_DICT"]);
        assert_eq!(overrides["GENERIC_TUPLE"], ConfValue::list([1, 2, 3]));
        assert_eq!(overrides["NAME"], ConfValue::from("exp-1"));
    }

    #[test]
    fn test_parse_toml_and_json() {
        let toml = parse_overrides("NAME = \"t\"\nGENERIC_LIST = [1]\n", SourceFormat::Toml)
            .unwrap();
        assert_eq!(toml["GENERIC_LIST"], ConfValue::list([1]));

        let json = parse_overrides(r#"{"NAME": null}"#, SourceFormat::Json).unwrap();
        assert!(json["NAME"].is_null());
    }

    #[test]
    fn test_parse_toml_datetime_as_text() {
        let overrides = parse_overrides(
            "NAME = 1979-05-27T07:32:00Z\nGENERIC_LIST = [1979-05-27]\n",
            SourceFormat::Toml,
        )
        .unwrap();
        assert_eq!(overrides["NAME"], ConfValue::from("1979-05-27T07:32:00Z"));
        assert_eq!(
            overrides["GENERIC_LIST"],
            ConfValue::List(vec![ConfValue::from("1979-05-27")])
        );
    }

    #[test]
    fn test_parse_yaml_expands_merge_keys() {
        let overrides = parse_overrides(
            "base: &b {x: 1}\nGENERIC_DICT:\n  <<: *b\n  y: 2\n",
            SourceFormat::Yaml,
        )
        .unwrap();
        assert_eq!(overrides["GENERIC_DICT"], ConfValue::map([("x", 1), ("y", 2)]));
    }

    #[test]
    fn test_parse_yaml_integer_and_string_keys_collide() {
        let overrides =
            parse_overrides("1: first\n\"1\": second\n", SourceFormat::Yaml).unwrap();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides["1"], ConfValue::from("second"));
    }

    #[test]
    fn test_parse_empty_yaml_is_no_overrides() {
        assert!(parse_overrides("", SourceFormat::Yaml).unwrap().is_empty());
        assert!(parse_overrides("~\n", SourceFormat::Yaml).unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let result = parse_overrides("NAME: [unclosed\n", SourceFormat::Yaml);
        assert!(matches!(
            result,
            Err(ConfigError::ParseError {
                format: SourceFormat::Yaml,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_rejects_non_mapping_top_level() {
        let result = parse_overrides("- 1\n- 2\n", SourceFormat::Yaml);
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn test_load_overrides_nonexistent() {
        let result = load_overrides(Path::new("/nonexistent/conf.yaml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn test_load_overrides_reports_path_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("broken.yaml");
        std::fs::write(&file_path, "NAME: {oops\n").unwrap();

        let err = load_overrides(&file_path).unwrap_err();
        match err {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with("broken.yaml")),
            other => panic!("expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn test_oversized_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("huge.yaml");
        // Write a file exceeding 1 MB.
        let data = "NAME: \"".to_owned() + &"a".repeat(1_100_000) + "\"";
        std::fs::write(&file_path, data).unwrap();

        let result = load_overrides(&file_path);
        assert!(
            matches!(result, Err(ConfigError::ValidationError { .. })),
            "Expected ValidationError for oversized config, got: {result:?}"
        );
    }
}
