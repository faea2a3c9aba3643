/*
 * load.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Reading configuration seeds from JSON, YAML and TOML sources.

use crate::error::{ConfigError, Result};
use crate::store::ConfigStore;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// Supported seed formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Determine the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(ConfigFormat::Json),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "toml" => Some(ConfigFormat::Toml),
            _ => None,
        }
    }
}

/// Parse a seed document into a mapping.
///
/// The top level of every seed must be a mapping.
pub fn parse_str(text: &str, format: ConfigFormat, source_name: &str) -> Result<Map<String, Value>> {
    let parse_error = |message: String| ConfigError::Parse {
        source_name: source_name.to_string(),
        message,
    };

    let value: Value = match format {
        ConfigFormat::Json => serde_json::from_str(text).map_err(|e| parse_error(e.to_string()))?,
        ConfigFormat::Yaml => serde_yaml::from_str(text).map_err(|e| parse_error(e.to_string()))?,
        ConfigFormat::Toml => toml::from_str(text).map_err(|e| parse_error(e.to_string()))?,
    };

    match value {
        Value::Object(map) => Ok(map),
        // An empty YAML document
        Value::Null => Ok(Map::new()),
        other => Err(parse_error(format!(
            "top-level value must be a mapping, found {}",
            kind_name(&other)
        ))),
    }
}

/// Read and parse a seed file, choosing the format by extension.
pub fn read_file(path: &Path) -> Result<Map<String, Value>> {
    let format = ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), ?format, "read configuration seed");
    parse_str(&text, format, &path.display().to_string())
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

impl ConfigStore {
    /// Read a seed file and merge it into the store.
    ///
    /// The lock is checked before the file is read.
    pub fn load_file(&mut self, path: &Path) -> Result<&Map<String, Value>> {
        self.ensure_mutable("load configuration")?;
        let data = read_file(path)?;
        self.load_from_map(data)
    }

    /// Parse seed text and merge it into the store.
    pub fn load_str(
        &mut self,
        text: &str,
        format: ConfigFormat,
        source_name: &str,
    ) -> Result<&Map<String, Value>> {
        self.ensure_mutable("load configuration")?;
        let data = parse_str(text, format, source_name)?;
        self.load_from_map(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("a/site.json")), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_path(Path::new("site.YML")), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_path(Path::new("site.yaml")), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_path(Path::new("site.toml")), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_path(Path::new("site.ini")), None);
        assert_eq!(ConfigFormat::from_path(Path::new("site")), None);
    }

    #[test]
    fn test_parse_each_format() {
        let expected = json!({"site": {"name": "Acme"}, "minimize": true});

        let json_map = parse_str(r#"{"site": {"name": "Acme"}, "minimize": true}"#, ConfigFormat::Json, "a.json").unwrap();
        assert_eq!(Value::Object(json_map), expected);

        let yaml_map = parse_str("site:\n  name: Acme\nminimize: true\n", ConfigFormat::Yaml, "a.yaml").unwrap();
        assert_eq!(Value::Object(yaml_map), expected);

        let toml_map = parse_str("minimize = true\n[site]\nname = \"Acme\"\n", ConfigFormat::Toml, "a.toml").unwrap();
        assert_eq!(Value::Object(toml_map), expected);
    }

    #[test]
    fn test_parse_rejects_non_mapping() {
        let err = parse_str("[1, 2]", ConfigFormat::Json, "list.json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("list.json"));
        assert!(err.to_string().contains("a sequence"));
    }

    #[test]
    fn test_parse_reports_syntax_errors() {
        let err = parse_str("{not json", ConfigFormat::Json, "broken.json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { ref source_name, .. } if source_name == "broken.json"));
        assert!(err.is_source_error());
    }

    #[test]
    fn test_load_str_respects_lock() {
        let mut config = ConfigStore::new();
        config.lock();
        let err = config.load_str("{}", ConfigFormat::Json, "x.json").unwrap_err();
        assert!(!err.is_source_error());
    }
}
