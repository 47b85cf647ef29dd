// Schema source: construct definitions and value range.
// Loaded from a JSON file (default ./config.json).

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;

use crate::data::schema::{define_constructs, Schema, ValueRange, VariableList};

/// Contents of the config file.
///
/// ```json
/// {
///   "value_range": { "min": 1, "max": 7 },
///   "data_model": ["a", "b", "c", "d"],
///   "constructs": { "C1": "a, b, c", "C2": ["c", "d"] }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Construct name → variables, in file order. Repeated names are kept
    /// so the schema can reject them.
    #[serde(deserialize_with = "ordered_entries")]
    pub constructs: Vec<(String, Value)>,

    #[serde(default)]
    pub value_range: ValueRange,

    /// Extra columns validated against `value_range`.
    #[serde(default)]
    pub data_model: Vec<String>,
}

/// Collect a JSON object as key/value pairs without merging repeated keys.
fn ordered_entries<'de, D>(deserializer: D) -> std::result::Result<Vec<(String, Value)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = Vec<(String, Value)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an object of construct definitions")
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, Value>()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor)
}

impl Config {
    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text)?;
        Ok(config)
    }

    /// Build the construct schema described by this config.
    pub fn schema(&self) -> Result<Schema> {
        let raw = self
            .constructs
            .iter()
            .map(|(name, vars)| {
                let vars: VariableList = serde_json::from_value(vars.clone()).with_context(|| {
                    format!("construct '{name}' must be a string or a list of strings")
                })?;
                Ok((name.clone(), vars))
            })
            .collect::<Result<Vec<_>>>()?;

        let constructs = define_constructs(raw)?;
        log::info!("Constructs: {constructs}");
        Ok(Schema::new(constructs, self.value_range, &self.data_model)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FilterError;

    #[test]
    fn constructs_keep_file_order() {
        let config = Config::from_json(
            r#"{ "constructs": { "Zeta": "a, b", "Alpha": ["c", "d"] } }"#,
        )
        .unwrap();
        let schema = config.schema().unwrap();
        let names: Vec<&str> = schema.constructs().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
        assert_eq!(config.value_range, ValueRange { min: 1, max: 7 });
    }

    #[test]
    fn custom_range_and_data_model() {
        let config = Config::from_json(
            r#"{
                "value_range": { "min": 0, "max": 10 },
                "data_model": ["age_band"],
                "constructs": { "C1": "a" }
            }"#,
        )
        .unwrap();
        let schema = config.schema().unwrap();
        assert_eq!(schema.rules().len(), 2);
        assert_eq!(schema.rules()[1].column, "age_band");
        assert_eq!(schema.rules()[1].range, ValueRange { min: 0, max: 10 });
    }

    #[test]
    fn empty_constructs_is_a_schema_error() {
        let config = Config::from_json(r#"{ "constructs": {} }"#).unwrap();
        let err = config.schema().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FilterError>(),
            Some(FilterError::Schema(_))
        ));
    }

    #[test]
    fn repeated_construct_name_is_a_schema_error() {
        let config =
            Config::from_json(r#"{ "constructs": { "C1": "a", "C1": "b" } }"#).unwrap();
        assert_eq!(config.constructs.len(), 2);
        let err = config.schema().unwrap_err();
        match err.downcast_ref::<FilterError>() {
            Some(FilterError::Schema(msg)) => assert!(msg.contains("defined more than once")),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn non_string_variables_are_rejected() {
        let config = Config::from_json(r#"{ "constructs": { "C1": 5 } }"#).unwrap();
        let err = config.schema().unwrap_err();
        assert!(err.to_string().contains("construct 'C1'"));
    }

    #[test]
    fn missing_constructs_section_fails_to_parse() {
        assert!(Config::from_json(r#"{ "data_model": [] }"#).is_err());
    }
}
