use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use fieldfuzz_generate::SessionOptions;
use fieldfuzz_generate::defaults::DEFAULT_MAX_LEN;

use crate::CliError;

/// Sampling settings read from a TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    pub seed: Option<u64>,
    pub count: usize,
    pub size: usize,
    pub zero_value_fallthrough: bool,
    pub max_len: usize,
    /// Field name to a constant value, converted to the field's type.
    pub bindings: BTreeMap<String, serde_json::Value>,
    /// Field name to an inclusive `min..max` range.
    pub ranges: BTreeMap<String, String>,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            seed: None,
            count: 1,
            size: 10,
            zero_value_fallthrough: false,
            max_len: DEFAULT_MAX_LEN,
            bindings: BTreeMap::new(),
            ranges: BTreeMap::new(),
        }
    }
}

impl SampleConfig {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let raw = fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            zero_value_fallthrough: self.zero_value_fallthrough,
            max_len: self.max_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let config: SampleConfig = toml::from_str("seed = 7\n").expect("parse");
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.count, 1);
        assert_eq!(config.max_len, DEFAULT_MAX_LEN);
        assert!(config.bindings.is_empty());
    }

    #[test]
    fn bindings_keep_their_toml_types() {
        let config: SampleConfig = toml::from_str(
            r#"
count = 3

[bindings]
age = 42
name = "Ana"

[ranges]
score = "1..5"
"#,
        )
        .expect("parse");
        assert_eq!(config.bindings.get("age"), Some(&serde_json::json!(42)));
        assert_eq!(config.bindings.get("name"), Some(&serde_json::json!("Ana")));
        assert_eq!(config.ranges.get("score").map(String::as_str), Some("1..5"));
    }
}
