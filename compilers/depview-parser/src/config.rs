use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Settings for one [`crate::ParserSession`], usually read from JSON.
/// Every field has a default, so `{}` is a complete config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Serialized parser model. The replay backend reads its parse bank
    /// from here (`.json`, or `.rkyv` for a compiled bank).
    pub model_path: PathBuf,

    /// Inputs longer than this fail to parse. `0` means unlimited.
    pub max_length: usize,

    /// Keep temporary subcategories on tree labels.
    pub retain_tmp_subcategories: bool,

    /// Parses requested when the caller gives no `k`.
    pub default_k_best: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("englishPCFG.ser.gz"),
            max_length: 80,
            retain_tmp_subcategories: true,
            default_k_best: 2,
        }
    }
}

impl SessionConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_k_best == 0 {
            return Err(ConfigError::Invalid("default_k_best must be at least 1".to_string()));
        }
        if self.model_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("model_path is empty".to_string()));
        }
        Ok(())
    }

    /// Command-line style flags for backends that take them.
    pub fn parser_options(&self) -> Vec<String> {
        let mut options = Vec::new();
        if self.max_length > 0 {
            options.push("-maxLength".to_string());
            options.push(self.max_length.to_string());
        }
        if self.retain_tmp_subcategories {
            options.push("-retainTmpSubcategories".to_string());
        }
        options
    }

    /// Whether `len` tokens is within the configured limit.
    pub fn accepts_length(&self, len: usize) -> bool {
        self.max_length == 0 || len <= self.max_length
    }
}
