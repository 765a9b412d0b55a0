//! View configuration.
//!
//! ```toml
//! marker = "_"
//! audit_capacity = 1000
//! revoke_after = 3
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::audit::DEFAULT_AUDIT_CAPACITY;
use crate::error::ConfigError;
use crate::policy::{AccessPolicy, DEFAULT_MARKER};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Names starting with this character are private.
    pub marker: char,

    /// Audit entries retained per view.
    pub audit_capacity: usize,

    /// Revoke a revocable view once it has denied this many private-key
    /// accesses. `None` disables the tripwire.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoke_after: Option<u32>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER,
            audit_capacity: DEFAULT_AUDIT_CAPACITY,
            revoke_after: None,
        }
    }
}

impl ViewConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.marker.is_whitespace() || self.marker.is_control() {
            return Err(ConfigError::Invalid(format!(
                "marker must be a visible character, got {:?}",
                self.marker
            )));
        }
        if self.audit_capacity == 0 {
            return Err(ConfigError::Invalid(
                "audit_capacity must be at least 1".to_string(),
            ));
        }
        if self.revoke_after == Some(0) {
            return Err(ConfigError::Invalid(
                "revoke_after must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The marker policy described by this config.
    pub fn policy(&self) -> AccessPolicy {
        AccessPolicy::marker(self.marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::PropertyKey;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ViewConfig::from_toml_str("").unwrap();
        assert_eq!(config, ViewConfig::default());
        assert_eq!(config.marker, '_');
        assert_eq!(config.revoke_after, None);
    }

    #[test]
    fn test_parse_full() {
        let config = ViewConfig::from_toml_str(
            r#"
            marker = "$"
            audit_capacity = 16
            revoke_after = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.marker, '$');
        assert_eq!(config.audit_capacity, 16);
        assert_eq!(config.revoke_after, Some(3));
        assert!(config.policy().is_private(&PropertyKey::from("$x")));
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(matches!(
            ViewConfig::from_toml_str("marker = \" \""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ViewConfig::from_toml_str("audit_capacity = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ViewConfig::from_toml_str("revoke_after = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ViewConfig::from_toml_str("marker = \"ab\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "marker = \"#\"").unwrap();
        let config = ViewConfig::from_file(file.path()).unwrap();
        assert_eq!(config.marker, '#');

        assert!(matches!(
            ViewConfig::from_file("/definitely/not/here.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
