//! Policy configuration management
//!
//! Stores field policies in `~/.config/kubetype/policy.yaml`

use kubetype_core::{DEFAULT_MAX_DEPTH, DecodeMode, PathExpression};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{KubeError, Result};
use crate::fields::FieldPolicy;

/// Policy configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyConfig {
    /// API version
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Start from the server-managed fields (status, resourceVersion, ...)
    #[serde(default = "default_true")]
    pub server_managed: bool,

    /// Additional fields dropped when decoding
    #[serde(default)]
    pub ignore_fields: Vec<PathExpression>,

    /// Additional fields forced to unknown when decoding
    #[serde(default)]
    pub unknown_fields: Vec<PathExpression>,

    /// How declared fields missing from an object are treated
    #[serde(default)]
    pub mode: DecodeMode,

    /// Maximum nesting accepted when decoding
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Field manager owning the applied fields
    #[serde(default = "default_field_manager")]
    pub field_manager: String,
}

fn default_api_version() -> String {
    "kubetype.io/v1".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_field_manager() -> String {
    "kubetype".to_string()
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            server_managed: true,
            ignore_fields: Vec::new(),
            unknown_fields: Vec::new(),
            mode: DecodeMode::default(),
            max_depth: default_max_depth(),
            field_manager: default_field_manager(),
        }
    }
}

impl PolicyConfig {
    /// Load configuration from default location
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            tracing::debug!(path = %path.display(), "no policy file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded policy file");
        Ok(config)
    }

    /// Save configuration to default location
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default configuration path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            KubeError::InvalidConfig("Could not determine config directory".to_string())
        })?;
        Ok(config_dir.join("kubetype").join("policy.yaml"))
    }

    fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(KubeError::InvalidConfig(
                "maxDepth must be greater than zero".to_string(),
            ));
        }
        if self.field_manager.is_empty() {
            return Err(KubeError::InvalidConfig(
                "fieldManager must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Field policy used when decoding server responses
    pub fn field_policy(&self) -> FieldPolicy {
        let base = if self.server_managed {
            FieldPolicy::server_managed()
        } else {
            FieldPolicy::new()
        };

        let mut policy = base.with_mode(self.mode);
        policy.ignore.extend(self.ignore_fields.iter().cloned());
        policy.unknown.extend(self.unknown_fields.iter().cloned());
        policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubetype_core::Path as ValuePath;

    #[test]
    fn test_defaults() {
        let config = PolicyConfig::default();
        assert_eq!(config.api_version, "kubetype.io/v1");
        assert!(config.server_managed);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.field_policy(), FieldPolicy::server_managed());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
apiVersion: kubetype.io/v1
ignoreFields:
  - spec.template.metadata.annotations["kubectl.kubernetes.io/restartedAt"]
  - spec.replicas
unknownFields:
  - metadata.labels.*
mode: declaredComplete
"#;
        let config: PolicyConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.ignore_fields.len(), 2);
        assert_eq!(config.mode, DecodeMode::DeclaredComplete);
        assert_eq!(config.field_manager, "kubetype");

        let policy = config.field_policy();
        let replicas = ValuePath::root().at_name("spec").at_name("replicas");
        let label = ValuePath::root().at_name("metadata").at_name("labels").at_key("app");
        assert!(policy.ignore.matches(&replicas));
        assert!(policy.unknown.matches(&label));
        assert_eq!(policy.mode, DecodeMode::DeclaredComplete);
    }

    #[test]
    fn test_invalid_expression() {
        let yaml = "ignoreFields:\n  - spec..replicas\n";
        assert!(serde_yaml::from_str::<PolicyConfig>(yaml).is_err());
    }

    #[test]
    fn test_without_server_managed() {
        let config = PolicyConfig {
            server_managed: false,
            ignore_fields: vec![PathExpression::parse("status").unwrap()],
            ..Default::default()
        };
        assert_eq!(config.field_policy().ignore.len(), 1);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("policy.yaml");

        let config = PolicyConfig {
            unknown_fields: vec![PathExpression::parse("metadata.uid").unwrap()],
            max_depth: 64,
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = PolicyConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("unknownFields"));
        assert!(content.contains("metadata.uid"));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.yaml");
        std::fs::write(&path, "maxDepth: 0\n").unwrap();

        let err = PolicyConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, KubeError::InvalidConfig(_)));
    }
}
