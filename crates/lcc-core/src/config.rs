use crate::error::{LccError, Result};
use crate::{io, paths};
use crate::responder::Rule;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const CONFIG_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// RuleSpec
// ---------------------------------------------------------------------------

/// A user-authored responder rule as written in `config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub id: String,
    pub pattern: String,
    pub response: String,
}

// ---------------------------------------------------------------------------
// ResponderConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponderConfig {
    #[serde(default = "default_use_default_rules")]
    pub use_default_rules: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
    /// Tested in order, ahead of the built-in rules.
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

fn default_use_default_rules() -> bool {
    true
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            use_default_rules: default_use_default_rules(),
            fallback: None,
            rules: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub responder: ResponderConfig,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            responder: ResponderConfig::default(),
        }
    }
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(LccError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    /// A file that exists and fails to parse is still an error.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        match Self::load(root) {
            Err(LccError::NotInitialized) => Ok(Self::default()),
            other => other,
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        io::write_yaml(&paths::config_path(root), self)
    }

    /// Write the config only when no config file exists yet.
    /// Returns `true` when the file was created.
    pub fn save_if_missing(&self, root: &Path) -> Result<bool> {
        io::write_yaml_if_missing(&paths::config_path(root), self)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.version != CONFIG_VERSION {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "unknown config version {} (expected {})",
                    self.version, CONFIG_VERSION
                ),
            });
        }

        let mut seen = HashSet::new();
        for spec in &self.responder.rules {
            if !seen.insert(spec.id.as_str()) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("duplicate rule id '{}'", spec.id),
                });
            }

            if spec.pattern.is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "rule '{}' has an empty pattern and will match any non-blank input",
                        spec.id
                    ),
                });
            } else if spec.pattern.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "rule '{}' has a whitespace-only pattern; input is trimmed, so only inner whitespace can match",
                        spec.id
                    ),
                });
            } else if let Err(e) = Rule::from_spec(spec) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: e.to_string(),
                });
            }

            if spec.response.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("rule '{}' has an empty response", spec.id),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn spec(id: &str, pattern: &str, response: &str) -> RuleSpec {
        RuleSpec {
            id: id.to_string(),
            pattern: pattern.to_string(),
            response: response.to_string(),
        }
    }

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.version, 1);
        assert!(parsed.responder.use_default_rules);
        assert!(parsed.responder.rules.is_empty());
    }

    #[test]
    fn minimal_yaml_fills_defaults() {
        let cfg: Config = serde_yaml::from_str("responder:\n  rules: []\n").unwrap();
        assert_eq!(cfg.version, CONFIG_VERSION);
        assert!(cfg.responder.use_default_rules);
        assert!(cfg.responder.fallback.is_none());
    }

    #[test]
    fn parses_custom_rules_in_order() {
        let yaml = r#"
version: 1
responder:
  use_default_rules: false
  fallback: "No idea."
  rules:
    - id: deploy
      pattern: "deploy|release"
      response: "Run the release checklist first."
    - id: oncall
      pattern: "on-?call"
      response: "Check the rota."
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(!cfg.responder.use_default_rules);
        assert_eq!(cfg.responder.fallback.as_deref(), Some("No idea."));
        let ids: Vec<_> = cfg.responder.rules.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["deploy", "oncall"]);
    }

    #[test]
    fn load_missing_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(LccError::NotInitialized)
        ));
        let cfg = Config::load_or_default(dir.path()).unwrap();
        assert_eq!(cfg.version, CONFIG_VERSION);
    }

    #[test]
    fn load_or_default_surfaces_parse_errors() {
        let dir = TempDir::new().unwrap();
        let path = paths::config_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "responder: [not, a, map]\n").unwrap();
        assert!(matches!(
            Config::load_or_default(dir.path()),
            Err(LccError::Yaml(_))
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::default();
        cfg.responder.rules.push(spec("deploy", "deploy", "Ship it."));
        cfg.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.responder.rules, cfg.responder.rules);
    }

    #[test]
    fn save_if_missing_keeps_existing_config() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::default();
        cfg.responder.fallback = Some("first".to_string());
        assert!(cfg.save_if_missing(dir.path()).unwrap());

        cfg.responder.fallback = Some("second".to_string());
        assert!(!cfg.save_if_missing(dir.path()).unwrap());

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.responder.fallback.as_deref(), Some("first"));
    }

    #[test]
    fn validate_clean_config() {
        let mut cfg = Config::default();
        cfg.responder.rules.push(spec("deploy", "deploy", "Ship it."));
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn validate_reports_problems() {
        let mut cfg = Config::default();
        cfg.version = 7;
        cfg.responder.rules = vec![
            spec("dup", "a", "x"),
            spec("dup", "b", "y"),
            spec("empty", "", "z"),
            spec("spaces", "  ", "v"),
            spec("broken", "(unclosed", "w"),
            spec("silent", "quiet", ""),
        ];
        let warnings = cfg.validate();
        let messages: Vec<_> = warnings.iter().map(|w| w.message.as_str()).collect();

        assert!(messages.iter().any(|m| m.contains("unknown config version 7")));
        assert!(messages.iter().any(|m| m.contains("duplicate rule id 'dup'")));
        assert!(messages.iter().any(|m| m.contains("'empty' has an empty pattern")));
        assert!(messages
            .iter()
            .any(|m| m.contains("'spaces' has a whitespace-only pattern")));
        assert!(!messages
            .iter()
            .any(|m| m.contains("'spaces'") && m.contains("any non-blank input")));
        assert!(messages.iter().any(|m| m.contains("'silent' has an empty response")));

        let errors: Vec<_> = warnings
            .iter()
            .filter(|w| w.level == WarnLevel::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("broken"));
    }
}
