//! Environment configuration.
//!
//! [`EnvConfig`] describes how a [`ScaffoldEnvironment`](crate::ScaffoldEnvironment)
//! is built: template delimiters, undefined handling, trailing newlines, whether
//! MiniJinja's own filters are present, and how filter name collisions resolve.
//! Every field is optional in YAML:
//!
//! ```rust
//! use standout_scaffold::{ConflictPolicy, EnvConfig};
//! use standout_scaffold::config::UndefinedMode;
//!
//! let config = EnvConfig::from_yaml(r#"
//! syntax:
//!   variable: ["[[", "]]"]
//! undefined: strict
//! on_conflict: keep_existing
//! "#).unwrap();
//!
//! assert_eq!(config.syntax.variable.start(), "[[");
//! assert_eq!(config.syntax.block.start(), "{%");
//! assert_eq!(config.undefined, UndefinedMode::Strict);
//! assert_eq!(config.on_conflict, ConflictPolicy::KeepExisting);
//! ```

use std::path::{Path, PathBuf};

use minijinja::syntax::SyntaxConfig;
use minijinja::UndefinedBehavior;
use serde::Deserialize;

use crate::error::{FilterError, Result};
use crate::registry::ConflictPolicy;

/// An opening/closing delimiter pair, written as a two-item list in YAML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Delimiters(String, String);

impl Delimiters {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self(start.into(), end.into())
    }

    pub fn start(&self) -> &str {
        &self.0
    }

    pub fn end(&self) -> &str {
        &self.1
    }
}

/// Template delimiters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Syntax {
    pub block: Delimiters,
    pub variable: Delimiters,
    pub comment: Delimiters,
}

impl Default for Syntax {
    fn default() -> Self {
        Self {
            block: Delimiters::new("{%", "%}"),
            variable: Delimiters::new("{{", "}}"),
            comment: Delimiters::new("{#", "#}"),
        }
    }
}

impl Syntax {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Builds the MiniJinja syntax description for these delimiters.
    pub fn to_syntax_config(&self) -> Result<SyntaxConfig> {
        SyntaxConfig::builder()
            .block_delimiters(self.block.0.clone(), self.block.1.clone())
            .variable_delimiters(self.variable.0.clone(), self.variable.1.clone())
            .comment_delimiters(self.comment.0.clone(), self.comment.1.clone())
            .build()
            .map_err(|err| FilterError::config(format!("invalid delimiters: {}", err)))
    }
}

/// How undefined variables behave when rendered or iterated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UndefinedMode {
    /// Undefined renders as empty and iterates as an empty sequence.
    #[default]
    Lenient,
    /// Like lenient, but attribute access on undefined stays undefined.
    Chainable,
    /// Any use of an undefined value is an error.
    Strict,
}

impl From<UndefinedMode> for UndefinedBehavior {
    fn from(mode: UndefinedMode) -> Self {
        match mode {
            UndefinedMode::Lenient => UndefinedBehavior::Lenient,
            UndefinedMode::Chainable => UndefinedBehavior::Chainable,
            UndefinedMode::Strict => UndefinedBehavior::Strict,
        }
    }
}

/// Settings used to build a [`ScaffoldEnvironment`](crate::ScaffoldEnvironment).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvConfig {
    pub syntax: Syntax,
    pub undefined: UndefinedMode,
    pub keep_trailing_newline: bool,
    /// Start from MiniJinja's built-in filters and tests.
    pub builtins: bool,
    pub on_conflict: ConflictPolicy,
    /// Directory served through MiniJinja's path loader.
    pub template_dir: Option<PathBuf>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            syntax: Syntax::default(),
            undefined: UndefinedMode::default(),
            keep_trailing_newline: false,
            builtins: true,
            on_conflict: ConflictPolicy::default(),
            template_dir: None,
        }
    }
}

impl EnvConfig {
    /// Parses a configuration from YAML. Missing fields take their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads and parses a YAML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Copier-style settings: `[[ ]]` for variables and trailing newlines kept.
    pub fn copier() -> Self {
        Self {
            syntax: Syntax {
                variable: Delimiters::new("[[", "]]"),
                ..Syntax::default()
            },
            keep_trailing_newline: true,
            ..Self::default()
        }
    }

    pub(crate) fn has_custom_syntax(&self) -> bool {
        !self.syntax.is_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_gives_defaults() {
        assert_eq!(EnvConfig::from_yaml("").unwrap(), EnvConfig::default());
        assert_eq!(EnvConfig::from_yaml("{}").unwrap(), EnvConfig::default());
    }

    #[test]
    fn test_defaults() {
        let config = EnvConfig::default();
        assert!(config.builtins);
        assert!(!config.keep_trailing_newline);
        assert_eq!(config.undefined, UndefinedMode::Lenient);
        assert_eq!(config.on_conflict, ConflictPolicy::Overwrite);
        assert!(!config.has_custom_syntax());
    }

    #[test]
    fn test_full_yaml() {
        let config = EnvConfig::from_yaml(
            r##"
syntax:
  block: ["[%", "%]"]
  variable: ["[[", "]]"]
  comment: ["[#", "#]"]
undefined: chainable
keep_trailing_newline: true
builtins: false
on_conflict: keep_existing
template_dir: templates
"##,
        )
        .unwrap();

        assert_eq!(config.syntax.block, Delimiters::new("[%", "%]"));
        assert_eq!(config.syntax.comment.end(), "#]");
        assert_eq!(config.undefined, UndefinedMode::Chainable);
        assert!(config.keep_trailing_newline);
        assert!(!config.builtins);
        assert_eq!(config.on_conflict, ConflictPolicy::KeepExisting);
        assert_eq!(config.template_dir, Some(PathBuf::from("templates")));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = EnvConfig::from_yaml("undefinde: strict").unwrap_err();
        assert!(matches!(err, FilterError::Yaml(_)));
    }

    #[test]
    fn test_unknown_undefined_mode_is_rejected() {
        assert!(EnvConfig::from_yaml("undefined: loose").is_err());
    }

    #[test]
    fn test_copier_preset() {
        let config = EnvConfig::copier();
        assert_eq!(config.syntax.variable, Delimiters::new("[[", "]]"));
        assert_eq!(config.syntax.block, Delimiters::new("{%", "%}"));
        assert!(config.keep_trailing_newline);
        assert!(config.has_custom_syntax());
    }

    #[test]
    fn test_syntax_config_builds() {
        assert!(EnvConfig::copier().syntax.to_syntax_config().is_ok());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("env.yaml");
        std::fs::write(&path, "keep_trailing_newline: true\n").unwrap();

        let config = EnvConfig::from_file(&path).unwrap();
        assert!(config.keep_trailing_newline);

        let missing = EnvConfig::from_file(dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(missing, FilterError::Io(_)));
    }
}
