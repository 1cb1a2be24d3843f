//! Matcher configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! tie-break = "declaration-order"   # or "ambiguous"
//! reject-collisions = false
//!
//! [diagnostics]
//! max-issues-per-signature = 0      # 0 = unlimited
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for a [`Matcher`](crate::Matcher).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MatcherConfig {
    /// How equally ranked matches are resolved.
    pub tie_break: TieBreak,

    /// Reject signature sets where two ordinary signatures share
    /// specificity and arity bounds.
    pub reject_collisions: bool,

    /// Rendering of no-match reports.
    pub diagnostics: DiagnosticsConfig,
}

/// Resolution of matches that share the top score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
    /// The later declaration wins.
    #[default]
    DeclarationOrder,
    /// Equally ranked matches are reported as ambiguous.
    Ambiguous,
}

/// Diagnostics rendering configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DiagnosticsConfig {
    /// Issues listed per rejected signature; `0` lists all of them.
    pub max_issues_per_signature: usize,
}

impl MatcherConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn rejecting_collisions(mut self) -> Self {
        self.reject_collisions = true;
        self
    }

    pub fn with_max_issues_per_signature(mut self, limit: usize) -> Self {
        self.diagnostics.max_issues_per_signature = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_empty_document_is_default() {
        let config = MatcherConfig::from_toml_str("").unwrap();
        assert_eq!(config, MatcherConfig::default());
        assert_eq!(config.tie_break, TieBreak::DeclarationOrder);
        assert!(!config.reject_collisions);
        assert_eq!(config.diagnostics.max_issues_per_signature, 0);
    }

    #[test]
    fn test_parse_all_fields() {
        let config = MatcherConfig::from_toml_str(
            r#"
            tie-break = "ambiguous"
            reject-collisions = true

            [diagnostics]
            max-issues-per-signature = 3
            "#,
        )
        .unwrap();

        assert_eq!(
            config,
            MatcherConfig::new()
                .with_tie_break(TieBreak::Ambiguous)
                .rejecting_collisions()
                .with_max_issues_per_signature(3)
        );
    }

    #[test]
    fn test_unknown_tie_break_is_rejected() {
        let err = MatcherConfig::from_toml_str(r#"tie-break = "random""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = MatcherConfig::new().with_tie_break(TieBreak::Ambiguous);
        let text = config.to_toml_string().unwrap();
        assert!(text.contains(r#"tie-break = "ambiguous""#));
        assert_eq!(MatcherConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "reject-collisions = true").unwrap();

        let config = MatcherConfig::load(file.path()).unwrap();
        assert!(config.reject_collisions);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = MatcherConfig::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
