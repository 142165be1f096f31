#![forbid(unsafe_code)]

//! Configuration for the table extension.
//!
//! Every tunable lives in [`TablePlusConfig`], which can be loaded from TOML
//! or JSON at startup with the `config` feature.
//!
//! ```toml
//! [resize]
//! min_column_width = 50.0
//! handle_size = 12.0
//! handle_background = "#353535"
//!
//! [table]
//! border_color = "black"
//!
//! [reconcile]
//! min_column_share = 1.0
//! max_append_rounds = 8
//! ```
//!
//! ```rust,ignore
//! let config = TablePlusConfig::from_toml_file("tableplus.toml")?;
//! ```
//!
//! # Defaults
//!
//! `TablePlusConfig::default()` reproduces the behaviour of an unconfigured
//! editor: 50 px minimum columns, dark 12 px handles, black borders.

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct TablePlusConfig {
    /// Interactive resize overlay.
    pub resize: ResizeConfig,
    /// Table rendering defaults.
    pub table: TableConfig,
    /// Reconciliation engine.
    pub reconcile: ReconcileConfig,
}

impl TablePlusConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Check every value is usable. An empty list means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.resize.min_column_width.is_finite() || self.resize.min_column_width < 0.0 {
            errors.push(format!(
                "resize.min_column_width must be a finite value >= 0, got {}",
                self.resize.min_column_width
            ));
        }
        if !self.resize.handle_size.is_finite() || self.resize.handle_size <= 0.0 {
            errors.push(format!(
                "resize.handle_size must be > 0, got {}",
                self.resize.handle_size
            ));
        }
        if self.resize.handle_background.trim().is_empty() {
            errors.push("resize.handle_background must not be empty".into());
        }
        if self.table.border_color.trim().is_empty() {
            errors.push("table.border_color must not be empty".into());
        }
        let share = self.reconcile.min_column_share;
        if !(0.0..=100.0).contains(&share) {
            errors.push(format!(
                "reconcile.min_column_share must be in [0, 100], got {share}"
            ));
        }
        if self.reconcile.max_append_rounds == 0 {
            errors.push("reconcile.max_append_rounds must be > 0".into());
        }

        errors
    }

    /// Validate, turning any problem into an error.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Resize overlay parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ResizeConfig {
    /// Minimum column width in pixels. Default: 50.
    pub min_column_width: f64,
    /// Handle hit-area edge in pixels. Default: 12.
    pub handle_size: f64,
    /// Handle background colour. Default: `#353535`.
    pub handle_background: String,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            min_column_width: 50.0,
            handle_size: 12.0,
            handle_background: "#353535".into(),
        }
    }
}

/// Table rendering defaults.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct TableConfig {
    /// Border colour used when a table has none. Default: `black`.
    pub border_color: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            border_color: "black".into(),
        }
    }
}

/// Reconciliation parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ReconcileConfig {
    /// Smallest percentage an inserted column receives. Default: 1.
    pub min_column_share: f64,
    /// Upper bound on append-transaction rounds per dispatch. Default: 8.
    pub max_append_rounds: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            min_column_share: 1.0,
            max_append_rounds: 8,
        }
    }
}

/// Errors from loading a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = TablePlusConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.resize.min_column_width, 50.0);
        assert_eq!(config.resize.handle_background, "#353535");
        assert_eq!(config.table.border_color, "black");
        assert_eq!(config.reconcile.max_append_rounds, 8);
    }

    #[test]
    fn validate_reports_each_problem() {
        let mut config = TablePlusConfig::default();
        config.resize.min_column_width = f64::NAN;
        config.resize.handle_size = 0.0;
        config.table.border_color = "  ".into();
        config.reconcile.min_column_share = 120.0;
        config.reconcile.max_append_rounds = 0;
        let errors = config.validate();
        assert_eq!(errors.len(), 5, "{errors:?}");
        assert!(errors.iter().any(|e| e.contains("max_append_rounds")));
    }

    #[test]
    fn validated_wraps_errors() {
        let mut config = TablePlusConfig::default();
        config.resize.handle_background.clear();
        let err = config.validated().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref v) if v.len() == 1));
        assert!(err.to_string().starts_with("validation errors:"));
    }

    #[cfg(feature = "config")]
    #[test]
    fn toml_partial_override() {
        let config = TablePlusConfig::from_toml_str(
            r#"
            [resize]
            min_column_width = 80.0

            [reconcile]
            max_append_rounds = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.resize.min_column_width, 80.0);
        assert_eq!(config.resize.handle_size, 12.0);
        assert_eq!(config.reconcile.max_append_rounds, 3);
        assert_eq!(config.table.border_color, "black");
    }

    #[cfg(feature = "config")]
    #[test]
    fn json_roundtrip_and_file_loading() {
        let mut config = TablePlusConfig::default();
        config.table.border_color = "#ccc".into();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(TablePlusConfig::from_json_str(&json).unwrap(), config);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tableplus.toml");
        std::fs::write(&path, "[table]\nborder_color = \"red\"\n").unwrap();
        let loaded = TablePlusConfig::from_toml_file(&path).unwrap();
        assert_eq!(loaded.table.border_color, "red");

        let missing = TablePlusConfig::from_json_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }

    #[cfg(feature = "config")]
    #[test]
    fn toml_parse_error() {
        let err = TablePlusConfig::from_toml_str("[resize\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
