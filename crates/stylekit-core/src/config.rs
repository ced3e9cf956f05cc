//! `stylekit.toml`
//!
//! ```toml
//! [macros]
//! environment_value = "EnvironmentValue"
//! focus_value = "FocusValue"
//! stylable = "Stylable"
//! color = "color"
//!
//! [output]
//! color_type = "Color"
//!
//! [stylable]
//! composition = "style-innermost"   # or "current-innermost"
//! ```
//!
//! Every key is optional; unknown keys are rejected.

use serde::Deserialize;
use std::path::Path;

use crate::error::{Error, Result};
use crate::macros::CompositionOrder;

pub const DEFAULT_FILE_NAME: &str = "stylekit.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub macros: MacroNames,
    pub output: OutputConfig,
    pub stylable: StylableConfig,
}

/// Names the macros are invoked by, without the `@` or `#`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MacroNames {
    pub environment_value: String,
    pub focus_value: String,
    pub stylable: String,
    pub color: String,
}

impl Default for MacroNames {
    fn default() -> Self {
        MacroNames {
            environment_value: "EnvironmentValue".to_string(),
            focus_value: "FocusValue".to_string(),
            stylable: "Stylable".to_string(),
            color: "color".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Type constructed by `#color`
    pub color_type: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            color_type: "Color".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StylableConfig {
    pub composition: CompositionOrder,
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load `path` if given, else `stylekit.toml` in `dir` if present, else
    /// the defaults
    pub fn discover(path: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let candidate = dir.join(DEFAULT_FILE_NAME);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            tracing::trace!(dir = %dir.display(), "no configuration file, using defaults");
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_config() {
        let config = Config::from_toml_str(
            "[macros]\ncolor = \"hex\"\n\n[stylable]\ncomposition = \"current-innermost\"\n",
        )
        .unwrap();
        assert_eq!(config.macros.color, "hex");
        assert_eq!(config.macros.stylable, "Stylable");
        assert_eq!(config.stylable.composition, CompositionOrder::CurrentInnermost);
        assert_eq!(config.output.color_type, "Color");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert_matches!(Config::from_toml_str("[output]\nindent = 2\n"), Err(Error::Config(_)));
    }

    #[test]
    fn test_discover() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::discover(None, dir.path()).unwrap(), Config::default());

        std::fs::write(dir.path().join(DEFAULT_FILE_NAME), "[output]\ncolor_type = \"UIColor\"\n").unwrap();
        let config = Config::discover(None, dir.path()).unwrap();
        assert_eq!(config.output.color_type, "UIColor");

        let missing = dir.path().join("missing.toml");
        assert_matches!(Config::discover(Some(&missing), dir.path()), Err(Error::Io { .. }));
    }
}
