//! Application configuration.
//!
//! The configuration is a YAML file (by default
//! `$XDG_CONFIG_HOME/nichtwm/config.yaml`).  A JSON file is accepted too;
//! the format is chosen by the `.json` extension.
//!
//! # Example
//!
//! ```yaml
//! modifier: super
//! num-o-workspaces: 6
//! actions:
//!   - key: Return
//!     command: xterm
//!   - key: j
//!     action: NEXT_WINDOW
//!   - key: "1"
//!     action: SWITCH_WORKSPACE_1
//! ```

use crate::action::Action;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Number of workspaces when the configuration does not say.
pub const DEFAULT_WORKSPACES: usize = 6;

/// Modifier key that every binding is combined with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modifier {
    /// Alt (X11 `Mod1`).
    #[default]
    Alt,
    /// Super / Windows key (X11 `Mod4`).
    Super,
}

impl Modifier {
    /// X11 modifier mask bit for this modifier.
    pub fn mask(self) -> u16 {
        match self {
            Modifier::Alt => 1 << 3,
            Modifier::Super => 1 << 6,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "alt" | "mod1" => Some(Modifier::Alt),
            "super" | "mod4" => Some(Modifier::Super),
            _ => None,
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Alt => write!(f, "alt"),
            Modifier::Super => write!(f, "super"),
        }
    }
}

impl<'de> Deserialize<'de> for Modifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Modifier::from_name(&s).ok_or_else(|| {
            serde::de::Error::custom(format!("unknown modifier {:?} (expected alt or super)", s))
        })
    }
}

impl Serialize for Modifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// What a binding does when its chord is pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingTarget {
    /// Run a shell command, detached.
    Command(String),
    /// Perform an internal action.
    Action(Action),
}

/// One entry of the `actions` list.
///
/// Exactly one of `command` and `action` must be present; see
/// [`ActionConfig::target`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionConfig {
    /// Key name, e.g. `"Return"`, `"j"`, `"F5"`.
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
}

impl ActionConfig {
    /// The single target of this entry.
    pub fn target(&self) -> Result<BindingTarget, ConfigError> {
        match (&self.command, &self.action) {
            (Some(cmd), None) => Ok(BindingTarget::Command(cmd.clone())),
            (None, Some(action)) => Ok(BindingTarget::Action(*action)),
            (Some(_), Some(_)) => Err(ConfigError(format!(
                "binding for {:?} has both a command and an action",
                self.key
            ))),
            (None, None) => Err(ConfigError(format!(
                "binding for {:?} has neither a command nor an action",
                self.key
            ))),
        }
    }
}

/// Top-level configuration.
///
/// Every field is optional; `{}` (or no file at all) gives a manager with
/// six workspaces and no key bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Modifier held for every binding.
    pub modifier: Modifier,

    /// Number of workspaces, fixed for the lifetime of the process.
    #[serde(rename = "num-o-workspaces")]
    pub workspaces: usize,

    /// Key bindings, in priority order.
    pub actions: Vec<ActionConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            modifier: Modifier::default(),
            workspaces: DEFAULT_WORKSPACES,
            actions: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from `path`.  `.json` files are read as JSON,
    /// anything else as YAML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let config = if is_json {
            Self::from_json(&contents)
        } else {
            Self::from_yaml(&contents)
        };
        config.map_err(|e| ConfigError(format!("{}: {}", path.display(), e.0)))
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as unit, not as a map.
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(contents)
            .map_err(|e| ConfigError(format!("failed to parse: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(contents)
            .map_err(|e| ConfigError(format!("failed to parse: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.workspaces == 0 {
            return Err(ConfigError("num-o-workspaces must be at least 1".into()));
        }
        for entry in &self.actions {
            entry.target()?;
        }
        Ok(())
    }
}

/// Error from loading, parsing or validating a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
