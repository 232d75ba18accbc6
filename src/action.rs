//! Internal actions a key binding can trigger.
//!
//! Actions are written in the configuration as upper-case identifiers
//! (`NEXT_WINDOW`, `SWITCH_WORKSPACE_3`, …).  Workspace numbers are
//! **1-based** in that form; [`Action::SwitchWorkspace`] and
//! [`Action::MoveToWorkspace`] keep the number as written and the
//! [`WindowManager`](crate::manager::WindowManager) converts it.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Every internal action the window manager can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Focus and raise the next window of the active workspace.
    NextWindow,
    /// Focus and raise the previous window of the active workspace.
    PreviousWindow,
    /// Destroy the focused window.
    KillWindow,
    /// Show workspace `n` (1-based).
    SwitchWorkspace(usize),
    /// Send the focused window to workspace `n` (1-based).
    MoveToWorkspace(usize),
    /// Show the workspace after the active one, wrapping around.
    NextWorkspace,
    /// Show the workspace before the active one, wrapping around.
    PreviousWorkspace,
}

const SWITCH_PREFIX: &str = "SWITCH_WORKSPACE_";
const MOVE_PREFIX: &str = "MOVE_TO_WORKSPACE_";

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::NextWindow => write!(f, "NEXT_WINDOW"),
            Action::PreviousWindow => write!(f, "PREVIOUS_WINDOW"),
            Action::KillWindow => write!(f, "KILL_WINDOW"),
            Action::SwitchWorkspace(n) => write!(f, "{}{}", SWITCH_PREFIX, n),
            Action::MoveToWorkspace(n) => write!(f, "{}{}", MOVE_PREFIX, n),
            Action::NextWorkspace => write!(f, "NEXT_WORKSPACE"),
            Action::PreviousWorkspace => write!(f, "PREVIOUS_WORKSPACE"),
        }
    }
}

/// Error for an action name that does not name any [`Action`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action: {0:?}")]
pub struct UnknownAction(pub String);

/// Parse the workspace number suffix; `0` is not a workspace.
fn workspace_number(suffix: &str) -> Option<usize> {
    suffix.parse::<usize>().ok().filter(|n| *n >= 1)
}

impl FromStr for Action {
    type Err = UnknownAction;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        let action = match normalized.as_str() {
            "NEXT_WINDOW" => Some(Action::NextWindow),
            "PREVIOUS_WINDOW" => Some(Action::PreviousWindow),
            "KILL_WINDOW" => Some(Action::KillWindow),
            "NEXT_WORKSPACE" => Some(Action::NextWorkspace),
            "PREVIOUS_WORKSPACE" => Some(Action::PreviousWorkspace),
            other => {
                if let Some(n) = other.strip_prefix(SWITCH_PREFIX) {
                    workspace_number(n).map(Action::SwitchWorkspace)
                } else if let Some(n) = other.strip_prefix(MOVE_PREFIX) {
                    workspace_number(n).map(Action::MoveToWorkspace)
                } else {
                    None
                }
            }
        };
        action.ok_or_else(|| UnknownAction(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<Action>().map_err(D::Error::custom)
    }
}

impl Serialize for Action {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
