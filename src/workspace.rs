//! Workspaces: a fixed number of independent window lists.
//!
//! The [`WorkspaceManager`] is the only place windows are added, removed,
//! moved or shown, which keeps the central invariant easy to check: a
//! window belongs to at most one workspace.

use crate::event::{ScreenSize, Window};
use crate::tiling::TilingEngine;
use crate::traits::{DisplayServer, TransportError};
use log::{debug, info};
use std::collections::HashMap;

/// Possible errors from workspace operations.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("workspace {index} out of range (have {count})")]
    OutOfRange { index: usize, count: usize },
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// One virtual desktop.
///
/// Window order is tiling order: index 0 is the master.
#[derive(Debug, Clone)]
pub struct Workspace {
    windows: Vec<Window>,
    focus: usize,
    tiling: TilingEngine,
}

impl Workspace {
    pub fn new(screen: ScreenSize) -> Self {
        Self {
            windows: Vec::new(),
            focus: 0,
            tiling: TilingEngine::new(screen),
        }
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn contains(&self, window: Window) -> bool {
        self.windows.contains(&window)
    }

    /// Index of the focused window.  `0` when the workspace is empty.
    pub fn focus_index(&self) -> usize {
        self.focus
    }

    pub fn focused(&self) -> Option<Window> {
        self.windows.get(self.focus).copied()
    }

    /// Focus `window` if it is in this workspace.
    pub fn set_focus(&mut self, window: Window) -> bool {
        match self.windows.iter().position(|w| *w == window) {
            Some(i) => {
                self.focus = i;
                true
            }
            None => false,
        }
    }

    /// Move focus one step forward (`true`) or back, wrapping around.
    pub fn cycle_focus(&mut self, forward: bool) -> Option<Window> {
        let len = self.windows.len();
        if len == 0 {
            return None;
        }
        self.focus = if forward {
            (self.focus + 1) % len
        } else {
            (self.focus + len - 1) % len
        };
        self.focused()
    }

    /// Append `window` at the tail.  Returns `false` if it was already here.
    fn push(&mut self, window: Window) -> bool {
        if self.contains(window) {
            return false;
        }
        self.windows.push(window);
        true
    }

    /// Remove `window`, keeping focus on the same window when possible and
    /// otherwise on the window that took its place.
    fn remove(&mut self, window: Window) -> bool {
        let Some(i) = self.windows.iter().position(|w| *w == window) else {
            return false;
        };
        self.windows.remove(i);
        if i < self.focus {
            self.focus -= 1;
        }
        self.focus = self.focus.min(self.windows.len().saturating_sub(1));
        true
    }

    /// Re-tile this workspace.
    pub fn arrange(&self, display: &impl DisplayServer) -> Result<(), TransportError> {
        self.tiling.arrange(&self.windows, display)
    }
}

/// Owns all workspaces and tracks which one is shown.
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    workspaces: Vec<Workspace>,
    current: usize,
    /// Unmaps we issued ourselves and whose `UnmapNotify` is still pending.
    expected_unmaps: HashMap<Window, usize>,
}

impl WorkspaceManager {
    /// Create `count` empty workspaces (at least one) with workspace 0
    /// active.
    pub fn new(count: usize, screen: ScreenSize) -> Self {
        Self {
            workspaces: (0..count.max(1)).map(|_| Workspace::new(screen)).collect(),
            current: 0,
            expected_unmaps: HashMap::new(),
        }
    }

    /// Number of workspaces.  Never zero.
    pub fn count(&self) -> usize {
        self.workspaces.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn active(&self) -> &Workspace {
        &self.workspaces[self.current]
    }

    pub fn active_mut(&mut self) -> &mut Workspace {
        &mut self.workspaces[self.current]
    }

    pub fn get(&self, index: usize) -> Option<&Workspace> {
        self.workspaces.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Workspace> {
        self.workspaces.iter()
    }

    /// Index of the workspace holding `window`.
    pub fn workspace_of(&self, window: Window) -> Option<usize> {
        self.workspaces.iter().position(|ws| ws.contains(window))
    }

    fn check_index(&self, index: usize) -> Result<(), WorkspaceError> {
        if index < self.workspaces.len() {
            Ok(())
        } else {
            Err(WorkspaceError::OutOfRange {
                index,
                count: self.workspaces.len(),
            })
        }
    }

    fn unmap(&mut self, window: Window, display: &impl DisplayServer) -> Result<(), TransportError> {
        *self.expected_unmaps.entry(window).or_insert(0) += 1;
        display.unmap_window(window)
    }

    /// Consume one pending self-issued unmap of `window`.  Returns `true`
    /// if the notification was caused by us and should be ignored.
    pub fn take_expected_unmap(&mut self, window: Window) -> bool {
        match self.expected_unmaps.get_mut(&window) {
            Some(n) if *n > 1 => {
                *n -= 1;
                true
            }
            Some(_) => {
                self.expected_unmaps.remove(&window);
                true
            }
            None => false,
        }
    }

    /// Show workspace `index`.
    ///
    /// Returns `Ok(false)` without touching the display if `index` is
    /// already active.  Otherwise the outgoing windows are unmapped, the
    /// incoming ones mapped and re-tiled.
    pub fn switch_to(
        &mut self,
        index: usize,
        display: &impl DisplayServer,
    ) -> Result<bool, WorkspaceError> {
        self.check_index(index)?;
        if index == self.current {
            debug!("workspace {} already active", index + 1);
            return Ok(false);
        }
        info!("switching to workspace {}", index + 1);

        let outgoing = self.workspaces[self.current].windows.clone();
        for window in outgoing {
            self.unmap(window, display)?;
        }

        self.current = index;

        let incoming = &self.workspaces[self.current];
        for window in &incoming.windows {
            display.map_window(*window)?;
        }
        incoming.arrange(display)?;
        Ok(true)
    }

    /// Switch to the next (`true`) or previous workspace, wrapping around.
    pub fn cycle(
        &mut self,
        forward: bool,
        display: &impl DisplayServer,
    ) -> Result<bool, WorkspaceError> {
        let len = self.workspaces.len();
        let target = if forward {
            (self.current + 1) % len
        } else {
            (self.current + len - 1) % len
        };
        self.switch_to(target, display)
    }

    /// Add `window` to the active workspace and focus it.  Returns `false`
    /// if it is already managed by any workspace.
    pub fn add_to_active(&mut self, window: Window) -> bool {
        if self.workspace_of(window).is_some() {
            return false;
        }
        let ws = self.active_mut();
        ws.push(window);
        ws.set_focus(window);
        info!("added window 0x{:x} to workspace {}", window, self.current + 1);
        true
    }

    /// Remove `window` from the active workspace only.
    pub fn remove_from_active(&mut self, window: Window) -> bool {
        let removed = self.active_mut().remove(window);
        if removed {
            self.expected_unmaps.remove(&window);
        }
        removed
    }

    /// Remove `window` from whichever workspace holds it.  Returns that
    /// workspace's index.
    pub fn remove(&mut self, window: Window) -> Option<usize> {
        let index = self.workspace_of(window)?;
        self.workspaces[index].remove(window);
        self.expected_unmaps.remove(&window);
        Some(index)
    }

    /// Move `window` from the active workspace to workspace `index`,
    /// hiding it.  The active workspace is re-tiled.
    ///
    /// Returns `Ok(false)` if the window is not on the active workspace or
    /// `index` is the active workspace.
    pub fn move_to(
        &mut self,
        window: Window,
        index: usize,
        display: &impl DisplayServer,
    ) -> Result<bool, WorkspaceError> {
        self.check_index(index)?;
        if index == self.current || !self.active().contains(window) {
            return Ok(false);
        }
        self.active_mut().remove(window);
        self.unmap(window, display)?;
        self.workspaces[index].push(window);
        info!(
            "moved window 0x{:x} to workspace {}",
            window,
            index + 1
        );
        self.active().arrange(display)?;
        Ok(true)
    }
}
