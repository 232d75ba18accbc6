//! Transport-neutral event and geometry types.
//!
//! The [`DisplayServer`](crate::traits::DisplayServer) backend translates
//! whatever its protocol library delivers into these types, so the
//! [`WindowManager`](crate::manager::WindowManager) never sees raw X11
//! structures.

use std::fmt;

/// Opaque window handle assigned by the display server.
pub type Window = u32;

/// Device-specific physical key identifier.
pub type Keycode = u8;

/// Symbolic key identifier (X11 keysym value).
pub type Keysym = u32;

/// Pixel dimensions of the (single) screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The rectangle covering the whole screen.
    pub fn full(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }
}

/// A window geometry in root-window coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Stacking position a client may ask for in a configure request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackMode {
    Above,
    Below,
    TopIf,
    BottomIf,
    Opposite,
}

/// A client's configure request.
///
/// Only the fields the client actually set are `Some`; they are forwarded
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigureRequest {
    pub window: Window,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub border_width: Option<u32>,
    pub sibling: Option<Window>,
    pub stack_mode: Option<StackMode>,
}

/// Events the window manager reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A grabbed key chord was pressed.  `state` is the raw modifier state.
    KeyPress { keycode: Keycode, state: u16 },
    /// A top-level window asks to become visible.
    MapRequest { window: Window },
    /// A client asks to change its own geometry or stacking.
    ConfigureRequest(ConfigureRequest),
    /// The pointer entered a window.
    EnterNotify { window: Window },
    /// A window was destroyed by its client.
    DestroyNotify { window: Window },
    /// A window was unmapped, by its client or by us.
    UnmapNotify { window: Window },
    /// Anything the manager does not handle.  Carries a short description
    /// for logging.
    Other(String),
}
