//! Core traits that decouple nichtwm from the X11 protocol library and from
//! the operating system.
//!
//! The [`WindowManager`](crate::manager::WindowManager) only depends on
//! these abstractions.  The x11rb-backed implementation lives in
//! [`x11`](crate::x11); tests use the recording double in [`mock`].

use crate::event::{ConfigureRequest, Event, Keycode, Keysym, Rect, ScreenSize, Window};

/// Errors produced by a [`DisplayServer`].
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection to the display server is gone.  This is how the
    /// manager normally ends: the X server exits or the user logs out.
    #[error("connection to the display server lost: {0}")]
    Disconnected(String),

    /// The server rejected a single request.
    #[error("request failed: {0}")]
    Request(String),
}

impl TransportError {
    pub fn is_disconnect(&self) -> bool {
        matches!(self, TransportError::Disconnected(_))
    }
}

/// Abstraction over the display-server connection.
///
/// Requests are queued and only guaranteed to reach the server after
/// [`flush`](DisplayServer::flush).  The exceptions are the *checked*
/// requests ([`become_manager`](DisplayServer::become_manager) and
/// [`grab_key`](DisplayServer::grab_key)) and
/// [`is_override_redirect`](DisplayServer::is_override_redirect), which block
/// until the server answered.
pub trait DisplayServer {
    /// Size of the managed screen.  Fixed for the lifetime of the process.
    fn screen_size(&self) -> ScreenSize;

    /// Select substructure-redirect (and the other root events the manager
    /// needs) on the root window.  Fails if another window manager already
    /// holds the redirect.
    fn become_manager(&self) -> Result<(), TransportError>;

    /// Grab `keycode` with exactly `modifiers` held on the root window.
    fn grab_key(&self, keycode: Keycode, modifiers: u16) -> Result<(), TransportError>;

    /// Whether `window` asked to bypass the window manager.
    fn is_override_redirect(&self, window: Window) -> Result<bool, TransportError>;

    fn map_window(&self, window: Window) -> Result<(), TransportError>;

    fn unmap_window(&self, window: Window) -> Result<(), TransportError>;

    /// Move and resize `window`.
    fn configure_window(&self, window: Window, rect: Rect) -> Result<(), TransportError>;

    /// Forward a client's configure request unchanged.
    fn forward_configure(&self, request: &ConfigureRequest) -> Result<(), TransportError>;

    fn destroy_window(&self, window: Window) -> Result<(), TransportError>;

    fn raise_window(&self, window: Window) -> Result<(), TransportError>;

    fn set_input_focus(&self, window: Window) -> Result<(), TransportError>;

    /// Subscribe to pointer-enter notifications on `window`.
    fn watch_window(&self, window: Window) -> Result<(), TransportError>;

    /// Block until the next event arrives.
    fn wait_for_event(&self) -> Result<Event, TransportError>;

    fn flush(&self) -> Result<(), TransportError>;
}

/// Keysym to keycode resolution against the live keyboard mapping.
pub trait KeyTranslator {
    /// Return the first keycode producing `keysym`, or `None` if no key on
    /// the current keyboard does.
    fn keycode_for(&self, keysym: Keysym) -> Option<Keycode>;
}

/// Launches external commands without waiting for them.
pub trait Spawner {
    fn spawn(&self, command: &str) -> std::io::Result<()>;
}
