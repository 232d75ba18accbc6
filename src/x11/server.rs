//! [`DisplayServer`] implementation backed by an x11rb [`RustConnection`].

use crate::event::{ConfigureRequest, Event, Keycode, Rect, ScreenSize, StackMode, Window};
use crate::keys::KeyboardMapping;
use crate::traits::{DisplayServer, TransportError};
use x11rb::connection::Connection;
use x11rb::errors::{ConnectError, ConnectionError, ReplyError};
use x11rb::protocol::xproto::{
    self, ChangeWindowAttributesAux, ConfigWindow, ConfigureWindowAux, ConnectionExt as _,
    EventMask, GrabMode, InputFocus, ModMask, NotifyDetail,
};
use x11rb::protocol::Event as XEvent;
use x11rb::rust_connection::RustConnection;

impl From<ConnectError> for TransportError {
    fn from(e: ConnectError) -> Self {
        TransportError::Disconnected(e.to_string())
    }
}

impl From<ConnectionError> for TransportError {
    fn from(e: ConnectionError) -> Self {
        TransportError::Disconnected(e.to_string())
    }
}

impl From<ReplyError> for TransportError {
    fn from(e: ReplyError) -> Self {
        match e {
            ReplyError::ConnectionError(e) => e.into(),
            ReplyError::X11Error(e) => TransportError::Request(format!("{:?}", e.error_kind)),
        }
    }
}

/// Connection to an X server, bound to one screen.
pub struct X11Server {
    conn: RustConnection,
    root: Window,
    screen: ScreenSize,
}

impl X11Server {
    /// Connect to `display` (or `$DISPLAY` when `None`).
    pub fn connect(display: Option<&str>) -> Result<Self, TransportError> {
        let (conn, screen_num) = RustConnection::connect(display)?;
        let screen = &conn.setup().roots[screen_num];
        let root = screen.root;
        let size = ScreenSize::new(
            u32::from(screen.width_in_pixels),
            u32::from(screen.height_in_pixels),
        );
        log::info!(
            "connected to X11, screen {}, root window 0x{:x}, {}x{}",
            screen_num,
            root,
            size.width,
            size.height
        );
        Ok(Self {
            conn,
            root,
            screen: size,
        })
    }

    /// Fetch the current keycode → keysym table.
    pub fn keyboard_mapping(&self) -> Result<KeyboardMapping, TransportError> {
        let setup = self.conn.setup();
        let min = setup.min_keycode;
        let max = setup.max_keycode;
        let reply = self
            .conn
            .get_keyboard_mapping(min, max - min + 1)?
            .reply()?;
        Ok(KeyboardMapping::new(
            min,
            reply.keysyms_per_keycode,
            reply.keysyms,
        ))
    }

    fn translate(&self, event: XEvent) -> Event {
        match event {
            XEvent::KeyPress(e) => Event::KeyPress {
                keycode: e.detail,
                state: u16::from(e.state),
            },
            XEvent::MapRequest(e) => Event::MapRequest { window: e.window },
            XEvent::ConfigureRequest(e) => Event::ConfigureRequest(configure_request(&e)),
            XEvent::EnterNotify(e) => match entered_window(self.root, e.event, e.detail) {
                Some(window) => Event::EnterNotify { window },
                None => Event::Other(format!("EnterNotify on 0x{:x} ({:?})", e.event, e.detail)),
            },
            XEvent::DestroyNotify(e) => Event::DestroyNotify { window: e.window },
            // Clients only receive the root's copy; a window's own
            // StructureNotify copy would duplicate it.
            XEvent::UnmapNotify(e) if e.event == self.root => {
                Event::UnmapNotify { window: e.window }
            }
            XEvent::Error(e) => Event::Other(format!("X11 error {:?}", e.error_kind)),
            other => Event::Other(format!("{:?}", other)),
        }
    }
}

/// The client window the pointer moved into, if the crossing should move
/// focus.  Entering the root (through gaps the layout leaves uncovered) and
/// coming back from a child window of the same client do not.
fn entered_window(root: Window, event: Window, detail: NotifyDetail) -> Option<Window> {
    if event == root || detail == NotifyDetail::INFERIOR {
        None
    } else {
        Some(event)
    }
}

fn configure_request(e: &xproto::ConfigureRequestEvent) -> ConfigureRequest {
    let has = |flag: ConfigWindow| e.value_mask.contains(flag);
    ConfigureRequest {
        window: e.window,
        x: has(ConfigWindow::X).then(|| i32::from(e.x)),
        y: has(ConfigWindow::Y).then(|| i32::from(e.y)),
        width: has(ConfigWindow::WIDTH).then(|| u32::from(e.width)),
        height: has(ConfigWindow::HEIGHT).then(|| u32::from(e.height)),
        border_width: has(ConfigWindow::BORDER_WIDTH).then(|| u32::from(e.border_width)),
        sibling: has(ConfigWindow::SIBLING).then_some(e.sibling),
        stack_mode: has(ConfigWindow::STACK_MODE).then(|| stack_mode_from_x(e.stack_mode)),
    }
}

fn stack_mode_from_x(mode: xproto::StackMode) -> StackMode {
    match mode {
        xproto::StackMode::BELOW => StackMode::Below,
        xproto::StackMode::TOP_IF => StackMode::TopIf,
        xproto::StackMode::BOTTOM_IF => StackMode::BottomIf,
        xproto::StackMode::OPPOSITE => StackMode::Opposite,
        _ => StackMode::Above,
    }
}

fn stack_mode_to_x(mode: StackMode) -> xproto::StackMode {
    match mode {
        StackMode::Above => xproto::StackMode::ABOVE,
        StackMode::Below => xproto::StackMode::BELOW,
        StackMode::TopIf => xproto::StackMode::TOP_IF,
        StackMode::BottomIf => xproto::StackMode::BOTTOM_IF,
        StackMode::Opposite => xproto::StackMode::OPPOSITE,
    }
}

impl DisplayServer for X11Server {
    fn screen_size(&self) -> ScreenSize {
        self.screen
    }

    fn become_manager(&self) -> Result<(), TransportError> {
        let mask = EventMask::SUBSTRUCTURE_REDIRECT
            | EventMask::SUBSTRUCTURE_NOTIFY
            | EventMask::KEY_PRESS
            | EventMask::ENTER_WINDOW;
        self.conn
            .change_window_attributes(
                self.root,
                &ChangeWindowAttributesAux::new().event_mask(mask),
            )?
            .check()
            .map_err(|e| match e {
                ReplyError::X11Error(_) => TransportError::Request(
                    "substructure redirect refused; is another window manager running?".into(),
                ),
                other => other.into(),
            })
    }

    fn grab_key(&self, keycode: Keycode, modifiers: u16) -> Result<(), TransportError> {
        self.conn
            .grab_key(
                false,
                self.root,
                ModMask::from(modifiers),
                keycode,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
            )?
            .check()?;
        Ok(())
    }

    fn is_override_redirect(&self, window: Window) -> Result<bool, TransportError> {
        let attrs = self.conn.get_window_attributes(window)?.reply()?;
        Ok(attrs.override_redirect)
    }

    fn map_window(&self, window: Window) -> Result<(), TransportError> {
        self.conn.map_window(window)?;
        Ok(())
    }

    fn unmap_window(&self, window: Window) -> Result<(), TransportError> {
        self.conn.unmap_window(window)?;
        Ok(())
    }

    fn configure_window(&self, window: Window, rect: Rect) -> Result<(), TransportError> {
        let aux = ConfigureWindowAux::new()
            .x(rect.x)
            .y(rect.y)
            .width(rect.width)
            .height(rect.height);
        self.conn.configure_window(window, &aux)?;
        Ok(())
    }

    fn forward_configure(&self, request: &ConfigureRequest) -> Result<(), TransportError> {
        let aux = ConfigureWindowAux::new()
            .x(request.x)
            .y(request.y)
            .width(request.width)
            .height(request.height)
            .border_width(request.border_width)
            .sibling(request.sibling)
            .stack_mode(request.stack_mode.map(stack_mode_to_x));
        self.conn.configure_window(request.window, &aux)?;
        Ok(())
    }

    fn destroy_window(&self, window: Window) -> Result<(), TransportError> {
        self.conn.destroy_window(window)?;
        Ok(())
    }

    fn raise_window(&self, window: Window) -> Result<(), TransportError> {
        let aux = ConfigureWindowAux::new().stack_mode(xproto::StackMode::ABOVE);
        self.conn.configure_window(window, &aux)?;
        Ok(())
    }

    fn set_input_focus(&self, window: Window) -> Result<(), TransportError> {
        self.conn
            .set_input_focus(InputFocus::POINTER_ROOT, window, x11rb::CURRENT_TIME)?;
        Ok(())
    }

    fn watch_window(&self, window: Window) -> Result<(), TransportError> {
        self.conn.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::new().event_mask(EventMask::ENTER_WINDOW),
        )?;
        Ok(())
    }

    fn wait_for_event(&self) -> Result<Event, TransportError> {
        let event = self.conn.wait_for_event()?;
        Ok(self.translate(event))
    }

    fn flush(&self) -> Result<(), TransportError> {
        self.conn.flush()?;
        Ok(())
    }
}
