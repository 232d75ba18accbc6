//! The window manager proper: state aggregate, event dispatcher and action
//! dispatcher.
//!
//! [`WindowManager`] owns every piece of mutable state (workspaces, focus,
//! key bindings) and reacts to [`Event`]s one at a time by updating that
//! state and issuing requests through the [`DisplayServer`] trait.

use crate::action::Action;
use crate::bindings::BindingTable;
use crate::config::BindingTarget;
use crate::event::{Event, Keycode, ScreenSize, Window};
use crate::traits::{DisplayServer, Spawner, TransportError};
use crate::workspace::{WorkspaceError, WorkspaceManager};
use log::{debug, error, info, trace, warn};

/// Possible errors from the window manager.
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    /// Could not become the window manager (usually another one is running).
    #[error("setup failed: {0}")]
    Setup(TransportError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}

impl ManagerError {
    /// Whether this error means the display connection is gone.
    pub fn is_disconnect(&self) -> bool {
        match self {
            ManagerError::Setup(_) => false,
            ManagerError::Transport(e) => e.is_disconnect(),
            ManagerError::Workspace(WorkspaceError::Transport(e)) => e.is_disconnect(),
            ManagerError::Workspace(_) => false,
        }
    }
}

/// Event-driven tiling window manager.
///
/// Generic over the display connection and the command launcher, so the
/// whole state machine runs against recording doubles in tests.
///
/// # Typical usage
///
/// ```ignore
/// let server = X11Server::connect(None)?;
/// let bindings = BindingTable::resolve(&config, &server.keyboard_mapping()?);
/// let mut wm = WindowManager::new(server, ShellSpawner::default(), config.workspaces, bindings);
/// wm.run()?;
/// ```
pub struct WindowManager<D: DisplayServer, S: Spawner> {
    display: D,
    spawner: S,
    screen: ScreenSize,
    workspaces: WorkspaceManager,
    bindings: BindingTable,
}

impl<D: DisplayServer, S: Spawner> WindowManager<D, S> {
    /// Create a manager with `workspaces` empty workspaces, workspace 1
    /// active.
    pub fn new(display: D, spawner: S, workspaces: usize, bindings: BindingTable) -> Self {
        let screen = display.screen_size();
        Self {
            display,
            spawner,
            screen,
            workspaces: WorkspaceManager::new(workspaces, screen),
            bindings,
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn workspaces(&self) -> &WorkspaceManager {
        &self.workspaces
    }

    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    /// The focused window of the active workspace.
    pub fn focused(&self) -> Option<Window> {
        self.workspaces.active().focused()
    }

    /// Take over the root window and grab the configured keys.
    ///
    /// Fails with [`ManagerError::Setup`] if the root window cannot be
    /// claimed.  Rejected key grabs only drop their binding.
    pub fn setup(&mut self) -> Result<(), ManagerError> {
        self.display.become_manager().map_err(ManagerError::Setup)?;
        info!(
            "successfully became the window manager ({} workspaces)",
            self.workspaces.count()
        );
        self.bindings.grab_all(&self.display)?;
        self.display.flush()?;
        Ok(())
    }

    /// Set up, then process events until the display connection closes.
    ///
    /// A closed connection is the normal way to stop and returns `Ok(())`.
    /// Errors while handling one event are logged and the loop continues.
    pub fn run(&mut self) -> Result<(), ManagerError> {
        self.setup()?;
        info!("entering event loop");

        loop {
            let event = match self.display.wait_for_event() {
                Ok(event) => event,
                Err(e) if e.is_disconnect() => {
                    info!("{}", e);
                    break;
                }
                Err(e) => {
                    error!("failed to receive event: {}", e);
                    continue;
                }
            };

            if let Err(e) = self.handle_event(event) {
                if e.is_disconnect() {
                    info!("{}", e);
                    break;
                }
                error!("error handling event: {}", e);
            }

            if let Err(e) = self.display.flush() {
                if e.is_disconnect() {
                    info!("{}", e);
                    break;
                }
                error!("flush failed: {}", e);
            }
        }

        self.shutdown();
        Ok(())
    }

    fn shutdown(&self) {
        info!("shutting down");
        let _ = self.display.flush();
    }

    /// Process a single [`Event`].
    ///
    /// State changes made before a failing request are kept; the caller is
    /// expected to log the error and carry on.
    pub fn handle_event(&mut self, event: Event) -> Result<(), ManagerError> {
        match event {
            Event::KeyPress { keycode, state } => self.handle_key_press(keycode, state)?,
            Event::MapRequest { window } => self.handle_map_request(window)?,
            Event::ConfigureRequest(request) => {
                debug!("configure request for window 0x{:x}", request.window);
                self.display.forward_configure(&request)?;
            }
            Event::EnterNotify { window } => self.handle_enter(window)?,
            Event::DestroyNotify { window } => {
                debug!("window 0x{:x} destroyed", window);
                self.forget_window(window)?;
            }
            Event::UnmapNotify { window } => {
                if self.workspaces.take_expected_unmap(window) {
                    trace!("ignoring our own unmap of 0x{:x}", window);
                } else {
                    debug!("window 0x{:x} withdrawn by its client", window);
                    self.forget_window(window)?;
                }
            }
            Event::Other(description) => trace!("unhandled event: {}", description),
        }
        Ok(())
    }

    fn handle_key_press(&mut self, keycode: Keycode, state: u16) -> Result<(), ManagerError> {
        let Some(binding) = self.bindings.lookup(keycode, state) else {
            debug!("no binding for keycode {} state 0x{:x}", keycode, state);
            return Ok(());
        };
        let target = binding.binding.target.clone();
        info!("key {:?} pressed", binding.binding.key);

        match target {
            BindingTarget::Command(command) => {
                if let Err(e) = self.spawner.spawn(&command) {
                    error!("failed to spawn {:?}: {}", command, e);
                }
                Ok(())
            }
            BindingTarget::Action(action) => self.perform(action),
        }
    }

    fn handle_map_request(&mut self, window: Window) -> Result<(), ManagerError> {
        if self.display.is_override_redirect(window)? {
            debug!("ignoring override-redirect window 0x{:x}", window);
            return Ok(());
        }

        match self.workspaces.workspace_of(window) {
            Some(index) if index == self.workspaces.current_index() => {
                self.display.map_window(window)?;
                return Ok(());
            }
            Some(index) => {
                debug!(
                    "window 0x{:x} lives on hidden workspace {}; not mapping",
                    window,
                    index + 1
                );
                return Ok(());
            }
            None => {}
        }

        self.display.map_window(window)?;
        self.display.configure_window(window, self.screen.full())?;
        self.display.watch_window(window)?;

        self.workspaces.add_to_active(window);
        self.workspaces.active().arrange(&self.display)?;
        self.display.set_input_focus(window)?;
        Ok(())
    }

    fn handle_enter(&mut self, window: Window) -> Result<(), ManagerError> {
        self.display.set_input_focus(window)?;
        if self.workspaces.active_mut().set_focus(window) {
            debug!("focused window 0x{:x}", window);
        }
        Ok(())
    }

    /// Drop a window that went away on its own.
    fn forget_window(&mut self, window: Window) -> Result<(), ManagerError> {
        let Some(index) = self.workspaces.remove(window) else {
            return Ok(());
        };
        info!("removed window 0x{:x} from workspace {}", window, index + 1);
        if index == self.workspaces.current_index() {
            self.workspaces.active().arrange(&self.display)?;
            self.focus_active()?;
        }
        Ok(())
    }

    /// Give input focus to the focused window of the active workspace.
    fn focus_active(&self) -> Result<(), TransportError> {
        if let Some(window) = self.focused() {
            self.display.set_input_focus(window)?;
        }
        Ok(())
    }

    /// Perform an internal action.
    pub fn perform(&mut self, action: Action) -> Result<(), ManagerError> {
        debug!("action {}", action);
        match action {
            Action::NextWindow => self.cycle_focus(true)?,
            Action::PreviousWindow => self.cycle_focus(false)?,
            Action::KillWindow => self.kill_focused()?,
            Action::SwitchWorkspace(n) => match n.checked_sub(1) {
                Some(index) => self.switch_workspace(index)?,
                None => warn!("there is no workspace 0"),
            },
            Action::MoveToWorkspace(n) => match n.checked_sub(1) {
                Some(index) => self.move_focused_to(index)?,
                None => warn!("there is no workspace 0"),
            },
            Action::NextWorkspace => {
                if self.workspaces.cycle(true, &self.display)? {
                    self.focus_active()?;
                }
            }
            Action::PreviousWorkspace => {
                if self.workspaces.cycle(false, &self.display)? {
                    self.focus_active()?;
                }
            }
        }
        Ok(())
    }

    /// Focus and raise the next or previous window.  Visibility never
    /// changes.
    fn cycle_focus(&mut self, forward: bool) -> Result<(), TransportError> {
        match self.workspaces.active_mut().cycle_focus(forward) {
            Some(window) => {
                self.display.set_input_focus(window)?;
                self.display.raise_window(window)?;
            }
            None => debug!("no windows to cycle through"),
        }
        Ok(())
    }

    fn kill_focused(&mut self) -> Result<(), TransportError> {
        let Some(window) = self.focused() else {
            debug!("no focused window to kill");
            return Ok(());
        };
        info!("killing window 0x{:x}", window);
        self.display.destroy_window(window)?;
        self.workspaces.remove_from_active(window);
        self.workspaces.active().arrange(&self.display)?;
        self.focus_active()
    }

    fn switch_workspace(&mut self, index: usize) -> Result<(), ManagerError> {
        match self.workspaces.switch_to(index, &self.display) {
            Ok(true) => self.focus_active()?,
            Ok(false) => {}
            Err(e @ WorkspaceError::OutOfRange { .. }) => warn!("{}", e),
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    fn move_focused_to(&mut self, index: usize) -> Result<(), ManagerError> {
        let Some(window) = self.focused() else {
            debug!("no focused window to move");
            return Ok(());
        };
        match self.workspaces.move_to(window, index, &self.display) {
            Ok(true) => self.focus_active()?,
            Ok(false) => {}
            Err(e @ WorkspaceError::OutOfRange { .. }) => warn!("{}", e),
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ActionConfig, Config, Modifier};
    use crate::event::{ConfigureRequest, Rect, StackMode};
    use crate::traits::mock::{RecorderServer, RecorderSpawner, Request, TableTranslator};
    use std::collections::HashSet;

    const SUPER: u16 = 0x40;
    const KEY_J: Keycode = 44;
    const KEY_K: Keycode = 45;
    const KEY_Q: Keycode = 24;
    const KEY_RETURN: Keycode = 36;
    const KEY_1: Keycode = 10;
    const KEY_2: Keycode = 11;
    const KEY_M: Keycode = 58;

    type TestWm = WindowManager<RecorderServer, RecorderSpawner>;

    fn translator() -> TableTranslator {
        let mut t = TableTranslator::default();
        for (sym, code) in [
            (0x6a, KEY_J),
            (0x6b, KEY_K),
            (0x71, KEY_Q),
            (0xff0d, KEY_RETURN),
            (0x31, KEY_1),
            (0x32, KEY_2),
            (0x6d, KEY_M),
        ] {
            t.keys.insert(sym, code);
        }
        t
    }

    fn entry(key: &str, action: Option<Action>, command: Option<&str>) -> ActionConfig {
        ActionConfig {
            key: key.into(),
            command: command.map(String::from),
            action,
        }
    }

    fn default_actions() -> Vec<ActionConfig> {
        vec![
            entry("j", Some(Action::NextWindow), None),
            entry("k", Some(Action::PreviousWindow), None),
            entry("q", Some(Action::KillWindow), None),
            entry("Return", None, Some("xterm")),
            entry("1", Some(Action::SwitchWorkspace(1)), None),
            entry("2", Some(Action::SwitchWorkspace(2)), None),
            entry("m", Some(Action::MoveToWorkspace(2)), None),
        ]
    }

    fn make_wm_with(server: RecorderServer, actions: Vec<ActionConfig>) -> TestWm {
        let config = Config {
            modifier: Modifier::Super,
            workspaces: 3,
            actions,
        };
        let bindings = BindingTable::resolve(&config, &translator());
        WindowManager::new(
            server,
            RecorderSpawner::default(),
            config.workspaces,
            bindings,
        )
    }

    fn make_wm() -> TestWm {
        make_wm_with(RecorderServer::new(1920, 1080), default_actions())
    }

    fn press(wm: &mut TestWm, keycode: Keycode) {
        wm.handle_event(Event::KeyPress {
            keycode,
            state: SUPER,
        })
        .unwrap();
    }

    fn map(wm: &mut TestWm, window: Window) {
        wm.handle_event(Event::MapRequest { window }).unwrap();
    }

    fn assert_disjoint(wm: &TestWm) {
        let mut seen = HashSet::new();
        for ws in wm.workspaces().iter() {
            for w in ws.windows() {
                assert!(seen.insert(*w), "window 0x{:x} in two workspaces", w);
            }
        }
    }

    //  Adoption and tiling

    #[test]
    fn three_windows_tile_master_stack() {
        let mut wm = make_wm();
        for w in [1, 2, 3] {
            map(&mut wm, w);
        }
        let g = wm.display().geometry();
        assert_eq!(g[&1], Rect::new(0, 0, 960, 1080));
        assert_eq!(g[&2], Rect::new(960, 0, 960, 540));
        assert_eq!(g[&3], Rect::new(960, 540, 960, 540));
        assert_eq!(wm.workspaces().active().windows(), &[1, 2, 3]);
    }

    #[test]
    fn map_request_maps_watches_and_focuses() {
        let mut wm = make_wm();
        map(&mut wm, 7);
        assert_eq!(
            wm.display().take_requests(),
            vec![
                Request::Map(7),
                Request::Configure(7, Rect::new(0, 0, 1920, 1080)),
                Request::Watch(7),
                Request::Configure(7, Rect::new(0, 0, 1920, 1080)),
                Request::Focus(7),
            ]
        );
        assert_eq!(wm.focused(), Some(7));
    }

    #[test]
    fn override_redirect_windows_are_ignored() {
        let mut server = RecorderServer::new(1920, 1080);
        server.override_redirect.insert(9);
        let mut wm = make_wm_with(server, default_actions());
        map(&mut wm, 9);
        assert!(wm.display().take_requests().is_empty());
        assert!(wm.workspaces().active().is_empty());
    }

    #[test]
    fn remapping_a_managed_window_does_not_duplicate_it() {
        let mut wm = make_wm();
        map(&mut wm, 1);
        map(&mut wm, 1);
        assert_eq!(wm.workspaces().active().windows(), &[1]);
    }

    #[test]
    fn configure_request_is_forwarded_verbatim() {
        let mut wm = make_wm();
        let request = ConfigureRequest {
            window: 4,
            width: Some(300),
            height: Some(200),
            stack_mode: Some(StackMode::Below),
            ..ConfigureRequest::default()
        };
        wm.handle_event(Event::ConfigureRequest(request.clone()))
            .unwrap();
        assert_eq!(wm.display().take_requests(), vec![Request::Forward(request)]);
    }

    #[test]
    fn enter_notify_moves_focus() {
        let mut wm = make_wm();
        for w in [1, 2, 3] {
            map(&mut wm, w);
        }
        wm.display().take_requests();
        wm.handle_event(Event::EnterNotify { window: 1 }).unwrap();
        assert_eq!(wm.focused(), Some(1));
        assert_eq!(wm.display().take_requests(), vec![Request::Focus(1)]);

        // untracked windows still get input focus, the index stays put
        wm.handle_event(Event::EnterNotify { window: 99 }).unwrap();
        assert_eq!(wm.focused(), Some(1));
    }

    //  Focus cycling

    #[test]
    fn next_window_k_times_returns_to_start() {
        let mut wm = make_wm();
        for w in [1, 2, 3, 4] {
            map(&mut wm, w);
        }
        let start = wm.focused();
        wm.display().take_requests();
        for _ in 0..4 {
            press(&mut wm, KEY_J);
        }
        assert_eq!(wm.focused(), start);
        let requests = wm.display().take_requests();
        assert!(
            requests
                .iter()
                .all(|r| matches!(r, Request::Focus(_) | Request::Raise(_))),
            "cycling must not change visibility: {requests:?}"
        );
    }

    #[test]
    fn previous_window_focuses_and_raises() {
        let mut wm = make_wm();
        for w in [1, 2, 3] {
            map(&mut wm, w);
        }
        wm.display().take_requests();
        press(&mut wm, KEY_K);
        assert_eq!(wm.focused(), Some(2));
        assert_eq!(
            wm.display().take_requests(),
            vec![Request::Focus(2), Request::Raise(2)]
        );
    }

    #[test]
    fn cycling_empty_workspace_is_noop() {
        let mut wm = make_wm();
        press(&mut wm, KEY_J);
        press(&mut wm, KEY_K);
        assert!(wm.display().take_requests().is_empty());
    }

    //  Kill

    #[test]
    fn killing_only_window_leaves_empty_workspace() {
        let mut wm = make_wm();
        map(&mut wm, 1);
        wm.display().take_requests();
        press(&mut wm, KEY_Q);
        assert_eq!(wm.display().take_requests(), vec![Request::Destroy(1)]);
        assert!(wm.workspaces().active().is_empty());
        assert_eq!(wm.workspaces().active().focus_index(), 0);

        // a second kill, and a re-arrange, are harmless
        press(&mut wm, KEY_Q);
        wm.workspaces().active().arrange(wm.display()).unwrap();
        assert!(wm.display().take_requests().is_empty());
    }

    #[test]
    fn killing_retiles_and_clamps_focus() {
        let mut wm = make_wm();
        for w in [1, 2, 3] {
            map(&mut wm, w);
        }
        // focus is on 3, the last window
        press(&mut wm, KEY_Q);
        assert_eq!(wm.workspaces().active().windows(), &[1, 2]);
        assert_eq!(wm.focused(), Some(2));
        let g = wm.display().geometry();
        assert_eq!(g[&1], Rect::new(0, 0, 960, 1080));
        assert_eq!(g[&2], Rect::new(960, 0, 960, 1080));
    }

    //  Workspaces

    #[test]
    fn switching_workspaces_hides_and_shows_windows() {
        let mut wm = make_wm();
        map(&mut wm, 1);
        map(&mut wm, 2);
        press(&mut wm, KEY_2);
        assert_eq!(wm.workspaces().current_index(), 1);
        map(&mut wm, 3);
        assert_eq!(wm.workspaces().active().windows(), &[3]);
        wm.display().take_requests();

        press(&mut wm, KEY_1);
        assert_eq!(
            wm.display().take_requests(),
            vec![
                Request::Unmap(3),
                Request::Map(1),
                Request::Map(2),
                Request::Configure(1, Rect::new(0, 0, 960, 1080)),
                Request::Configure(2, Rect::new(960, 0, 960, 1080)),
                Request::Focus(2),
            ]
        );
        assert_disjoint(&wm);
    }

    #[test]
    fn switching_to_current_workspace_issues_nothing() {
        let mut wm = make_wm();
        map(&mut wm, 1);
        wm.display().take_requests();
        press(&mut wm, KEY_1);
        assert!(wm.display().take_requests().is_empty());
        assert_eq!(wm.workspaces().current_index(), 0);
    }

    #[test]
    fn out_of_range_workspace_is_ignored() {
        let mut wm = make_wm();
        wm.perform(Action::SwitchWorkspace(9)).unwrap();
        wm.perform(Action::SwitchWorkspace(0)).unwrap();
        assert_eq!(wm.workspaces().current_index(), 0);
    }

    #[test]
    fn move_to_workspace_sends_focused_window_away() {
        let mut wm = make_wm();
        map(&mut wm, 1);
        map(&mut wm, 2);
        press(&mut wm, KEY_M);
        assert_eq!(wm.workspaces().active().windows(), &[1]);
        assert_eq!(wm.workspaces().get(1).unwrap().windows(), &[2]);
        assert_eq!(wm.focused(), Some(1));
        assert_disjoint(&wm);

        // the unmap we issued must not make us forget the window
        wm.handle_event(Event::UnmapNotify { window: 2 }).unwrap();
        assert_eq!(wm.workspaces().workspace_of(2), Some(1));
    }

    #[test]
    fn workspace_cycling_wraps() {
        let mut wm = make_wm();
        wm.perform(Action::PreviousWorkspace).unwrap();
        assert_eq!(wm.workspaces().current_index(), 2);
        wm.perform(Action::NextWorkspace).unwrap();
        assert_eq!(wm.workspaces().current_index(), 0);
    }

    //  Client withdrawal

    #[test]
    fn destroyed_window_is_forgotten() {
        let mut wm = make_wm();
        for w in [1, 2] {
            map(&mut wm, w);
        }
        wm.handle_event(Event::DestroyNotify { window: 2 }).unwrap();
        assert_eq!(wm.workspaces().active().windows(), &[1]);
        assert_eq!(wm.display().geometry()[&1], Rect::new(0, 0, 1920, 1080));
        assert_eq!(wm.focused(), Some(1));
    }

    #[test]
    fn client_unmap_is_forgotten_but_own_unmap_is_not() {
        let mut wm = make_wm();
        map(&mut wm, 1);
        map(&mut wm, 2);
        wm.handle_event(Event::UnmapNotify { window: 2 }).unwrap();
        assert_eq!(wm.workspaces().active().windows(), &[1]);

        press(&mut wm, KEY_2);
        wm.handle_event(Event::UnmapNotify { window: 1 }).unwrap();
        assert_eq!(wm.workspaces().workspace_of(1), Some(0));
    }

    #[test]
    fn destroy_on_hidden_workspace_does_not_touch_active() {
        let mut wm = make_wm();
        map(&mut wm, 1);
        press(&mut wm, KEY_2);
        map(&mut wm, 2);
        wm.display().take_requests();
        wm.handle_event(Event::DestroyNotify { window: 1 }).unwrap();
        assert!(wm.workspaces().get(0).unwrap().is_empty());
        assert!(wm.display().take_requests().is_empty());
    }

    //  Key bindings

    #[test]
    fn command_binding_spawns() {
        let mut wm = make_wm();
        press(&mut wm, KEY_RETURN);
        assert_eq!(*wm.spawner.spawned.borrow(), vec!["xterm".to_string()]);
    }

    #[test]
    fn duplicate_chord_triggers_only_first_binding() {
        let actions = vec![
            entry("Return", None, Some("first")),
            entry("Return", None, Some("second")),
        ];
        let mut wm = make_wm_with(RecorderServer::new(1920, 1080), actions);
        press(&mut wm, KEY_RETURN);
        press(&mut wm, KEY_RETURN);
        assert_eq!(
            *wm.spawner.spawned.borrow(),
            vec!["first".to_string(), "first".to_string()]
        );
    }

    #[test]
    fn wrong_modifier_does_nothing() {
        let mut wm = make_wm();
        wm.handle_event(Event::KeyPress {
            keycode: KEY_RETURN,
            state: 0x08,
        })
        .unwrap();
        assert!(wm.spawner.spawned.borrow().is_empty());
    }

    //  Event loop

    #[test]
    fn run_processes_events_until_disconnect() {
        let server = RecorderServer::new(1920, 1080);
        server.push_event(Event::MapRequest { window: 1 });
        server.push_event(Event::MapRequest { window: 2 });
        server.push_event(Event::Other("MotionNotify".into()));
        let mut wm = make_wm_with(server, default_actions());
        wm.run().unwrap();
        assert_eq!(wm.workspaces().active().windows(), &[1, 2]);
        // one flush after setup, one per event, one on shutdown
        assert_eq!(*wm.display().flushes.borrow(), 5);
    }

    #[test]
    fn run_grabs_configured_keys_first() {
        let mut wm = make_wm();
        wm.run().unwrap();
        let requests = wm.display().take_requests();
        assert_eq!(requests[0], Request::BecomeManager);
        // four grabs (plain + lock variants) per binding
        let grabs = requests
            .iter()
            .filter(|r| matches!(r, Request::GrabKey(..)))
            .count();
        assert_eq!(grabs, default_actions().len() * 4);
    }

    #[test]
    fn run_without_bindings_still_runs() {
        let server = RecorderServer::new(1920, 1080);
        server.push_event(Event::MapRequest { window: 1 });
        let mut wm = make_wm_with(server, Vec::new());
        wm.run().unwrap();
        assert!(wm.bindings().is_empty());
        assert_eq!(wm.workspaces().active().windows(), &[1]);
    }

    #[test]
    fn setup_failure_is_fatal() {
        let mut server = RecorderServer::new(1920, 1080);
        server.reject_manager = true;
        server.push_event(Event::MapRequest { window: 1 });
        let mut wm = make_wm_with(server, default_actions());
        let err = wm.run().unwrap_err();
        assert!(matches!(err, ManagerError::Setup(_)));
        assert_eq!(wm.display().events.borrow().len(), 1, "loop never entered");
    }

    #[test]
    fn disconnect_while_handling_ends_loop_cleanly() {
        let server = RecorderServer::new(1920, 1080);
        // become_manager and the setup flush succeed, the first map fails
        server.disconnect_after.set(Some(2));
        server.push_event(Event::MapRequest { window: 1 });
        server.push_event(Event::MapRequest { window: 2 });
        let mut wm = make_wm_with(server, Vec::new());
        wm.run().unwrap();
        assert_eq!(wm.display().events.borrow().len(), 1, "loop kept going");
        // setup flush plus the shutdown flush
        assert_eq!(*wm.display().flushes.borrow(), 2);
    }

    #[test]
    fn disconnect_on_flush_ends_loop_cleanly() {
        let server = RecorderServer::new(1920, 1080);
        server.disconnect_after.set(Some(2));
        server.push_event(Event::Other("PropertyNotify".into()));
        server.push_event(Event::MapRequest { window: 1 });
        let mut wm = make_wm_with(server, Vec::new());
        wm.run().unwrap();
        assert_eq!(wm.display().events.borrow().len(), 1, "loop kept going");
        assert!(wm.workspaces().active().is_empty());
        // setup, the failing per-event flush, shutdown
        assert_eq!(*wm.display().flushes.borrow(), 3);
    }

    #[test]
    fn failing_event_does_not_stop_the_loop() {
        let mut server = RecorderServer::new(1920, 1080);
        server.broken_windows.insert(5);
        server.push_event(Event::MapRequest { window: 5 });
        server.push_event(Event::MapRequest { window: 6 });
        let mut wm = make_wm_with(server, default_actions());
        wm.run().unwrap();
        assert_eq!(wm.workspaces().active().windows(), &[6]);
    }
}
