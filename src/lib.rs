//! **nichtwm**: a small master-stack tiling window manager for X11.
//!
//! Each workspace holds an ordered list of windows.  The first one (the
//! *master*) takes the left half of the screen; the rest share the right
//! half, stacked top to bottom.  Only the active workspace is mapped.
//!
//! # Architecture
//!
//! The crate is organised around a few traits in [`traits`]:
//!
//! * [`traits::DisplayServer`] abstracts the X connection so that the
//!   window-manager state machine is not coupled to the protocol library.
//! * [`traits::KeyTranslator`] resolves key names to keycodes.
//! * [`traits::Spawner`] launches the commands bound to keys.
//!
//! [`manager::WindowManager`] consumes [`event::Event`]s and drives
//! [`workspace::WorkspaceManager`] and [`tiling::TilingEngine`].  The
//! x11rb-backed implementation lives in [`x11`].

pub mod action;
pub mod bindings;
pub mod config;
pub mod event;
pub mod keys;
pub mod manager;
pub mod spawn;
pub mod tiling;
pub mod traits;
pub mod workspace;
pub mod x11;
