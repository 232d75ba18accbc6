//! X11-specific implementations.
//!
//! This module provides the concrete backend for the
//! [`DisplayServer`](crate::traits::DisplayServer) trait, powered by
//! [`x11rb`]'s pure-Rust connection.
//!
//! Nothing outside this module should reference x11rb directly.

pub mod server;

pub use server::X11Server;
