//! Key bindings: configured chords resolved to keycodes and grabbed on the
//! root window.
//!
//! Resolution happens once at startup.  A binding that cannot be resolved
//! or grabbed is dropped with a warning; the others keep working.
//! At runtime [`BindingTable::lookup`] returns the **first** binding in
//! configuration order that matches a key press, so a later binding for the
//! same chord is never triggered.

pub use crate::config::Modifier;
use crate::config::{BindingTarget, Config, ConfigError};
use crate::event::{Keycode, Keysym};
use crate::keys::keysym_from_name;
use crate::traits::{DisplayServer, KeyTranslator, TransportError};
use log::{debug, info, warn};

/// CapsLock.
const LOCK_MASK: u16 = 1 << 1;
/// NumLock on virtually every keyboard layout.
const NUM_LOCK_MASK: u16 = 1 << 4;
/// Shift, Lock, Control and Mod1..Mod5; pointer-button bits are above.
const MODIFIER_BITS: u16 = 0x00ff;

/// Lock combinations grabbed in addition to the plain chord.
const LOCK_VARIANTS: [u16; 3] = [LOCK_MASK, NUM_LOCK_MASK, LOCK_MASK | NUM_LOCK_MASK];

/// Reduce a key event's state to the modifiers that take part in matching.
pub fn clean_state(state: u16) -> u16 {
    state & MODIFIER_BITS & !(LOCK_MASK | NUM_LOCK_MASK)
}

/// Why a binding was dropped.
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    #[error("unknown key name {0:?}")]
    UnknownKey(String),
    #[error("no keycode produces {key:?} (keysym 0x{keysym:x}) on this keyboard")]
    Unmapped { key: String, keysym: Keysym },
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// A configured binding before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    pub key: String,
    pub modifier: Modifier,
    pub target: BindingTarget,
}

impl KeyBinding {
    /// Translate the key name into the `(keycode, modifier mask)` the server
    /// understands.
    pub fn resolve(&self, keys: &impl KeyTranslator) -> Result<(Keycode, u16), BindingError> {
        let keysym =
            keysym_from_name(&self.key).ok_or_else(|| BindingError::UnknownKey(self.key.clone()))?;
        let keycode = keys.keycode_for(keysym).ok_or_else(|| BindingError::Unmapped {
            key: self.key.clone(),
            keysym,
        })?;
        Ok((keycode, self.modifier.mask()))
    }
}

/// A binding together with the chord it was resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBinding {
    pub binding: KeyBinding,
    pub keycode: Keycode,
    pub modifiers: u16,
}

impl ResolvedBinding {
    fn matches(&self, keycode: Keycode, state: u16) -> bool {
        self.keycode == keycode && self.modifiers == clean_state(state)
    }
}

/// The ordered set of active bindings.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    bindings: Vec<ResolvedBinding>,
}

impl BindingTable {
    /// Resolve every configured binding, dropping the ones that fail.
    pub fn resolve(config: &Config, keys: &impl KeyTranslator) -> Self {
        let mut bindings = Vec::with_capacity(config.actions.len());
        for entry in &config.actions {
            let resolved = entry
                .target()
                .map_err(BindingError::from)
                .and_then(|target| {
                    let binding = KeyBinding {
                        key: entry.key.clone(),
                        modifier: config.modifier,
                        target,
                    };
                    let (keycode, modifiers) = binding.resolve(keys)?;
                    Ok(ResolvedBinding {
                        binding,
                        keycode,
                        modifiers,
                    })
                });
            match resolved {
                Ok(b) => {
                    debug!(
                        "key {:?} resolved to keycode {} mods 0x{:x}",
                        b.binding.key, b.keycode, b.modifiers
                    );
                    bindings.push(b);
                }
                Err(e) => warn!("dropping binding for {:?}: {}", entry.key, e),
            }
        }
        Self { bindings }
    }

    /// Grab every binding on the root window.
    ///
    /// A binding whose grab is rejected is dropped.  Only a lost connection
    /// is returned as an error.
    pub fn grab_all(&mut self, display: &impl DisplayServer) -> Result<(), TransportError> {
        let mut kept = Vec::with_capacity(self.bindings.len());
        for b in self.bindings.drain(..) {
            match display.grab_key(b.keycode, b.modifiers) {
                Ok(()) => {}
                Err(e) if e.is_disconnect() => return Err(e),
                Err(e) => {
                    warn!("dropping binding for {:?}: grab failed: {}", b.binding.key, e);
                    continue;
                }
            }
            for extra in LOCK_VARIANTS {
                match display.grab_key(b.keycode, b.modifiers | extra) {
                    Ok(()) => {}
                    Err(e) if e.is_disconnect() => return Err(e),
                    Err(e) => debug!(
                        "lock variant 0x{:x} of {:?} not grabbed: {}",
                        extra, b.binding.key, e
                    ),
                }
            }
            kept.push(b);
        }
        self.bindings = kept;
        info!("{} key binding(s) active", self.bindings.len());
        Ok(())
    }

    /// First binding matching a key press.
    pub fn lookup(&self, keycode: Keycode, state: u16) -> Option<&ResolvedBinding> {
        self.bindings.iter().find(|b| b.matches(keycode, state))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedBinding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
