//! Key symbol names and keyboard mapping lookup.
//!
//! *Keycode* = physical key (`A` and `a` share one).  *Keysym* = symbolic
//! meaning of a key.  Configured bindings name keysyms; the X server reports
//! and grabs keycodes, so every binding is translated once at startup.

use crate::event::{Keycode, Keysym};
use crate::traits::KeyTranslator;
use xkbcommon::xkb;

/// `NoSymbol`, what xkbcommon returns for an unknown name.
const NO_SYMBOL: Keysym = 0;

/// Resolve a key name as written in the configuration to its keysym.
///
/// Single ASCII letters, digits and punctuation map to their Latin-1
/// keysym (`"a"` → 0x61, `"1"` → 0x31).  Anything else is looked up by its
/// case-sensitive `keysymdef.h` name (`Return`, `plus`, `KP_Enter`,
/// `XF86AudioNext`, …) through xkbcommon.
pub fn keysym_from_name(name: &str) -> Option<Keysym> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_graphic() {
            return Some(c as Keysym);
        }
    }

    match xkb::keysym_from_name(name, xkb::KEYSYM_NO_FLAGS).raw() {
        NO_SYMBOL => None,
        sym => Some(sym),
    }
}

/// Snapshot of the server's keycode → keysyms table.
///
/// Row `i` lists the keysyms of keycode `min_keycode + i`; each row has
/// `keysyms_per_keycode` columns (unshifted, shifted, …).
#[derive(Debug, Clone)]
pub struct KeyboardMapping {
    min_keycode: Keycode,
    keysyms_per_keycode: usize,
    keysyms: Vec<Keysym>,
}

impl KeyboardMapping {
    pub fn new(min_keycode: Keycode, keysyms_per_keycode: u8, keysyms: Vec<Keysym>) -> Self {
        Self {
            min_keycode,
            keysyms_per_keycode: usize::from(keysyms_per_keycode),
            keysyms,
        }
    }
}

impl KeyTranslator for KeyboardMapping {
    fn keycode_for(&self, keysym: Keysym) -> Option<Keycode> {
        if self.keysyms_per_keycode == 0 || keysym == 0 {
            return None;
        }
        self.keysyms
            .chunks(self.keysyms_per_keycode)
            .position(|row| row.contains(&keysym))
            .and_then(|row| u8::try_from(row).ok())
            .and_then(|row| self.min_keycode.checked_add(row))
    }
}
