//! Keyboard input translation via xkbcommon
//!
//! The compositor sends the keymap as a blob of xkb text; we compile it once
//! and translate every subsequent key press through the live modifier state.
//! A keymap we cannot compile is discarded with a warning and simply leaves
//! the keyboard untranslatable until a usable one arrives.

use log::{debug, warn};
use xkbcommon::xkb;

/// Translates raw evdev scancodes into UTF-8 fragments.
///
/// Holds the xkb context/keymap/state triple from the session record; the
/// keymap and state are only populated once a keymap event has been compiled.
pub struct KeyTranslator {
    context: xkb::Context,
    keymap: Option<xkb::Keymap>,
    state: Option<xkb::State>,
    scancode_offset: u32,
}

impl KeyTranslator {
    pub fn new(scancode_offset: u32) -> Self {
        Self {
            context: xkb::Context::new(xkb::CONTEXT_NO_FLAGS),
            keymap: None,
            state: None,
            scancode_offset,
        }
    }

    /// Compile a textual (xkb_v1) keymap, replacing any previous one.
    ///
    /// Returns `false` and clears the triple if the text does not compile,
    /// leaving the keyboard untranslatable rather than failing the client.
    pub fn load_keymap(&mut self, text: &str) -> bool {
        match xkb::Keymap::new_from_string(
            &self.context,
            text.to_owned(),
            xkb::KEYMAP_FORMAT_TEXT_V1,
            xkb::KEYMAP_COMPILE_NO_FLAGS,
        ) {
            Some(keymap) => {
                self.state = Some(xkb::State::new(&keymap));
                self.keymap = Some(keymap);
                debug!("Compiled keymap ({} bytes of xkb text)", text.len());
                true
            }
            None => {
                warn!("Discarding keymap that failed to compile; keyboard is untranslatable");
                self.keymap = None;
                self.state = None;
                false
            }
        }
    }

    /// Whether a keymap has been received and compiled.
    pub fn has_keymap(&self) -> bool {
        self.state.is_some()
    }

    /// Update the live modifier mask used by subsequent translations.
    pub fn update_modifiers(&mut self, depressed: u32, latched: u32, locked: u32, group: u32) {
        if let Some(state) = self.state.as_mut() {
            state.update_mask(depressed, latched, locked, 0, 0, group);
        }
    }

    /// Translate a pressed key's raw scancode into a UTF-8 fragment.
    ///
    /// Returns `None` when no keymap is loaded or the key has no character
    /// mapping under the current modifier state. Releases never reach this
    /// function; the caller filters on key state.
    pub fn translate_press(&self, raw_scancode: u32) -> Option<String> {
        let state = self.state.as_ref()?;
        let keycode = xkb::Keycode::new(raw_scancode + self.scancode_offset);
        let fragment = state.key_get_utf8(keycode);
        if fragment.is_empty() {
            None
        } else {
            Some(fragment)
        }
    }
}

impl std::fmt::Debug for KeyTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyTranslator")
            .field("has_keymap", &self.keymap.is_some())
            .field("scancode_offset", &self.scancode_offset)
            .finish()
    }
}
