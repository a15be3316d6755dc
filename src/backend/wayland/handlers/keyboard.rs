// Translates keysyms into `Key`s and routes them to the selection dialog while it
// is open, otherwise to the annotation input state.
use log::{debug, warn};
use smithay_client_toolkit::seat::keyboard::{
    KeyEvent, KeyboardHandler, Keysym, Modifiers, RawModifiers,
};
use wayland_client::{
    Connection, QueueHandle,
    protocol::{wl_keyboard, wl_surface},
};

use crate::input::Key;

use super::super::state::WaylandState;

impl WaylandState {
    fn route_key(&mut self, qh: &QueueHandle<Self>, key: Key) {
        if let Some(selection) = self.selection.as_mut() {
            let outcome = selection.view.on_key(key);
            selection.surface.mark_dirty();
            if let Some(outcome) = outcome
                && let Err(e) = self.finish_selection(outcome, qh)
            {
                warn!("Failed to apply monitor selection: {:#}", e);
                self.input_state.should_exit = true;
            }
            return;
        }
        self.input_state.on_key_press(key);
    }
}

impl KeyboardHandler for WaylandState {
    fn enter(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _surface: &wl_surface::WlSurface,
        _serial: u32,
        _raw: &[u32],
        _keysyms: &[Keysym],
    ) {
        debug!("Keyboard focus entered");
    }

    fn leave(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _surface: &wl_surface::WlSurface,
        _serial: u32,
    ) {
        debug!("Keyboard focus left");
        self.input_state.on_focus_lost();
    }

    fn press_key(
        &mut self,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _serial: u32,
        event: KeyEvent,
    ) {
        let key = keysym_to_key(event.keysym, event.utf8.as_deref());
        debug!("Key pressed: {:?}", key);
        self.route_key(qh, key);
    }

    fn release_key(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _serial: u32,
        event: KeyEvent,
    ) {
        let key = keysym_to_key(event.keysym, event.utf8.as_deref());
        if self.selection.is_none() {
            self.input_state.on_key_release(key);
        }
    }

    fn update_modifiers(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _serial: u32,
        modifiers: Modifiers,
        _layout: RawModifiers,
        _group: u32,
    ) {
        debug!(
            "Modifiers: ctrl={} alt={} shift={}",
            modifiers.ctrl, modifiers.alt, modifiers.shift
        );
    }

    fn repeat_key(
        &mut self,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _serial: u32,
        event: KeyEvent,
    ) {
        let key = keysym_to_key(event.keysym, event.utf8.as_deref());
        self.route_key(qh, key);
    }
}

fn keysym_to_key(keysym: Keysym, utf8: Option<&str>) -> Key {
    match keysym {
        Keysym::Escape => Key::Escape,
        Keysym::Return | Keysym::KP_Enter => Key::Return,
        Keysym::BackSpace => Key::Backspace,
        Keysym::Tab | Keysym::ISO_Left_Tab => Key::Tab,
        Keysym::space => Key::Space,
        Keysym::Shift_L | Keysym::Shift_R => Key::Shift,
        Keysym::Control_L | Keysym::Control_R => Key::Ctrl,
        Keysym::Alt_L | Keysym::Alt_R => Key::Alt,
        _ => {
            let raw = keysym.raw();
            if (Keysym::F1.raw()..=Keysym::F12.raw()).contains(&raw) {
                return Key::F((raw - Keysym::F1.raw() + 1) as u8);
            }
            if (0x20..=0x7E).contains(&raw) {
                return Key::Char(raw as u8 as char);
            }
            utf8.and_then(|text| text.chars().next())
                .filter(|c| !c.is_control())
                .map_or(Key::Unknown, Key::Char)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_keys_map_by_number() {
        assert_eq!(keysym_to_key(Keysym::F1, None), Key::F(1));
        assert_eq!(keysym_to_key(Keysym::F10, None), Key::F(10));
        assert_eq!(keysym_to_key(Keysym::F12, None), Key::F(12));
    }

    #[test]
    fn ascii_keysyms_become_chars() {
        assert_eq!(keysym_to_key(Keysym::z, Some("z")), Key::Char('z'));
        assert_eq!(keysym_to_key(Keysym::Z, Some("Z")), Key::Char('Z'));
        assert_eq!(keysym_to_key(Keysym::plus, Some("+")), Key::Char('+'));
    }

    #[test]
    fn non_ascii_text_uses_utf8() {
        assert_eq!(keysym_to_key(Keysym::eacute, Some("é")), Key::Char('é'));
        assert_eq!(keysym_to_key(Keysym::Home, None), Key::Unknown);
    }

    #[test]
    fn keypad_enter_is_return() {
        assert_eq!(keysym_to_key(Keysym::KP_Enter, None), Key::Return);
    }
}
