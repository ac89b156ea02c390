use crossterm::event::KeyCode;

use crate::config::key::{Key, KeyBinding};
use crate::config::keybindings::{DialogKeybindings, GlobalKeybindings};

impl Default for GlobalKeybindings {
    fn default() -> Self {
        Self {
            quit: Key::with_ctrl(KeyCode::Char('q')).into(),
            suspend: Key::with_ctrl(KeyCode::Char('z')).into(),
        }
    }
}

impl Default for DialogKeybindings {
    fn default() -> Self {
        Self {
            next: KeyBinding::multiple(vec![Key::new(KeyCode::Tab), Key::new(KeyCode::Down)]),
            previous: KeyBinding::multiple(vec![
                Key::with_shift(KeyCode::BackTab),
                Key::new(KeyCode::Up),
            ]),
            activate: Key::new(KeyCode::Enter).into(),
            cancel: Key::new(KeyCode::Esc).into(),
            toggle: Key::new(KeyCode::Char(' ')).into(),
        }
    }
}
