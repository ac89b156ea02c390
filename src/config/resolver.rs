use std::sync::Arc;

use crossterm::event::KeyEvent;

use crate::config::actions::{DialogAction, GlobalAction};
use crate::config::keybindings::KeybindingsConfig;

pub struct KeyResolver {
    pub keybindings: Arc<KeybindingsConfig>,
}

impl KeyResolver {
    pub const fn new(keybindings: Arc<KeybindingsConfig>) -> Self {
        Self { keybindings }
    }

    pub fn matches_global(&self, event: &KeyEvent, action: GlobalAction) -> bool {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.matches(event),
            GlobalAction::Suspend => kb.suspend.matches(event),
        }
    }

    pub fn matches_dialog(&self, event: &KeyEvent, action: DialogAction) -> bool {
        let kb = &self.keybindings.dialog;
        match action {
            DialogAction::Next => kb.next.matches(event),
            DialogAction::Previous => kb.previous.matches(event),
            DialogAction::Activate => kb.activate.matches(event),
            DialogAction::Cancel => kb.cancel.matches(event),
            DialogAction::Toggle => kb.toggle.matches(event),
        }
    }

    /// First dialog action bound to `event`, checked in a fixed order.
    pub fn dialog_action(&self, event: &KeyEvent) -> Option<DialogAction> {
        [
            DialogAction::Activate,
            DialogAction::Cancel,
            DialogAction::Next,
            DialogAction::Previous,
            DialogAction::Toggle,
        ]
        .into_iter()
        .find(|action| self.matches_dialog(event, *action))
    }

    pub fn display_dialog(&self, action: DialogAction) -> String {
        let kb = &self.keybindings.dialog;
        match action {
            DialogAction::Next => kb.next.display(),
            DialogAction::Previous => kb.previous.display(),
            DialogAction::Activate => kb.activate.display(),
            DialogAction::Cancel => kb.cancel.display(),
            DialogAction::Toggle => kb.toggle.display(),
        }
    }
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new(Arc::new(KeybindingsConfig::default()))
    }
}
