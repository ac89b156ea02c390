use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// An action button rendered at the bottom of an overlay.
///
/// `value` is the button's identity and must be unique within one overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    /// Overrides the default "all but the first button" validation rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_validation: Option<bool>,
}

impl Button {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            title: None,
            disabled: false,
            requires_validation: None,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    #[must_use]
    pub const fn with_validation(mut self, requires_validation: bool) -> Self {
        self.requires_validation = Some(requires_validation);
        self
    }
}

/// Which buttons must pass input validation before they may resolve a wait.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ValidationRule {
    /// Every button except the first; a lone button is validated too.
    #[default]
    Default,
    /// Applies uniformly to every button.
    All(bool),
    /// Only the listed button values.
    Only(HashSet<String>),
}

impl ValidationRule {
    pub fn only<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Only(values.into_iter().map(Into::into).collect())
    }
}

impl From<bool> for ValidationRule {
    fn from(value: bool) -> Self {
        Self::All(value)
    }
}

/// How the button row is laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonLayout {
    #[default]
    Row,
    /// Exactly two buttons, split to either side like a yes/no prompt.
    Confirm,
    Vertical,
}

/// Ordered set of buttons keyed by value.
#[derive(Debug, Clone, Default)]
pub struct ButtonRegistry {
    buttons: Vec<Button>,
    vertical: bool,
}

impl ButtonRegistry {
    pub const fn new() -> Self {
        Self {
            buttons: Vec::new(),
            vertical: false,
        }
    }

    /// Replace every button at once.
    ///
    /// # Panics
    ///
    /// Panics when two buttons share a value.
    pub fn set_buttons(&mut self, buttons: Vec<Button>) {
        let mut seen = HashSet::with_capacity(buttons.len());
        for button in &buttons {
            assert!(
                seen.insert(button.value.as_str()),
                "duplicate button value `{}`",
                button.value
            );
        }
        self.buttons = buttons;
    }

    /// Enable or disable every existing button without replacing them.
    pub fn set_enabled(&mut self, enabled: bool) {
        for button in &mut self.buttons {
            button.disabled = !enabled;
        }
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    pub fn get(&self, value: &str) -> Option<&Button> {
        self.buttons.iter().find(|button| button.value == value)
    }

    pub fn position(&self, value: &str) -> Option<usize> {
        self.buttons.iter().position(|button| button.value == value)
    }

    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    pub const fn set_vertical(&mut self, vertical: bool) {
        self.vertical = vertical;
    }

    pub const fn is_vertical(&self) -> bool {
        self.vertical
    }

    pub fn layout(&self) -> ButtonLayout {
        if self.vertical {
            ButtonLayout::Vertical
        } else if self.buttons.len() == 2 {
            ButtonLayout::Confirm
        } else {
            ButtonLayout::Row
        }
    }

    /// Whether pressing `value` must pass input validation under `rule`.
    pub fn requires_validation(&self, value: &str, rule: &ValidationRule) -> bool {
        match rule {
            ValidationRule::All(all) => *all,
            ValidationRule::Only(values) => values.contains(value),
            ValidationRule::Default => match self.position(value) {
                Some(index) => self.buttons[index]
                    .requires_validation
                    .unwrap_or(index > 0 || self.buttons.len() == 1),
                None => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cancel_ok() -> ButtonRegistry {
        let mut registry = ButtonRegistry::new();
        registry.set_buttons(vec![Button::new("Cancel", "cancel"), Button::new("OK", "ok")]);
        registry
    }

    #[test]
    fn test_default_rule_skips_first_button() {
        let registry = cancel_ok();
        assert!(!registry.requires_validation("cancel", &ValidationRule::Default));
        assert!(registry.requires_validation("ok", &ValidationRule::Default));
    }

    #[test]
    fn test_default_rule_validates_lone_button() {
        let mut registry = ButtonRegistry::new();
        registry.set_buttons(vec![Button::new("OK", "ok")]);
        assert!(registry.requires_validation("ok", &ValidationRule::Default));
    }

    #[test]
    fn test_button_override_beats_default_rule() {
        let mut registry = ButtonRegistry::new();
        registry.set_buttons(vec![
            Button::new("Cancel", "cancel"),
            Button::new("Skip", "skip").with_validation(false),
            Button::new("Save", "save"),
        ]);
        assert!(!registry.requires_validation("skip", &ValidationRule::Default));
        assert!(registry.requires_validation("save", &ValidationRule::Default));
        // Explicit rules win over per-button hints.
        assert!(registry.requires_validation("skip", &ValidationRule::All(true)));
    }

    #[test]
    fn test_explicit_rules() {
        let registry = cancel_ok();
        assert!(registry.requires_validation("cancel", &true.into()));
        assert!(!registry.requires_validation("ok", &false.into()));

        let only = ValidationRule::only(["cancel"]);
        assert!(registry.requires_validation("cancel", &only));
        assert!(!registry.requires_validation("ok", &only));
    }

    #[test]
    fn test_set_enabled_keeps_buttons() {
        let mut registry = cancel_ok();
        registry.set_enabled(false);
        assert_eq!(registry.len(), 2);
        assert!(registry.buttons().iter().all(|button| button.disabled));
        registry.set_enabled(true);
        assert!(registry.buttons().iter().all(|button| !button.disabled));
    }

    #[test]
    fn test_layout_switches_on_two_buttons() {
        let mut registry = cancel_ok();
        assert_eq!(registry.layout(), ButtonLayout::Confirm);

        registry.set_buttons(vec![Button::new("OK", "ok")]);
        assert_eq!(registry.layout(), ButtonLayout::Row);

        registry.set_vertical(true);
        assert_eq!(registry.layout(), ButtonLayout::Vertical);
    }

    #[test]
    #[should_panic(expected = "duplicate button value `ok`")]
    fn test_duplicate_values_panic() {
        let mut registry = ButtonRegistry::new();
        registry.set_buttons(vec![Button::new("OK", "ok"), Button::new("Also OK", "ok")]);
    }

    #[test]
    fn test_button_deserializes_with_defaults() {
        let button: Button = serde_json::from_str(r#"{"label":"OK","value":"ok"}"#).unwrap();
        assert_eq!(button, Button::new("OK", "ok"));
    }
}
