use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::Theme;
use crate::ui::{Component, EventResult, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextInputEvent {
    /// The value was edited.
    Changed(String),
    Submitted(String),
}

/// Single-line inline text editor.
///
/// The cursor counts characters, not bytes.
pub struct TextInput {
    value: String,
    cursor: usize,
    placeholder: Option<String>,
    masked: bool,
    focused: bool,
    disabled: bool,
}

impl TextInput {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            cursor: value.chars().count(),
            value,
            placeholder: None,
            masked: false,
            focused: false,
            disabled: false,
        }
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: Option<String>) -> Self {
        self.placeholder = placeholder;
        self
    }

    #[must_use]
    pub const fn masked(mut self, masked: bool) -> Self {
        self.masked = masked;
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the value from outside, moving the cursor to the end.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.len();
    }

    pub const fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub const fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.value
            .char_indices()
            .nth(cursor)
            .map_or(self.value.len(), |(index, _)| index)
    }

    fn insert_char(&mut self, c: char) {
        let index = self.byte_index(self.cursor);
        self.value.insert(index, c);
        self.cursor += 1;
    }

    fn delete_char_before_cursor(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let index = self.byte_index(self.cursor);
        self.value.remove(index);
        true
    }

    fn delete_char_at_cursor(&mut self) -> bool {
        if self.cursor >= self.len() {
            return false;
        }
        let index = self.byte_index(self.cursor);
        self.value.remove(index);
        true
    }

    fn delete_word_before_cursor(&mut self) -> bool {
        let chars: Vec<char> = self.value.chars().collect();
        let mut pos = self.cursor;
        while pos > 0 && chars[pos - 1] == ' ' {
            pos -= 1;
        }
        while pos > 0 && chars[pos - 1] != ' ' {
            pos -= 1;
        }
        if pos == self.cursor {
            return false;
        }
        let (start, end) = (self.byte_index(pos), self.byte_index(self.cursor));
        self.value.drain(start..end);
        self.cursor = pos;
        true
    }

    fn changed(&self, changed: bool) -> EventResult<TextInputEvent> {
        if changed {
            TextInputEvent::Changed(self.value.clone()).into()
        } else {
            EventResult::Consumed
        }
    }

    fn display_value(&self) -> String {
        if self.masked {
            "•".repeat(self.len())
        } else {
            self.value.clone()
        }
    }
}

impl Component for TextInput {
    type Output = TextInputEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.disabled {
            return Ok(EventResult::Ignored);
        }
        Ok(match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => TextInputEvent::Submitted(self.value.clone()).into(),

            (KeyCode::Backspace, KeyModifiers::ALT) | (KeyCode::Char('w'), KeyModifiers::CONTROL) => {
                let changed = self.delete_word_before_cursor();
                self.changed(changed)
            }
            (KeyCode::Backspace, _) => {
                let changed = self.delete_char_before_cursor();
                self.changed(changed)
            }
            (KeyCode::Delete, _) => {
                let changed = self.delete_char_at_cursor();
                self.changed(changed)
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                let changed = !self.value.is_empty();
                self.value.clear();
                self.cursor = 0;
                self.changed(changed)
            }

            (KeyCode::Left, _) => {
                self.cursor = self.cursor.saturating_sub(1);
                EventResult::Consumed
            }
            (KeyCode::Right, _) => {
                self.cursor = (self.cursor + 1).min(self.len());
                EventResult::Consumed
            }
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
                self.cursor = 0;
                EventResult::Consumed
            }
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.cursor = self.len();
                EventResult::Consumed
            }

            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.insert_char(c);
                self.changed(true)
            }

            _ => EventResult::Ignored,
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let foreground = if self.disabled { theme.dimmed() } else { theme.text() };
        let field = Style::default().fg(foreground).bg(theme.field_background());
        let placeholder_style = field.fg(theme.dimmed()).add_modifier(Modifier::ITALIC);
        let cursor_style = Style::default()
            .fg(theme.overlay.active_button_foreground)
            .bg(theme.overlay.active_button_background);

        let display: Vec<char> = self.display_value().chars().collect();
        let line = match (&self.placeholder, self.focused) {
            (Some(placeholder), false) if display.is_empty() => {
                Line::from(Span::styled(placeholder.clone(), placeholder_style))
            }
            (placeholder, true) => {
                let before: String = display[..self.cursor.min(display.len())].iter().collect();
                let at = display.get(self.cursor).copied().unwrap_or(' ');
                let after: String = display.iter().skip(self.cursor + 1).collect();
                let mut spans = vec![
                    Span::styled(before, field),
                    Span::styled(at.to_string(), cursor_style),
                    Span::styled(after, field),
                ];
                if display.is_empty()
                    && let Some(placeholder) = placeholder
                {
                    spans.push(Span::styled(placeholder.clone(), placeholder_style));
                }
                Line::from(spans)
            }
            (_, false) => Line::from(Span::styled(display.iter().collect::<String>(), field)),
        };

        // Keep the cursor visible on narrow fields.
        let scroll = u16::try_from((self.cursor + 1).saturating_sub(area.width as usize)).unwrap_or(0);
        let paragraph = Paragraph::new(line).style(field).scroll((0, scroll));
        frame.render_widget(paragraph, area);
    }
}
