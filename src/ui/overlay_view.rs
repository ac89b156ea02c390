//! Terminal rendering and key handling for one [`Overlay`].
//!
//! The view owns nothing but presentation state (focus, in-progress text
//! edits, spinner frame). Inputs, buttons and values are read back from the
//! overlay on every key and every frame, so changes made through the library
//! API show up without any extra plumbing.

use std::collections::HashMap;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};
use tracing::warn;

use crate::Theme;
use crate::config::{DialogAction, KeyResolver};
use crate::overlay::{Button, Input, InputKind, Overlay, Value};
use crate::ui::{ButtonRow, Component, EventResult, Result, Spinner, TextInput, TextInputEvent};

const MIN_WIDTH: u16 = 36;
const FIELD_MIN_WIDTH: u16 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input(usize),
    Button(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// A button was activated and delivered to the overlay.
    Activated(String),
}

/// One horizontal band of the dialog body.
enum Section {
    Message,
    Input(usize),
    InputError(String),
    Hint(String),
    Spinner,
    Buttons,
    Notice(String),
    Blank,
}

pub struct OverlayView {
    overlay: Overlay,
    resolver: Arc<KeyResolver>,
    focus: Option<Focus>,
    editors: HashMap<String, TextInput>,
    /// Input edited since it was last committed.
    dirty: Option<String>,
    buttons: ButtonRow,
    spinner: Spinner,
    notice: Option<String>,
    /// Whether the last frame was drawn behind another overlay.
    inert: bool,
}

impl OverlayView {
    pub fn new(overlay: Overlay, resolver: Arc<KeyResolver>) -> Self {
        let focus = initial_focus(&overlay.inputs(), &overlay.buttons());
        Self {
            overlay,
            resolver,
            focus,
            editors: HashMap::new(),
            dirty: None,
            buttons: ButtonRow::new(),
            spinner: Spinner::new(),
            notice: None,
            inert: false,
        }
    }

    pub const fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub const fn focus(&self) -> Option<Focus> {
        self.focus
    }

    /// Bring focus and editors in line with the overlay's current inputs.
    fn sync(&mut self, inputs: &[Input], buttons: &[Button]) {
        let order = focus_order(inputs, buttons);
        if self.focus.is_none_or(|focus| !order.contains(&focus)) {
            self.focus = initial_focus(inputs, buttons);
        }

        self.editors
            .retain(|name, _| inputs.iter().any(|input| &input.name == name && input.kind.is_textual()));
        for (index, input) in inputs.iter().enumerate() {
            if !input.kind.is_textual() {
                continue;
            }
            let focused = self.focus == Some(Focus::Input(index));
            let editor = self.editors.entry(input.name.clone()).or_insert_with(|| {
                TextInput::new(input.value.to_string())
                    .with_placeholder(input.placeholder.clone())
                    .masked(input.kind == InputKind::Password)
            });
            // Values set through the API win unless the user is mid-edit.
            let value = input.value.to_string();
            if !focused && editor.value() != value {
                editor.set_value(value);
            }
            editor.set_focused(focused);
            editor.set_disabled(input.disabled || input.read_only);
        }
    }

    fn move_focus(&mut self, forward: bool, inputs: &[Input], buttons: &[Button]) {
        let order = focus_order(inputs, buttons);
        if order.is_empty() {
            self.focus = None;
            return;
        }
        let next = match self.focus.and_then(|focus| order.iter().position(|f| *f == focus)) {
            Some(index) if forward => (index + 1) % order.len(),
            Some(index) => (index + order.len() - 1) % order.len(),
            None if forward => 0,
            None => order.len() - 1,
        };
        self.blur(inputs);
        self.focus = Some(order[next]);
    }

    /// Step between buttons only, without wrapping into the inputs.
    fn move_button_focus(&mut self, forward: bool, buttons: &[Button]) {
        let Some(Focus::Button(current)) = self.focus else {
            return;
        };
        let candidate = if forward {
            (current + 1..buttons.len()).find(|&index| !buttons[index].disabled)
        } else {
            (0..current).rev().find(|&index| !buttons[index].disabled)
        };
        if let Some(index) = candidate {
            self.focus = Some(Focus::Button(index));
        }
    }

    /// Commit the focused input if it was edited.
    fn blur(&mut self, inputs: &[Input]) {
        let Some(Focus::Input(index)) = self.focus else {
            return;
        };
        if let Some(input) = inputs.get(index)
            && self.dirty.as_deref() == Some(input.name.as_str())
        {
            self.dirty = None;
            self.report(self.overlay.commit_input(&input.name));
        }
    }

    fn report(&mut self, result: crate::overlay::Result<()>) {
        match result {
            Ok(()) => self.notice = None,
            Err(err) => {
                warn!(overlay = %self.overlay.id(), "Input update failed: {err}");
                self.notice = Some(err.to_string());
            }
        }
    }

    fn edit(&mut self, name: &str, value: impl Into<Value>) {
        let result = self.overlay.edit_input(name, value);
        self.report(result);
        self.dirty = Some(name.to_string());
    }

    fn click(&self, value: &str) -> EventResult<ViewEvent> {
        if self.overlay.click(value) {
            ViewEvent::Activated(value.to_string()).into()
        } else {
            EventResult::Consumed
        }
    }

    /// Press the last enabled button, the dialog's affirmative action.
    fn submit(&mut self, inputs: &[Input], buttons: &[Button]) -> EventResult<ViewEvent> {
        self.blur(inputs);
        match buttons.iter().rev().find(|button| !button.disabled) {
            Some(button) => self.click(&button.value),
            None => EventResult::Consumed,
        }
    }

    /// Press the first button, when there is a choice to cancel.
    fn cancel(&self, buttons: &[Button]) -> EventResult<ViewEvent> {
        match buttons {
            [first, _, ..] => self.click(&first.value),
            _ => EventResult::Consumed,
        }
    }

    fn toggle(&mut self, input: &Input, forward: bool) {
        if input.disabled || input.read_only {
            return;
        }
        let value = match input.kind {
            InputKind::Checkbox => Value::Bool(!input.value.as_bool().unwrap_or(false)),
            InputKind::Select if !input.options.is_empty() => {
                let count = input.options.len();
                let current = input
                    .options
                    .iter()
                    .position(|option| input.value.as_text() == Some(option.value.as_str()));
                let next = match current {
                    Some(index) if forward => (index + 1) % count,
                    Some(index) => (index + count - 1) % count,
                    None if forward => 0,
                    None => count - 1,
                };
                Value::from(input.options[next].value.as_str())
            }
            _ => return,
        };
        self.edit(&input.name, value);
        self.blur_committed(&input.name);
    }

    /// Checkbox and select edits are committed straight away.
    fn blur_committed(&mut self, name: &str) {
        self.dirty = None;
        let result = self.overlay.commit_input(name);
        self.report(result);
    }

    fn handle_text_key(
        &mut self,
        key: KeyEvent,
        input: &Input,
        inputs: &[Input],
        buttons: &[Button],
    ) -> Result<Option<EventResult<ViewEvent>>> {
        let Some(editor) = self.editors.get_mut(&input.name) else {
            return Ok(None);
        };
        Ok(match editor.handle_key(key)? {
            EventResult::Event(TextInputEvent::Changed(value)) => {
                self.edit(&input.name, value);
                Some(EventResult::Consumed)
            }
            EventResult::Event(TextInputEvent::Submitted(_)) => Some(self.submit(inputs, buttons)),
            EventResult::Consumed => Some(EventResult::Consumed),
            EventResult::Ignored => None,
        })
    }

    fn section_height(&self, section: &Section, width: u16) -> u16 {
        match section {
            Section::Message => wrapped_height(&self.overlay.message(), width),
            Section::Hint(text) | Section::Notice(text) | Section::InputError(text) => {
                wrapped_height(text, width)
            }
            Section::Buttons => self.buttons.height(),
            Section::Input(_) | Section::Spinner | Section::Blank => 1,
        }
    }

    fn sections(&self, inputs: &[Input], buttons: &[Button], loading: bool) -> Vec<Section> {
        let mut sections = Vec::new();
        if !self.overlay.message().is_empty() {
            sections.push(Section::Message);
        }

        if !inputs.is_empty() {
            if !sections.is_empty() {
                sections.push(Section::Blank);
            }
            let errors = self.overlay.input_errors();
            for (index, input) in inputs.iter().enumerate() {
                sections.push(Section::Input(index));
                if let Some((_, message)) = errors.iter().find(|(name, _)| name == &input.name) {
                    sections.push(Section::InputError(message.clone()));
                }
            }
        }

        let hint = match self.focus {
            Some(Focus::Input(index)) => inputs.get(index).and_then(|input| input.title.clone()),
            Some(Focus::Button(index)) => buttons.get(index).and_then(|button| button.title.clone()),
            None => None,
        };
        if let Some(hint) = hint {
            sections.push(Section::Hint(hint));
        }

        if loading {
            sections.push(Section::Spinner);
        }
        if let Some(notice) = &self.notice {
            sections.push(Section::Notice(notice.clone()));
        }
        if !buttons.is_empty() {
            if !sections.is_empty() {
                sections.push(Section::Blank);
            }
            sections.push(Section::Buttons);
        }
        sections
    }

    fn render_input(&mut self, frame: &mut Frame, area: Rect, input: (usize, &Input), label_width: u16, theme: &Theme) {
        let (index, input) = input;
        let inert = self.inert;
        let focused = !inert && self.focus == Some(Focus::Input(index));
        let [label_area, field_area] =
            Layout::horizontal([Constraint::Length(label_width), Constraint::Fill(1)]).areas(area);

        let label_style = if inert || input.disabled {
            Style::default().fg(theme.dimmed())
        } else if focused {
            Style::default()
                .fg(theme.overlay.container_focus)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.overlay.container_foreground)
        };
        let marker = if focused { "› " } else { "  " };
        let required = if input.required { "*" } else { "" };
        let label = Line::from(vec![
            Span::styled(marker, Style::default().fg(theme.overlay.button_focus)),
            Span::styled(format!("{}{required}", input.display_label()), label_style),
        ]);
        frame.render_widget(Paragraph::new(label), label_area);

        let field_style = if inert || input.disabled {
            Style::default().fg(theme.dimmed())
        } else if focused {
            Style::default()
                .fg(theme.overlay.active_button_foreground)
                .bg(theme.overlay.active_button_background)
        } else {
            Style::default().fg(theme.text()).bg(theme.field_background())
        };

        match input.kind {
            InputKind::Checkbox => {
                let mark = if input.value.as_bool().unwrap_or(false) { "[x]" } else { "[ ]" };
                frame.render_widget(Paragraph::new(Span::styled(mark, field_style)), field_area);
            }
            InputKind::Select => {
                let current = input
                    .options
                    .iter()
                    .find(|option| input.value.as_text() == Some(option.value.as_str()))
                    .map_or("–", |option| option.label.as_str());
                let text = format!("‹ {current} ›");
                frame.render_widget(Paragraph::new(Span::styled(text, field_style)), field_area);
            }
            _ => {
                if let Some(editor) = self.editors.get_mut(&input.name) {
                    editor.set_focused(focused);
                    editor.render(frame, field_area, theme);
                }
            }
        }
    }
}

impl Component for OverlayView {
    type Output = ViewEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if !self.overlay.is_attached() || self.overlay.is_inert() {
            return Ok(EventResult::Ignored);
        }
        let inputs = self.overlay.inputs();
        let buttons = self.overlay.buttons();
        self.sync(&inputs, &buttons);

        let action = self.resolver.dialog_action(&key);
        match action {
            Some(DialogAction::Next) => {
                self.move_focus(true, &inputs, &buttons);
                return Ok(EventResult::Consumed);
            }
            Some(DialogAction::Previous) => {
                self.move_focus(false, &inputs, &buttons);
                return Ok(EventResult::Consumed);
            }
            Some(DialogAction::Cancel) => return Ok(self.cancel(&buttons)),
            _ => {}
        }

        Ok(match self.focus {
            Some(Focus::Input(index)) => {
                let Some(input) = inputs.get(index).cloned() else {
                    return Ok(EventResult::Consumed);
                };
                if input.kind.is_textual() {
                    if let Some(result) = self.handle_text_key(key, &input, &inputs, &buttons)? {
                        return Ok(result);
                    }
                }
                match (action, key.code) {
                    (Some(DialogAction::Activate), _) => self.submit(&inputs, &buttons),
                    (Some(DialogAction::Toggle), _) | (_, KeyCode::Right) => {
                        self.toggle(&input, true);
                        EventResult::Consumed
                    }
                    (_, KeyCode::Left) => {
                        self.toggle(&input, false);
                        EventResult::Consumed
                    }
                    _ => EventResult::Consumed,
                }
            }
            Some(Focus::Button(index)) => match (action, key.code) {
                (Some(DialogAction::Activate | DialogAction::Toggle), _) => match buttons.get(index) {
                    Some(button) => self.click(&button.value),
                    None => EventResult::Consumed,
                },
                (_, KeyCode::Right) => {
                    self.move_button_focus(true, &buttons);
                    EventResult::Consumed
                }
                (_, KeyCode::Left) => {
                    self.move_button_focus(false, &buttons);
                    EventResult::Consumed
                }
                _ => EventResult::Consumed,
            },
            // A modal swallows everything while it is interactive.
            None => EventResult::Consumed,
        })
    }

    fn handle_tick(&mut self) {
        if self.overlay.is_loading() {
            self.spinner.handle_tick();
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let inputs = self.overlay.inputs();
        let buttons = self.overlay.buttons();
        self.sync(&inputs, &buttons);

        let inert = self.overlay.is_inert();
        self.inert = inert;
        let loading = self.overlay.is_loading();
        let title = self.overlay.title();
        self.spinner.set_large(self.overlay.is_loading_large());

        let bare = title.is_empty()
            && self.overlay.message().is_empty()
            && inputs.is_empty()
            && buttons.is_empty();
        if bare {
            if loading {
                self.spinner.set_label(None);
                self.spinner.render(frame, area, theme);
            }
            return;
        }

        self.buttons.update(buttons.clone(), self.overlay.button_layout());
        self.buttons.set_dimmed(inert);
        self.buttons.set_focused(match self.focus {
            Some(Focus::Button(index)) if !inert => Some(index),
            _ => None,
        });

        let width = area.width.min(MIN_WIDTH.max(area.width.saturating_mul(3) / 5));
        // Borders and horizontal padding.
        let inner_width = width.saturating_sub(4);
        let sections = self.sections(&inputs, &buttons, loading);
        let heights: Vec<u16> = sections
            .iter()
            .map(|section| self.section_height(section, inner_width))
            .collect();
        let height = area.height.min(heights.iter().sum::<u16>().saturating_add(2));
        let popup = area.centered(Constraint::Length(width), Constraint::Length(height));

        let palette = &theme.overlay;
        let foreground = if inert { theme.dimmed() } else { palette.container_foreground };
        let body = if self.overlay.is_transparent() {
            popup.inner(ratatui::layout::Margin::new(2, 1))
        } else {
            let border = if inert { theme.dimmed() } else { palette.container_border };
            let title_color = if inert { theme.dimmed() } else { palette.container_focus };
            let mut block = Block::default()
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(Style::default().fg(border))
                .padding(Padding::horizontal(1))
                .style(Style::default().bg(palette.container_background).fg(foreground));
            if !title.is_empty() {
                block = block
                    .title(format!(" {title} "))
                    .title_style(Style::default().fg(title_color).add_modifier(Modifier::BOLD));
            }
            frame.render_widget(Clear, popup);
            let body = block.inner(popup);
            frame.render_widget(block, popup);
            body
        };

        let label_width = inputs
            .iter()
            .map(|input| input.display_label().chars().count() + 4)
            .max()
            .and_then(|width| u16::try_from(width).ok())
            .unwrap_or(0)
            .min(body.width.saturating_sub(FIELD_MIN_WIDTH));

        let areas = Layout::vertical(heights.iter().map(|height| Constraint::Length(*height))).split(body);
        for (section, area) in sections.into_iter().zip(areas.iter().copied()) {
            match section {
                Section::Message => {
                    let message = Paragraph::new(self.overlay.message())
                        .style(Style::default().fg(foreground))
                        .wrap(Wrap { trim: false });
                    frame.render_widget(message, area);
                }
                Section::Input(index) => {
                    if let Some(input) = inputs.get(index) {
                        self.render_input(frame, area, (index, input), label_width, theme);
                    }
                }
                Section::InputError(message) | Section::Notice(message) => {
                    let color = if inert { theme.dimmed() } else { theme.error() };
                    let text = Paragraph::new(message)
                        .style(Style::default().fg(color))
                        .wrap(Wrap { trim: true });
                    frame.render_widget(text, area);
                }
                Section::Hint(hint) => {
                    let text = Paragraph::new(hint)
                        .style(Style::default().fg(theme.muted()).add_modifier(Modifier::ITALIC))
                        .wrap(Wrap { trim: true });
                    frame.render_widget(text, area);
                }
                Section::Spinner => self.spinner.render(frame, area, theme),
                Section::Buttons => self.buttons.render(frame, area, theme),
                Section::Blank => {}
            }
        }
    }
}

fn focusable(input: &Input) -> bool {
    !input.disabled
}

/// Focus on attach: first auto-focus input, else first input, else first
/// enabled button.
fn initial_focus(inputs: &[Input], buttons: &[Button]) -> Option<Focus> {
    inputs
        .iter()
        .position(|input| input.auto_focus && focusable(input))
        .or_else(|| inputs.iter().position(focusable))
        .map(Focus::Input)
        .or_else(|| buttons.iter().position(|button| !button.disabled).map(Focus::Button))
}

fn focus_order(inputs: &[Input], buttons: &[Button]) -> Vec<Focus> {
    let inputs = inputs
        .iter()
        .enumerate()
        .filter(|(_, input)| focusable(input))
        .map(|(index, _)| Focus::Input(index));
    let buttons = buttons
        .iter()
        .enumerate()
        .filter(|(_, button)| !button.disabled)
        .map(|(index, _)| Focus::Button(index));
    inputs.chain(buttons).collect()
}

fn wrapped_height(text: &str, width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let lines: usize = text
        .lines()
        .map(|line| line.chars().count().div_ceil(width).max(1))
        .sum();
    u16::try_from(lines.max(1)).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::overlay::{Document, OverlayError, SelectOption};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn view(overlay: &Overlay) -> OverlayView {
        OverlayView::new(overlay.clone(), Arc::new(KeyResolver::default()))
    }

    fn cancel_ok(document: &Document) -> Overlay {
        Overlay::create(
            document,
            "Delete",
            "Delete the file?",
            vec![Button::new("No", "no"), Button::new("Yes", "yes")],
        )
    }

    fn render(view: &mut OverlayView, theme: &Theme) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(60, 16)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                view.render(frame, area, theme);
            })
            .unwrap();
        terminal
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[tokio::test]
    async fn test_renders_title_message_and_buttons() {
        let document = Document::new();
        let overlay = cancel_ok(&document);
        overlay.show();
        let mut view = view(&overlay);

        let text = screen_text(&render(&mut view, &Theme::default()));
        assert!(text.contains(" Delete "));
        assert!(text.contains("Delete the file?"));
        assert!(text.contains("[No]"));
        assert!(text.contains(" Yes "));
    }

    #[tokio::test]
    async fn test_initial_focus() {
        let document = Document::new();
        let overlay = cancel_ok(&document);
        assert_eq!(view(&overlay).focus(), Some(Focus::Button(0)));

        overlay.set_buttons(vec![Button::new("No", "no").disabled(), Button::new("Yes", "yes")]);
        assert_eq!(view(&overlay).focus(), Some(Focus::Button(1)));

        overlay
            .set_inputs(vec![Input::new("first"), Input::new("second").auto_focus()])
            .await
            .unwrap();
        assert_eq!(view(&overlay).focus(), Some(Focus::Input(1)));

        overlay
            .set_inputs(vec![Input::new("first"), Input::new("second")])
            .await
            .unwrap();
        assert_eq!(view(&overlay).focus(), Some(Focus::Input(0)));
    }

    #[tokio::test]
    async fn test_focus_cycles_and_enter_clicks_focused_button() {
        let document = Document::new();
        let overlay = cancel_ok(&document);
        let promise = overlay.wait();
        let mut view = view(&overlay);

        view.handle_key(key(KeyCode::Tab)).unwrap();
        assert_eq!(view.focus(), Some(Focus::Button(1)));
        view.handle_key(key(KeyCode::Tab)).unwrap();
        assert_eq!(view.focus(), Some(Focus::Button(0)));
        view.handle_key(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT))
            .unwrap();
        assert_eq!(view.focus(), Some(Focus::Button(1)));

        let result = view.handle_key(key(KeyCode::Enter)).unwrap();
        assert_eq!(result, EventResult::Event(ViewEvent::Activated("yes".into())));
        assert_eq!(promise.await.unwrap().button, "yes");
    }

    #[tokio::test]
    async fn test_escape_clicks_first_button_only_with_a_choice() {
        let document = Document::new();
        let overlay = cancel_ok(&document);
        let promise = overlay.wait();
        let mut view = view(&overlay);

        let result = view.handle_key(key(KeyCode::Esc)).unwrap();
        assert_eq!(result, EventResult::Event(ViewEvent::Activated("no".into())));
        assert_eq!(promise.await.unwrap().button, "no");

        let alert = Overlay::create(&document, "", "Done", vec![Button::new("OK", "ok")]);
        alert.show();
        let mut view = OverlayView::new(alert.clone(), Arc::new(KeyResolver::default()));
        assert_eq!(view.handle_key(key(KeyCode::Esc)).unwrap(), EventResult::Consumed);
        assert!(alert.is_attached());
    }

    #[tokio::test]
    async fn test_typing_edits_and_enter_submits() {
        let document = Document::new();
        let overlay = Overlay::new(
            &document,
            "Name",
            "",
            vec![Input::new("name").auto_focus().required()],
            vec![Button::new("Cancel", "cancel"), Button::new("OK", "ok")],
        )
        .await
        .unwrap();
        let promise = overlay.wait();
        let mut view = view(&overlay);

        for c in "Ann".chars() {
            view.handle_key(key(KeyCode::Char(c))).unwrap();
        }
        assert_eq!(overlay.inputs()[0].value, Value::from("Ann"));

        view.handle_key(key(KeyCode::Enter)).unwrap();
        let result = promise.await.unwrap();
        assert_eq!(result.button, "ok");
        assert_eq!(result.input("name"), &Value::from("Ann"));
    }

    #[tokio::test]
    async fn test_space_is_typed_into_text_but_toggles_checkbox() {
        let document = Document::new();
        let overlay = Overlay::new(
            &document,
            "",
            "",
            vec![
                Input::new("note"),
                Input::new("agree").with_kind(InputKind::Checkbox),
                Input::new("size").with_kind(InputKind::Select).with_options(vec![
                    SelectOption { label: "Small".into(), value: "s".into() },
                    SelectOption { label: "Large".into(), value: "l".into() },
                ]),
            ],
            vec![Button::new("OK", "ok")],
        )
        .await
        .unwrap();
        overlay.show();
        let mut view = view(&overlay);

        view.handle_key(key(KeyCode::Char(' '))).unwrap();
        assert_eq!(overlay.inputs()[0].value, Value::from(" "));

        view.handle_key(key(KeyCode::Tab)).unwrap();
        view.handle_key(key(KeyCode::Char(' '))).unwrap();
        assert_eq!(overlay.inputs()[1].value, Value::Bool(true));

        view.handle_key(key(KeyCode::Tab)).unwrap();
        view.handle_key(key(KeyCode::Char(' '))).unwrap();
        assert_eq!(overlay.inputs()[2].value, Value::from("s"));
        view.handle_key(key(KeyCode::Right)).unwrap();
        assert_eq!(overlay.inputs()[2].value, Value::from("l"));
        view.handle_key(key(KeyCode::Left)).unwrap();
        assert_eq!(overlay.inputs()[2].value, Value::from("s"));
    }

    #[tokio::test]
    async fn test_inert_view_ignores_keys_and_renders_dimmed() {
        let document = Document::new();
        let below = cancel_ok(&document);
        below.show();
        let above = Overlay::create(&document, "Top", "", vec![Button::new("OK", "ok")]);
        above.show();

        let mut view = view(&below);
        assert_eq!(view.handle_key(key(KeyCode::Enter)).unwrap(), EventResult::Ignored);

        let theme = Theme::default();
        let terminal = render(&mut view, &theme);
        let buffer = terminal.backend().buffer();
        let corner = buffer
            .content()
            .iter()
            .find(|cell| cell.symbol() == "╭")
            .unwrap();
        assert_eq!(corner.fg, theme.dimmed());

        above.remove();
        let terminal = render(&mut view, &theme);
        let corner = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .find(|cell| cell.symbol() == "╭")
            .cloned()
            .unwrap();
        assert_eq!(corner.fg, theme.overlay.container_border);
    }

    #[tokio::test]
    async fn test_validation_errors_are_rendered() {
        let document = Document::new();
        let overlay = Overlay::new(
            &document,
            "Sign up",
            "",
            vec![Input::new("email").with_kind(InputKind::Email).required()],
            vec![Button::new("Cancel", "cancel"), Button::new("OK", "ok")],
        )
        .await
        .unwrap();
        overlay.show();
        assert!(!overlay.validate_inputs(true).await);

        let mut view = view(&overlay);
        let text = screen_text(&render(&mut view, &Theme::default()));
        let (_, message) = &overlay.input_errors()[0];
        assert!(text.contains(message.as_str()));
    }

    #[tokio::test]
    async fn test_removed_overlay_wait_fails() {
        let document = Document::new();
        let overlay = cancel_ok(&document);
        let promise = overlay.wait();
        let mut view = view(&overlay);
        overlay.remove();

        assert_eq!(view.handle_key(key(KeyCode::Enter)).unwrap(), EventResult::Ignored);
        assert_eq!(promise.await, Err(OverlayError::Removed));
    }

    #[test]
    fn test_wrapped_height() {
        assert_eq!(wrapped_height("", 10), 1);
        assert_eq!(wrapped_height("0123456789", 10), 1);
        assert_eq!(wrapped_height("0123456789a", 10), 2);
        assert_eq!(wrapped_height("a\nb", 10), 2);
    }
}
