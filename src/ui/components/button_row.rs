use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::Theme;
use crate::overlay::{Button, ButtonLayout};
use crate::ui::Component;

const GAP: &str = "  ";

/// The overlay's buttons, laid out in a row or a column.
#[derive(Default)]
pub struct ButtonRow {
    buttons: Vec<Button>,
    layout: ButtonLayout,
    focused: Option<usize>,
    dimmed: bool,
}

impl ButtonRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, buttons: Vec<Button>, layout: ButtonLayout) {
        self.buttons = buttons;
        self.layout = layout;
    }

    pub const fn set_focused(&mut self, focused: Option<usize>) {
        self.focused = focused;
    }

    pub const fn set_dimmed(&mut self, dimmed: bool) {
        self.dimmed = dimmed;
    }

    pub fn height(&self) -> u16 {
        match self.layout {
            _ if self.buttons.is_empty() => 0,
            ButtonLayout::Vertical => u16::try_from(self.buttons.len()).unwrap_or(u16::MAX),
            ButtonLayout::Row | ButtonLayout::Confirm => 1,
        }
    }

    fn button_span(&self, index: usize, button: &Button, theme: &Theme) -> Span<'static> {
        let palette = &theme.overlay;
        let focused = self.focused == Some(index) && !self.dimmed;
        let style = if self.dimmed || button.disabled {
            Style::default().fg(theme.dimmed()).bg(palette.button_background)
        } else if focused {
            Style::default()
                .fg(palette.active_button_foreground)
                .bg(palette.active_button_background)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(palette.button_foreground)
                .bg(palette.button_background)
        };
        let label = if focused {
            format!("[{}]", button.label)
        } else {
            format!(" {} ", button.label)
        };
        Span::styled(label, style)
    }

    fn focus_marker(&self, index: usize, theme: &Theme) -> Span<'static> {
        if self.focused == Some(index) && !self.dimmed {
            Span::styled("›", Style::default().fg(theme.overlay.button_focus))
        } else {
            Span::raw(" ")
        }
    }
}

impl Component for ButtonRow {
    type Output = ();

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if self.buttons.is_empty() {
            return;
        }

        match self.layout {
            ButtonLayout::Vertical => {
                let lines: Vec<Line> = self
                    .buttons
                    .iter()
                    .enumerate()
                    .map(|(index, button)| {
                        Line::from(vec![
                            self.focus_marker(index, theme),
                            self.button_span(index, button, theme),
                        ])
                    })
                    .collect();
                frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
            }
            ButtonLayout::Confirm => {
                for (index, alignment) in [(0, Alignment::Left), (1, Alignment::Right)] {
                    if let Some(button) = self.buttons.get(index) {
                        let line = Line::from(self.button_span(index, button, theme));
                        frame.render_widget(Paragraph::new(line).alignment(alignment), area);
                    }
                }
            }
            ButtonLayout::Row => {
                let mut spans = Vec::with_capacity(self.buttons.len() * 2);
                for (index, button) in self.buttons.iter().enumerate() {
                    if index > 0 {
                        spans.push(Span::raw(GAP));
                    }
                    spans.push(self.button_span(index, button, theme));
                }
                frame.render_widget(
                    Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
                    area,
                );
            }
        }
    }
}
