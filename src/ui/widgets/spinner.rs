use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use throbber_widgets_tui::WhichUse::Spin;
use throbber_widgets_tui::{BRAILLE_SIX, BRAILLE_SIX_DOUBLE, Throbber, ThrobberState};

use crate::Theme;
use crate::ui::Component;

pub struct Spinner {
    throbber_state: ThrobberState,
    label: Option<String>,
    large: bool,
}

impl Spinner {
    pub fn new() -> Self {
        Self {
            throbber_state: ThrobberState::default(),
            label: None,
            large: false,
        }
    }

    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label.filter(|label| !label.is_empty());
    }

    pub const fn set_large(&mut self, large: bool) {
        self.large = large;
    }

    pub fn width(&self) -> u16 {
        let symbol = if self.large { 2 } else { 1 };
        // +1 for the space between throbber and label
        let label = self
            .label
            .as_ref()
            .map_or(0, |label| label.chars().count() + 1);
        u16::try_from(symbol + label).unwrap_or(u16::MAX)
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Spinner {
    type Output = ();

    fn handle_tick(&mut self) {
        self.throbber_state.calc_next();
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let (set, symbol_style) = if self.large {
            (
                BRAILLE_SIX_DOUBLE,
                Style::default()
                    .fg(theme.overlay.loading)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            (BRAILLE_SIX, Style::default().fg(theme.overlay.loading))
        };

        let mut throbber = Throbber::default()
            .throbber_set(set)
            .use_type(Spin)
            .throbber_style(symbol_style)
            .style(Style::default().fg(theme.overlay.container_foreground));
        if let Some(label) = &self.label {
            throbber = throbber.label(label.clone());
        }

        let area = area.centered(Constraint::Length(self.width()), Constraint::Length(1));
        frame.render_stateful_widget(throbber, area, &mut self.throbber_state);
    }
}
