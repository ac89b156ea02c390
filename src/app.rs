use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tracing::{debug, error, info};

use crate::Theme;
use crate::config::{DialogAction, GlobalAction, KeyResolver};
use crate::overlay::{Document, NodeId};
use crate::tui::{Event, Tui};
use crate::ui::{Component, EventResult, OverlayView, ViewEvent};

const FRAME_RATE: f64 = 30.0;
const TICK_RATE: f64 = 12.0;
/// How long a quit waits for the dialog task to observe its removal.
const QUIT_GRACE: Duration = Duration::from_millis(250);

/// Terminal host for every overlay attached to a [`Document`].
///
/// The app appends one background element to the document. Overlays are
/// drawn in priority order on top of it and keys go to the interactive one.
pub struct App {
    document: Document,
    theme: Theme,
    resolver: Arc<KeyResolver>,
    background: NodeId,
    views: Vec<OverlayView>,
    should_quit: bool,
    should_suspend: bool,
}

impl App {
    pub fn new(document: Document, theme: Theme, resolver: Arc<KeyResolver>) -> Self {
        let background = document.append_element("background");
        Self {
            document,
            theme,
            resolver,
            background,
            views: Vec::new(),
            should_quit: false,
            should_suspend: false,
        }
    }

    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Drive the terminal until `task` completes.
    ///
    /// Returns `None` when the terminal went away before the task finished.
    /// Quitting removes every overlay, so a task waiting on one fails with
    /// `OverlayError::Removed` and its result is still returned.
    pub async fn run<T>(&mut self, task: impl Future<Output = T>) -> color_eyre::Result<Option<T>> {
        let mut tui = Tui::new(FRAME_RATE, TICK_RATE)?;
        tui.enter()?;
        tokio::pin!(task);

        let outcome = loop {
            let event = tokio::select! {
                output = &mut task => break Some(output),
                event = tui.next_event() => event,
            };
            let Some(event) = event else {
                break None;
            };
            self.handle_event(&mut tui, event)?;

            if self.should_suspend {
                tui.suspend()?;
                self.should_suspend = false;
                tui.resume()?;
            } else if self.should_quit {
                info!("Quit requested, removing overlays");
                self.remove_overlays();
                break tokio::time::timeout(QUIT_GRACE, &mut task).await.ok();
            }
        };

        tui.exit()?;
        Ok(outcome)
    }

    fn handle_event(&mut self, tui: &mut Tui, event: Event) -> color_eyre::Result<()> {
        match event {
            Event::Init => debug!("Terminal ready"),
            Event::Quit => self.should_quit = true,
            Event::Tick => self.handle_tick(),
            Event::Render => self.render(tui)?,
            Event::Resize(width, height) => {
                tui.resize(Rect::new(0, 0, width, height))?;
                self.render(tui)?;
            }
            Event::Key(key) => self.handle_key(key)?,
            Event::Paste(text) => {
                for c in text.chars().filter(|c| !c.is_control()) {
                    self.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))?;
                }
            }
            Event::Error(message) => error!("Terminal event error: {message}"),
        }
        Ok(())
    }

    /// Keep one view per attached overlay, lowest priority first.
    fn sync_views(&mut self) {
        let overlays = self.document.overlays();
        let mut views = std::mem::take(&mut self.views);
        self.views = overlays
            .into_iter()
            .map(|overlay| match views.iter().position(|view| view.overlay() == &overlay) {
                Some(index) => views.swap_remove(index),
                None => {
                    debug!(overlay = %overlay.id(), "Creating overlay view");
                    OverlayView::new(overlay, Arc::clone(&self.resolver))
                }
            })
            .collect();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> color_eyre::Result<()> {
        if self.resolver.matches_global(&key, GlobalAction::Quit) {
            self.should_quit = true;
            return Ok(());
        }
        if self.resolver.matches_global(&key, GlobalAction::Suspend) {
            self.should_suspend = true;
            return Ok(());
        }

        self.sync_views();
        let Some(interactive) = self.document.interactive() else {
            return Ok(());
        };
        let Some(view) = self
            .views
            .iter_mut()
            .find(|view| view.overlay().id() == interactive)
        else {
            return Ok(());
        };

        if let EventResult::Event(ViewEvent::Activated(button)) = view.handle_key(key)? {
            debug!(overlay = %interactive, %button, "Button activated from keyboard");
        }
        Ok(())
    }

    fn handle_tick(&mut self) {
        self.sync_views();
        for view in &mut self.views {
            view.handle_tick();
        }
    }

    /// Remove every attached overlay, failing their pending waits.
    pub fn remove_overlays(&mut self) {
        for overlay in self.document.overlays() {
            overlay.remove();
        }
        self.views.clear();
    }

    fn render(&mut self, tui: &mut Tui) -> color_eyre::Result<()> {
        tui.draw(|frame| self.draw(frame))?;
        Ok(())
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        self.sync_views();
        let area = frame.area();
        self.draw_background(frame, area);
        for view in &mut self.views {
            view.render(frame, area, &self.theme);
        }
    }

    fn draw_background(&self, frame: &mut Frame, area: Rect) {
        let inert = self.document.is_inert(self.background);
        let [heading_area, _, help_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        let text = if inert { self.theme.dimmed() } else { self.theme.text() };
        frame.render_widget(
            Paragraph::new(Span::styled(
                " lazydialog",
                Style::default().fg(text).add_modifier(Modifier::BOLD),
            )),
            heading_area,
        );

        let key_style = Style::default().fg(self.theme.overlay.container_focus);
        let label_style = Style::default().fg(self.theme.muted());
        let mut spans = vec![Span::raw(" ")];
        for (action, label) in [
            (DialogAction::Next, "next"),
            (DialogAction::Activate, "activate"),
            (DialogAction::Cancel, "cancel"),
            (DialogAction::Toggle, "toggle"),
        ] {
            spans.push(Span::styled(self.resolver.display_dialog(action), key_style));
            spans.push(Span::styled(format!(" {label}  "), label_style));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), help_area);
    }
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::overlay::{Button, Overlay, OverlayError};

    fn app(document: &Document) -> App {
        App::new(document.clone(), Theme::default(), Arc::new(KeyResolver::default()))
    }

    fn draw(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(70, 20)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    fn dialog(document: &Document, title: &str) -> Overlay {
        Overlay::create(
            document,
            title,
            "",
            vec![Button::new("Cancel", "cancel"), Button::new("OK", "ok")],
        )
    }

    #[tokio::test]
    async fn test_background_is_inert_behind_overlays() {
        let document = Document::new();
        let mut app = app(&document);
        assert!(!document.is_inert(app.background));

        let overlay = dialog(&document, "First");
        overlay.show();
        assert!(document.is_inert(app.background));

        let screen = draw(&mut app);
        assert!(screen.contains("lazydialog"));
        assert!(screen.contains("First"));
        assert!(screen.contains("Esc cancel"));
    }

    #[tokio::test]
    async fn test_keys_go_to_the_interactive_overlay() {
        let document = Document::new();
        let mut app = app(&document);
        let below = dialog(&document, "Below");
        let below_wait = below.wait();
        let above = dialog(&document, "Above");
        let above_wait = above.wait();

        app.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE))
            .unwrap();
        assert_eq!(above_wait.await.unwrap().button, "cancel");
        assert!(below.is_attached());

        app.handle_key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE))
            .unwrap();
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))
            .unwrap();
        assert_eq!(below_wait.await.unwrap().button, "ok");
        assert!(document.overlays().is_empty());
    }

    #[tokio::test]
    async fn test_views_follow_the_document() {
        let document = Document::new();
        let mut app = app(&document);
        let first = dialog(&document, "First");
        let second = dialog(&document, "Second");
        first.show();
        second.show();
        draw(&mut app);
        assert_eq!(app.views.len(), 2);
        assert_eq!(app.views[1].overlay(), &second);

        second.remove();
        draw(&mut app);
        assert_eq!(app.views.len(), 1);
        assert_eq!(app.views[0].overlay(), &first);
    }

    #[tokio::test]
    async fn test_quit_key_removes_overlays() {
        let document = Document::new();
        let mut app = app(&document);
        let overlay = dialog(&document, "Bye");
        let promise = overlay.wait();

        app.handle_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL))
            .unwrap();
        assert!(app.should_quit);
        app.remove_overlays();
        assert_eq!(promise.await, Err(OverlayError::Removed));
    }
}
