//! Terminal UI wrapper.
//!
//! [`Tui`] owns the ratatui terminal, switches the terminal in and out of raw
//! mode and feeds an async event channel from a background task.

use std::io::Stderr;
use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};

use crossterm::cursor;
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, Event as CrosstermEvent, EventStream, KeyCode,
    KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use futures::{FutureExt, StreamExt};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// After this the event task is aborted.
const GRACEFUL_SHUTDOWN: Duration = Duration::from_millis(500);
/// After this stopping gives up.
const FORCEFUL_SHUTDOWN: Duration = Duration::from_secs(2);

/// Draws to stderr; stdout carries the dialog result.
pub type Backend = CrosstermBackend<Stderr>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Init,
    Quit,
    Error(String),
    Tick,
    Render,
    Paste(String),
    Key(KeyEvent),
    Resize(u16, u16),
}

impl Event {
    /// Map a terminal event onto the app's events. Key releases, mouse and
    /// focus changes are dropped.
    fn from_terminal(event: CrosstermEvent) -> Option<Self> {
        match event {
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                let interrupt = key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('c');
                Some(if interrupt { Self::Quit } else { Self::Key(key) })
            }
            CrosstermEvent::Resize(width, height) => Some(Self::Resize(width, height)),
            CrosstermEvent::Paste(text) => Some(Self::Paste(text)),
            _ => None,
        }
    }
}

pub struct Tui {
    terminal: Terminal<Backend>,
    task: JoinHandle<()>,
    cancellation_token: CancellationToken,
    event_rx: UnboundedReceiver<Event>,
    event_tx: UnboundedSender<Event>,
    frame_period: Duration,
    tick_period: Duration,
}

impl Tui {
    /// Create a new TUI with the given frames and ticks per second.
    pub fn new(frame_rate: f64, tick_rate: f64) -> color_eyre::Result<Self> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Ok(Self {
            terminal: Terminal::new(Backend::new(std::io::stderr()))?,
            task: tokio::spawn(async {}),
            cancellation_token: CancellationToken::new(),
            event_rx,
            event_tx,
            frame_period: Duration::from_secs_f64(1.0 / frame_rate),
            tick_period: Duration::from_secs_f64(1.0 / tick_rate),
        })
    }

    pub fn enter(&mut self) -> color_eyre::Result<()> {
        crossterm::terminal::enable_raw_mode()?;
        crossterm::execute!(
            std::io::stderr(),
            EnterAlternateScreen,
            EnableBracketedPaste,
            cursor::Hide
        )?;
        self.start();
        Ok(())
    }

    pub fn exit(&mut self) -> color_eyre::Result<()> {
        self.stop()?;
        if crossterm::terminal::is_raw_mode_enabled()? {
            self.flush()?;
            crossterm::execute!(
                std::io::stderr(),
                DisableBracketedPaste,
                LeaveAlternateScreen,
                cursor::Show
            )?;
            crossterm::terminal::disable_raw_mode()?;
        }
        Ok(())
    }

    /// Suspend the TUI (for Ctrl+Z handling).
    pub fn suspend(&mut self) -> color_eyre::Result<()> {
        self.exit()?;
        #[cfg(not(windows))]
        signal_hook::low_level::raise(signal_hook::consts::SIGTSTP)?;
        Ok(())
    }

    pub fn resume(&mut self) -> color_eyre::Result<()> {
        self.enter()?;
        // The alternate screen was torn down while suspended.
        self.clear()?;
        Ok(())
    }

    pub async fn next_event(&mut self) -> Option<Event> {
        self.event_rx.recv().await
    }

    fn start(&mut self) {
        self.cancellation_token.cancel();
        self.cancellation_token = CancellationToken::new();
        self.task = tokio::spawn(pump_events(
            self.event_tx.clone(),
            self.cancellation_token.clone(),
            self.tick_period,
            self.frame_period,
        ));
    }

    fn stop(&mut self) -> color_eyre::Result<()> {
        self.cancellation_token.cancel();
        let started = Instant::now();
        while !self.task.is_finished() {
            std::thread::sleep(Duration::from_millis(1));
            let elapsed = started.elapsed();
            if elapsed >= FORCEFUL_SHUTDOWN {
                return Err(color_eyre::eyre::eyre!("Failed to stop TUI task"));
            }
            if elapsed >= GRACEFUL_SHUTDOWN {
                self.task.abort();
            }
        }
        Ok(())
    }
}

/// Forward terminal input, ticks and frames until cancelled.
async fn pump_events(
    event_tx: UnboundedSender<Event>,
    cancellation_token: CancellationToken,
    tick_period: Duration,
    frame_period: Duration,
) {
    let mut event_stream = EventStream::new();
    let mut tick_interval = interval(tick_period);
    let mut frame_interval = interval(frame_period);

    #[cfg(unix)]
    tokio::spawn(forward_sigterm(event_tx.clone(), cancellation_token.clone()));

    if event_tx.send(Event::Init).is_err() {
        return;
    }

    loop {
        let event = tokio::select! {
            () = cancellation_token.cancelled() => break,
            _ = tick_interval.tick() => Event::Tick,
            _ = frame_interval.tick() => Event::Render,
            terminal_event = event_stream.next().fuse() => match terminal_event {
                Some(Ok(event)) => match Event::from_terminal(event) {
                    Some(event) => event,
                    None => continue,
                },
                Some(Err(e)) => Event::Error(e.to_string()),
                None => break,
            },
        };
        if event_tx.send(event).is_err() {
            break;
        }
    }
    cancellation_token.cancel();
}

#[cfg(unix)]
async fn forward_sigterm(event_tx: UnboundedSender<Event>, cancellation_token: CancellationToken) {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(err) => {
            error!("Failed to install SIGTERM handler: {err}");
            return;
        }
    };
    tokio::select! {
        () = cancellation_token.cancelled() => {}
        _ = sigterm.recv() => {
            debug!("SIGTERM received");
            let _ = event_tx.send(Event::Quit);
        }
    }
}

impl Deref for Tui {
    type Target = Terminal<Backend>;

    fn deref(&self) -> &Self::Target {
        &self.terminal
    }
}

impl DerefMut for Tui {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.terminal
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(err) = self.exit() {
            error!("Failed to restore terminal: {err}");
        }
    }
}
