use crate::log_debug;
use crate::session::{Session, Tick, TickOutcome, Toggle};
use crate::view::{self, Viewport};
use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Rows reserved under the tape for the key hint.
pub(crate) const HINT_ROWS: u16 = 1;

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Toggle,
    Quit,
    None,
}

/// Map a key event to an action. Only presses count.
pub fn action_for_key(key: KeyEvent) -> Action {
    if key.kind == KeyEventKind::Release {
        return Action::None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Action::Quit,
            _ => Action::None,
        };
    }
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => Action::Toggle,
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        _ => Action::None,
    }
}

pub struct App {
    session: Session,
    viewport: Option<Viewport>,
    scheduled_tick: Option<Tick>,
    should_quit: bool,
}

impl App {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            viewport: None,
            scheduled_tick: None,
            should_quit: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Apply one terminal event. Errors from the session are fatal.
    pub fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(key) => match action_for_key(key) {
                Action::Toggle => self.toggle()?,
                Action::Quit => self.quit(),
                Action::None => {}
            },
            Event::Resize(width, height) => self.set_viewport(Viewport::new(width, height)),
            _ => {}
        }
        Ok(())
    }

    fn toggle(&mut self) -> Result<()> {
        match self.session.toggle()? {
            Toggle::Started { first_tick } => self.scheduled_tick = Some(first_tick),
            Toggle::Stopped { exit } => {
                self.scheduled_tick = None;
                if let Some(exit) = exit.filter(|exit| !exit.success()) {
                    log_debug(&format!("Recorder exited with code {:?}", exit.code));
                }
            }
        }
        Ok(())
    }

    fn quit(&mut self) {
        log_debug("Quit requested");
        self.session.shutdown();
        self.scheduled_tick = None;
        self.should_quit = true;
    }

    /// Deliver a fired timer message.
    pub fn handle_tick(&mut self, tick: Tick) {
        if let TickOutcome::Advanced { next } = self.session.tick(tick) {
            self.scheduled_tick = Some(next);
        }
    }

    /// Tick that should be delivered one interval from now, if any. The
    /// caller replaces its pending timer with it.
    pub fn take_scheduled_tick(&mut self) -> Option<Tick> {
        self.scheduled_tick.take()
    }

    /// Tape text for the area above the key hint.
    pub fn render_text(&self) -> String {
        let area = self.viewport.map(|viewport| {
            Viewport::new(viewport.width, viewport.height.saturating_sub(HINT_ROWS))
        });
        view::render(self.session.state(), self.session.extension(), area)
    }
}
