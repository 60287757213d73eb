//! Full-screen `ratatui` shell around [`App`]: terminal setup, the input
//! thread, and the event loop that drives the one-second timer.

use crate::app::HINT_ROWS;
use crate::log_debug;
use crate::session::{Tick, TICK_INTERVAL};
use crate::terminal::TerminalGuard;
use crate::App;
use anyhow::{bail, Context, Result};
use crossbeam_channel::{after, bounded, never, select, Receiver, Sender};
use crossterm::event::{self, Event};
use crossterm::terminal::size as terminal_size;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Terminal,
};
use std::io;
use std::thread;

/// Max pending input events before the reader blocks.
const INPUT_CHANNEL_CAPACITY: usize = 64;
const RECORDING_COLOR: Color = Color::Rgb(255, 140, 90);
const IDLE_COLOR: Color = Color::DarkGray;
const HINT_COLOR: Color = Color::Gray;

/// Configure the terminal, run the event loop, and tear everything down.
pub fn run_app(app: &mut App) -> Result<()> {
    let terminal_guard = TerminalGuard::enter().context("failed to set up the terminal")?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    match terminal_size() {
        Ok((cols, rows)) => app.set_viewport(crate::view::Viewport::new(cols, rows)),
        Err(err) => log_debug(&format!("terminal size unavailable: {err}")),
    }

    let (input_tx, input_rx) = bounded(INPUT_CHANNEL_CAPACITY);
    let _input_handle = spawn_input_thread(input_tx)?;

    let result = app_loop(&mut terminal, app, &input_rx);

    drop(terminal);
    drop(terminal_guard);

    result
}

/// Forward terminal events until the receiver goes away. A read error is
/// forwarded once and ends the thread.
fn spawn_input_thread(tx: Sender<io::Result<Event>>) -> Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("tape-input".to_string())
        .spawn(move || loop {
            let event = event::read();
            let failed = event.is_err();
            if tx.send(event).is_err() || failed {
                return;
            }
        })
        .context("failed to spawn input thread")
}

fn app_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    input_rx: &Receiver<io::Result<Event>>,
) -> Result<()> {
    let mut timer = never();
    let mut pending_tick: Option<Tick> = None;

    terminal.draw(|frame| draw(frame, app))?;

    while !app.should_quit() {
        if let Some(tick) = app.take_scheduled_tick() {
            pending_tick = Some(tick);
            timer = after(TICK_INTERVAL);
        }

        select! {
            recv(input_rx) -> event => match event {
                Ok(Ok(event)) => app.handle_event(event)?,
                Ok(Err(err)) => return Err(err).context("failed to read terminal input"),
                Err(_) => bail!("terminal input closed"),
            },
            recv(timer) -> _ => {
                if let Some(tick) = pending_tick.take() {
                    app.handle_tick(tick);
                }
            }
        }

        if !app.should_quit() {
            terminal.draw(|frame| draw(frame, app))?;
        }
    }
    Ok(())
}

fn hint_text(recording: bool) -> &'static str {
    if recording {
        "enter/space: stop   q: quit"
    } else {
        "enter/space: record   q: quit"
    }
}

/// Paint the tape above a one-line key hint.
pub fn draw(frame: &mut ratatui::Frame<'_>, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(HINT_ROWS)])
        .split(frame.size());

    let recording = app.session().is_running();
    let tape_style = if recording {
        Style::default()
            .fg(RECORDING_COLOR)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(IDLE_COLOR)
    };
    frame.render_widget(Paragraph::new(app.render_text()).style(tape_style), chunks[0]);

    let hint = Line::from(Span::styled(
        hint_text(recording),
        Style::default().fg(HINT_COLOR),
    ));
    frame.render_widget(
        Paragraph::new(hint).alignment(Alignment::Center),
        chunks[1],
    );
}
