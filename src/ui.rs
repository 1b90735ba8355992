pub mod footer;
pub mod header;
pub mod status_bar;

use crate::app::App;
use crate::chat_view::draw_chat;
use crate::constants::TICK_RATE;
use crate::errors::ChatterResult;
use crate::key_handlers::handle_chat_input;
use crossterm::{
    event::{self, Event as CEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::warn;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    io,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;

/// Runs the terminal UI until the user quits.
pub async fn run_ui(app: &mut App) -> ChatterResult<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app).await;

    // Restore the terminal even when the loop failed.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

/// Reads terminal events on a blocking thread until the receiver goes away.
fn spawn_input_reader(tx: mpsc::Sender<CEvent>) {
    tokio::task::spawn_blocking(move || loop {
        match event::poll(Duration::from_millis(100)) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    if tx.blocking_send(ev).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    warn!("Failed to read terminal event: {}", e);
                    return;
                }
            },
            Ok(false) => {
                if tx.is_closed() {
                    return;
                }
            }
            Err(e) => {
                warn!("Failed to poll terminal events: {}", e);
                return;
            }
        }
    });
}

/// Main loop of the application.
pub async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> ChatterResult<()> {
    let (tx, mut rx) = mpsc::channel::<CEvent>(100);
    spawn_input_reader(tx);

    let mut ticker = tokio::time::interval(TICK_RATE);
    app.panel.mount();

    while !app.should_quit {
        terminal.draw(|f| draw_chat(f, app))?;

        tokio::select! {
            Some(input) = rx.recv() => {
                if let CEvent::Key(key) = input {
                    handle_chat_input(key, app, Instant::now());
                }
            }
            Some(event) = app.panel.next_event() => {
                app.panel.handle_event(event, Instant::now());
            }
            _ = ticker.tick() => {
                app.panel.tick(Instant::now());
            }
        }
    }

    app.panel.unmount();
    Ok(())
}
