use crate::app::App;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Instant;

pub fn handle_chat_input(key: KeyEvent, app: &mut App, now: Instant) {
    if key.kind == KeyEventKind::Release {
        return;
    }

    match key.code {
        KeyCode::Esc => app.quit(),
        KeyCode::Enter => app.panel.send_message(now),
        KeyCode::PageUp => app.panel.scroll_up(),
        KeyCode::PageDown => app.panel.scroll_down(),
        KeyCode::Backspace => {
            let mut draft = app.panel.draft().to_string();
            draft.pop();
            app.panel.on_change_message(draft);
        }
        KeyCode::Char(c) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                match c {
                    'c' => app.quit(),
                    'u' => app.panel.scroll_up(),
                    'd' => app.panel.scroll_down(),
                    _ => {}
                }
            } else {
                let mut draft = app.panel.draft().to_string();
                draft.push(c);
                app.panel.on_change_message(draft);
            }
        }
        _ => {}
    }
}
