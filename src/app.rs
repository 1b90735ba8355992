use crate::chat_panel::ChatPanel;
use crate::typing_indicator::TypingIndicator;
use crate::ui::status_bar::StatusBar;

pub struct App {
    pub panel: ChatPanel,
    pub status_bar: StatusBar,
    pub typing_indicator: TypingIndicator,
    pub should_quit: bool,
}

impl App {
    pub fn new(panel: ChatPanel, status_bar: StatusBar) -> App {
        App {
            panel,
            status_bar,
            typing_indicator: TypingIndicator::new(),
            should_quit: false,
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}
