use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tokio::sync::watch;

/// Sibling of the chat panel that shows the most recent message.
#[derive(Debug)]
pub struct StatusBar {
    latest: watch::Receiver<String>,
}

impl StatusBar {
    pub fn new(latest: watch::Receiver<String>) -> Self {
        Self { latest }
    }

    /// First line of the latest message.
    pub fn text(&self) -> String {
        self.latest
            .borrow()
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let status = Line::from(vec![
            Span::styled("latest ", Style::default().fg(Color::DarkGray)),
            Span::styled(self.text(), Style::default().fg(Color::Yellow)),
        ]);

        frame.render_widget(Paragraph::new(status), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::latest_message::LatestMessage;

    #[test]
    fn shows_first_line_of_latest_message() {
        let slot = LatestMessage::new("greeting");
        let bar = StatusBar::new(slot.subscribe());
        assert_eq!(bar.text(), "greeting");

        slot.publish("line one\nline two");
        assert_eq!(bar.text(), "line one");
    }
}
