use crate::constants::BOT_NAME;
use chrono::{DateTime, Local};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use textwrap::wrap;

/// Creation time in milliseconds. Two messages created within the same
/// millisecond share an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    id: MessageId,
    sender: Sender,
    text: String,
    timestamp: DateTime<Local>,
}

impl ChatMessage {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        let timestamp = Local::now();
        Self {
            id: MessageId(timestamp.timestamp_millis()),
            sender,
            text: text.into(),
            timestamp,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text)
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    fn from_user(&self) -> bool {
        self.sender == Sender::User
    }

    /// Renders the message as a bubble.
    ///
    /// `next` is the message that follows in the list: the closing tail is
    /// only drawn on the last message of a run from one sender. The last bot
    /// message also drops its tail while the bot is typing, since the typing
    /// indicator continues the run.
    pub fn render(
        &self,
        area: Rect,
        next: Option<&ChatMessage>,
        bot_typing: bool,
    ) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        let base_style = self.get_base_style();

        self.render_header(&mut lines, base_style);
        self.render_content(&mut lines, area, base_style);

        let continues = match next {
            Some(next) => next.sender == self.sender,
            None => bot_typing && self.sender == Sender::Bot,
        };
        if !continues {
            self.render_footer(&mut lines, base_style);
        }

        lines
    }

    fn get_base_style(&self) -> Style {
        Style::default().fg(if self.from_user() {
            Color::Rgb(255, 223, 128)
        } else {
            Color::Rgb(144, 238, 144)
        })
    }

    fn indent(&self) -> &'static str {
        if self.from_user() {
            "  "
        } else {
            ""
        }
    }

    fn render_header(&self, lines: &mut Vec<Line<'static>>, style: Style) {
        let timestamp = self.timestamp.format("%H:%M").to_string();
        let label = match self.sender {
            Sender::User => "You",
            Sender::Bot => BOT_NAME,
        };

        lines.push(Line::from(vec![
            Span::styled(self.indent().to_string(), style),
            Span::styled("┌─".to_string(), style),
            Span::styled(label.to_string(), style.add_modifier(Modifier::BOLD)),
            Span::styled(" ", style),
            Span::styled(timestamp, style.add_modifier(Modifier::DIM)),
        ]));
    }

    fn render_content(&self, lines: &mut Vec<Line<'static>>, area: Rect, style: Style) {
        let mut in_code_block = false;
        let mut code_buffer = String::new();
        let mut text_buffer = String::new();

        for line in self.text.lines() {
            if line.trim().starts_with("```") {
                self.flush_text_buffer(lines, &text_buffer, area, style);
                self.flush_code_buffer(lines, &code_buffer, style);
                text_buffer.clear();
                code_buffer.clear();
                in_code_block = !in_code_block;
                continue;
            }

            let buffer = if in_code_block {
                &mut code_buffer
            } else {
                &mut text_buffer
            };
            buffer.push_str(line);
            buffer.push('\n');
        }

        self.flush_text_buffer(lines, &text_buffer, area, style);
        self.flush_code_buffer(lines, &code_buffer, style);
    }

    fn flush_text_buffer(
        &self,
        lines: &mut Vec<Line<'static>>,
        buffer: &str,
        area: Rect,
        style: Style,
    ) {
        if buffer.is_empty() {
            return;
        }

        let wrap_width = (area.width as usize)
            .saturating_sub(2 + self.indent().len())
            .max(1);

        for wrapped_line in wrap(buffer.trim_end_matches('\n'), wrap_width) {
            lines.push(Line::from(vec![
                Span::styled(self.indent().to_string(), style),
                Span::styled("│ ".to_string(), style),
                Span::styled(wrapped_line.into_owned(), style),
            ]));
        }
    }

    fn flush_code_buffer(&self, lines: &mut Vec<Line<'static>>, buffer: &str, style: Style) {
        if buffer.is_empty() {
            return;
        }

        let code_style = Style::default()
            .fg(Color::Rgb(209, 154, 102))
            .add_modifier(Modifier::BOLD);

        for code_line in buffer.lines() {
            lines.push(Line::from(vec![
                Span::styled(self.indent().to_string(), style),
                Span::styled("│ ".to_string(), style),
                Span::styled("▎".to_string(), Style::default().fg(Color::DarkGray)),
                Span::styled(format!(" {}", code_line), code_style),
            ]));
        }
    }

    fn render_footer(&self, lines: &mut Vec<Line<'static>>, style: Style) {
        lines.push(Line::from(vec![
            Span::styled(self.indent().to_string(), style),
            Span::styled("╰─".to_string(), style),
        ]));
    }
}
