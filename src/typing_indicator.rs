use crate::constants::BOT_NAME;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

const SPINNER_FRAMES: [&str; 4] = ["◐", "◓", "◑", "◒"];

#[derive(Debug, Default)]
pub struct TypingIndicator {
    spinner_idx: usize,
}

impl TypingIndicator {
    pub fn new() -> Self {
        Self { spinner_idx: 0 }
    }

    pub fn update_spinner(&mut self) {
        self.spinner_idx = self.spinner_idx.wrapping_add(1);
    }

    pub fn frame(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_idx % SPINNER_FRAMES.len()]
    }

    pub fn line(&self) -> Line<'static> {
        let style = Style::default().fg(Color::Rgb(144, 238, 144));
        Line::from(vec![
            Span::styled("┌─".to_string(), style),
            Span::styled(self.frame().to_string(), Style::default().fg(Color::Gray)),
            Span::raw(" "),
            Span::styled(
                format!("{} is typing…", BOT_NAME),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spinner_cycles() {
        let mut indicator = TypingIndicator::new();
        let first = indicator.frame();
        for _ in 0..SPINNER_FRAMES.len() {
            indicator.update_spinner();
        }
        assert_eq!(indicator.frame(), first);
        indicator.update_spinner();
        assert_ne!(indicator.frame(), first);
    }
}
