use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

pub const KEY_HINTS: &str = "Enter send · PgUp/PgDn scroll · Esc quit";

/// Draws the key hints under the input.
pub fn draw_footer(f: &mut Frame<'_>, area: Rect) {
    let footer = Paragraph::new(KEY_HINTS)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);

    f.render_widget(footer, area);
}
