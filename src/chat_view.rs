use crate::app::App;
use crate::chat_panel::ChatPanel;
use crate::typing_indicator::TypingIndicator;
use crate::ui::{footer::draw_footer, header::draw_header};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

pub fn draw_chat(f: &mut Frame, app: &mut App) {
    let size = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(2),
                Constraint::Min(1),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .margin(1)
        .split(size);

    draw_header(f, chunks[0]);

    if app.panel.is_typing() {
        app.typing_indicator.update_spinner();
    }
    draw_messages(f, &mut app.panel, &app.typing_indicator, chunks[1]);

    draw_input(f, &app.panel, chunks[2]);
    app.status_bar.render(f, chunks[3]);
    draw_footer(f, chunks[4]);
}

/// Builds every line of the message list, typing indicator included.
pub fn message_lines(
    panel: &ChatPanel,
    indicator: &TypingIndicator,
    area: Rect,
) -> Vec<Line<'static>> {
    let messages = panel.messages();
    let bot_typing = panel.is_typing();
    let mut lines = Vec::new();

    for (idx, message) in messages.iter().enumerate() {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.extend(message.render(area, messages.get(idx + 1), bot_typing));
    }

    if bot_typing {
        lines.push(Line::from(""));
        lines.push(indicator.line());
    }

    lines
}

fn draw_messages(f: &mut Frame, panel: &mut ChatPanel, indicator: &TypingIndicator, area: Rect) {
    let lines = message_lines(panel, indicator, area);

    let total_lines = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let max_scroll = total_lines.saturating_sub(area.height);
    panel.clamp_scroll(max_scroll);

    let msgs_para = Paragraph::new(lines)
        .style(Style::default())
        .block(Block::default());
    f.render_widget(msgs_para.scroll((panel.scroll_offset(), 0)), area);
}

fn draw_input(f: &mut Frame, panel: &ChatPanel, area: Rect) {
    if area.height < 3 || area.width < 4 {
        return;
    }

    let separator = "─".repeat(area.width as usize);
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            separator.clone(),
            Style::default().fg(Color::DarkGray),
        ))),
        Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height: 1,
        },
    );

    let draft = panel.draft();
    let input = Line::from(vec![
        Span::styled("→ ", Style::default().fg(Color::DarkGray)),
        Span::styled(draft.to_string(), Style::default().fg(Color::White)),
    ]);

    let visible_width = area.width.saturating_sub(3);
    let text_width = u16::try_from(draft.width()).unwrap_or(u16::MAX);
    let scroll_offset = text_width.saturating_sub(visible_width);

    f.render_widget(
        Paragraph::new(input).scroll((0, scroll_offset)),
        Rect {
            x: area.x,
            y: area.y + 1,
            width: area.width,
            height: 1,
        },
    );

    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            separator,
            Style::default().fg(Color::DarkGray),
        ))),
        Rect {
            x: area.x,
            y: area.y + 2,
            width: area.width,
            height: 1,
        },
    );

    let cursor_x = area.x.saturating_add(2).saturating_add(text_width - scroll_offset);
    f.set_cursor_position((cursor_x, area.y + 1));
}
