use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::UnicodeWidthChar;

const SEPARATOR: &str = "  ";

/// Configuration for text input rendering
pub struct TextInputConfig<'a> {
    pub content: &'a str,
    pub title: &'a str,
    pub placeholder: Option<&'a str>,
    pub show_cursor: bool,
    pub cursor_position: usize,
}

impl<'a> TextInputConfig<'a> {
    pub fn new(content: &'a str, title: &'a str) -> Self {
        Self {
            content,
            title,
            placeholder: None,
            show_cursor: true,
            cursor_position: content.chars().count(),
        }
    }

    pub fn with_placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    pub fn with_cursor_visible(mut self, show_cursor: bool) -> Self {
        self.show_cursor = show_cursor;
        self
    }

    pub fn with_cursor_position(mut self, cursor_position: usize) -> Self {
        self.cursor_position = cursor_position;
        self
    }
}

/// Renders a bordered one-line input that keeps the cursor in view
pub fn render_text_input(frame: &mut Frame, area: Rect, config: TextInputConfig) {
    let cursor_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::SLOW_BLINK);
    let cursor = if config.show_cursor { "█" } else { "" };

    let line = if config.content.is_empty() {
        let mut spans = vec![
            Span::styled("> ", Style::default().fg(Color::DarkGray)),
            Span::styled(cursor, cursor_style),
        ];
        if let Some(placeholder) = config.placeholder {
            spans.push(Span::styled(
                format!(" {}", placeholder),
                Style::default().fg(Color::DarkGray),
            ));
        }
        Line::from(spans)
    } else {
        let available = usize::from(area.width.saturating_sub(2))
            .saturating_sub(2 + usize::from(config.show_cursor))
            .max(1);
        let characters: Vec<char> = config.content.chars().collect();
        let cursor_index = config.cursor_position.min(characters.len());
        let (start, end) = visible_window(&characters, cursor_index, available);

        let before: String = characters.iter().take(cursor_index).skip(start).collect();
        let after: String = characters
            .iter()
            .take(end)
            .skip(cursor_index)
            .collect();
        let text_style = Style::default().fg(Color::White);

        Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Cyan)),
            Span::styled(before, text_style),
            Span::styled(cursor, cursor_style),
            Span::styled(after, text_style),
        ])
    };

    let border_color = if config.content.is_empty() {
        Color::DarkGray
    } else {
        Color::Cyan
    };

    frame.render_widget(
        Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(config.title, Style::default().fg(Color::White)))
                .border_style(Style::default().fg(border_color)),
        ),
        area,
    );
}

/// Character range `[start, end)` whose display width fits and which contains the cursor
fn visible_window(characters: &[char], cursor: usize, width: usize) -> (usize, usize) {
    let char_width = |character: &char| UnicodeWidthChar::width(*character).unwrap_or(0).max(1);

    let mut start = cursor;
    let mut used = 0usize;
    while start > 0 {
        let previous = characters.get(start - 1).map_or(1, char_width);
        if used + previous > width {
            break;
        }
        used += previous;
        start -= 1;
    }

    let mut end = cursor;
    while let Some(next) = characters.get(end) {
        let next_width = char_width(next);
        if used + next_width > width {
            break;
        }
        used += next_width;
        end += 1;
    }
    (start, end)
}

/// Key hint spans: mode badge followed by `key description` pairs
pub fn footer_spans(mode: &str, keybindings: &[(&str, &str)]) -> Vec<Span<'static>> {
    let mut spans = vec![
        Span::raw(" "),
        Span::styled(
            format!(" {} ", mode),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
    ];

    for &(key, description) in keybindings {
        spans.push(Span::raw(SEPARATOR));
        spans.push(Span::styled(
            format!(" {} ", key),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
        spans.push(Span::styled(
            format!(" {}", description),
            Style::default().fg(Color::White),
        ));
    }
    spans
}

pub fn render_status_toast(frame: &mut Frame, area: Rect, message: &str) {
    let toast = Paragraph::new(Line::from(vec![Span::styled(
        format!(" {} ", message),
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )]))
    .alignment(Alignment::Right);

    frame.render_widget(toast, area);
}

/// Area inside a one-cell border
pub fn inner(area: Rect) -> Rect {
    Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_fits_short_content() {
        let characters: Vec<char> = "abc".chars().collect();
        assert_eq!(visible_window(&characters, 3, 10), (0, 3));
    }

    #[test]
    fn test_window_follows_cursor_at_end() {
        let characters: Vec<char> = "abcdefghij".chars().collect();
        assert_eq!(visible_window(&characters, 10, 4), (6, 10));
    }

    #[test]
    fn test_window_counts_wide_characters() {
        let characters: Vec<char> = "지하철종결자".chars().collect();
        let (start, end) = visible_window(&characters, 6, 5);
        assert_eq!((start, end), (4, 6));
        let (start, end) = visible_window(&characters, 0, 5);
        assert_eq!((start, end), (0, 2));
    }
}
