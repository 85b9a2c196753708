use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::components;
use super::wrap::{display_width, wrap_text};

use crate::app::App;
use crate::scope::ServiceScope;
use crate::session::{Turn, TurnRole};

pub const APP_TITLE: &str = "도플소프트 블로그 챗봇";

/// Primary chat view with header, transcript, input, and footer
pub fn render_chat_view(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header
            Constraint::Min(0),    // Transcript
            Constraint::Length(3), // Input
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    if let [header, history, input, footer] = &chunks[..] {
        render_chat_header(f, app, *header);
        render_transcript(f, app, *history);
        render_chat_input(f, app, *input);
        render_chat_footer(f, app, *footer);
    }
}

fn app_caption() -> String {
    ServiceScope::APPS
        .iter()
        .filter_map(|scope| scope.app_name())
        .collect::<Vec<_>>()
        .join(" · ")
}

fn render_chat_header(f: &mut Frame, app: &App, area: Rect) {
    let border_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    f.render_widget(border_block, area);

    let inner = components::inner(area);
    let status = format!("✅ Vector Store 연결됨 · {} ", app.backend.model());
    let status_width = u16::try_from(display_width(&status)).unwrap_or(u16::MAX);

    let left_area = Rect {
        width: inner.width.saturating_sub(status_width),
        ..inner
    };
    let right_area = Rect {
        x: inner.x + inner.width.saturating_sub(status_width),
        width: status_width.min(inner.width),
        ..inner
    };

    let title = Line::from(vec![
        Span::raw(" 🤖 "),
        Span::styled(
            APP_TITLE,
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    let caption = Line::from(Span::styled(
        format!(" {}", app_caption()),
        Style::default().fg(Color::Cyan),
    ));

    f.render_widget(Paragraph::new(vec![title, caption]), left_area);
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            status,
            Style::default().fg(Color::Green),
        )))
        .alignment(Alignment::Right),
        right_area,
    );
}

/// Usage guide shown while the transcript is empty
fn add_usage_guide(lines: &mut Vec<Line<'static>>) {
    let muted = Style::default().fg(Color::DarkGray);
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("  💡 사용 방법:", Style::default().fg(Color::Cyan))));
    lines.push(Line::from(""));
    for scope in ServiceScope::APPS {
        let command = scope.command().unwrap_or_default();
        lines.push(Line::from(vec![
            Span::raw("    "),
            Span::styled(format!(" {} ", command), Style::default().fg(Color::Black).bg(Color::Yellow)),
            Span::styled(format!("  {} {}", scope.icon(), scope.description()), muted),
        ]));
    }
    lines.push(Line::from(vec![
        Span::raw("    "),
        Span::styled(
            format!("{} {}", ServiceScope::All.icon(), ServiceScope::All.description()),
            muted,
        ),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  예: /지하철 프리미엄 해지 방법",
        Style::default().fg(Color::Cyan),
    )));
}

fn turn_header(turn: &Turn) -> Option<Line<'static>> {
    let (indicator, name, color) = match turn.role {
        TurnRole::User => (">", "You", Color::Cyan),
        TurnRole::Assistant => ("<", "Assistant", Color::Magenta),
        TurnRole::Notice => return None,
    };
    Some(Line::from(vec![
        Span::styled(format!(" {} ", indicator), Style::default().fg(Color::DarkGray)),
        Span::styled(name, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("  {}", turn.timestamp),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
}

fn render_turn(turn: &Turn, max_width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let content_style = match turn.role {
        TurnRole::Notice => Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::ITALIC),
        TurnRole::User | TurnRole::Assistant => Style::default().fg(Color::White),
    };

    lines.extend(turn_header(turn));
    let body = if turn.role == TurnRole::User && turn.content.is_empty() {
        format!("{}(질문 없이 범위만 지정)", turn.display_text())
    } else {
        turn.display_text()
    };
    for content_line in wrap_text(&body, max_width, 1) {
        lines.push(Line::from(vec![
            Span::raw("   "),
            Span::styled(content_line, content_style),
        ]));
    }
    lines
}

fn add_loading_indicator(lines: &mut Vec<Line<'static>>, frame: u8) {
    let dots_frames = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];
    let dots = dots_frames
        .get(usize::from(frame) % dots_frames.len())
        .copied()
        .unwrap_or_default();
    lines.push(Line::from(vec![
        Span::styled(" < ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("답변 생성 중... {}", dots),
            Style::default().fg(Color::Magenta).add_modifier(Modifier::DIM),
        ),
    ]));
}

/// Scroll position from the top for a bottom-anchored offset
fn calculate_scroll_position(
    total_lines: usize,
    visible_height: usize,
    chat_scroll_offset: usize,
) -> (usize, usize) {
    let max_scroll_offset = total_lines.saturating_sub(visible_height);
    let actual_scroll_offset = chat_scroll_offset.min(max_scroll_offset);
    (max_scroll_offset - actual_scroll_offset, actual_scroll_offset)
}

fn render_transcript(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let content_width = usize::from(area.width.saturating_sub(2));
    let max_content_width = content_width.saturating_sub(6).max(1);

    let transcript = app.session.transcript();
    if transcript.is_empty() && !app.is_loading() {
        add_usage_guide(&mut lines);
    }

    for turn in transcript {
        lines.push(Line::from(""));
        lines.extend(render_turn(turn, max_content_width));
    }

    if app.is_loading() {
        lines.push(Line::from(""));
        add_loading_indicator(&mut lines, app.loading_frame);
    }
    lines.push(Line::from(""));

    let visible_height = usize::from(area.height.saturating_sub(2));
    let (scroll_from_top, actual_scroll_offset) =
        calculate_scroll_position(lines.len(), visible_height, app.chat_scroll_offset);
    app.chat_scroll_limit.set(lines.len().saturating_sub(visible_height));

    let mut title_spans = vec![Span::styled(" 대화 ", Style::default().fg(Color::White))];
    if actual_scroll_offset > 0 {
        title_spans.push(Span::styled(
            format!("[+{} lines] ", actual_scroll_offset),
            Style::default().fg(Color::Yellow),
        ));
    }

    let content = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Line::from(title_spans))
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .scroll((u16::try_from(scroll_from_top).unwrap_or(u16::MAX), 0));

    frame.render_widget(content, area);
}

fn render_chat_input(frame: &mut Frame, app: &App, area: Rect) {
    let placeholder = if app.is_loading() {
        "답변을 기다리는 중..."
    } else {
        "질문을 입력하세요. 예: /지하철 프리미엄 해지 방법"
    };

    let config = components::TextInputConfig::new(app.chat_input.content(), " 질문 ")
        .with_placeholder(placeholder)
        .with_cursor_visible(!app.is_loading())
        .with_cursor_position(app.chat_input.cursor_position());

    components::render_text_input(frame, area, config);
}

fn render_chat_footer(f: &mut Frame, app: &App, area: Rect) {
    let keybindings = [("Enter", "전송"), ("^N", "새 대화"), ("^Y", "답변 복사"), ("F1", "도움말"), ("^C", "종료")];

    let border_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    f.render_widget(border_block, area);
    let inner = components::inner(area);

    let toast_message = app.status_toast_message();
    let toast_width = toast_message
        .map(|message| u16::try_from(display_width(message) + 4).unwrap_or(u16::MAX))
        .unwrap_or(0)
        .min(inner.width);

    let left_area = Rect {
        width: inner.width.saturating_sub(toast_width),
        ..inner
    };
    f.render_widget(
        Paragraph::new(Line::from(components::footer_spans("CHAT", &keybindings))),
        left_area,
    );

    if let Some(message) = toast_message {
        let toast_area = Rect {
            x: inner.x + inner.width.saturating_sub(toast_width),
            width: toast_width,
            ..inner
        };
        components::render_status_toast(f, toast_area, message);
    }
}
