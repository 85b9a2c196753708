use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::chat::APP_TITLE;
use super::components;
use crate::scope::ServiceScope;

pub fn render_help_view(f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Body
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    if let [header, body, footer] = &chunks[..] {
        render_help_header(f, *header);
        render_help_body(f, *body);
        render_help_footer(f, *footer);
    }
}

fn render_help_header(f: &mut Frame, area: Rect) {
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw(" "),
            Span::styled(
                APP_TITLE,
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  도움말", Style::default().fg(Color::Cyan)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        ),
        area,
    );
}

fn section(title: &'static str) -> [Line<'static>; 2] {
    [
        Line::from(""),
        Line::from(Span::styled(format!("  {}", title), Style::default().fg(Color::Cyan))),
    ]
}

fn entry(key: String, description: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), Style::default().fg(Color::Yellow)),
        Span::styled(description, Style::default().fg(Color::White)),
    ])
}

fn render_help_body(f: &mut Frame, area: Rect) {
    let mut lines = Vec::new();

    lines.extend(section("검색 범위 명령어"));
    for scope in ServiceScope::APPS {
        lines.push(entry(
            scope.command().unwrap_or_default().to_string(),
            format!("{} {}", scope.icon(), scope.description()),
        ));
    }
    lines.push(entry(
        "(없음)".to_string(),
        format!("{} {}", ServiceScope::All.icon(), ServiceScope::All.description()),
    ));

    lines.extend(section("단축키"));
    for (key, description) in [
        ("Enter", "질문 전송"),
        ("Ctrl+N", "새 대화 시작 (이전 맥락 삭제)"),
        ("Ctrl+Y", "마지막 답변 복사"),
        ("↑ ↓", "대화 스크롤"),
        ("PgUp PgDn", "한 페이지 스크롤"),
        ("Home End", "커서 이동 (입력창이 비어 있으면 처음/끝으로 스크롤)"),
        ("F1", "도움말 열기/닫기"),
        ("Ctrl+C", "종료"),
    ] {
        lines.push(entry(key.to_string(), description.to_string()));
    }

    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        ),
        area,
    );
}

fn render_help_footer(f: &mut Frame, area: Rect) {
    f.render_widget(
        Paragraph::new(Line::from(components::footer_spans(
            "HELP",
            &[("Esc", "돌아가기"), ("q", "돌아가기")],
        )))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        ),
        area,
    );
}
