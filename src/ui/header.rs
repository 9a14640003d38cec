//! Header Component
//!
//! Displays the API root, load state and page tabs.

use crate::app::{App, Page};
use labsite::context::LoadState;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" labsite v{} ", app.version()),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    // Row 1: API and load state
    let state = app.state();
    let (status, status_color) = match &state {
        LoadState::Idle | LoadState::Loading => ("Loading".to_string(), Color::Yellow),
        LoadState::Ready(snapshot) if snapshot.failures.is_empty() => {
            ("Ready".to_string(), Color::Green)
        }
        LoadState::Ready(snapshot) => (
            format!("Ready ({} unavailable)", snapshot.failures.len()),
            Color::Yellow,
        ),
        LoadState::Failed(_) => ("Error".to_string(), Color::Red),
    };
    let api_line = Line::from(vec![
        Span::styled(" API: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            app.api_url.as_str(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("Status: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            status,
            Style::default()
                .fg(status_color)
                .add_modifier(Modifier::BOLD),
        ),
    ]);
    f.render_widget(Paragraph::new(api_line), rows[0]);

    // Row 2: Page tabs
    let mut tabs = vec![Span::raw(" ")];
    for (i, page) in Page::ALL.iter().enumerate() {
        let style = if *page == app.page {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        tabs.push(Span::styled(format!(" {}:{} ", i + 1, page.title()), style));
        tabs.push(Span::raw(" "));
    }
    f.render_widget(Paragraph::new(Line::from(tabs)), rows[1]);

    // Row 3: Help hint
    let hint = if app.page == Page::Publications {
        " ?:help  /:filter  y:year  t:type  x:clear  Tab:page  q:quit"
    } else {
        " ?:help  /:filter  Tab:page  1-5:jump  q:quit"
    };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            hint,
            Style::default().fg(Color::DarkGray),
        ))),
        rows[2],
    );
}
