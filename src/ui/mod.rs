//! Terminal User Interface rendering module
//!
//! Renders the lab pages with ratatui: a header with page tabs, a table of
//! entries for the current page with a detail pane for the selection, and
//! a one-line status footer.
//!
//! - [`splash`] - Loading screen while the context is fetching
//! - `header` - API root, load state and page tabs
//! - `help` - Help overlay showing keybindings

mod header;
mod help;
pub mod splash;

use crate::app::{App, Entry, Mode, Page};
use labsite::context::{LabSnapshot, LoadState};
use labsite::views::PublicationType;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState,
        Table, TableState, Wrap,
    },
    Frame,
};
use splash::SplashState;

pub fn render(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Header
            Constraint::Min(1),    // Page content
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    header::render(f, app, chunks[0]);

    let state = app.state();
    match &state {
        LoadState::Idle | LoadState::Loading => {
            let splash = SplashState {
                api_url: &app.api_url,
                tick: app.tick,
            };
            splash::render(f, chunks[1], &splash);
        }
        LoadState::Failed(error) => render_error(f, &error.to_string(), chunks[1]),
        LoadState::Ready(snapshot) => render_page(f, app, snapshot, chunks[1]),
    }

    render_footer(f, app, &state, chunks[2]);

    if app.mode == Mode::Help {
        help::render(f);
    }
}

fn render_error(f: &mut Frame, message: &str, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Error",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("There was an error loading the lab data. Please try again later."),
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::DarkGray))),
    ];
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );
    f.render_widget(paragraph, area);
}

fn render_page(f: &mut Frame, app: &mut App, snapshot: &LabSnapshot, area: Rect) {
    let show_filter = app.filter_active || !app.filter_text.is_empty();
    let show_pub_filter = app.page == Page::Publications;

    let mut constraints = Vec::new();
    if show_filter {
        constraints.push(Constraint::Length(1));
    }
    if show_pub_filter {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Min(1));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let mut next = 0;
    if show_filter {
        render_filter_bar(f, app, chunks[next]);
        next += 1;
    }
    if show_pub_filter {
        render_publication_filter(f, app, chunks[next]);
        next += 1;
    }

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[next]);

    let entries = app.visible_entries();
    if app.selected >= entries.len() {
        app.selected = entries.len().saturating_sub(1);
    }

    render_table(f, app, snapshot, &entries, body[0]);
    render_detail(f, entries.get(app.selected), body[1]);
}

fn render_filter_bar(f: &mut Frame, app: &App, area: Rect) {
    let cursor_style = if app.filter_active {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let filter_display = if app.filter_active {
        format!("/{}_", app.filter_text)
    } else {
        format!("/{}", app.filter_text)
    };

    f.render_widget(
        Paragraph::new(Line::from(vec![Span::styled(filter_display, cursor_style)])),
        area,
    );
}

fn render_publication_filter(f: &mut Frame, app: &App, area: Rect) {
    let filter = &app.publication_filter;
    let year = filter
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "All years".to_string());
    let kind = filter
        .kind
        .map(PublicationType::label)
        .unwrap_or("All types");

    let line = Line::from(vec![
        Span::styled(" Year: ", Style::default().fg(Color::DarkGray)),
        Span::styled(year, Style::default().fg(Color::Green)),
        Span::styled("  Type: ", Style::default().fg(Color::DarkGray)),
        Span::styled(kind, Style::default().fg(Color::Green)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_table(f: &mut Frame, app: &App, snapshot: &LabSnapshot, entries: &[Entry], area: Rect) {
    let title = if app.filter_text.is_empty() {
        format!(" {}[{}] ", app.page.title(), entries.len())
    } else {
        let total = crate::app::page_entries(app.page, snapshot, &app.publication_filter).len();
        format!(" {}[{}/{}] ", app.page.title(), entries.len(), total)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    f.render_widget(block, area);

    if entries.is_empty() {
        let message = if app.filter_text.is_empty() {
            empty_message(app.page)
        } else {
            "No entries match your filter."
        };
        f.render_widget(
            Paragraph::new(message)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let header = Row::new(
        ["Section", "Title", ""]
            .into_iter()
            .map(|h| {
                Cell::from(format!(" {}", h)).style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
            })
            .collect::<Vec<_>>(),
    )
    .height(1);

    let rows: Vec<Row> = entries
        .iter()
        .map(|entry| {
            Row::new(vec![
                Cell::from(format!(" {}", truncate_string(&entry.section, 24)))
                    .style(Style::default().fg(Color::Cyan)),
                Cell::from(format!(" {}", truncate_string(&entry.title, 48))),
                Cell::from(format!(" {}", truncate_string(&entry.subtitle, 32)))
                    .style(Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Percentage(25),
        Constraint::Percentage(45),
        Constraint::Percentage(30),
    ];

    let visible_height = (inner.height as usize).saturating_sub(1);
    let needs_scrollbar = entries.len() > visible_height;
    let table_area = if needs_scrollbar {
        Rect {
            width: inner.width.saturating_sub(1),
            ..inner
        }
    } else {
        inner
    };

    let table = Table::new(rows, widths).header(header).row_highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let mut state = TableState::default().with_selected(Some(app.selected));
    f.render_stateful_widget(table, table_area, &mut state);

    if needs_scrollbar {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .symbols(symbols::scrollbar::VERTICAL)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));

        let mut scrollbar_state = ScrollbarState::new(entries.len()).position(app.selected);
        f.render_stateful_widget(scrollbar, inner, &mut scrollbar_state);
    }
}

fn empty_message(page: Page) -> &'static str {
    match page {
        Page::Home => "No lab content found.",
        Page::Members => "No team members found.",
        Page::Projects => "No projects found.",
        Page::Publications => "No publications match your filter criteria.",
        Page::Network => "No grants, awards or partners found.",
    }
}

fn render_detail(f: &mut Frame, entry: Option<&Entry>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(" Details ", Style::default().fg(Color::Cyan)));

    let Some(entry) = entry else {
        f.render_widget(block, area);
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            entry.title.as_str(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            entry.subtitle.as_str(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];
    lines.extend(entry.detail.iter().map(|l| Line::from(highlight_label(l))));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

/// Color the `Label:` prefix of a detail line
fn highlight_label(line: &str) -> Vec<Span<'_>> {
    match line.split_once(": ") {
        Some((label, value)) if !label.is_empty() && label.len() <= 24 => vec![
            Span::styled(format!("{}: ", label), Style::default().fg(Color::Cyan)),
            Span::raw(value),
        ],
        _ => vec![Span::raw(line)],
    }
}

fn render_footer(f: &mut Frame, app: &App, state: &LoadState, area: Rect) {
    let line = match state {
        LoadState::Ready(snapshot) if !snapshot.failures.is_empty() => {
            let failed: Vec<String> = snapshot
                .failures
                .iter()
                .map(|failure| format!("{} ({})", failure.resource.display_name(), failure.message))
                .collect();
            Line::from(Span::styled(
                format!(" Unavailable: {}", failed.join("; ")),
                Style::default().fg(Color::Yellow),
            ))
        }
        _ => Line::from(Span::styled(
            format!(" {} > {}", "labsite", app.page.title()),
            Style::default().fg(Color::DarkGray),
        )),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}
