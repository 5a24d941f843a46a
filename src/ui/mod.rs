mod components;

use std::sync::OnceLock;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::app::{App, Popup, Section};
use crate::governance::ProposalState;
use crate::theme::Theme;

// Theme is installed once at startup; falls back to defaults
static THEME: OnceLock<Theme> = OnceLock::new();

pub fn install_theme(theme: Theme) {
    if THEME.set(theme).is_err() {
        tracing::debug!("theme already installed");
    }
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

// Helper functions to get theme colors
fn accent() -> Color { theme().accent }
fn primary() -> Color { theme().primary }
fn inactive() -> Color { theme().inactive }
fn success() -> Color { theme().success }
fn warning() -> Color { theme().warning }
fn danger() -> Color { theme().danger }
fn text() -> Color { theme().text }
fn text_secondary() -> Color { theme().text_secondary }
fn disabled() -> Color { theme().disabled }
fn paper() -> Color { theme().paper }
fn bg_selected() -> Color { theme().bg_selected }
fn header() -> Color { theme().header }

/// Below this width captions drop their label
const NARROW_WIDTH: u16 = 70;

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1),       // Info line
            Constraint::Ratio(2, 5),     // Proposals box
            Constraint::Ratio(3, 5),     // Migration box
            Constraint::Length(1),       // Footer
        ])
        .split(area);

    draw_info_line(f, app, chunks[0]);
    draw_proposals_box(f, app, chunks[1]);
    draw_migration_box(f, app, chunks[2]);
    draw_footer(f, app, chunks[3]);

    if app.popup == Popup::Help {
        draw_help_popup(f);
    }
}

fn section_block(title: String, is_active: bool) -> Block<'static> {
    let border_color = if is_active { accent() } else { inactive() };
    let title_style = if is_active {
        Style::default().fg(accent()).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(inactive())
    };

    Block::default()
        .title(Span::styled(title, title_style))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(ref status) = app.status_message {
        Line::from(vec![Span::styled(status.as_str(), Style::default().fg(warning()))])
    } else {
        let clock = app.dates.date(app.now());
        Line::from(vec![
            Span::styled("󰥔 ", Style::default().fg(text_secondary())),
            Span::styled(clock, Style::default().fg(text())),
            Span::styled(
                format!(" │ refreshes every {}s", app.clock.interval().as_secs()),
                Style::default().fg(text_secondary()),
            ),
        ])
    };

    let info = Paragraph::new(line).alignment(Alignment::Center);
    f.render_widget(info, area);
}

fn state_color(state: ProposalState) -> Color {
    match state {
        ProposalState::Active => success(),
        ProposalState::Pending | ProposalState::Queued => warning(),
        ProposalState::Executed | ProposalState::Succeeded => accent(),
        ProposalState::Failed | ProposalState::Canceled | ProposalState::Expired => danger(),
        ProposalState::Unknown => text_secondary(),
    }
}

fn draw_proposals_box(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.section == Section::Proposals;
    let block = section_block(" Proposals ".to_string(), is_active);

    let show_label = area.width >= NARROW_WIDTH;

    let header = Row::new(vec![
        Span::styled("#", Style::default().fg(header())),
        Span::styled("Title", Style::default().fg(header())),
        Span::styled("State", Style::default().fg(header())),
        Span::styled("When", Style::default().fg(header())),
    ]);

    let rows: Vec<Row> = if app.snapshot.proposals.is_empty() {
        vec![Row::new(vec![
            Span::raw(""),
            Span::styled("No proposals", Style::default().fg(text_secondary())),
        ])]
    } else {
        app.snapshot
            .proposals
            .iter()
            .zip(app.proposal_captions())
            .enumerate()
            .map(|(i, (proposal, caption))| {
                let row_style = if i == app.selected_proposal && is_active {
                    Style::default().bg(bg_selected()).fg(text())
                } else {
                    Style::default()
                };

                Row::new(vec![
                    Line::from(Span::styled(proposal.id.to_string(), Style::default().fg(text_secondary()))),
                    Line::from(Span::styled(proposal.title.clone(), Style::default().fg(text()))),
                    Line::from(Span::styled(
                        proposal.timing.state.as_str(),
                        Style::default().fg(state_color(proposal.timing.state)),
                    )),
                    Line::from(components::caption_spans(&caption, show_label)),
                ])
                .style(row_style)
            })
            .collect()
    };

    let widths = [
        Constraint::Length(5),
        Constraint::Percentage(45),
        Constraint::Length(10),
        Constraint::Percentage(40),
    ];

    let table = Table::new(rows, widths)
        .header(header.style(Style::default()))
        .block(block);

    // Scrolls the table so the selected proposal stays in view
    let mut state = TableState::default();
    if !app.snapshot.proposals.is_empty() {
        state = state.with_selected(Some(app.selected_proposal));
    }
    f.render_stateful_widget(table, area, &mut state);
}

fn draw_migration_box(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.section == Section::Migration;
    let title = format!(
        " Migrate to v3 ({}/{} selected) ",
        app.selected_count(),
        app.snapshot.migration.len()
    );
    let block = section_block(title, is_active);

    if app.snapshot.migration.is_empty() {
        let empty = Paragraph::new("No positions to migrate")
            .style(Style::default().fg(text_secondary()))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let rows = app.migration_rows();
    let rendered: Vec<Vec<Line>> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let selected = is_active && i == app.selected_position;
            components::migration_row_lines(row, selected, app.show_usd)
        })
        .collect();

    // Scroll so the whole selected entry is visible
    let inner_height = area.height.saturating_sub(2) as usize;
    let mut start = 0;
    let selected_end: usize = rendered
        .iter()
        .take(app.selected_position + 1)
        .map(|r| r.len() + 1)
        .sum();
    while start < app.selected_position
        && selected_end - rendered.iter().take(start).map(|r| r.len() + 1).sum::<usize>() > inner_height
    {
        start += 1;
    }

    let mut lines: Vec<Line> = Vec::new();
    for entry in rendered.into_iter().skip(start) {
        lines.extend(entry);
        lines.push(Line::from(""));
    }

    let content = Paragraph::new(lines).block(block);
    f.render_widget(content, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let hints: Vec<(&str, &str)> = match app.section {
        Section::Proposals => vec![
            ("↑↓", "Nav"),
            ("Tab", "Migration"),
            ("R", "Reload"),
            ("h", "Help"),
            ("q", "Quit"),
        ],
        Section::Migration => vec![
            ("↑↓", "Nav"),
            ("Space", "Select"),
            ("c", "Collateral"),
            ("Tab", "Proposals"),
            ("R", "Reload"),
            ("h", "Help"),
        ],
    };

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 60 { 4 } else { hints.len() };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(accent())),
                Span::styled(format!(" {} │ ", action), Style::default().fg(text_secondary())),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center);

    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 90 } else { 60 },
        if area.height < 30 { 90 } else { 70 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let heading = |s: &'static str| {
        Line::from(Span::styled(s, Style::default().fg(header()).add_modifier(Modifier::BOLD)))
    };
    let entry = |key: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(key, Style::default().fg(accent())),
            Span::raw(what),
        ])
    };

    let help_text = vec![
        heading("═══ Navigation ═══"),
        entry("  Tab       ", "Switch between proposals and migration"),
        entry("  j/k ↑↓    ", "Move selection"),
        entry("  R         ", "Reload snapshot"),
        entry("  q         ", "Quit"),
        Line::from(""),
        heading("═══ Migration ═══"),
        entry("  Space     ", "Select / deselect position"),
        entry("  c         ", "Use position as collateral on v3"),
        Line::from(vec![Span::styled(
            "            Disabled positions cannot be selected",
            Style::default().fg(text_secondary()),
        )]),
        Line::from(""),
        heading("═══ Proposal times ═══"),
        Line::from(vec![Span::raw("  Times are sampled every refresh interval, not live.")]),
        Line::from(vec![Span::raw("  Cross-chain payloads execute 48h after the proposal.")]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(text_secondary())),
            Span::styled("h", Style::default().fg(accent())),
            Span::styled("/", Style::default().fg(text_secondary())),
            Span::styled("?", Style::default().fg(accent())),
            Span::styled("/", Style::default().fg(text_secondary())),
            Span::styled("Esc", Style::default().fg(accent())),
            Span::styled(" to close", Style::default().fg(text_secondary())),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" 󰋖 govboard Help ", Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
