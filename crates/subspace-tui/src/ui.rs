use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
};
use subspace_core::{Action, InputField, Notice, NoticeKind, PendingCommand, PrimaryAction};
use crate::app::{App, InputMode};

/// Colors for one theme.
struct Palette {
    bg: Color,
    fg: Color,
    muted: Color,
    accent: Color,
    border: Color,
    log_fg: Color,
}

impl Palette {
    fn for_mode(dark: bool) -> Self {
        if dark {
            Self {
                bg: Color::Reset,
                fg: Color::White,
                muted: Color::DarkGray,
                accent: Color::Cyan,
                border: Color::DarkGray,
                log_fg: Color::Green,
            }
        } else {
            Self {
                bg: Color::White,
                fg: Color::Black,
                muted: Color::Gray,
                accent: Color::Blue,
                border: Color::Gray,
                log_fg: Color::Rgb(0, 110, 40),
            }
        }
    }
}

const QUERY_PLACEHOLDER: &str = "Ex: 'Software Engineer', 'Recruiter', 'Founder'...";
const LOGS_PLACEHOLDER: &str = "Waiting for process...";
const TABLE_PLACEHOLDER: &str = "No data found yet. Start an automation to begin scraping.";

pub fn render(app: &mut App, frame: &mut Frame) {
    let palette = Palette::for_mode(app.dark_mode);
    let area = frame.area();

    frame.render_widget(
        Block::default().style(Style::default().bg(palette.bg).fg(palette.fg)),
        area,
    );

    let control_height = if app.dashboard.show_credentials() { 8 } else { 5 };

    // Main layout: header, stats, controls, body, footer
    let [header_area, stats_area, control_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(control_height),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_stats(app, frame, stats_area, &palette);
    render_controls(app, frame, control_area, &palette);

    let [logs_area, table_area] = Layout::horizontal([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(2, 3),
    ])
    .areas(body_area);

    app.logs_area = Some(logs_area);
    app.table_area = Some(table_area);

    render_logs(app, frame, logs_area, &palette);
    render_activities(app, frame, table_area, &palette);
    render_footer(app, frame, footer_area);

    if let Some(notice) = app.dashboard.notice() {
        render_notice(notice, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let badge = if app.dashboard.is_running() {
        Span::styled(" ● RUNNING ", Style::default().bg(Color::Green).fg(Color::Black).bold())
    } else {
        Span::styled(" ○ IDLE ", Style::default().bg(Color::Gray).fg(Color::Black))
    };

    let title = Line::from(vec![
        Span::styled(" SubSpace ", Style::default().fg(Color::White).bold()),
        Span::styled("Automator ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{} • {} ", env!("CARGO_PKG_VERSION"), app.api_url()),
            Style::default().fg(Color::Gray),
        ),
        badge,
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_stats(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let summary = app.dashboard.summary();
    let cards = [
        ("Profiles Scraped", summary.profiles_found, Color::Blue),
        ("Requests Sent", summary.requests_sent, Color::Green),
        ("Messages", summary.messages_sent, Color::Magenta),
    ];

    let areas = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(area);

    for ((title, value, color), card_area) in cards.into_iter().zip(areas.iter()) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border))
            .title(Span::styled(format!(" {} ", title), Style::default().fg(color)));

        let card = Paragraph::new(Span::styled(
            value.to_string(),
            Style::default().fg(palette.fg).add_modifier(Modifier::BOLD),
        ))
        .block(block);

        frame.render_widget(card, *card_area);
    }
}

fn render_controls(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .title(Span::styled(" Target Configuration ", Style::default().fg(palette.accent).bold()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let search_row = if app.dashboard.show_credentials() {
        let [creds_row, search_row] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .areas(inner);

        let [email_area, password_area] = Layout::horizontal([
            Constraint::Percentage(50),
            Constraint::Percentage(50),
        ])
        .areas(creds_row);

        let creds = app.dashboard.credentials();
        render_input(app, frame, email_area, palette, InputField::Email, &creds.email, "LinkedIn Email");
        let masked = "•".repeat(creds.password.chars().count());
        render_input(app, frame, password_area, palette, InputField::Password, &masked, "LinkedIn Password");
        search_row
    } else {
        inner
    };

    let [input_area, button_area] = Layout::horizontal([
        Constraint::Min(10),
        Constraint::Length(24),
    ])
    .areas(search_row);

    render_input(app, frame, input_area, palette, InputField::Query, app.dashboard.query(), QUERY_PLACEHOLDER);
    render_button(app, frame, button_area);
}

fn render_input(
    app: &App,
    frame: &mut Frame,
    area: Rect,
    palette: &Palette,
    field: InputField,
    value: &str,
    placeholder: &str,
) {
    let editing = app.input_mode == InputMode::Editing && app.focus == field;
    let locked = field == InputField::Query && app.dashboard.input_locked();

    let title = match field {
        InputField::Query if app.dashboard.show_credentials() => " Search (c: Use Default .env) ".to_string(),
        InputField::Query => " Search (c: Set Custom Credentials) ".to_string(),
        other => format!(" {} ", other.label()),
    };

    let border_color = if editing {
        Color::Yellow
    } else {
        palette.border
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let text = if value.is_empty() && !editing {
        Span::styled(placeholder.to_string(), Style::default().fg(palette.muted))
    } else if locked {
        Span::styled(value.to_string(), Style::default().fg(palette.muted).add_modifier(Modifier::DIM))
    } else {
        Span::styled(value.to_string(), Style::default().fg(palette.accent))
    };

    frame.render_widget(Paragraph::new(text).block(block), area);

    // Show cursor when editing
    if editing {
        let offset = (value.chars().count() as u16).min(area.width.saturating_sub(3));
        frame.set_cursor_position((area.x + offset + 1, area.y + 1));
    }
}

fn render_button(app: &App, frame: &mut Frame, area: Rect) {
    let dots = ".".repeat(app.animation_frame as usize + 1);
    let (label, bg) = match (app.dashboard.pending_command(), app.dashboard.primary_action()) {
        (Some(PendingCommand::Start), _) => (format!("Starting{}", dots), Color::DarkGray),
        (Some(PendingCommand::Stop), _) => (format!("Stopping{}", dots), Color::DarkGray),
        (None, PrimaryAction::Start) => (format!("▶ {}", PrimaryAction::Start.label()), Color::Blue),
        (None, PrimaryAction::Stop) => (format!("■ {}", PrimaryAction::Stop.label()), Color::Red),
    };

    let button = Paragraph::new(Span::styled(label, Style::default().fg(Color::White).bold()))
        .alignment(Alignment::Center)
        .style(Style::default().bg(bg))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(bg)));

    frame.render_widget(button, area);
}

fn render_logs(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .title(Span::styled(" System Logs ", Style::default().fg(Color::Green).bold()));

    let lines = app.dashboard.log_lines(app.config.log_order);

    if lines.is_empty() {
        let inner_height = area.height.saturating_sub(2);
        let mut text: Vec<Line> = vec![Line::default(); (inner_height / 2) as usize];
        text.push(Line::from(Span::styled(LOGS_PLACEHOLDER, Style::default().fg(palette.muted))));

        let placeholder = Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let text: Vec<Line> = lines
        .into_iter()
        .map(|line| {
            let mut spans = Vec::with_capacity(2);
            if let Some(prefix) = line.prefix {
                spans.push(Span::styled(format!("{} ", prefix), Style::default().fg(palette.muted)));
            }
            spans.push(Span::styled(line.message, Style::default().fg(palette.log_fg)));
            Line::from(spans)
        })
        .collect();

    let logs = Paragraph::new(Text::from(text))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.log_scroll, 0));

    frame.render_widget(logs, area);
}

fn badge_style(action: &Action) -> Style {
    let color = match action {
        Action::SearchFound => Color::Blue,
        Action::Connect => Color::Green,
        Action::Message => Color::Magenta,
        Action::Other(_) => Color::Gray,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn render_activities(app: &mut App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let records = app.dashboard.activities();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .title(Line::from(vec![
            Span::styled(
                format!(" Scraped Data ({}) ", records.len()),
                Style::default().fg(Color::Magenta).bold(),
            ),
            Span::styled("Live Feed ", Style::default().fg(palette.muted)),
        ]));

    if records.is_empty() {
        let placeholder = Paragraph::new(vec![
            Line::default(),
            Line::from(Span::styled(TABLE_PLACEHOLDER, Style::default().fg(palette.muted))),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let header = Row::new(vec!["Status", "Candidate Profile", "Timestamp"])
        .style(Style::default().fg(palette.muted).add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    let rows: Vec<Row> = records
        .iter()
        .map(|record| {
            let profile = Text::from(vec![
                Line::from(Span::styled(record.metadata.clone(), Style::default().fg(palette.fg))),
                Line::from(Span::styled(record.profile_url.clone(), Style::default().fg(palette.accent))),
            ]);
            Row::new(vec![
                Cell::from(Span::styled(record.action.badge().to_string(), badge_style(&record.action))),
                Cell::from(profile),
                Cell::from(Span::styled(record.local_time(), Style::default().fg(palette.muted))),
            ])
            .height(2)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Min(20),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(block)
    .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
    .highlight_symbol("> ");

    frame.render_stateful_widget(table, area, &mut app.activity_state);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " EDITING ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match app.input_mode {
        InputMode::Normal => {
            let mut hints = Vec::new();
            if !app.dashboard.input_locked() {
                hints.extend(vec![
                    Span::styled(" i ", key_style),
                    Span::styled(" search ", label_style),
                ]);
            }
            if app.dashboard.show_credentials() {
                hints.extend(vec![
                    Span::styled(" e/p ", key_style),
                    Span::styled(" email/password ", label_style),
                ]);
            }
            let action = match app.dashboard.primary_action() {
                PrimaryAction::Start => " start ",
                PrimaryAction::Stop => " stop ",
            };
            hints.extend(vec![
                Span::styled(" Enter ", key_style),
                Span::styled(action, label_style),
                Span::styled(" c ", key_style),
                Span::styled(" credentials ", label_style),
                Span::styled(" j/k ", key_style),
                Span::styled(" rows ", label_style),
                Span::styled(" J/K ", key_style),
                Span::styled(" logs ", label_style),
                Span::styled(" r ", key_style),
                Span::styled(" refresh ", label_style),
                Span::styled(" t ", key_style),
                Span::styled(" theme ", label_style),
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ]);
            hints
        }
        InputMode::Editing => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" start ", label_style),
            Span::styled(" Tab ", key_style),
            Span::styled(" next field ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" stop typing ", label_style),
        ],
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_notice(notice: &Notice, frame: &mut Frame, area: Rect) {
    // Calculate popup size and position (centered)
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = 6.min(area.height);

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let (title, color) = match notice.kind {
        NoticeKind::Warning => (" Warning ", Color::Yellow),
        NoticeKind::Error => (" Error ", Color::Red),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(title, Style::default().fg(color).bold()));

    let text = vec![
        Line::from(notice.message.as_str()),
        Line::default(),
        Line::from(Span::styled("Press any key to continue", Style::default().fg(Color::DarkGray))),
    ];

    let popup = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);

    frame.render_widget(popup, popup_area);
}
