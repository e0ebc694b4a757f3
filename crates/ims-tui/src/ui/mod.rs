use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState,
    Wrap,
};
use ratatui::Frame;

use ims_core::table::{TableBody, TableView};
use ims_core::{Field, FormMode, FormPhase};

use crate::app::{App, FormButton, FormState, Mode};

const COLUMN_WIDTHS: [Constraint; 6] = [
    Constraint::Percentage(26),
    Constraint::Percentage(11),
    Constraint::Percentage(14),
    Constraint::Percentage(17),
    Constraint::Percentage(17),
    Constraint::Percentage(15),
];

pub fn draw(frame: &mut Frame<'_>, app: &App) {
    let size = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(4),
        ])
        .split(size);

    render_header(frame, chunks[0], app);
    render_table(frame, chunks[1], app);
    render_footer(frame, chunks[2], app);

    match &app.mode {
        Mode::Form(form) => render_form(frame, size, form),
        Mode::SitePicker(index) => render_site_picker(frame, size, app, *index),
        _ => {}
    }

    if app.show_help {
        render_help(frame, size);
    }
}

fn render_header(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let site = app
        .sites
        .active_site()
        .map(|site| site.name.as_str())
        .unwrap_or("(no site)");
    let mut spans = vec![
        Span::styled(site.to_string(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  filter: "),
    ];
    if matches!(app.mode, Mode::FilterEditing) {
        spans.push(Span::styled(
            format!("{}_", app.filter_input),
            Style::default().fg(Color::Yellow),
        ));
    } else if app.filter_input.trim().is_empty() {
        spans.push(Span::styled("(none)", Style::default().fg(Color::DarkGray)));
    } else {
        spans.push(Span::raw(app.filter_input.clone()));
    }
    if let Some(err) = &app.filter_error {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(err.clone(), Style::default().fg(Color::Red)));
    }

    let block = Block::default().borders(Borders::ALL).title("ims");
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_table(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let Some(query) = &app.query else {
        let paragraph = Paragraph::new("Loading sites...")
            .block(Block::default().borders(Borders::ALL).title("Interactions"))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    };

    let view = TableView::build(query, &app.list);
    let title = if view.loading {
        "Interactions (loading...)"
    } else {
        "Interactions"
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    let area = match &view.banner {
        Some(banner) => {
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Min(3)])
                .split(area);
            let line = Line::from(Span::styled(
                banner.clone(),
                Style::default().fg(Color::Red),
            ));
            frame.render_widget(Paragraph::new(line), parts[0]);
            parts[1]
        }
        None => area,
    };

    let message = match &view.body {
        TableBody::Empty(kind) => Some(format!(
            "{}. Press '{}' to {}.",
            kind.message(),
            if query.has_filters() { 'c' } else { 'a' },
            kind.action_hint().to_lowercase()
        )),
        TableBody::Failed(error) => Some(format!("Could not load interactions: {}", error)),
        TableBody::Skeleton(0) => Some(String::new()),
        TableBody::Skeleton(_) | TableBody::Rows(_) => None,
    };
    if let Some(message) = message {
        let paragraph = Paragraph::new(message)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(view.header.iter().map(|cell| {
        let style = if cell.indicator.is_some() {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        Cell::from(cell.label()).style(style)
    }));

    let rows: Vec<Row> = match &view.body {
        TableBody::Rows(rows) => rows
            .iter()
            .map(|row| Row::new(row.cells.iter().map(|text| Cell::from(text.clone()))))
            .collect(),
        TableBody::Skeleton(count) => (0..*count)
            .map(|_| {
                Row::new(COLUMN_WIDTHS.iter().map(|_| Cell::from("░░░░░░")))
                    .style(Style::default().fg(Color::DarkGray))
            })
            .collect(),
        _ => Vec::new(),
    };

    let mut state = TableState::default();
    if matches!(view.body, TableBody::Rows(_)) {
        state.select(Some(app.selected));
    }

    let table = Table::new(rows, COLUMN_WIDTHS)
        .header(header)
        .block(block)
        .row_highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("➤ ");
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_footer(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let hint = match &app.mode {
        Mode::Finder => "j/k move  enter edit  a add  d delete  / filter  c clear  1-6 sort  n/p page  +/- size  s site  r refresh  ? help",
        Mode::FilterEditing => "enter apply  esc cancel  ctrl+u clear",
        Mode::SitePicker(_) => "j/k move  enter switch  esc cancel",
        Mode::Form(form) => match form.controller.phase() {
            FormPhase::ConfirmingDelete => "y delete  n keep",
            FormPhase::LoadFailed => "r retry  esc back",
            _ => "tab next  shift+tab prev  ctrl+s save  ctrl+n save & new  ctrl+d delete  esc cancel",
        },
    };

    let mut left = vec![Line::from(Span::styled(
        hint,
        Style::default().fg(Color::DarkGray),
    ))];
    if let Some(status) = &app.status {
        left.push(Line::from(Span::styled(
            status.clone(),
            Style::default().fg(Color::Green),
        )));
    }
    if let Some(err) = &app.error {
        left.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let summary = app
        .query
        .as_ref()
        .map(|query| TableView::build(query, &app.list))
        .and_then(|view| view.pagination)
        .map(|pagination| pagination.summary())
        .unwrap_or_default();

    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let parts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(summary.chars().count() as u16)])
        .split(inner);
    frame.render_widget(Paragraph::new(left), parts[0]);
    frame.render_widget(
        Paragraph::new(summary).alignment(Alignment::Right),
        parts[1],
    );
}

fn render_form(frame: &mut Frame<'_>, area: Rect, form: &FormState) {
    let modal = centered_rect(70, 80, area);
    frame.render_widget(Clear, modal);

    let title = match form.controller.mode() {
        FormMode::Create => "New interaction".to_string(),
        FormMode::Edit(id) => format!("Edit interaction {}", id),
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    let controller = &form.controller;
    let mut lines = Vec::new();
    match controller.phase() {
        FormPhase::Loading => lines.push(Line::from("Loading...")),
        FormPhase::LoadFailed => {
            lines.push(error_line(controller.page_error().unwrap_or("Could not load")));
            lines.push(Line::from("Press r to retry."));
        }
        _ => {
            if let Some(message) = controller.page_error() {
                lines.push(error_line(message));
                lines.push(Line::from(""));
            }
            let draft = controller.draft();
            for (index, field) in Field::ALL.iter().enumerate() {
                let value = if *field == Field::Type && draft.kind.is_none() {
                    "(←/→ to choose)"
                } else {
                    draft.text(*field)
                };
                lines.push(field_line(field.label(), value, form.focus == index));
                if let Some(message) = controller.errors().get(*field) {
                    lines.push(error_line(&format!("  {}", message)));
                }
            }
            lines.push(Line::from(""));
            lines.push(button_line(form));
            match controller.phase() {
                FormPhase::Submitting(_) => lines.push(Line::from("Saving...")),
                FormPhase::Deleting => lines.push(Line::from("Deleting...")),
                FormPhase::ConfirmingDelete => lines.push(Line::from(Span::styled(
                    "Delete this interaction? (y/n)",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ))),
                _ => {}
            }
        }
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, modal);
}

fn button_line(form: &FormState) -> Line<'static> {
    let focused = form.focused_button();
    let mut spans = Vec::new();
    for button in form.buttons() {
        let (label, color, focus_bg) = match button {
            FormButton::Save => ("[Save]", Color::Green, Color::LightGreen),
            FormButton::SaveAndNew => ("[Save & New]", Color::Green, Color::LightGreen),
            FormButton::Cancel => ("[Cancel]", Color::Gray, Color::White),
            FormButton::Delete => ("[Delete]", Color::Red, Color::LightRed),
        };
        let style = if focused == Some(*button) {
            Style::default().fg(Color::Black).bg(focus_bg)
        } else {
            Style::default().fg(color)
        };
        if !spans.is_empty() {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(label, style));
    }
    Line::from(spans)
}

fn render_site_picker(frame: &mut Frame<'_>, area: Rect, app: &App, index: usize) {
    let modal = centered_rect(50, 50, area);
    frame.render_widget(Clear, modal);

    let active = app.sites.active_id();
    let items: Vec<ListItem> = app
        .sites
        .sites()
        .iter()
        .map(|site| {
            let marker = if Some(site.id) == active { "*" } else { " " };
            ListItem::new(Line::from(format!("{} {}", marker, site.name)))
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(index));
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Switch site"))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("➤ ");
    frame.render_stateful_widget(list, modal, &mut state);
}

fn render_help(frame: &mut Frame<'_>, area: Rect) {
    let modal = centered_rect(70, 70, area);
    frame.render_widget(Clear, modal);

    let text = vec![
        Line::from("Global: Ctrl+C quit, q quit (finder), ? help"),
        Line::from("Finder: j/k move, enter edit, a add, d delete, / filter, c clear filters, r refresh"),
        Line::from("Sort: 1 title, 2 type, 3 lead, 4 start, 5 end, 6 location (again to reverse)"),
        Line::from("Pages: n/p or ←/→ next/previous, +/- page size, s switch site"),
        Line::from("Form: tab/shift+tab move, ←/→ change type, ctrl+s save, ctrl+n save & new, ctrl+d delete, esc cancel"),
        Line::from(""),
        Line::from("Filter syntax: free text, title:, type:, lead:, from:YYYY-MM-DD, to:YYYY-MM-DD, at:location"),
        Line::from("Quote values with spaces: lead:\"Jane Smith\""),
    ];

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, modal);
}

fn field_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(
            format!("{}: ", label),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(value.to_string(), style),
    ])
}

fn error_line(message: &str) -> Line<'static> {
    Line::from(Span::styled(
        message.to_string(),
        Style::default().fg(Color::Red),
    ))
}

fn centered_rect(percent_x: u16, percent_y: u16, rect: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(rect);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
