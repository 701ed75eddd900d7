use crate::estimator::format_bytes;
use crate::model::Aggregate;
use crate::ui::app::{App, AppState};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap},
};
use std::path::Path;

const fn checkbox(checked: bool) -> &'static str {
    if checked { "[x]" } else { "[ ]" }
}

pub fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let system_root = if cfg!(windows) { "C:\\" } else { "/" };
    let disk = app
        .disks
        .list()
        .iter()
        .find(|d| d.mount_point() == Path::new(system_root))
        .or_else(|| app.disks.list().first());

    let header_text = if let Some(disk) = disk {
        let total = disk.total_space();
        let used = total.saturating_sub(disk.available_space());
        let percent = if total > 0 {
            #[allow(clippy::cast_precision_loss)]
            {
                (used as f64 / total as f64) * 100.0
            }
        } else {
            0.0
        };
        format!(
            "Clearway v{} | Disk: {} / {} ({percent:.1}% Used)",
            env!("CARGO_PKG_VERSION"),
            format_bytes(used),
            format_bytes(total)
        )
    } else {
        format!("Clearway v{} | Disk: N/A", env!("CARGO_PKG_VERSION"))
    };

    let title = Paragraph::new(header_text).block(Block::default().borders(Borders::ALL));
    f.render_widget(title, area);
}

pub fn render_descriptor_list(f: &mut Frame, app: &mut App, area: Rect) {
    let all = app.session.selection_aggregate() == Aggregate::All;
    let dim = if app.is_busy() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    let mut items = vec![ListItem::new(format!("{} Select all", checkbox(all))).style(dim)];
    items.extend(app.rows.iter().map(|row| {
        let style = if row.is_risky() {
            dim.fg(Color::Red)
        } else {
            dim
        };
        let size = row.size.formatted().unwrap_or_else(|| "-".to_string());
        ListItem::new(format!(
            "{} {:<30} {:>10}",
            checkbox(app.session.is_selected(&row.name)),
            row.name,
            size
        ))
        .style(style)
    }));

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Cleanup Items"))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .fg(Color::Yellow),
        )
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut app.list_state);
}

pub fn render_details(f: &mut Frame, app: &App, area: Rect) {
    let Some(row) = app.highlighted() else {
        let summary = format!(
            "Selected: {} of {} items, {}",
            app.session.selected_names().len(),
            app.rows.len(),
            format_bytes(app.total_selected_size())
        );
        f.render_widget(
            Paragraph::new(summary).block(Block::default().borders(Borders::ALL).title("Details")),
            area,
        );
        return;
    };

    let mut lines = vec![Line::from(row.size.label()).bold()];
    if let Some(root) = &row.root {
        let shown = if root.as_os_str().is_empty() {
            "(not available on this system)".to_string()
        } else {
            root.display().to_string()
        };
        lines.push(Line::from(format!("Path: {shown}")));
    }
    lines.push(Line::default());
    lines.push(Line::from(row.description.as_str()));
    if let Some(risk) = &row.risk_message {
        lines.push(Line::default());
        lines.push(Line::from(format!("Warning: {risk}")).fg(Color::Red));
    }

    let details = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Details: {}", row.name)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(details, area);
}

pub fn render_progress(f: &mut Frame, app: &App, area: Rect) {
    let (done, total) = app.progress;
    #[allow(clippy::cast_precision_loss)]
    let ratio = if total > 0 {
        (done as f64 / total as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(ratio)
        .label(app.status.as_str());
    f.render_widget(gauge, area);
}

pub fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let total_selected = format_bytes(app.total_selected_size());
    let footer_text = match app.state {
        AppState::Browsing => format!(
            "Total Selected: {total_selected} | [Space] Toggle [a] All [r] Refresh [Enter] Clean [q] Quit"
        ),
        AppState::Confirming => format!(
            "CONFIRM CLEAN? Selected: {total_selected} | [y/Enter] Confirm [n/Esc] Cancel"
        ),
        AppState::Cleaning => "Cleaning... [c] Cancel".to_string(),
        AppState::Done(_) => "Done! [Press key to continue]".to_string(),
    };

    let footer = Paragraph::new(footer_text).block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}

pub fn render_popup(f: &mut Frame, app: &App) {
    match app.state {
        AppState::Confirming => {
            let risks = app.selected_risks();
            let mut lines = vec![Line::from(format!(
                "Clean {} items ({})?",
                app.session.selected_names().len(),
                format_bytes(app.total_selected_size())
            ))];
            for (name, message) in risks {
                lines.push(Line::default());
                lines.push(Line::from(format!("{name}: {message}")).fg(Color::Red));
            }
            render_dialog(f, "Confirm Cleanup", lines, 60, 40);
        }
        AppState::Done(ref msg) => {
            render_dialog(f, "Clean Completed", vec![Line::from(msg.as_str())], 60, 20);
        }
        AppState::Browsing | AppState::Cleaning => {}
    }
}

fn render_dialog(f: &mut Frame, title: &str, lines: Vec<Line>, percent_x: u16, percent_y: u16) {
    let area = centered_rect(percent_x, percent_y, f.area());
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines)
            .block(Block::default().title(title).borders(Borders::ALL))
            .wrap(Wrap { trim: true }),
        area,
    );
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
