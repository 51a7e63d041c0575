//! UI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use condoguard_core::Resident;

use super::app::{App, InputMode, View};
use crate::output::format_millis;

/// Main UI rendering function
pub fn draw(frame: &mut Frame, app: &App) {
    // Usage gauge on top, status bar at the bottom
    let outer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_usage_gauge(frame, app, outer_chunks[0]);

    match app.view {
        View::List => {
            let pane_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(outer_chunks[1]);
            draw_residents_pane(frame, app, pane_chunks[0]);
            draw_detail_pane(frame, app, pane_chunks[1], false);
        }
        View::Detail => draw_detail_pane(frame, app, outer_chunks[1], true),
    }

    match app.input_mode {
        InputMode::Normal => draw_status_bar(frame, app, outer_chunks[2]),
        InputMode::Search => draw_search_input(frame, app, outer_chunks[2]),
    }

    if app.show_help {
        draw_help_overlay(frame, app);
    }
}

/// Draw the capacity gauge and access level
fn draw_usage_gauge(frame: &mut Frame, app: &App, area: Rect) {
    let color = if app.usage_critical() {
        Color::Red
    } else {
        Color::Green
    };
    let ratio = (app.usage.percentage / 100.0).clamp(0.0, 1.0);

    let title = format!(" CondoGuard [{}] ", app.access);
    let gauge = Gauge::default()
        .block(Block::default().title(title).borders(Borders::ALL))
        .gauge_style(Style::default().fg(color))
        .ratio(ratio)
        .label(format!(
            "{} / {} records ({:.1}%)",
            app.usage.used, app.usage.total, app.usage.percentage
        ));

    frame.render_widget(gauge, area);
}

/// Draw the resident list (left)
fn draw_residents_pane(frame: &mut Frame, app: &App, area: Rect) {
    let max_len = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = app
        .residents
        .iter()
        .map(|resident| {
            let status_style = if resident.status.is_active() {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::DarkGray)
            };

            let title = Line::from(vec![
                Span::styled(
                    format!("{} ", resident.display_id()),
                    Style::default().add_modifier(Modifier::DIM),
                ),
                Span::raw(clip(&resident.name.to_uppercase(), max_len.saturating_sub(5))),
            ]);
            let info = Line::from(vec![
                Span::styled(
                    format!("Casa {}  ", resident.house_number),
                    Style::default().add_modifier(Modifier::DIM),
                ),
                Span::styled(resident.status.as_str(), status_style),
            ]);

            ListItem::new(vec![title, info])
        })
        .collect();

    let title = if app.search.is_empty() {
        format!(" Residents ({}) ", app.residents.len())
    } else {
        format!(" Residents ({}) /{} ", app.residents.len(), app.search)
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::REVERSED),
    );

    let mut state = ListState::default();
    if !app.residents.is_empty() {
        state.select(Some(app.selected));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

/// Draw the selected resident (right pane, or full screen)
fn draw_detail_pane(frame: &mut Frame, app: &App, area: Rect, focused: bool) {
    let border_style = if focused {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let block = Block::default()
        .title(" Detail ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let content = match app.current_resident() {
        Some(resident) => detail_lines(resident),
        None => vec![Line::from(Span::styled(
            "No resident selected",
            Style::default().add_modifier(Modifier::DIM),
        ))],
    };

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn detail_lines(resident: &Resident) -> Vec<Line<'static>> {
    let label = Style::default().add_modifier(Modifier::BOLD);
    let field = |name: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<14}", name), label),
            Span::raw(if value.is_empty() { "-".to_string() } else { value }),
        ])
    };

    let mut lines = vec![
        Line::from(Span::styled(
            resident.name.to_uppercase(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        field("ID", resident.display_id()),
        field("Casa", resident.house_number.clone()),
        field("Telefone", resident.phone.clone()),
        field("Início", resident.start_date.clone()),
        field("Fim", resident.end_date.clone()),
        field("Status", resident.status.to_string()),
        field("Cadastro", format_millis(resident.created_at)),
    ];

    if let Some(ref observations) = resident.observations {
        lines.push(field("Observações", observations.clone()));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("── Prestadores ({}) ──", resident.providers.len()),
        Style::default().add_modifier(Modifier::DIM),
    )));
    for provider in &resident.providers {
        let name = if provider.name.is_empty() {
            "---".to_string()
        } else {
            provider.name.to_uppercase()
        };
        let document = if provider.document.is_empty() {
            "---".to_string()
        } else {
            provider.document.clone()
        };
        lines.push(Line::from(format!("  {}  {}", name, document)));
    }

    lines
}

/// Draw the status bar at the bottom
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let content = if let Some(msg) = &app.status_message {
        msg.clone()
    } else if app.access.is_admin() {
        "/:search  enter:detail  t:toggle status  c:card  r:reload  ?:help  q:quit".to_string()
    } else {
        "/:search  enter:detail  r:reload  ?:help  q:quit  (read-only)".to_string()
    };

    let paragraph = Paragraph::new(content).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Draw search input at the bottom
fn draw_search_input(frame: &mut Frame, app: &App, area: Rect) {
    let prefix = "/";

    let line = Line::from(vec![
        Span::styled(prefix, Style::default().fg(Color::Cyan)),
        Span::raw(app.search.as_str()),
        Span::styled(
            format!("  ({} matches)", app.residents.len()),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);

    let paragraph = Paragraph::new(line);
    frame.render_widget(paragraph, area);

    // Position cursor
    let cursor_x = area.x + prefix.len() as u16 + app.search.chars().count() as u16;
    frame.set_cursor_position((cursor_x, area.y));
}

/// Draw help overlay
fn draw_help_overlay(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Calculate centered popup area
    let popup_width = 50.min(area.width.saturating_sub(4));
    let popup_height = 18.min(area.height.saturating_sub(4));
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let mut help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  j/k, ↑/↓    Move up/down"),
        Line::from("  g/G         Jump to first/last"),
        Line::from("  Enter       Show detail"),
        Line::from("  Esc         Back to list"),
        Line::from(""),
        Line::from("  /           Search name or house"),
        Line::from("  r           Reload"),
    ];
    if app.access.is_admin() {
        help_text.push(Line::from("  t           Toggle active/inactive"));
        help_text.push(Line::from("  c           Export card (PDF)"));
    }
    help_text.push(Line::from("  q           Quit"));
    help_text.push(Line::from(""));
    help_text.push(Line::from(vec![Span::styled(
        "Press any key to close",
        Style::default().add_modifier(Modifier::DIM),
    )]));

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, popup_area);
}

/// Clip to `max` characters with an ellipsis
fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip() {
        assert_eq!(clip("ANA", 10), "ANA");
        assert_eq!(clip("CONCEIÇÃO", 5), "CONC…");
    }
}
