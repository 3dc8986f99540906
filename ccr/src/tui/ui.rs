//! Console rendering
//!
//! Draws the follower index list, the follower index form from its
//! [`FormView`], the fatal error screen and the popups on top of them.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

use super::app::{App, Screen};
use super::forms::{ConfirmDialog, FieldView, FocusTarget, FormActions, FormView};
use ccr_core::fields::FieldKind;
use ccr_core::{ApiStatus, FollowerStatus};

const PRIMARY_COLOR: Color = Color::Cyan;
const SUCCESS_COLOR: Color = Color::Green;
const WARNING_COLOR: Color = Color::Yellow;
const ERROR_COLOR: Color = Color::Red;
const MUTED_COLOR: Color = Color::DarkGray;
const TEXT_COLOR: Color = Color::White;

pub fn render(f: &mut Frame, app: &App) {
    let size = f.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Status bar
        ])
        .split(size);

    render_header(f, chunks[0], app);

    match &app.screen {
        Screen::List => render_follower_index_list(f, chunks[1], app),
        Screen::Loading => render_loading(f, chunks[1]),
        Screen::Form => {
            if let Some(form) = &app.form {
                let view = form.view();
                render_form(f, chunks[1], &view, app.focus);
                if view.show_busy_overlay {
                    render_busy_overlay(f);
                }
            }
        }
        Screen::Fatal { title, message } => render_fatal(f, chunks[1], title, message),
    }

    render_status_bar(f, chunks[2], app);

    if let Some(dialog) = &app.confirm_dialog {
        render_confirm_dialog(f, dialog);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let title = match &app.screen {
        Screen::List => "Follower indices",
        Screen::Loading => "Loading",
        Screen::Form => match &app.form {
            Some(form) if form.is_new() => "Add follower index",
            Some(_) => "Edit follower index",
            None => "Follower index",
        },
        Screen::Fatal { .. } => "Error",
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "Cross-cluster replication",
            Style::default().fg(PRIMARY_COLOR).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" › "),
        Span::styled(title, Style::default().fg(TEXT_COLOR)),
        Span::styled(format!("  {}", app.current_path), Style::default().fg(MUTED_COLOR)),
    ]))
    .block(Block::default().borders(Borders::ALL));

    f.render_widget(header, area);
}

fn render_follower_index_list(f: &mut Frame, area: Rect, app: &App) {
    let header = Row::new(vec!["Name", "Remote cluster", "Leader index", "Status"])
        .style(Style::default().fg(PRIMARY_COLOR).add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    let rows = app.follower_indices.iter().map(|follower| {
        let status_style = match follower.status {
            FollowerStatus::Active => Style::default().fg(SUCCESS_COLOR),
            FollowerStatus::Paused => Style::default().fg(WARNING_COLOR),
        };
        Row::new(vec![
            Cell::from(follower.name.clone()),
            Cell::from(follower.remote_cluster.clone()),
            Cell::from(follower.leader_index.clone()),
            Cell::from(follower.status.to_string()).style(status_style),
        ])
    });

    let widths = [
        Constraint::Percentage(35),
        Constraint::Percentage(25),
        Constraint::Percentage(25),
        Constraint::Percentage(15),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Follower indices ({})", app.follower_indices.len())),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("▶ ");

    let mut state = app.list_state.clone();
    f.render_stateful_widget(table, area, &mut state);

    if app.follower_indices.is_empty() {
        let empty = Paragraph::new("No follower indices. Press 'a' to add one.")
            .style(Style::default().fg(MUTED_COLOR))
            .alignment(Alignment::Center);
        f.render_widget(empty, area.inner(&Margin { vertical: 3, horizontal: 2 }));
    }
}

fn render_loading(f: &mut Frame, area: Rect) {
    let loading = Paragraph::new("Loading follower index…")
        .style(Style::default().fg(MUTED_COLOR))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(loading, area);
}

/// Draw the form. The left column holds the fields, the right one the help
/// for whatever has focus.
pub fn render_form(f: &mut Frame, area: Rect, view: &FormView, focus: Option<FocusTarget>) {
    let mut banners: Vec<Line> = Vec::new();
    if let Some(message) = &view.api_error {
        banners.push(Line::from(Span::styled(
            format!("✗ {}", message),
            Style::default().fg(ERROR_COLOR).add_modifier(Modifier::BOLD),
        )));
    }
    if view.show_error_banner {
        banners.push(Line::from(Span::styled(
            "Fix errors before continuing.",
            Style::default().fg(WARNING_COLOR).add_modifier(Modifier::BOLD),
        )));
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(if banners.is_empty() { 0 } else { banners.len() as u16 + 2 }),
            Constraint::Min(0),
        ])
        .split(area);

    if !banners.is_empty() {
        let banner = Paragraph::new(banners)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(ERROR_COLOR)));
        f.render_widget(banner, rows[0]);
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    let (lines, focused_line) = form_lines(view, focus);
    let visible = columns[0].height.saturating_sub(2);
    let scroll = (focused_line as u16).saturating_sub(visible.saturating_sub(2));

    let fields = Paragraph::new(lines)
        .scroll((scroll, 0))
        .block(Block::default().borders(Borders::ALL).title(if view.is_new {
            "Add follower index"
        } else {
            "Edit follower index"
        }));
    f.render_widget(fields, columns[0]);

    let help = Paragraph::new(help_lines(view, focus))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, columns[1]);
}

/// Form lines plus the index of the focused one.
fn form_lines(view: &FormView, focus: Option<FocusTarget>) -> (Vec<Line<'static>>, usize) {
    let mut lines = Vec::new();
    let mut focused_line = 0;

    let identity = [&view.name, &view.remote_cluster.field, &view.leader_index];
    for field in identity {
        let is_focused = focus == Some(FocusTarget::Field(field.id));
        if is_focused {
            focused_line = lines.len();
        }
        lines.extend(field_lines(field, is_focused));
    }
    if let Some(guidance) = &view.remote_cluster.guidance {
        lines.push(Line::from(Span::styled(
            format!("  ⚠ {}", guidance.message()),
            Style::default().fg(WARNING_COLOR),
        )));
    }
    lines.push(Line::default());

    if let Some(visible) = view.advanced_toggle {
        let is_focused = focus == Some(FocusTarget::AdvancedToggle);
        if is_focused {
            focused_line = lines.len();
        }
        lines.push(Line::from(Span::styled(
            format!("[{}] Advanced settings (Ctrl-A)", if visible { "x" } else { " " }),
            focus_style(is_focused, TEXT_COLOR),
        )));
    }
    for field in &view.advanced_fields {
        let is_focused = focus == Some(FocusTarget::Field(field.id));
        if is_focused {
            focused_line = lines.len();
        }
        lines.extend(field_lines(field, is_focused));
    }
    lines.push(Line::default());

    match view.actions {
        FormActions::Saving => lines.push(Line::from(Span::styled(
            "⏳ Saving…",
            Style::default().fg(WARNING_COLOR),
        ))),
        FormActions::Buttons { save_disabled } => {
            let save_focused = focus == Some(FocusTarget::Save);
            let cancel_focused = focus == Some(FocusTarget::Cancel);
            if save_focused || cancel_focused {
                focused_line = lines.len();
            }
            let save_style = if save_disabled {
                Style::default().fg(MUTED_COLOR)
            } else {
                focus_style(save_focused, SUCCESS_COLOR)
            };
            lines.push(Line::from(vec![
                Span::styled(if view.is_new { "[ Create ]" } else { "[ Update ]" }, save_style),
                Span::raw("  "),
                Span::styled("[ Cancel ]", focus_style(cancel_focused, TEXT_COLOR)),
            ]));
        }
    }

    (lines, focused_line)
}

fn field_lines(field: &FieldView, is_focused: bool) -> Vec<Line<'static>> {
    let label_style = if field.editable {
        focus_style(is_focused, PRIMARY_COLOR)
    } else {
        Style::default().fg(MUTED_COLOR)
    };

    let mut spans = vec![Span::styled(format!("{}: ", field.label), label_style)];
    match (field.kind, field.value.is_empty()) {
        (FieldKind::RemoteCluster, true) => {
            spans.push(Span::styled("(select with ↑↓)", Style::default().fg(MUTED_COLOR)))
        }
        (FieldKind::RemoteCluster, false) if field.editable => {
            spans.push(Span::raw(format!("◀ {} ▶", field.value)))
        }
        (_, true) => match field.default_value {
            Some(default) => {
                spans.push(Span::styled(format!("({})", default), Style::default().fg(MUTED_COLOR)))
            }
            None => {}
        },
        _ => spans.push(Span::raw(field.value.clone())),
    }
    if is_focused && field.editable && field.kind != FieldKind::RemoteCluster {
        spans.push(Span::styled("▏", Style::default().fg(PRIMARY_COLOR)));
    }
    if !field.editable {
        spans.push(Span::styled(" (locked)", Style::default().fg(MUTED_COLOR)));
    }
    if field.is_validating {
        spans.push(Span::styled(
            "  checking availability…",
            Style::default().fg(WARNING_COLOR),
        ));
    }

    let mut lines = vec![Line::from(spans)];
    if let Some(error) = &field.error {
        lines.push(Line::from(Span::styled(
            format!("  ✗ {}", error),
            Style::default().fg(ERROR_COLOR),
        )));
    }
    lines
}

fn help_lines(view: &FormView, focus: Option<FocusTarget>) -> Vec<Line<'static>> {
    let field = match focus {
        Some(FocusTarget::Field(id)) => view.fields().find(|field| field.id == id),
        _ => None,
    };

    match (field, focus) {
        (Some(field), _) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    field.label,
                    Style::default().fg(PRIMARY_COLOR).add_modifier(Modifier::BOLD),
                )),
                Line::from(field.description),
            ];
            if let Some(default) = field.default_value {
                lines.push(Line::default());
                lines.push(Line::from(format!("Default: {}", default)));
            }
            lines
        }
        (None, Some(FocusTarget::AdvancedToggle)) => vec![Line::from(
            "Advanced settings control the rate of replication. Hiding them resets them to the cluster defaults.",
        )],
        (None, Some(FocusTarget::Save)) => vec![Line::from("Save the follower index (Enter or Ctrl-S).")],
        (None, Some(FocusTarget::Cancel)) => vec![Line::from("Return to the follower index list (Esc).")],
        _ => Vec::new(),
    }
}

fn focus_style(is_focused: bool, color: Color) -> Style {
    if is_focused {
        Style::default().fg(color).add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().fg(color)
    }
}

fn render_busy_overlay(f: &mut Frame) {
    let area = centered_rect(40, 20, f.size());
    f.render_widget(Clear, area);

    let overlay = Paragraph::new("Saving follower index…")
        .style(Style::default().fg(WARNING_COLOR).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(WARNING_COLOR)),
        );
    f.render_widget(overlay, area);
}

fn render_fatal(f: &mut Frame, area: Rect, title: &str, message: &str) {
    let lines = vec![
        Line::from(Span::styled(
            title.to_string(),
            Style::default().fg(ERROR_COLOR).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(message.to_string()),
        Line::default(),
        Line::from(Span::styled(
            "Esc: back to the list   q: quit",
            Style::default().fg(MUTED_COLOR),
        )),
    ];

    let fatal = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ERROR_COLOR))
            .title("Error"),
    );
    f.render_widget(fatal, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let (status_text, status_style) = if let Some(msg) = &app.error_message {
        (format!("✗ {}", msg), Style::default().fg(ERROR_COLOR))
    } else if let Some(msg) = &app.status_message {
        (format!("✓ {}", msg), Style::default().fg(SUCCESS_COLOR))
    } else {
        let status = match app.api_status {
            ApiStatus::Idle => app.config.cluster.url.clone(),
            ApiStatus::Loading => "Loading…".to_string(),
            ApiStatus::Saving => "Saving…".to_string(),
        };
        (status, Style::default().fg(TEXT_COLOR))
    };

    let status = Paragraph::new(status_text)
        .style(status_style)
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status, chunks[0]);

    let shortcuts = Paragraph::new(shortcuts(app))
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL).title("Keys"))
        .wrap(Wrap { trim: true });
    f.render_widget(shortcuts, chunks[1]);
}

fn shortcuts(app: &App) -> &'static str {
    if app.confirm_dialog.is_some() {
        return "←→: select  Enter: confirm  Esc: cancel";
    }
    match app.screen {
        Screen::List => "a: add  e: edit  r: refresh  q: quit",
        Screen::Loading => "Esc: back",
        Screen::Form => "Tab: next  Ctrl-S: save  Ctrl-A: advanced  Esc: cancel",
        Screen::Fatal { .. } => "Esc: back  q: quit",
    }
}

fn render_confirm_dialog(f: &mut Frame, dialog: &ConfirmDialog) {
    let area = centered_rect(50, 30, f.size());
    f.render_widget(Clear, area);

    let border_color = if dialog.is_dangerous { ERROR_COLOR } else { WARNING_COLOR };
    let block = Block::default()
        .title(dialog.title.as_str())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    f.render_widget(block, area);

    let inner_area = area.inner(&Margin { vertical: 1, horizontal: 1 });
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(inner_area);

    let message = Paragraph::new(dialog.message.as_str())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(message, chunks[0]);

    let button_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    let cancel_style = if !dialog.selected {
        Style::default().bg(WARNING_COLOR).fg(Color::Black).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(WARNING_COLOR)
    };
    let confirm_style = if dialog.selected {
        Style::default().bg(border_color).fg(Color::Black).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(border_color)
    };

    let cancel_button = Paragraph::new(dialog.cancel_text.as_str())
        .style(cancel_style)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    let confirm_button = Paragraph::new(dialog.confirm_text.as_str())
        .style(confirm_style)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);

    f.render_widget(cancel_button, button_chunks[0]);
    f.render_widget(confirm_button, button_chunks[1]);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::forms::{RemoteClusterGuidance, RemoteClusterView};
    use ccr_core::FieldId;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn new_form_view() -> FormView {
        let mut name = FieldView::bare(FieldId::Name, "orders follower", true);
        name.error = Some("Spaces are not allowed in the name.".to_string());
        name.is_validating = true;

        FormView {
            is_new: true,
            name,
            remote_cluster: RemoteClusterView {
                field: FieldView::bare(FieldId::RemoteCluster, "", true),
                options: Vec::new(),
                guidance: Some(RemoteClusterGuidance::NoClusters),
            },
            leader_index: FieldView::bare(FieldId::LeaderIndex, "orders", true),
            advanced_toggle: Some(false),
            advanced_fields: Vec::new(),
            show_error_banner: true,
            api_error: Some("The leader index 'orders' does not exist.".to_string()),
            actions: FormActions::Buttons { save_disabled: true },
            show_busy_overlay: false,
        }
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_render_form_shows_errors_and_guidance() {
        let mut terminal = Terminal::new(TestBackend::new(160, 30)).unwrap();
        let view = new_form_view();

        terminal
            .draw(|f| {
                let area = f.size();
                render_form(f, area, &view, Some(FocusTarget::Field(FieldId::Name)))
            })
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Spaces are not allowed in the name."));
        assert!(text.contains("checking availability"));
        assert!(text.contains("Fix errors before continuing."));
        assert!(text.contains("does not exist."));
        assert!(text.contains("[ ] Advanced settings"));
    }

    #[test]
    fn test_saving_replaces_buttons() {
        let mut view = new_form_view();
        view.actions = FormActions::Saving;

        let (lines, _) = form_lines(&view, None);
        let text: String = lines
            .iter()
            .flat_map(|line| line.spans.iter().map(|span| span.content.to_string()))
            .collect();
        assert!(text.contains("Saving"));
        assert!(!text.contains("[ Create ]"));
        assert!(!text.contains("[ Cancel ]"));
    }

    #[test]
    fn test_centered_rect_is_inside() {
        let outer = Rect::new(0, 0, 100, 50);
        let inner = centered_rect(50, 50, outer);
        assert!(inner.x >= outer.x && inner.right() <= outer.right());
        assert!(inner.y >= outer.y && inner.bottom() <= outer.bottom());
        assert_eq!(inner.width, 50);
    }
}
