//! Screen rendering.
//!
//! Rendering only reads session state, apart from restyling the
//! description editor for its block and focus.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::task::{AssigneeSelection, Member};
use crate::tui::app::App;
use crate::tui::colors::{hex_color, priority_color, ACCENT, DARK_RED, ERROR_RED, MUTED};
use crate::tui::editor::TextEditor;
use crate::tui::enums::{EditFocus, EditMode};
use crate::tui::input::InputField;
use crate::tui::picker::{Picker, PickerItem};
use crate::tui::screen::{CredentialForm, EditState, ListSelection, Progress, Screen, TaskBrowser, TaskDetail};
use crate::tui::utils::centered_rect;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

fn focused_block(title: impl Into<String>, focused: bool) -> Block<'static> {
    let style = if focused {
        Style::default().fg(ACCENT)
    } else {
        Style::default()
    };
    Block::default()
        .title(title.into())
        .borders(Borders::ALL)
        .border_style(style)
}

fn loading(f: &mut Frame, area: Rect, spinner: &str, what: &str) {
    let text = Paragraph::new(format!("{spinner} Loading {what}..."))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    f.render_widget(text, area);
}

/// Draw a picker as a list, one or two lines per row.
fn render_picker<T, S>(f: &mut Frame, area: Rect, picker: &Picker<T>, title: &str, row_style: S)
where
    T: PickerItem,
    S: Fn(&T) -> (String, Style),
{
    let title = if picker.is_filtering() || picker.filter_applied() {
        format!("{title} (filter: {})", picker.filter.value)
    } else {
        title.to_string()
    };
    let items: Vec<ListItem> = picker
        .visible_items()
        .map(|item| {
            let (prefix, style) = row_style(item);
            let mut lines = vec![Line::from(Span::styled(format!("{prefix}{}", item.title()), style))];
            let description = item.description();
            if !description.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("  {description}"),
                    Style::default().fg(MUTED),
                )));
            }
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::Rgb(40, 40, 60)))
        .highlight_symbol("► ");
    let mut state = ListState::default().with_selected(Some(picker.cursor()));
    f.render_stateful_widget(list, area, &mut state);
}

fn plain<T>(_: &T) -> (String, Style) {
    (String::new(), Style::default())
}

/// Column for a character cursor, kept inside a row `width` cells wide.
fn cursor_column(cursor: usize, width: u16) -> u16 {
    u16::try_from(cursor).unwrap_or(u16::MAX).min(width.saturating_sub(1))
}

fn render_input(f: &mut Frame, area: Rect, input: &InputField, title: &str, focused: bool) {
    let block = focused_block(title, focused);
    let inner = block.inner(area);
    f.render_widget(Paragraph::new(input.value.as_str()).block(block), area);
    if focused {
        let x = cursor_column(input.cursor, inner.width);
        f.set_cursor_position((inner.x + x, inner.y));
    }
}

fn render_text_editor(f: &mut Frame, area: Rect, editor: &mut TextEditor, title: &str, focused: bool) {
    let widget = editor.widget(focused_block(title, focused), focused);
    f.render_widget(widget, area);
}

fn render_progress(f: &mut Frame, area: Rect, progress: &Progress, headline: &str, footer: &str) {
    let area = centered_rect(60, 40, area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(3), Constraint::Length(2)])
        .split(area);

    f.render_widget(
        Paragraph::new(headline).style(Style::default().add_modifier(Modifier::BOLD)),
        chunks[0],
    );
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(ACCENT))
        .ratio(progress.ratio());
    f.render_widget(gauge, chunks[1]);
    f.render_widget(Paragraph::new(footer), chunks[2]);
}

fn render_credentials(f: &mut Frame, area: Rect, form: &CredentialForm) {
    let area = centered_rect(60, 50, area);
    f.render_widget(Clear, area);
    let outer = Block::default()
        .title("ClickUp credentials")
        .borders(Borders::ALL);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(3), Constraint::Length(3), Constraint::Min(0)])
        .split(inner);
    f.render_widget(
        Paragraph::new("Enter your API token and team ID. They are saved for next time.")
            .wrap(Wrap { trim: true }),
        chunks[0],
    );
    render_input(f, chunks[1], &form.token, "API Token", form.focus == 0);
    render_input(f, chunks[2], &form.team, "Team ID", form.focus == 1);
}

fn render_list_selection(f: &mut Frame, area: Rect, selection: &ListSelection, spinner: &str) {
    if selection.is_loading() && selection.picker.items().is_empty() {
        loading(f, area, spinner, "lists");
        return;
    }
    render_picker(f, area, &selection.picker, "Select a list", plain);
}

fn render_assignees(f: &mut Frame, area: Rect, picker: &Picker<Member>, chosen: &AssigneeSelection) {
    let title = format!("Assignees ({} selected, space to toggle)", chosen.len());
    render_picker(f, area, picker, &title, |member| {
        let mark = if chosen.contains(member.id) { "[x] " } else { "[ ] " };
        (mark.to_string(), Style::default())
    });
}

fn render_task_list(f: &mut Frame, area: Rect, tasks: &TaskBrowser, spinner: &str) {
    if tasks.loading {
        loading(f, area, spinner, "tasks");
        return;
    }
    let title = format!("{} ({})", tasks.title, tasks.picker.visible_len());
    render_picker(f, area, &tasks.picker, &title, plain);
}

fn render_detail(f: &mut Frame, area: Rect, detail: &TaskDetail, spinner: &str) {
    let Some(task) = &detail.task else {
        loading(f, area, spinner, "task");
        return;
    };

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(Span::styled(task.name.clone(), bold.fg(ACCENT))),
        Line::from(vec![Span::styled("Status: ", bold), Span::raw(task.status_label().to_string())]),
        Line::from(""),
        Line::from(Span::styled("Description", bold)),
    ];
    if task.description.is_empty() {
        lines.push(Line::from(Span::styled("No description.", Style::default().fg(MUTED))));
    } else {
        lines.extend(task.description.lines().map(|l| Line::from(l.to_string())));
    }
    lines.push(Line::from(""));

    match &detail.comments {
        None => lines.push(Line::from(format!("{spinner} Loading comments..."))),
        Some(comments) => {
            lines.push(Line::from(Span::styled("Comments", bold)));
            if comments.is_empty() {
                lines.push(Line::from(Span::styled(
                    "No comments on this task.",
                    Style::default().fg(MUTED),
                )));
            }
            for comment in comments {
                lines.push(Line::from(Span::styled(
                    format!("From: {} ({})", comment.author(), comment.display_time()),
                    Style::default().fg(MUTED),
                )));
                lines.extend(comment.text().lines().map(|l| Line::from(l.to_string())));
                lines.push(Line::from(""));
            }
        }
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().title("Task").borders(Borders::ALL))
        .wrap(Wrap { trim: false })
        .scroll((detail.scroll, 0));
    f.render_widget(paragraph, area);
}

fn render_editor(f: &mut Frame, area: Rect, state: &mut EditState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(3), Constraint::Length(1)])
        .split(area);

    let header = Line::from(vec![
        Span::styled(state.original.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  Status: "),
        Span::styled(state.status.clone(), Style::default().fg(ACCENT)),
    ]);
    f.render_widget(
        Paragraph::new(header).block(Block::default().borders(Borders::ALL).title("Edit task")),
        chunks[0],
    );

    let inserting = state.mode == EditMode::Insert;
    render_text_editor(
        f,
        chunks[1],
        &mut state.description,
        "Description",
        inserting && state.focus == EditFocus::Description,
    );
    render_input(
        f,
        chunks[2],
        &state.comment,
        "New comment",
        inserting && state.focus == EditFocus::Comment,
    );

    let mode_line = match state.mode {
        EditMode::Normal => Line::from(Span::styled("-- NORMAL --", Style::default().fg(MUTED))),
        EditMode::Insert => Line::from(Span::styled("-- INSERT --", Style::default().fg(ACCENT))),
        EditMode::Command => Line::from(format!(":{}", state.command.value)),
    };
    f.render_widget(Paragraph::new(mode_line), chunks[3]);
    if state.mode == EditMode::Command {
        let x = cursor_column(state.command.cursor, chunks[3].width.saturating_sub(1));
        f.set_cursor_position((chunks[3].x + 1 + x, chunks[3].y));
    }
}

fn render_confirm(f: &mut Frame, area: Rect, name: &str) {
    let block = Block::default()
        .title("Delete task")
        .borders(Borders::ALL)
        .style(Style::default().bg(DARK_RED));

    let area = centered_rect(50, 20, area);
    f.render_widget(Clear, area);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("Delete \"{name}\"?"),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Press 'y' to confirm, 'n' to cancel"),
    ];
    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let paragraph = Paragraph::new(format!(
        "An error occurred: {message}\n\nPress any key to quit."
    ))
    .style(Style::default().fg(ERROR_RED))
    .block(Block::default().borders(Borders::ALL).title("Error"))
    .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

/// Key hints for the status bar.
fn hints(screen: &Screen) -> String {
    match screen {
        Screen::CredentialEntry(_) => "tab: next field | enter: next/submit | ctrl+c: quit".into(),
        Screen::SpaceSelection(_) | Screen::ListSelection(_) | Screen::CreateStatus(_) => {
            "↑/↓: move | /: filter | enter: select | q: quit".into()
        }
        Screen::CreateTitle(_) => "enter: next | esc: quit".into(),
        Screen::CreateDescription(_) => "enter: new line | ctrl+d: done".into(),
        Screen::CreateAssignees(_) => "space: toggle | enter: next | q: quit".into(),
        Screen::CreatePriority { submitted: false, .. } => "enter: create task | q: quit".into(),
        Screen::CreatePriority { submitted: true, .. } => "Creating task...".into(),
        Screen::TaskCreated(_) | Screen::TaskDeleted { .. } => String::new(),
        Screen::TaskList => "v: view | e: edit | d: delete | /: filter | q: quit".into(),
        Screen::TaskDetail(_) => "↑/↓: scroll | q: back".into(),
        Screen::EditTask(state) => match state.mode {
            EditMode::Normal => "i: description | a: comment | s: status | :w save | :q! discard | q: back".into(),
            EditMode::Insert => "tab: switch field | esc: normal mode".into(),
            EditMode::Command => "enter: run | esc: cancel".into(),
        },
        Screen::StatusUpdate { .. } => "enter: stage status | esc: back".into(),
        Screen::DeleteConfirmation { .. } => "y: delete | n: cancel".into(),
        Screen::Error(_) => "any key: quit".into(),
    }
}

impl App {
    pub fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());
        let area = chunks[0];
        let spinner = SPINNER[self.spinner % SPINNER.len()];

        match &mut self.screen {
            Screen::CredentialEntry(form) => render_credentials(f, area, form),
            Screen::SpaceSelection(picker) => {
                if picker.items().is_empty() {
                    loading(f, area, spinner, "spaces");
                } else {
                    render_picker(f, area, picker, "Select a space", plain);
                }
            }
            Screen::ListSelection(selection) => render_list_selection(f, area, selection, spinner),
            Screen::CreateTitle(input) => {
                let area = centered_rect(70, 30, area);
                render_input(f, area, input, "Task title", true);
            }
            Screen::CreateDescription(text) => {
                render_text_editor(f, area, text, "Description (ctrl+d when done)", true)
            }
            Screen::CreateStatus(picker) => {
                if picker.items().is_empty() {
                    loading(f, area, spinner, "statuses");
                } else {
                    render_picker(f, area, picker, "Status", |status| {
                        let color = hex_color(&status.color).unwrap_or(Color::White);
                        (String::new(), Style::default().fg(color))
                    });
                }
            }
            Screen::CreateAssignees(picker) => {
                if picker.items().is_empty() {
                    loading(f, area, spinner, "members");
                } else {
                    render_assignees(f, area, picker, &self.draft.assignees);
                }
            }
            Screen::CreatePriority { picker, .. } => {
                render_picker(f, area, picker, "Priority", |p| {
                    (String::new(), Style::default().fg(priority_color(*p)))
                });
            }
            Screen::TaskCreated(progress) => {
                render_progress(f, area, progress, "Task Created Successfully!", "Quitting...")
            }
            Screen::TaskList => render_task_list(f, area, &self.tasks, spinner),
            Screen::TaskDetail(detail) => render_detail(f, area, detail, spinner),
            Screen::EditTask(state) => render_editor(f, area, state),
            Screen::StatusUpdate { picker, .. } => {
                if picker.items().is_empty() {
                    loading(f, area, spinner, "statuses");
                } else {
                    render_picker(f, area, picker, "Update status", |status| {
                        let color = hex_color(&status.color).unwrap_or(Color::White);
                        (String::new(), Style::default().fg(color))
                    });
                }
            }
            Screen::DeleteConfirmation { task } => {
                render_task_list(f, area, &self.tasks, spinner);
                render_confirm(f, area, &task.name);
            }
            Screen::TaskDeleted { progress, .. } => {
                render_progress(f, area, progress, "Task Deleted Successfully!", "Returning to list...")
            }
            Screen::Error(message) => render_error(f, area, message),
        }

        let status = Paragraph::new(hints(&self.screen))
            .style(Style::default().bg(ACCENT).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, chunks[1]);
    }
}
