//! Session state and the transition function driving every screen.
//!
//! [`App::apply`] is the only way state changes. It takes one [`Event`],
//! updates the session, and returns the [`Command`]s the event loop must
//! run. Nothing here performs I/O, so every transition can be exercised
//! directly in tests.

use std::mem;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, warn};

use crate::api::{NewTask, TaskUpdate};
use crate::bridge::{Command, Outcome, Sentinel};
use crate::config::Credentials;
use crate::fields::Priority;
use crate::task::{Member, RemoteTask, Space, TaskDraft, TaskStatus};
use crate::tui::editor::TextEditor;
use crate::tui::enums::{EditFocus, EditMode, Event, StartMode};
use crate::tui::input::InputField;
use crate::tui::picker::Picker;
use crate::tui::screen::{
    CredentialForm, EditState, ListSelection, Progress, Screen, TaskBrowser, TaskDetail,
};

/// Pause between progress bar steps.
pub const FRAME: Duration = Duration::from_millis(200);
const DETAIL_PAGE: u16 = 10;

type Step = (Screen, Vec<Command>);

fn stay(screen: Screen) -> Step {
    (screen, Vec::new())
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c'))
}

fn is_quit(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
}

/// The session aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct App {
    pub screen: Screen,
    pub credentials: Credentials,
    pub start: StartMode,
    pub selected_space: Option<Space>,
    pub selected_list_id: Option<String>,
    pub selected_task_id: Option<String>,
    pub draft: TaskDraft,
    pub tasks: TaskBrowser,
    pub size: (u16, u16),
    pub spinner: usize,
}

impl App {
    /// Start at space selection when credentials are complete, otherwise
    /// at the credential form.
    pub fn new(credentials: Credentials, start: StartMode) -> Self {
        let screen = if credentials.is_complete() {
            Screen::SpaceSelection(Picker::default())
        } else {
            Screen::CredentialEntry(CredentialForm::default())
        };
        Self {
            screen,
            credentials,
            start,
            selected_space: None,
            selected_list_id: None,
            selected_task_id: None,
            draft: TaskDraft::default(),
            tasks: TaskBrowser::default(),
            size: (0, 0),
            spinner: 0,
        }
    }

    /// Start directly on one task, either viewing or editing it.
    pub fn open_task(credentials: Credentials, task: RemoteTask, edit: bool) -> Self {
        let mut app = Self::new(credentials, StartMode::Browse);
        app.selected_space = Some(Space {
            id: task.space.id.clone(),
            name: String::new(),
        });
        app.selected_task_id = Some(task.id.clone());
        app.tasks.title = "Tasks".to_string();
        app.screen = if edit {
            Screen::EditTask(EditState::new(task))
        } else {
            Screen::TaskDetail(TaskDetail::default())
        };
        app
    }

    /// Commands needed to populate the initial screen.
    pub fn init(&self) -> Vec<Command> {
        match &self.screen {
            Screen::SpaceSelection(_) => vec![Command::FetchSpaces {
                team_id: self.credentials.team_id.clone(),
            }],
            Screen::TaskDetail(detail) if detail.task.is_none() => self
                .selected_task_id
                .as_deref()
                .map(detail_fetches)
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Message to report after exiting from the error screen.
    pub fn error_message(&self) -> Option<&str> {
        match &self.screen {
            Screen::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Apply one event and return the commands it produces.
    pub fn apply(&mut self, event: Event) -> Vec<Command> {
        let before = self.screen.name();
        let commands = match event {
            Event::Key(key) if is_ctrl_c(&key) => vec![Command::Quit],
            Event::Key(key) if key.kind != KeyEventKind::Press => Vec::new(),
            Event::Key(key) => {
                self.sync_page_size();
                let screen = mem::replace(&mut self.screen, Screen::TaskList);
                let (next, commands) = self.handle_key(screen, key);
                self.screen = next;
                commands
            }
            Event::Resize { width, height } => {
                self.size = (width, height);
                self.sync_page_size();
                Vec::new()
            }
            Event::Tick => {
                self.spinner = self.spinner.wrapping_add(1);
                Vec::new()
            }
            Event::Result(outcome) => {
                let screen = mem::replace(&mut self.screen, Screen::TaskList);
                let (next, commands) = self.handle_outcome(screen, outcome);
                self.screen = next;
                commands
            }
        };
        let after = self.screen.name();
        if before != after {
            debug!(from = before, to = after, "screen changed");
        }
        if !commands.is_empty() {
            debug!(?commands, "issuing commands");
        }
        commands
    }

    fn space_id(&self) -> String {
        self.selected_space
            .as_ref()
            .map(|s| s.id.clone())
            .unwrap_or_default()
    }

    fn fetch_tasks(&self) -> Command {
        Command::FetchTasks {
            team_id: self.credentials.team_id.clone(),
            space_id: self.selected_space.as_ref().map(|s| s.id.clone()),
        }
    }

    /// Show the task list in its loading state and fetch it again.
    fn reload_tasks(&mut self) -> Step {
        self.tasks.start_loading();
        (Screen::TaskList, vec![self.fetch_tasks()])
    }

    /// Return to the task list, loading it if it was never fetched or a
    /// change landed while another screen was open.
    fn back_to_list(&mut self) -> Step {
        if (!self.tasks.loaded || self.tasks.stale) && !self.tasks.loading {
            return self.reload_tasks();
        }
        stay(Screen::TaskList)
    }

    fn sync_page_size(&mut self) {
        let rows = usize::from(self.size.1).saturating_sub(8) / 2;
        if rows == 0 {
            return;
        }
        match &mut self.screen {
            Screen::SpaceSelection(picker) => picker.set_page_size(rows),
            Screen::ListSelection(selection) => selection.picker.set_page_size(rows),
            Screen::CreateStatus(picker) | Screen::StatusUpdate { picker, .. } => {
                picker.set_page_size(rows)
            }
            Screen::CreateAssignees(picker) => picker.set_page_size(rows),
            Screen::CreatePriority { picker, .. } => picker.set_page_size(rows),
            _ => {}
        }
        self.tasks.picker.set_page_size(rows);
    }

    fn handle_key(&mut self, screen: Screen, key: KeyEvent) -> Step {
        match screen {
            Screen::CredentialEntry(form) => self.credential_key(form, key),
            Screen::SpaceSelection(picker) => self.space_key(picker, key),
            Screen::ListSelection(selection) => self.list_key(selection, key),
            Screen::CreateTitle(input) => self.title_key(input, key),
            Screen::CreateDescription(area) => self.description_key(area, key),
            Screen::CreateStatus(picker) => self.wizard_status_key(picker, key),
            Screen::CreateAssignees(picker) => self.assignee_key(picker, key),
            Screen::CreatePriority { picker, submitted } => self.priority_key(picker, submitted, key),
            Screen::TaskList => self.task_list_key(key),
            Screen::TaskDetail(detail) => self.detail_key(detail, key),
            Screen::EditTask(state) => self.edit_key(state, key),
            Screen::StatusUpdate { picker, editor } => self.status_update_key(picker, editor, key),
            Screen::DeleteConfirmation { task } => self.delete_key(task, key),
            Screen::Error(message) => (Screen::Error(message), vec![Command::Quit]),
            screen @ (Screen::TaskCreated(_) | Screen::TaskDeleted { .. }) => stay(screen),
        }
    }

    fn credential_key(&mut self, mut form: CredentialForm, key: KeyEvent) -> Step {
        match key.code {
            KeyCode::Tab | KeyCode::Down => form.next(),
            KeyCode::BackTab | KeyCode::Up => form.prev(),
            KeyCode::Enter if form.on_last_field() => {
                let creds = Credentials::new(form.token.value, form.team.value);
                self.credentials = creds.clone();
                let fetch = Command::FetchSpaces {
                    team_id: creds.team_id.clone(),
                };
                return (
                    Screen::SpaceSelection(Picker::default()),
                    vec![Command::SaveCredentials(creds), fetch],
                );
            }
            KeyCode::Enter => form.next(),
            _ => {
                form.focused_mut().handle_key(&key);
            }
        }
        stay(Screen::CredentialEntry(form))
    }

    fn space_key(&mut self, mut picker: Picker<Space>, key: KeyEvent) -> Step {
        if picker.handle_key(&key) {
            return stay(Screen::SpaceSelection(picker));
        }
        match key.code {
            KeyCode::Enter => {
                let Some(space) = picker.selected().cloned() else {
                    return stay(Screen::SpaceSelection(picker));
                };
                let space_id = space.id.clone();
                self.tasks = TaskBrowser {
                    title: format!("Tasks in {}", space.name),
                    ..TaskBrowser::default()
                };
                self.selected_space = Some(space);
                match self.start {
                    StartMode::Browse => self.reload_tasks(),
                    StartMode::CreateTask => (
                        Screen::ListSelection(ListSelection::default()),
                        vec![
                            Command::FetchFolderlessLists {
                                space_id: space_id.clone(),
                            },
                            Command::FetchFolders { space_id },
                        ],
                    ),
                }
            }
            _ if is_quit(&key) => (Screen::SpaceSelection(picker), vec![Command::Quit]),
            _ => stay(Screen::SpaceSelection(picker)),
        }
    }

    fn list_key(&mut self, mut selection: ListSelection, key: KeyEvent) -> Step {
        if selection.picker.handle_key(&key) {
            return stay(Screen::ListSelection(selection));
        }
        match key.code {
            KeyCode::Enter => match selection.picker.selected() {
                Some(list) => {
                    self.selected_list_id = Some(list.id.clone());
                    self.draft = TaskDraft::default();
                    stay(Screen::CreateTitle(InputField::new()))
                }
                None => stay(Screen::ListSelection(selection)),
            },
            _ if is_quit(&key) => (Screen::ListSelection(selection), vec![Command::Quit]),
            _ => stay(Screen::ListSelection(selection)),
        }
    }

    fn title_key(&mut self, mut input: InputField, key: KeyEvent) -> Step {
        match key.code {
            KeyCode::Enter => {
                self.draft.title = input.value;
                stay(Screen::CreateDescription(TextEditor::new()))
            }
            KeyCode::Esc => (Screen::CreateTitle(input), vec![Command::Quit]),
            _ => {
                input.handle_key(&key);
                stay(Screen::CreateTitle(input))
            }
        }
    }

    fn description_key(&mut self, mut area: TextEditor, key: KeyEvent) -> Step {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('d') {
            self.draft.description = area.text();
            return (
                Screen::CreateStatus(Picker::default()),
                vec![Command::FetchStatuses {
                    space_id: self.space_id(),
                }],
            );
        }
        area.handle_key(&key);
        stay(Screen::CreateDescription(area))
    }

    fn wizard_status_key(&mut self, mut picker: Picker<TaskStatus>, key: KeyEvent) -> Step {
        if picker.handle_key(&key) {
            return stay(Screen::CreateStatus(picker));
        }
        match key.code {
            KeyCode::Enter => match picker.selected() {
                Some(status) => {
                    self.draft.status = status.label.clone();
                    let list_id = self.selected_list_id.clone().unwrap_or_default();
                    (
                        Screen::CreateAssignees(Picker::default()),
                        vec![Command::FetchMembers { list_id }],
                    )
                }
                None => stay(Screen::CreateStatus(picker)),
            },
            _ if is_quit(&key) => (Screen::CreateStatus(picker), vec![Command::Quit]),
            _ => stay(Screen::CreateStatus(picker)),
        }
    }

    fn assignee_key(&mut self, mut picker: Picker<Member>, key: KeyEvent) -> Step {
        if !picker.is_filtering() && key.code == KeyCode::Char(' ') {
            if let Some(member) = picker.selected() {
                self.draft.assignees.toggle(member.id);
            }
            return stay(Screen::CreateAssignees(picker));
        }
        if picker.handle_key(&key) {
            return stay(Screen::CreateAssignees(picker));
        }
        match key.code {
            KeyCode::Enter => stay(Screen::CreatePriority {
                picker: Picker::new(Priority::ALL.to_vec()),
                submitted: false,
            }),
            _ if is_quit(&key) => (Screen::CreateAssignees(picker), vec![Command::Quit]),
            _ => stay(Screen::CreateAssignees(picker)),
        }
    }

    fn priority_key(&mut self, mut picker: Picker<Priority>, submitted: bool, key: KeyEvent) -> Step {
        if submitted {
            return stay(Screen::CreatePriority { picker, submitted });
        }
        if picker.handle_key(&key) {
            return stay(Screen::CreatePriority { picker, submitted });
        }
        match key.code {
            KeyCode::Enter => {
                let Some(priority) = picker.selected().copied() else {
                    return stay(Screen::CreatePriority { picker, submitted });
                };
                self.draft.priority = priority;
                let create = Command::CreateTask {
                    list_id: self.selected_list_id.clone().unwrap_or_default(),
                    task: NewTask::from_draft(&self.draft),
                };
                (
                    Screen::CreatePriority {
                        picker,
                        submitted: true,
                    },
                    vec![create],
                )
            }
            _ if is_quit(&key) => (Screen::CreatePriority { picker, submitted }, vec![Command::Quit]),
            _ => stay(Screen::CreatePriority { picker, submitted }),
        }
    }

    fn task_list_key(&mut self, key: KeyEvent) -> Step {
        if self.tasks.loading {
            return stay(Screen::TaskList);
        }
        if self.tasks.picker.handle_key(&key) {
            return stay(Screen::TaskList);
        }
        let selected = self.tasks.picker.selected().cloned();
        match (key.code, selected) {
            (KeyCode::Char('v'), Some(task)) => {
                self.selected_task_id = Some(task.id.clone());
                (Screen::TaskDetail(TaskDetail::default()), detail_fetches(&task.id))
            }
            (KeyCode::Char('e'), Some(task)) => {
                self.selected_task_id = Some(task.id.clone());
                stay(Screen::EditTask(EditState::new(task)))
            }
            (KeyCode::Char('d'), Some(task)) => {
                self.selected_task_id = Some(task.id.clone());
                stay(Screen::DeleteConfirmation { task })
            }
            _ if is_quit(&key) => (Screen::TaskList, vec![Command::Quit]),
            _ => stay(Screen::TaskList),
        }
    }

    fn detail_key(&mut self, mut detail: TaskDetail, key: KeyEvent) -> Step {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => detail.scroll = detail.scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => detail.scroll = detail.scroll.saturating_add(1),
            KeyCode::PageUp => detail.scroll = detail.scroll.saturating_sub(DETAIL_PAGE),
            KeyCode::PageDown => detail.scroll = detail.scroll.saturating_add(DETAIL_PAGE),
            _ if is_quit(&key) => return self.back_to_list(),
            _ => {}
        }
        stay(Screen::TaskDetail(detail))
    }

    fn edit_key(&mut self, mut state: EditState, key: KeyEvent) -> Step {
        match state.mode {
            EditMode::Normal => match key.code {
                KeyCode::Char('i') => {
                    state.mode = EditMode::Insert;
                    state.focus = EditFocus::Description;
                }
                KeyCode::Char('a') => {
                    state.mode = EditMode::Insert;
                    state.focus = EditFocus::Comment;
                }
                KeyCode::Char('s') => {
                    let mut space_id = state.original.space.id.clone();
                    if space_id.is_empty() {
                        space_id = self.space_id();
                    }
                    return (
                        Screen::StatusUpdate {
                            picker: Picker::default(),
                            editor: Box::new(state),
                        },
                        vec![Command::FetchStatuses { space_id }],
                    );
                }
                KeyCode::Char('q') => return self.back_to_list(),
                KeyCode::Char(':') => {
                    state.mode = EditMode::Command;
                    state.command.clear();
                }
                _ => {}
            },
            EditMode::Insert => match key.code {
                KeyCode::Esc => state.mode = EditMode::Normal,
                KeyCode::Tab => state.focus = state.focus.toggle(),
                _ => match state.focus {
                    EditFocus::Description => {
                        state.description.handle_key(&key);
                    }
                    EditFocus::Comment => {
                        state.comment.handle_key(&key);
                    }
                },
            },
            EditMode::Command => match key.code {
                KeyCode::Esc => {
                    state.mode = EditMode::Normal;
                    state.command.clear();
                }
                KeyCode::Enter => return self.run_edit_command(state),
                _ => {
                    state.command.handle_key(&key);
                }
            },
        }
        stay(Screen::EditTask(state))
    }

    fn run_edit_command(&mut self, mut state: EditState) -> Step {
        match state.command.value.as_str() {
            "w" => {
                let task_id = state.original.id.clone();
                let mut commands = Vec::new();
                if !state.comment.is_empty() {
                    commands.push(Command::PostComment {
                        task_id: task_id.clone(),
                        text: state.comment.value.clone(),
                    });
                }
                let update = TaskUpdate::between(&state.original, &state.description.text(), &state.status);
                if !update.is_empty() {
                    commands.push(Command::UpdateTask { task_id, update });
                }
                let (screen, mut fetch) = self.back_to_list();
                commands.append(&mut fetch);
                (screen, commands)
            }
            "q!" => self.back_to_list(),
            "q" => (Screen::EditTask(state), vec![Command::Quit]),
            other => {
                debug!(command = other, "unknown editor command");
                state.mode = EditMode::Normal;
                state.command.clear();
                stay(Screen::EditTask(state))
            }
        }
    }

    fn status_update_key(
        &mut self,
        mut picker: Picker<TaskStatus>,
        mut editor: Box<EditState>,
        key: KeyEvent,
    ) -> Step {
        if picker.handle_key(&key) {
            return stay(Screen::StatusUpdate { picker, editor });
        }
        match key.code {
            KeyCode::Enter => {
                if let Some(status) = picker.selected() {
                    editor.status = status.label.clone();
                }
                editor.mode = EditMode::Normal;
                stay(Screen::EditTask(*editor))
            }
            _ if is_quit(&key) => stay(Screen::EditTask(*editor)),
            _ => stay(Screen::StatusUpdate { picker, editor }),
        }
    }

    fn delete_key(&mut self, task: RemoteTask, key: KeyEvent) -> Step {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => (
                Screen::TaskDeleted {
                    progress: Progress::default(),
                    confirmed: false,
                },
                vec![Command::DeleteTask { task_id: task.id }],
            ),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.back_to_list(),
            _ => stay(Screen::DeleteConfirmation { task }),
        }
    }

    fn handle_outcome(&mut self, mut screen: Screen, outcome: Outcome) -> Step {
        match outcome {
            Outcome::Failed(message) => {
                if let Screen::Error(_) = screen {
                    warn!(%message, "further error after failure");
                    return stay(screen);
                }
                stay(Screen::Error(message))
            }
            Outcome::Done(sentinel) => self.handle_sentinel(screen, sentinel),
            Outcome::Tick => self.advance_progress(screen),
            Outcome::Tasks(tasks) => {
                self.tasks.finish_loading(tasks);
                stay(screen)
            }
            Outcome::Spaces(spaces) => {
                if let Screen::SpaceSelection(picker) = &mut screen {
                    picker.set_items(spaces);
                }
                stay(screen)
            }
            Outcome::Lists(lists) => {
                if let Screen::ListSelection(selection) = &mut screen {
                    selection.set_folderless(lists);
                }
                stay(screen)
            }
            Outcome::Folders(folders) => {
                if let Screen::ListSelection(selection) = &mut screen {
                    selection.set_folders(&folders);
                }
                stay(screen)
            }
            Outcome::Members(members) => {
                if let Screen::CreateAssignees(picker) = &mut screen {
                    picker.set_items(members);
                }
                stay(screen)
            }
            Outcome::Statuses(statuses) => {
                match &mut screen {
                    Screen::CreateStatus(picker) | Screen::StatusUpdate { picker, .. } => {
                        picker.set_items(statuses)
                    }
                    _ => {}
                }
                stay(screen)
            }
            Outcome::Task(task) => {
                if let Screen::TaskDetail(detail) = &mut screen {
                    if self.selected_task_id.as_deref() == Some(task.id.as_str()) {
                        detail.task = Some(task);
                    }
                }
                stay(screen)
            }
            Outcome::Comments { task_id, comments } => {
                if let Screen::TaskDetail(detail) = &mut screen {
                    if self.selected_task_id.as_deref() == Some(task_id.as_str()) {
                        detail.comments = Some(comments);
                    }
                }
                stay(screen)
            }
            Outcome::CredentialsSaved | Outcome::Nothing => stay(screen),
        }
    }

    fn handle_sentinel(&mut self, screen: Screen, sentinel: Sentinel) -> Step {
        match (screen, sentinel) {
            (screen @ Screen::Error(_), _) => stay(screen),
            (Screen::CreatePriority { submitted: true, .. }, Sentinel::TaskCreated) => {
                self.draft = TaskDraft::default();
                (
                    Screen::TaskCreated(Progress::default()),
                    vec![Command::Delay(Duration::ZERO)],
                )
            }
            (Screen::TaskList, Sentinel::ListRefresh) => self.reload_tasks(),
            (screen, Sentinel::ListRefresh) => {
                self.tasks.stale = true;
                stay(screen)
            }
            (Screen::TaskDeleted { progress, confirmed: false }, Sentinel::TaskDeleted) => (
                Screen::TaskDeleted {
                    progress,
                    confirmed: true,
                },
                vec![Command::Delay(Duration::ZERO)],
            ),
            (screen, sentinel) => {
                debug!(%sentinel, screen = screen.name(), "sentinel ignored");
                stay(screen)
            }
        }
    }

    fn advance_progress(&mut self, screen: Screen) -> Step {
        match screen {
            Screen::TaskCreated(mut progress) => {
                if progress.tick() {
                    (Screen::TaskCreated(progress), vec![Command::Quit])
                } else {
                    (Screen::TaskCreated(progress), vec![Command::Delay(FRAME)])
                }
            }
            Screen::TaskDeleted {
                mut progress,
                confirmed: true,
            } => {
                if progress.tick() {
                    self.reload_tasks()
                } else {
                    (
                        Screen::TaskDeleted {
                            progress,
                            confirmed: true,
                        },
                        vec![Command::Delay(FRAME)],
                    )
                }
            }
            screen => stay(screen),
        }
    }
}

fn detail_fetches(task_id: &str) -> Vec<Command> {
    vec![
        Command::FetchTask {
            task_id: task_id.to_string(),
        },
        Command::FetchComments {
            task_id: task_id.to_string(),
        },
    ]
}
